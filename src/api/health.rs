use poem_openapi::{payload::Json, ApiResponse, OpenApi};
use std::sync::Arc;
use tracing::error;

use crate::business::OrderService;

pub const SERVICE_NAME: &str = "service-orders";

pub struct HealthApi {
    service: Arc<OrderService>,
}

impl HealthApi {
    pub fn new(service: Arc<OrderService>) -> Self {
        Self { service }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, poem_openapi::Object)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub order_count: Option<u64>,
}

#[derive(ApiResponse)]
pub enum HealthResponse {
    #[oai(status = 200)]
    Ok(Json<HealthStatus>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<HealthStatus>),
}

#[OpenApi]
impl HealthApi {
    /// Liveness plus a store round trip
    #[oai(path = "/health", method = "get")]
    async fn health(&self) -> HealthResponse {
        let mut health = HealthStatus {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            order_count: None,
        };

        match self.service.order_count().await {
            Ok(count) => {
                health.order_count = Some(count);
                HealthResponse::Ok(Json(health))
            }
            Err(e) => {
                error!("Health check could not reach the order store: {}", e);
                health.status = "degraded".to_string();
                HealthResponse::ServiceUnavailable(Json(health))
            }
        }
    }
}
