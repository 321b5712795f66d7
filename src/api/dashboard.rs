use poem::Request;
use poem_openapi::{payload::Json, ApiResponse, OpenApi};
use std::sync::Arc;

use crate::business::{DashboardStats, OrderService};
use crate::security::extract_caller;

pub struct DashboardApi {
    service: Arc<OrderService>,
}

impl DashboardApi {
    pub fn new(service: Arc<OrderService>) -> Self {
        Self { service }
    }
}

#[derive(ApiResponse)]
pub enum DashboardStatsResponse {
    #[oai(status = 200)]
    Ok(Json<DashboardStats>),
}

#[OpenApi]
impl DashboardApi {
    /// Order counts and revenue totals (admin)
    #[oai(path = "/dashboard/stats", method = "get")]
    async fn dashboard_stats(&self, req: &Request) -> Result<DashboardStatsResponse, poem::Error> {
        let caller = extract_caller(req)?;
        let stats = self.service.dashboard_stats(&caller).await?;
        Ok(DashboardStatsResponse::Ok(Json(stats)))
    }
}
