pub mod dashboard;
pub mod health;
pub mod orders;

pub use dashboard::*;
pub use health::*;
pub use orders::*;

use poem::{Endpoint, EndpointExt, Route};
use poem_openapi::error::{ParseParamError, ParseRequestPayloadError};
use poem_openapi::OpenApiService;
use std::sync::Arc;

use crate::business::OrderService;
use crate::error::AppError;
use crate::observability::RequestTracingMiddleware;

/// Full application: JSON API under `/api`, Swagger UI at `/docs` and the
/// OpenAPI document at `/spec`. Undecodable bodies and parameters are
/// answered with the same JSON error body as every other failure.
pub fn build_app(service: Arc<OrderService>, server_url: &str) -> impl Endpoint {
    let api_service = OpenApiService::new(
        (
            HealthApi::new(Arc::clone(&service)),
            OrdersApi::new(Arc::clone(&service)),
            DashboardApi::new(service),
        ),
        "Service Orders API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(server_url);

    let ui = api_service.swagger_ui();
    let spec = api_service.spec_endpoint();

    Route::new()
        .nest("/api", api_service)
        .nest("/docs", ui)
        .nest("/spec", spec)
        .with(RequestTracingMiddleware)
        .catch_error(|err: ParseRequestPayloadError| async move { AppError::from(err) })
        .catch_error(|err: ParseParamError| async move { AppError::from(err) })
}
