use std::time::Instant;

use poem::http::HeaderValue;
use poem::{Endpoint, Middleware, Request, Result as PoemResult};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

/// Wraps each request in an `http_request` span carrying request and
/// correlation ids. An incoming correlation id is kept; otherwise one is minted.
pub struct RequestTracingMiddleware;

impl<E: Endpoint> Middleware<E> for RequestTracingMiddleware {
    type Output = RequestTracingEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        RequestTracingEndpoint { ep }
    }
}

pub struct RequestTracingEndpoint<E> {
    ep: E,
}

#[poem::async_trait]
impl<E: Endpoint> Endpoint for RequestTracingEndpoint<E> {
    type Output = E::Output;

    async fn call(&self, mut req: Request) -> PoemResult<Self::Output> {
        let request_id = Uuid::new_v4().to_string();
        let correlation_id = extract_correlation_id(&req)
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // Both ids are uuids or came in as valid header values
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            req.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        if let Ok(value) = HeaderValue::from_str(&correlation_id) {
            req.headers_mut().insert(CORRELATION_ID_HEADER, value);
        }

        let span = info_span!(
            "http_request",
            request_id = %request_id,
            correlation_id = %correlation_id,
            method = %req.method(),
            path = %req.uri().path(),
        );

        let started = Instant::now();
        let result = self.ep.call(req).instrument(span.clone()).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        span.in_scope(|| match &result {
            Ok(_) => debug!(elapsed_ms, "Request handled"),
            Err(e) => info!(elapsed_ms, status = %e.status(), "Request failed"),
        });
        result
    }
}

pub fn extract_request_id(req: &Request) -> Option<String> {
    req.header(REQUEST_ID_HEADER).map(|s| s.to_string())
}

pub fn extract_correlation_id(req: &Request) -> Option<String> {
    req.header(CORRELATION_ID_HEADER).map(|s| s.to_string())
}
