use chrono::{DateTime, Utc};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::domain::order::ServiceType;

/// Metadata of a file uploaded alongside an order. The bytes themselves are
/// handled by the upload layer.
#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct AttachmentMeta {
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct CreateOrderRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub service_type: ServiceType,
    pub service_details: String,
    pub service_delivery_date: Option<DateTime<Utc>>,
    pub attachment: Option<AttachmentMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct SendPriceOfferRequest {
    pub price: f64,
    pub service_delivery_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Object)]
pub struct RejectRequest {
    pub reject_reason: Option<String>,
}

/// Admin listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub page: u64,
    pub limit: u64,
    pub search: Option<String>,
}

impl OrderQuery {
    pub const DEFAULT_LIMIT: u64 = 10;
    pub const MAX_LIMIT: u64 = 100;

    /// Clamp raw query parameters: missing or zero page is 1, missing or zero
    /// limit is 10, limit never exceeds 100, blank search is no search.
    pub fn new(page: Option<u64>, limit: Option<u64>, search: Option<String>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(Self::MAX_LIMIT);
        let search = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        Self { page, limit, search }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Case-insensitive substring match on the order number
    pub fn matches(&self, order_number: &str) -> bool {
        match &self.search {
            Some(needle) => order_number.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = OrderQuery::new(None, None, None);
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert_eq!(query.skip(), 0);
        assert!(query.search.is_none());
    }

    #[test]
    fn test_query_clamps() {
        let query = OrderQuery::new(Some(0), Some(0), Some("   ".to_string()));
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert!(query.search.is_none());

        let query = OrderQuery::new(Some(3), Some(500), None);
        assert_eq!(query.limit, 100);
        assert_eq!(query.skip(), 200);
    }

    #[test]
    fn test_query_search_is_case_insensitive_substring() {
        let query = OrderQuery::new(None, None, Some(" 4567 ".to_string()));
        assert!(query.matches("#123456789012"));
        assert!(!query.matches("#999999999000"));

        let query = OrderQuery::new(None, None, Some("#12".to_string()));
        assert!(query.matches("#123456789012"));
    }
}
