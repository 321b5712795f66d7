use chrono::{DateTime, Utc};
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};

pub type OrderId = String;
pub type UserId = String;

/// Lowest and highest numeral an order number may carry.
pub const ORDER_NUMBER_MIN: u64 = 100_000_000_000;
pub const ORDER_NUMBER_MAX: u64 = 999_999_999_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    #[oai(rename = "web-development")]
    WebDevelopment,
    #[oai(rename = "technical-consultation")]
    TechnicalConsultation,
    #[oai(rename = "technical-support")]
    TechnicalSupport,
}

impl ServiceType {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::WebDevelopment => "web development",
            ServiceType::TechnicalConsultation => "technical consultation",
            ServiceType::TechnicalSupport => "technical support",
        }
    }
}

/// Fulfilment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceStatus {
    #[oai(rename = "pending")]
    Pending,
    #[oai(rename = "wait-for-approval")]
    WaitForApproval,
    #[oai(rename = "in-progress")]
    InProgress,
    #[oai(rename = "wait-for-pay")]
    WaitForPay,
    #[oai(rename = "cancelled")]
    Cancelled,
    #[oai(rename = "completed")]
    Completed,
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 6] = [
        ServiceStatus::Pending,
        ServiceStatus::WaitForApproval,
        ServiceStatus::InProgress,
        ServiceStatus::WaitForPay,
        ServiceStatus::Cancelled,
        ServiceStatus::Completed,
    ];

    /// An order in one of these statuses blocks its owner from opening another.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            ServiceStatus::Pending
                | ServiceStatus::WaitForApproval
                | ServiceStatus::InProgress
                | ServiceStatus::WaitForPay
        )
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_in_flight()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Pending => "pending",
            ServiceStatus::WaitForApproval => "wait-for-approval",
            ServiceStatus::InProgress => "in-progress",
            ServiceStatus::WaitForPay => "wait-for-pay",
            ServiceStatus::Cancelled => "cancelled",
            ServiceStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[oai(rename = "unpaid")]
    Unpaid,
    #[oai(rename = "paid")]
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    #[oai(rename = "pending")]
    Pending,
    #[oai(rename = "accepted")]
    Accepted,
    #[oai(rename = "rejected")]
    Rejected,
}

/// Admin-proposed price for an order and the customer's response to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Object)]
pub struct PriceOffer {
    pub price: f64,
    pub status: OfferStatus,
    pub reject_reason: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl Default for PriceOffer {
    fn default() -> Self {
        Self {
            price: 0.0,
            status: OfferStatus::Pending,
            reject_reason: String::new(),
            sent_at: None,
            responded_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Object)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub service_type: ServiceType,
    pub service_details: String,
    pub service_delivery_date: Option<DateTime<Utc>>,
    pub service_status: ServiceStatus,
    pub service_payment_status: PaymentStatus,
    pub service_payment_date: Option<DateTime<Utc>>,
    pub attachment: Option<String>,
    pub price_offer: PriceOffer,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a fresh pending order. The order number is drawn here and may be
    /// redrawn by the caller if the store reports a collision.
    pub fn new(user_id: UserId, draft: OrderDraft) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            order_number: generate_order_number(),
            user_id,
            service_type: draft.service_type,
            service_details: draft.service_details,
            service_delivery_date: draft.service_delivery_date,
            service_status: ServiceStatus::Pending,
            service_payment_status: PaymentStatus::Unpaid,
            service_payment_date: None,
            attachment: draft.attachment,
            price_offer: PriceOffer::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.service_status.is_in_flight()
    }
}

/// Validated input for a new order
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub service_type: ServiceType,
    pub service_details: String,
    pub service_delivery_date: Option<DateTime<Utc>>,
    pub attachment: Option<String>,
}

/// `#` followed by a random 12-digit numeral.
pub fn generate_order_number() -> String {
    format!("#{}", fastrand::u64(ORDER_NUMBER_MIN..=ORDER_NUMBER_MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> OrderDraft {
        OrderDraft {
            service_type: ServiceType::WebDevelopment,
            service_details: "Build a storefront".to_string(),
            service_delivery_date: None,
            attachment: None,
        }
    }

    #[test]
    fn test_new_order_defaults() {
        let order = Order::new("user-1".to_string(), draft());

        assert_eq!(order.user_id, "user-1");
        assert_eq!(order.service_status, ServiceStatus::Pending);
        assert_eq!(order.service_payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.price_offer.status, OfferStatus::Pending);
        assert_eq!(order.price_offer.price, 0.0);
        assert!(order.service_payment_date.is_none());
        assert!(!order.id.is_empty());
        assert_eq!(order.created_at, order.updated_at);
    }

    #[test]
    fn test_order_number_format() {
        for _ in 0..1000 {
            let number = generate_order_number();
            assert!(number.starts_with('#'));
            let digits = &number[1..];
            assert_eq!(digits.len(), 12, "bad number {}", number);
            assert!(digits.chars().all(|c| c.is_ascii_digit()));
            let value: u64 = digits.parse().unwrap();
            assert!((ORDER_NUMBER_MIN..=ORDER_NUMBER_MAX).contains(&value));
        }
    }

    #[test]
    fn test_in_flight_statuses() {
        assert!(ServiceStatus::Pending.is_in_flight());
        assert!(ServiceStatus::WaitForApproval.is_in_flight());
        assert!(ServiceStatus::InProgress.is_in_flight());
        assert!(ServiceStatus::WaitForPay.is_in_flight());
        assert!(ServiceStatus::Cancelled.is_terminal());
        assert!(ServiceStatus::Completed.is_terminal());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ServiceStatus::WaitForApproval).unwrap();
        assert_eq!(json, "\"wait-for-approval\"");
        let json = serde_json::to_string(&ServiceType::TechnicalSupport).unwrap();
        assert_eq!(json, "\"technical-support\"");
        let parsed: PaymentStatus = serde_json::from_str("\"paid\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Paid);
    }

    #[test]
    fn test_status_display_matches_wire_name() {
        for status in ServiceStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }
}
