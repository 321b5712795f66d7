use std::collections::HashSet;

use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::domain::{OfferStatus, Order, PaymentStatus, ServiceStatus};

/// Order counts by status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Object)]
pub struct StatusCounts {
    pub pending: u64,
    pub wait_for_approval: u64,
    pub in_progress: u64,
    pub wait_for_pay: u64,
    pub cancelled: u64,
    pub completed: u64,
}

impl StatusCounts {
    fn bump(&mut self, status: ServiceStatus) {
        let slot = match status {
            ServiceStatus::Pending => &mut self.pending,
            ServiceStatus::WaitForApproval => &mut self.wait_for_approval,
            ServiceStatus::InProgress => &mut self.in_progress,
            ServiceStatus::WaitForPay => &mut self.wait_for_pay,
            ServiceStatus::Cancelled => &mut self.cancelled,
            ServiceStatus::Completed => &mut self.completed,
        };
        *slot += 1;
    }
}

/// Admin dashboard aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Object)]
pub struct DashboardStats {
    pub total_orders: u64,
    pub by_status: StatusCounts,
    pub rejected_offers: u64,
    /// Sum of offer prices on paid orders with an accepted offer
    pub earnings: f64,
    /// Sum of offer prices on every unpaid order, whatever the offer status
    pub unpaid_total: f64,
    /// Sum of offer prices that were rejected and never paid
    pub losses: f64,
    pub total_users: u64,
}

impl DashboardStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        let mut stats = DashboardStats::default();
        let mut users = HashSet::new();

        for order in orders {
            stats.total_orders += 1;
            stats.by_status.bump(order.service_status);
            users.insert(order.user_id.as_str());

            let offer = &order.price_offer;
            match (order.service_payment_status, offer.status) {
                (PaymentStatus::Paid, OfferStatus::Accepted) => stats.earnings += offer.price,
                (PaymentStatus::Unpaid, OfferStatus::Rejected) => stats.losses += offer.price,
                _ => {}
            }
            if order.service_payment_status == PaymentStatus::Unpaid {
                stats.unpaid_total += offer.price;
            }
            if offer.status == OfferStatus::Rejected {
                stats.rejected_offers += 1;
            }
        }

        stats.total_users = users.len() as u64;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderDraft, ServiceType, Transition};
    use chrono::Utc;

    fn order(user: &str) -> Order {
        Order::new(
            user.to_string(),
            OrderDraft {
                service_type: ServiceType::TechnicalSupport,
                service_details: "Server migration".to_string(),
                service_delivery_date: None,
                attachment: None,
            },
        )
    }

    fn walk(order: &mut Order, steps: &[Transition]) {
        for step in steps {
            step.apply(order, Utc::now()).unwrap();
        }
    }

    fn offer(price: f64) -> Transition {
        Transition::SendPriceOffer {
            price,
            delivery_date: None,
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(DashboardStats::from_orders(&[]), DashboardStats::default());
    }

    #[test]
    fn test_aggregates() {
        let pending = order("u1");

        let mut paid = order("u2");
        walk(
            &mut paid,
            &[offer(300.0), Transition::AcceptPriceOffer, Transition::RecordPayment],
        );

        let mut unpaid = order("u3");
        walk(&mut unpaid, &[offer(120.0), Transition::AcceptPriceOffer]);

        let mut rejected = order("u3");
        walk(
            &mut rejected,
            &[
                offer(80.0),
                Transition::RejectPriceOffer {
                    reason: "Too expensive".to_string(),
                },
            ],
        );

        let stats = DashboardStats::from_orders(&[pending, paid, unpaid, rejected]);
        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.by_status.pending, 1);
        assert_eq!(stats.by_status.in_progress, 2);
        assert_eq!(stats.by_status.cancelled, 1);
        assert_eq!(stats.rejected_offers, 1);
        assert_eq!(stats.earnings, 300.0);
        // accepted 120 plus rejected 80; the pending order has no price yet
        assert_eq!(stats.unpaid_total, 200.0);
        assert_eq!(stats.losses, 80.0);
        assert_eq!(stats.total_users, 3);
    }

    #[test]
    fn test_unpaid_total_counts_open_offers() {
        let mut offered = order("u1");
        walk(&mut offered, &[offer(500.0)]);

        let stats = DashboardStats::from_orders(&[offered]);
        assert_eq!(stats.unpaid_total, 500.0);
        assert_eq!(stats.earnings, 0.0);
        assert_eq!(stats.by_status.wait_for_approval, 1);
    }
}
