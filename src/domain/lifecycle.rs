use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::order::{OfferStatus, Order, PaymentStatus, ServiceStatus};

/// A status-changing operation on an existing order.
///
/// Each transition checks its guard against the order's current composite
/// state `(service_status, price_offer.status, service_payment_status)`
/// and only then mutates it. Stores run `apply` under the same lock used for
/// the read so the guard and the write cannot interleave with another request.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Admin proposes a price
    SendPriceOffer {
        price: f64,
        delivery_date: Option<DateTime<Utc>>,
    },
    /// Admin declines the order before any offer is accepted
    RejectOrder { reason: String },
    /// Customer accepts the offered price
    AcceptPriceOffer,
    /// Customer declines the offered price
    RejectPriceOffer { reason: String },
    /// Admin records the customer's payment
    RecordPayment,
    /// Admin closes a paid order
    MarkCompleted,
}

/// Guard violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A price offer cannot be sent for this order")]
    OfferNotPending,

    #[error("This order cannot be rejected")]
    OrderNotRejectable,

    #[error("A reject reason is required")]
    RejectReasonRequired,

    #[error("The price offer on this order cannot be {action}")]
    NotAwaitingApproval { action: &'static str },

    #[error("Payment cannot be recorded for this order")]
    PaymentNotAllowed,

    #[error("This order has already been paid")]
    AlreadyPaid,

    #[error("This order cannot be completed")]
    NotCompletable,

    #[error("The order must be paid before it can be completed")]
    PaymentRequired,
}

impl TransitionError {
    /// Stable machine-readable code for the error body
    pub fn code(&self) -> &'static str {
        match self {
            TransitionError::OfferNotPending => "offer_not_pending",
            TransitionError::OrderNotRejectable => "order_not_rejectable",
            TransitionError::RejectReasonRequired => "reject_reason_required",
            TransitionError::NotAwaitingApproval { .. } => "offer_not_awaiting_approval",
            TransitionError::PaymentNotAllowed => "payment_not_allowed",
            TransitionError::AlreadyPaid => "already_paid",
            TransitionError::NotCompletable => "order_not_completable",
            TransitionError::PaymentRequired => "payment_required",
        }
    }
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Transition::SendPriceOffer { .. } => "send_price_offer",
            Transition::RejectOrder { .. } => "reject_order",
            Transition::AcceptPriceOffer => "accept_price_offer",
            Transition::RejectPriceOffer { .. } => "reject_price_offer",
            Transition::RecordPayment => "record_payment",
            Transition::MarkCompleted => "mark_completed",
        }
    }

    /// Check the transition against the order's current state without mutating it.
    pub fn guard(&self, order: &Order) -> Result<(), TransitionError> {
        match self {
            Transition::SendPriceOffer { .. } => {
                if order.price_offer.status != OfferStatus::Pending
                    || order.service_status.is_terminal()
                {
                    return Err(TransitionError::OfferNotPending);
                }
            }
            Transition::RejectOrder { reason } => {
                if order.price_offer.status != OfferStatus::Pending
                    || order.service_status.is_terminal()
                {
                    return Err(TransitionError::OrderNotRejectable);
                }
                if reason.trim().is_empty() {
                    return Err(TransitionError::RejectReasonRequired);
                }
            }
            Transition::AcceptPriceOffer => {
                if order.service_status != ServiceStatus::WaitForApproval {
                    return Err(TransitionError::NotAwaitingApproval { action: "accepted" });
                }
            }
            Transition::RejectPriceOffer { .. } => {
                if order.service_status != ServiceStatus::WaitForApproval {
                    return Err(TransitionError::NotAwaitingApproval { action: "rejected" });
                }
            }
            Transition::RecordPayment => {
                if order.service_status != ServiceStatus::InProgress {
                    return Err(TransitionError::PaymentNotAllowed);
                }
                if order.service_payment_status == PaymentStatus::Paid {
                    return Err(TransitionError::AlreadyPaid);
                }
            }
            Transition::MarkCompleted => {
                if order.service_status != ServiceStatus::InProgress {
                    return Err(TransitionError::NotCompletable);
                }
                if order.service_payment_status != PaymentStatus::Paid {
                    return Err(TransitionError::PaymentRequired);
                }
            }
        }
        Ok(())
    }

    /// Guard, then mutate. On error the order is left untouched.
    pub fn apply(&self, order: &mut Order, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.guard(order)?;

        match self {
            Transition::SendPriceOffer {
                price,
                delivery_date,
            } => {
                order.price_offer.price = *price;
                order.price_offer.status = OfferStatus::Pending;
                order.price_offer.reject_reason.clear();
                order.price_offer.sent_at = Some(now);
                order.price_offer.responded_at = None;
                order.service_status = ServiceStatus::WaitForApproval;
                if delivery_date.is_some() {
                    order.service_delivery_date = *delivery_date;
                }
            }
            Transition::RejectOrder { reason } => {
                order.service_status = ServiceStatus::Cancelled;
                order.service_payment_status = PaymentStatus::Unpaid;
                order.price_offer.status = OfferStatus::Rejected;
                order.price_offer.reject_reason = reason.trim().to_string();
            }
            Transition::AcceptPriceOffer => {
                order.service_status = ServiceStatus::InProgress;
                order.service_payment_status = PaymentStatus::Unpaid;
                order.price_offer.status = OfferStatus::Accepted;
                order.price_offer.responded_at = Some(now);
            }
            Transition::RejectPriceOffer { reason } => {
                order.service_status = ServiceStatus::Cancelled;
                order.service_payment_status = PaymentStatus::Unpaid;
                order.price_offer.status = OfferStatus::Rejected;
                order.price_offer.responded_at = Some(now);
                order.price_offer.reject_reason = reason.trim().to_string();
            }
            Transition::RecordPayment => {
                order.service_payment_status = PaymentStatus::Paid;
                order.service_payment_date = Some(now);
                order.price_offer.status = OfferStatus::Accepted;
            }
            Transition::MarkCompleted => {
                order.service_status = ServiceStatus::Completed;
                order.price_offer.status = OfferStatus::Accepted;
            }
        }

        order.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderDraft, ServiceType};

    fn pending_order() -> Order {
        Order::new(
            "user-1".to_string(),
            OrderDraft {
                service_type: ServiceType::WebDevelopment,
                service_details: "details".to_string(),
                service_delivery_date: None,
                attachment: None,
            },
        )
    }

    fn offer(price: f64) -> Transition {
        Transition::SendPriceOffer {
            price,
            delivery_date: None,
        }
    }

    fn apply(order: &mut Order, transition: Transition) -> Result<(), TransitionError> {
        transition.apply(order, Utc::now())
    }

    #[test]
    fn test_send_offer_then_accept() {
        let mut order = pending_order();
        apply(&mut order, offer(500.0)).unwrap();
        assert_eq!(order.service_status, ServiceStatus::WaitForApproval);
        assert_eq!(order.price_offer.price, 500.0);
        assert!(order.price_offer.sent_at.is_some());

        apply(&mut order, Transition::AcceptPriceOffer).unwrap();
        assert_eq!(order.service_status, ServiceStatus::InProgress);
        assert_eq!(order.price_offer.status, OfferStatus::Accepted);
        assert_eq!(order.service_payment_status, PaymentStatus::Unpaid);
        assert!(order.price_offer.responded_at.is_some());
    }

    #[test]
    fn test_accept_twice_fails() {
        let mut order = pending_order();
        apply(&mut order, offer(100.0)).unwrap();
        apply(&mut order, Transition::AcceptPriceOffer).unwrap();

        let err = apply(&mut order, Transition::AcceptPriceOffer).unwrap_err();
        assert_eq!(err, TransitionError::NotAwaitingApproval { action: "accepted" });
    }

    #[test]
    fn test_accept_requires_offer() {
        let mut order = pending_order();
        let err = apply(&mut order, Transition::AcceptPriceOffer).unwrap_err();
        assert_eq!(err.code(), "offer_not_awaiting_approval");
        assert_eq!(order.service_status, ServiceStatus::Pending);
    }

    #[test]
    fn test_offer_can_be_resent_while_awaiting_approval() {
        let mut order = pending_order();
        let date = Utc::now();
        apply(
            &mut order,
            Transition::SendPriceOffer {
                price: 100.0,
                delivery_date: Some(date),
            },
        )
        .unwrap();
        apply(&mut order, offer(150.0)).unwrap();

        assert_eq!(order.price_offer.price, 150.0);
        assert_eq!(order.service_delivery_date, Some(date));
    }

    #[test]
    fn test_offer_rejected_after_acceptance() {
        let mut order = pending_order();
        apply(&mut order, offer(100.0)).unwrap();
        apply(&mut order, Transition::AcceptPriceOffer).unwrap();

        assert_eq!(
            apply(&mut order, offer(200.0)).unwrap_err(),
            TransitionError::OfferNotPending
        );
    }

    #[test]
    fn test_admin_reject() {
        let mut order = pending_order();
        apply(
            &mut order,
            Transition::RejectOrder {
                reason: "  out of scope ".to_string(),
            },
        )
        .unwrap();

        assert_eq!(order.service_status, ServiceStatus::Cancelled);
        assert_eq!(order.price_offer.status, OfferStatus::Rejected);
        assert_eq!(order.price_offer.reject_reason, "out of scope");
    }

    #[test]
    fn test_admin_reject_requires_reason() {
        let mut order = pending_order();
        let err = apply(
            &mut order,
            Transition::RejectOrder {
                reason: "   ".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err, TransitionError::RejectReasonRequired);
        assert_eq!(order.service_status, ServiceStatus::Pending);
    }

    #[test]
    fn test_user_reject_offer() {
        let mut order = pending_order();
        apply(&mut order, offer(100.0)).unwrap();
        apply(
            &mut order,
            Transition::RejectPriceOffer {
                reason: "too expensive".to_string(),
            },
        )
        .unwrap();

        assert_eq!(order.service_status, ServiceStatus::Cancelled);
        assert_eq!(order.price_offer.status, OfferStatus::Rejected);
        assert_eq!(order.price_offer.reject_reason, "too expensive");
        assert!(order.price_offer.responded_at.is_some());
    }

    #[test]
    fn test_payment_requires_in_progress() {
        let mut order = pending_order();
        let before = order.clone();
        let err = apply(&mut order, Transition::RecordPayment).unwrap_err();
        assert_eq!(err, TransitionError::PaymentNotAllowed);
        assert_eq!(order, before);
    }

    #[test]
    fn test_payment_then_complete() {
        let mut order = pending_order();
        apply(&mut order, offer(100.0)).unwrap();
        apply(&mut order, Transition::AcceptPriceOffer).unwrap();

        assert_eq!(
            apply(&mut order, Transition::MarkCompleted).unwrap_err(),
            TransitionError::PaymentRequired
        );

        apply(&mut order, Transition::RecordPayment).unwrap();
        assert_eq!(order.service_payment_status, PaymentStatus::Paid);
        assert!(order.service_payment_date.is_some());
        assert_eq!(
            apply(&mut order, Transition::RecordPayment).unwrap_err(),
            TransitionError::AlreadyPaid
        );

        apply(&mut order, Transition::MarkCompleted).unwrap();
        assert_eq!(order.service_status, ServiceStatus::Completed);
        assert_eq!(order.price_offer.status, OfferStatus::Accepted);
    }

    #[test]
    fn test_terminal_orders_reject_every_transition() {
        let mut cancelled = pending_order();
        apply(
            &mut cancelled,
            Transition::RejectOrder {
                reason: "no".to_string(),
            },
        )
        .unwrap();

        let transitions = vec![
            offer(10.0),
            Transition::RejectOrder {
                reason: "again".to_string(),
            },
            Transition::AcceptPriceOffer,
            Transition::RejectPriceOffer {
                reason: String::new(),
            },
            Transition::RecordPayment,
            Transition::MarkCompleted,
        ];

        for transition in transitions {
            let before = cancelled.clone();
            assert!(
                apply(&mut cancelled, transition.clone()).is_err(),
                "{} should fail on a cancelled order",
                transition.name()
            );
            assert_eq!(cancelled, before);
        }
    }

    #[test]
    fn test_random_walk_stays_in_defined_states() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..200 {
            let mut order = pending_order();
            for _ in 0..12 {
                let transition = match rng.u8(0..6) {
                    0 => offer(rng.f64() * 1000.0),
                    1 => Transition::RejectOrder {
                        reason: "r".to_string(),
                    },
                    2 => Transition::AcceptPriceOffer,
                    3 => Transition::RejectPriceOffer {
                        reason: String::new(),
                    },
                    4 => Transition::RecordPayment,
                    _ => Transition::MarkCompleted,
                };
                let _ = apply(&mut order, transition);

                assert!(ServiceStatus::ALL.contains(&order.service_status));
                if order.service_status == ServiceStatus::Completed {
                    assert_eq!(order.service_payment_status, PaymentStatus::Paid);
                    assert_eq!(order.price_offer.status, OfferStatus::Accepted);
                }
                if order.service_status == ServiceStatus::Cancelled {
                    assert_eq!(order.price_offer.status, OfferStatus::Rejected);
                }
            }
        }
    }
}
