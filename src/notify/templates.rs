use crate::domain::{Order, UserContact};
use crate::notify::NotificationEvent;

fn subject(event: NotificationEvent, order: &Order) -> String {
    let headline = match event {
        NotificationEvent::OrderCreated => "New order received",
        NotificationEvent::OfferSent => "You have a new price offer",
        NotificationEvent::OfferRejectedByAdmin => "Your order was declined",
        NotificationEvent::OfferAccepted => "Price offer accepted",
        NotificationEvent::OfferRejectedByUser => "Price offer rejected",
        NotificationEvent::PaymentRecorded => "Payment received",
        NotificationEvent::OrderCompleted => "Your order is complete",
    };
    format!("{} {}", headline, order.order_number)
}

fn summary(order: &Order) -> String {
    format!(
        "Order: {}\nService: {}\nStatus: {}\n\n{}\n",
        order.order_number,
        order.service_type.label(),
        order.service_status,
        order.service_details
    )
}

fn customer_line(event: NotificationEvent, order: &Order) -> String {
    match event {
        NotificationEvent::OrderCreated => "We received your order.\n".to_string(),
        NotificationEvent::OfferSent => {
            let mut line = format!(
                "We sent a price offer of {:.2} for your order.\n",
                order.price_offer.price
            );
            if let Some(date) = order.service_delivery_date {
                line.push_str(&format!("Expected delivery: {}\n", date.format("%Y-%m-%d")));
            }
            line
        }
        NotificationEvent::OfferRejectedByAdmin => format!(
            "Unfortunately we cannot take on this order. Reason: {}\n",
            order.price_offer.reject_reason
        ),
        NotificationEvent::OfferAccepted => format!(
            "You accepted our offer of {:.2}. Work will start once payment is received.\n",
            order.price_offer.price
        ),
        NotificationEvent::OfferRejectedByUser => {
            "You rejected our price offer. The order has been cancelled.\n".to_string()
        }
        NotificationEvent::PaymentRecorded => "We recorded your payment. Thank you.\n".to_string(),
        NotificationEvent::OrderCompleted => "Your order has been completed.\n".to_string(),
    }
}

/// Subject and body for the order owner
pub fn render_customer(
    event: NotificationEvent,
    order: &Order,
    contact: &UserContact,
) -> (String, String) {
    let mut body = format!("Hello {},\n\n", contact.first_name);
    body.push_str(&customer_line(event, order));
    body.push('\n');
    body.push_str(&summary(order));
    (subject(event, order), body)
}

/// Subject and body for the company inbox
pub fn render_company(
    event: NotificationEvent,
    order: &Order,
    contact: Option<&UserContact>,
) -> (String, String) {
    let mut body = match contact {
        Some(contact) => format!(
            "Customer: {} <{}> {}\n",
            contact.full_name(),
            contact.email,
            contact.mobile_number
        ),
        None => format!("Customer: {}\n", order.user_id),
    };
    if let Some(ref attachment) = order.attachment {
        body.push_str(&format!("Attachment: {}\n", attachment));
    }
    body.push('\n');
    body.push_str(&summary(order));
    (subject(event, order), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderDraft, ServiceType, Transition};
    use chrono::Utc;

    fn order() -> Order {
        Order::new(
            "u7".to_string(),
            OrderDraft {
                service_type: ServiceType::WebDevelopment,
                service_details: "A booking site for a clinic".to_string(),
                service_delivery_date: None,
                attachment: Some("wireframe.png".to_string()),
            },
        )
    }

    fn contact() -> UserContact {
        UserContact {
            first_name: "Yousef".to_string(),
            last_name: "Amin".to_string(),
            email: "yousef@example.com".to_string(),
            mobile_number: "0599999999".to_string(),
        }
    }

    #[test]
    fn test_offer_message_mentions_price() {
        let mut order = order();
        Transition::SendPriceOffer {
            price: 1250.5,
            delivery_date: Some(Utc::now()),
        }
        .apply(&mut order, Utc::now())
        .unwrap();

        let (subject, body) = render_customer(NotificationEvent::OfferSent, &order, &contact());
        assert!(subject.contains(&order.order_number));
        assert!(body.starts_with("Hello Yousef"));
        assert!(body.contains("1250.50"));
        assert!(body.contains("Expected delivery"));
        assert!(body.contains("wait-for-approval"));
    }

    #[test]
    fn test_admin_rejection_includes_reason() {
        let mut order = order();
        Transition::RejectOrder {
            reason: "Outside our expertise".to_string(),
        }
        .apply(&mut order, Utc::now())
        .unwrap();

        let (_, body) = render_customer(NotificationEvent::OfferRejectedByAdmin, &order, &contact());
        assert!(body.contains("Outside our expertise"));
    }

    #[test]
    fn test_company_message_lists_customer_and_attachment() {
        let (subject, body) = render_company(NotificationEvent::OrderCreated, &order(), Some(&contact()));
        assert!(subject.starts_with("New order received"));
        assert!(body.contains("Yousef Amin <yousef@example.com>"));
        assert!(body.contains("Attachment: wireframe.png"));
        assert!(body.contains("web development"));
    }

    #[test]
    fn test_company_message_without_contact_uses_user_id() {
        let (_, body) = render_company(NotificationEvent::OrderCompleted, &order(), None);
        assert!(body.starts_with("Customer: u7\n"));
        assert!(body.contains("Status: pending"));
    }
}
