//! Outbound customer and company notifications.
//!
//! Notifications are best effort. The dispatcher hands each message to a
//! detached task after the order change is stored; delivery failures are
//! retried a bounded number of times and then logged, never surfaced.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{Order, UserContact};
use crate::resilience::{retry_with_backoff, RetryConfig, RetryableError};

pub mod templates;
pub mod webhook;

pub use webhook::WebhookNotifier;

/// Lifecycle events that produce a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationEvent {
    OrderCreated,
    OfferSent,
    OfferRejectedByAdmin,
    OfferAccepted,
    OfferRejectedByUser,
    PaymentRecorded,
    OrderCompleted,
}

impl NotificationEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationEvent::OrderCreated => "order-created",
            NotificationEvent::OfferSent => "offer-sent",
            NotificationEvent::OfferRejectedByAdmin => "offer-rejected-by-admin",
            NotificationEvent::OfferAccepted => "offer-accepted",
            NotificationEvent::OfferRejectedByUser => "offer-rejected-by-user",
            NotificationEvent::PaymentRecorded => "payment-recorded",
            NotificationEvent::OrderCompleted => "order-completed",
        }
    }
}

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub event: NotificationEvent,
    pub to: String,
    pub recipient_name: Option<String>,
    pub subject: String,
    pub body: String,
    pub order_id: String,
    pub order_number: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Delivery rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Notifier unavailable: {0}")]
    Unavailable(String),
}

impl RetryableError for NotifyError {
    fn is_retryable(&self) -> bool {
        match self {
            NotifyError::Transport(_) => true,
            NotifyError::Rejected { status, .. } => *status >= 500 || *status == 429,
            NotifyError::Unavailable(_) => false,
        }
    }
}

/// Delivery backend
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of delivering them
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            event = notification.event.as_str(),
            to = %notification.to,
            order_number = %notification.order_number,
            "Notification: {}",
            notification.subject
        );
        Ok(())
    }
}

/// Renders lifecycle events and dispatches them off the request path
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    retry: RetryConfig,
    company_email: String,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, retry: RetryConfig, company_email: String) -> Self {
        Self {
            notifier,
            retry,
            company_email,
        }
    }

    /// Messages an event produces: the customer is addressed when a contact
    /// is known; new and completed orders also go to the company inbox.
    pub fn render(
        &self,
        event: NotificationEvent,
        order: &Order,
        contact: Option<&UserContact>,
    ) -> Vec<Notification> {
        let mut messages = Vec::new();

        let to_customer = !matches!(event, NotificationEvent::OrderCreated);
        let to_company = matches!(
            event,
            NotificationEvent::OrderCreated | NotificationEvent::OrderCompleted
        );

        if to_customer {
            match contact {
                Some(contact) => {
                    let (subject, body) = templates::render_customer(event, order, contact);
                    messages.push(Notification {
                        event,
                        to: contact.email.clone(),
                        recipient_name: Some(contact.full_name()),
                        subject,
                        body,
                        order_id: order.id.clone(),
                        order_number: order.order_number.clone(),
                    });
                }
                None => debug!(
                    "No contact on file for user {}, skipping {} message",
                    order.user_id,
                    event.as_str()
                ),
            }
        }

        if to_company {
            let (subject, body) = templates::render_company(event, order, contact);
            messages.push(Notification {
                event,
                to: self.company_email.clone(),
                recipient_name: None,
                subject,
                body,
                order_id: order.id.clone(),
                order_number: order.order_number.clone(),
            });
        }

        messages
    }

    /// Render and send in the background. Returns immediately.
    pub fn dispatch(&self, event: NotificationEvent, order: &Order, contact: Option<&UserContact>) {
        for notification in self.render(event, order, contact) {
            let notifier = Arc::clone(&self.notifier);
            let retry = self.retry.clone();
            tokio::spawn(async move {
                let result =
                    retry_with_backoff(&retry, || notifier.send(&notification)).await;
                match result {
                    Ok(()) => debug!(
                        "Delivered {} notification for {} to {}",
                        notification.event.as_str(),
                        notification.order_number,
                        notification.to
                    ),
                    Err(e) => warn!(
                        "Dropping {} notification for {} to {}: {}",
                        notification.event.as_str(),
                        notification.order_number,
                        notification.to,
                        e
                    ),
                }
            });
        }
    }
}
