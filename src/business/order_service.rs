use crate::business::{DashboardStats, OrderValidator};
use crate::domain::{
    CreateOrderRequest, Order, OrderQuery, RejectRequest, SendPriceOfferRequest, Transition,
    UserDirectory,
};
use crate::error::AppError;
use crate::notify::{NotificationDispatcher, NotificationEvent};
use crate::security::Caller;
use crate::store::{OrderPage, OrderStore, StoreError};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Attempts at drawing an unused order number before giving up
const ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// Result of a mutating operation
#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct OrderOutcome {
    pub message: String,
    pub order: Order,
}

impl OrderOutcome {
    fn new(message: &str, order: Order) -> Self {
        Self {
            message: message.to_string(),
            order,
        }
    }
}

/// Order lifecycle manager: validates input, enforces ownership and roles,
/// runs transitions through the store and announces them.
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    users: Arc<UserDirectory>,
    validator: OrderValidator,
    notifications: NotificationDispatcher,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        users: Arc<UserDirectory>,
        validator: OrderValidator,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            store,
            users,
            validator,
            notifications,
        }
    }

    /// Submit a new order for the calling user
    pub async fn create_order(
        &self,
        caller: &Caller,
        request: CreateOrderRequest,
    ) -> Result<OrderOutcome, AppError> {
        let (contact, draft) = self.validator.validate_create(request)?;

        if let Some(open) = self.store.find_in_flight_for_user(&caller.user_id).await? {
            debug!(
                "User {} still has order {} in {}",
                caller.user_id, open.order_number, open.service_status
            );
            return Err(StoreError::OpenOrderExists {
                order_number: open.order_number,
            }
            .into());
        }

        let mut attempt = 1;
        let order = loop {
            let candidate = Order::new(caller.user_id.clone(), draft.clone());
            match self.store.insert(candidate).await {
                Ok(order) => break order,
                Err(StoreError::DuplicateOrderNumber(number)) if attempt < ORDER_NUMBER_ATTEMPTS => {
                    warn!("Order number {} collided, drawing another", number);
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        self.users.upsert(caller.user_id.clone(), contact.clone()).await;
        info!(
            "Created order {} ({}) for user {}",
            order.order_number, order.id, order.user_id
        );

        self.notifications
            .dispatch(NotificationEvent::OrderCreated, &order, Some(&contact));
        Ok(OrderOutcome::new("Order created successfully", order))
    }

    pub async fn send_price_offer(
        &self,
        caller: &Caller,
        order_id: &str,
        request: SendPriceOfferRequest,
    ) -> Result<OrderOutcome, AppError> {
        caller.require_admin()?;
        self.validator.validate_price_offer(&request)?;

        let transition = Transition::SendPriceOffer {
            price: request.price,
            delivery_date: request.service_delivery_date,
        };
        let order = self
            .run_transition(order_id, transition, NotificationEvent::OfferSent)
            .await?;
        Ok(OrderOutcome::new("Price offer sent successfully", order))
    }

    /// Admin declines an order that has no accepted offer
    pub async fn reject_order(
        &self,
        caller: &Caller,
        order_id: &str,
        request: RejectRequest,
    ) -> Result<OrderOutcome, AppError> {
        caller.require_admin()?;

        let transition = Transition::RejectOrder {
            reason: request.reject_reason.unwrap_or_default(),
        };
        let order = self
            .run_transition(order_id, transition, NotificationEvent::OfferRejectedByAdmin)
            .await?;
        Ok(OrderOutcome::new("Order rejected successfully", order))
    }

    pub async fn accept_price_offer(
        &self,
        caller: &Caller,
        order_id: &str,
    ) -> Result<OrderOutcome, AppError> {
        self.ensure_owner(caller, order_id).await?;

        let order = self
            .run_transition(
                order_id,
                Transition::AcceptPriceOffer,
                NotificationEvent::OfferAccepted,
            )
            .await?;
        Ok(OrderOutcome::new("Price offer accepted successfully", order))
    }

    pub async fn reject_price_offer(
        &self,
        caller: &Caller,
        order_id: &str,
        request: RejectRequest,
    ) -> Result<OrderOutcome, AppError> {
        self.ensure_owner(caller, order_id).await?;

        let transition = Transition::RejectPriceOffer {
            reason: request.reject_reason.unwrap_or_default(),
        };
        let order = self
            .run_transition(order_id, transition, NotificationEvent::OfferRejectedByUser)
            .await?;
        Ok(OrderOutcome::new("Price offer rejected successfully", order))
    }

    pub async fn record_payment(
        &self,
        caller: &Caller,
        order_id: &str,
    ) -> Result<OrderOutcome, AppError> {
        caller.require_admin()?;

        let order = self
            .run_transition(
                order_id,
                Transition::RecordPayment,
                NotificationEvent::PaymentRecorded,
            )
            .await?;
        Ok(OrderOutcome::new("Payment status updated successfully", order))
    }

    pub async fn mark_completed(
        &self,
        caller: &Caller,
        order_id: &str,
    ) -> Result<OrderOutcome, AppError> {
        caller.require_admin()?;

        let order = self
            .run_transition(
                order_id,
                Transition::MarkCompleted,
                NotificationEvent::OrderCompleted,
            )
            .await?;
        Ok(OrderOutcome::new("Order status updated successfully", order))
    }

    /// Hard delete; no other records are touched
    pub async fn delete_order(&self, caller: &Caller, order_id: &str) -> Result<String, AppError> {
        caller.require_admin()?;

        let removed = self.store.delete(order_id).await?;
        info!(
            "Deleted order {} ({}) in {}",
            removed.order_number, removed.id, removed.service_status
        );
        Ok("Order deleted successfully".to_string())
    }

    pub async fn get_order(&self, caller: &Caller, order_id: &str) -> Result<Order, AppError> {
        let order = self.load(order_id).await?;
        if !caller.can_view(&order) {
            return Err(AppError::Forbidden("order belongs to another user".to_string()));
        }
        Ok(order)
    }

    pub async fn list_user_orders(&self, caller: &Caller) -> Result<Vec<Order>, AppError> {
        Ok(self.store.list_for_user(&caller.user_id).await?)
    }

    pub async fn list_orders(
        &self,
        caller: &Caller,
        query: &OrderQuery,
    ) -> Result<OrderPage, AppError> {
        caller.require_admin()?;
        Ok(self.store.list(query).await?)
    }

    pub async fn dashboard_stats(&self, caller: &Caller) -> Result<DashboardStats, AppError> {
        caller.require_admin()?;
        let orders = self.store.all().await?;
        Ok(DashboardStats::from_orders(&orders))
    }

    pub async fn order_count(&self) -> Result<u64, AppError> {
        Ok(self.store.count().await?)
    }

    async fn load(&self, order_id: &str) -> Result<Order, AppError> {
        self.store
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))
    }

    async fn ensure_owner(&self, caller: &Caller, order_id: &str) -> Result<(), AppError> {
        let order = self.load(order_id).await?;
        caller.require_owner(&order)
    }

    /// Guard and apply in one store call, then notify the owner. Ownership
    /// never changes, so a check made before this call still holds.
    async fn run_transition(
        &self,
        order_id: &str,
        transition: Transition,
        event: NotificationEvent,
    ) -> Result<Order, AppError> {
        let order = match self.store.apply_transition(order_id, &transition).await {
            Ok(order) => order,
            Err(StoreError::Transition(e)) => {
                debug!("Rejected {} on order {}: {}", transition.name(), order_id, e);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "Applied {} to order {}: status={} payment={:?} offer={:?}",
            transition.name(),
            order.order_number,
            order.service_status,
            order.service_payment_status,
            order.price_offer.status
        );

        let contact = self.users.get(&order.user_id).await;
        self.notifications.dispatch(event, &order, contact.as_ref());
        Ok(order)
    }
}
