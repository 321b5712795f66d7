use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::trace;

use crate::domain::{Order, OrderId, OrderQuery, Transition};
use crate::store::{OrderPage, OrderStore, StoreError};

/// Process-local order store. Every mutation holds the write lock for the
/// full check-and-write.
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;

        if let Some(open) = orders
            .values()
            .find(|o| o.user_id == order.user_id && o.is_in_flight())
        {
            return Err(StoreError::OpenOrderExists {
                order_number: open.order_number.clone(),
            });
        }
        if orders.values().any(|o| o.order_number == order.order_number) {
            return Err(StoreError::DuplicateOrderNumber(order.order_number));
        }
        if orders.contains_key(&order.id) {
            return Err(StoreError::Backend(format!("duplicate order id {}", order.id)));
        }

        trace!("Inserting order {}", order.id);
        orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders.get(id).cloned())
    }

    async fn find_in_flight_for_user(&self, user_id: &str) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .find(|o| o.user_id == user_id && o.is_in_flight())
            .cloned())
    }

    async fn apply_transition(&self, id: &str, transition: &Transition) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        transition.apply(order, Utc::now())?;
        Ok(order.clone())
    }

    async fn delete(&self, id: &str) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        orders
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        let mut owned: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut owned);
        Ok(owned)
    }

    async fn list(&self, query: &OrderQuery) -> Result<OrderPage, StoreError> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| query.matches(&o.order_number))
            .cloned()
            .collect();
        drop(orders);

        newest_first(&mut matching);
        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.limit as usize)
            .collect();

        Ok(OrderPage {
            data,
            total,
            page: query.page,
            limit: query.limit,
        })
    }

    async fn all(&self) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders.values().cloned().collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.orders.read().await.len() as u64)
    }
}
