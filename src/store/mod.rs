//! Order persistence.
//!
//! The lifecycle never reads an order and writes it back in two steps.
//! Backends receive the whole [`Transition`] and must check its guard and
//! apply it as a single atomic operation, so two concurrent requests against
//! the same order cannot both pass a guard computed from the same snapshot.

use async_trait::async_trait;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Order, OrderQuery, Transition, TransitionError};
use crate::error::AppError;

pub mod memory;

pub use memory::MemoryOrderStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The user still has an order that is not cancelled or completed
    #[error("User already has an order in progress ({order_number})")]
    OpenOrderExists { order_number: String },

    #[error("Order number {0} is already taken")]
    DuplicateOrderNumber(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(format!("Order {} not found", id)),
            StoreError::OpenOrderExists { .. } => AppError::InvalidState {
                code: "order_in_flight",
                message: "You already have an order being processed. Please wait until it is finished."
                    .to_string(),
            },
            StoreError::Transition(err) => err.into(),
            StoreError::DuplicateOrderNumber(_) | StoreError::Backend(_) => {
                AppError::Internal(anyhow::Error::new(err))
            }
        }
    }
}

/// One page of an admin listing plus the total number of matches
#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct OrderPage {
    pub data: Vec<Order>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order. Fails with `OpenOrderExists` if the owner has an
    /// in-flight order and `DuplicateOrderNumber` on a number collision; both
    /// checks run atomically with the insert.
    async fn insert(&self, order: Order) -> Result<Order, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, StoreError>;

    async fn find_in_flight_for_user(&self, user_id: &str) -> Result<Option<Order>, StoreError>;

    /// Guard and apply `transition` atomically, returning the updated order.
    async fn apply_transition(&self, id: &str, transition: &Transition) -> Result<Order, StoreError>;

    /// Hard delete, returning the removed order
    async fn delete(&self, id: &str) -> Result<Order, StoreError>;

    /// All orders of one user, newest first
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Order>, StoreError>;

    /// Filtered page of all orders, newest first
    async fn list(&self, query: &OrderQuery) -> Result<OrderPage, StoreError>;

    /// Every stored order, for aggregate reporting
    async fn all(&self) -> Result<Vec<Order>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}
