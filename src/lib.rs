pub mod api;
pub mod business;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod notify;
pub mod observability;
pub mod resilience;
pub mod security;
pub mod store;
