pub mod order_service;
pub mod stats;
pub mod validation;

pub use order_service::*;
pub use stats::*;
pub use validation::*;
