pub mod lifecycle;
pub mod order;
pub mod request;
pub mod user;

pub use lifecycle::*;
pub use order::*;
pub use request::*;
pub use user::*;
