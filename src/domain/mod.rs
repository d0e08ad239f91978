pub mod error_kind;
pub mod message;
pub mod response;

pub use error_kind::{ErrorKind, is_unregistered_code};
pub use message::{Message, Notification, Priority};
pub use response::{DeliveryResult, Response, ResponseShape};
