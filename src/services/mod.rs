pub mod client;
pub mod parser;
pub mod retry;

pub use client::{ClientOptions, FcmClient, SendOutcome};
pub use parser::parse_response;
pub use retry::RetryPolicy;
