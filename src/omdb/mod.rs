pub mod client;
pub mod retry;
pub mod types;

pub use client::*;
pub use retry::RetryPolicy;
pub use types::*;
