//! HTTP client for the weather analytics backend.
//!
//! Every endpoint response is parsed into a typed entity at the fetch
//! boundary; shape mismatches surface as `ClientError::Schema`.

pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::{AnalyticsClient, ClientSettings};
pub use error::ClientError;
pub use retry::RetryConfig;
pub use types::*;
