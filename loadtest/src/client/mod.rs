//! HTTP access to the movie search API
//!
//! - `transport`: the [`Transport`] seam and request description
//! - `http`: reqwest implementation with session-wide retries
//! - `retry`: backoff policy

pub mod http;
pub mod retry;
pub mod transport;

pub use http::HttpTransport;
pub use retry::RetryPolicy;
pub use transport::{ApiRequest, Method, Transport};
