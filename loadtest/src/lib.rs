//! Movie search load generator
//!
//! Simulates concurrent users exercising the movie search HTTP API. Each
//! virtual user thinks, draws a weighted task, runs it and remembers the movie
//! ids it learns about.

pub mod client;
pub mod config;
pub mod error;
pub mod movie;
pub mod report;
pub mod runner;
pub mod user;

mod test_utils;

// Re-export commonly used types
pub use client::{ApiRequest, HttpTransport, RetryPolicy, Transport};
pub use config::Config;
pub use error::{Outcome, TransportError};
pub use report::{Reporter, RunSummary};
pub use runner::LoadTest;
pub use user::{KnownMovieIds, Task, TaskSet, UserSettings, VirtualUser};
