//! Virtual users
//!
//! A [`VirtualUser`] owns its own known-id set and random source, draws tasks
//! from a shared weighted [`TaskSet`], and executes the matching behavior.

pub mod behaviors;
pub mod known_ids;
pub mod tasks;
pub mod virtual_user;

pub use known_ids::KnownMovieIds;
pub use tasks::{Task, TaskDescriptor, TaskSet, TaskSetBuilder, TaskSetError};
pub use virtual_user::{UserSettings, UserSummary, VirtualUser};
