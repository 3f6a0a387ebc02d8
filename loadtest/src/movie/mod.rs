//! Movie payloads and the word lists they are built from

pub mod generator;
pub mod types;
pub mod vocab;

pub use generator::{generate_movie, generate_movie_at};
pub use types::Movie;
