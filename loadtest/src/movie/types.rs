//! Movie payload types

use serde::{Deserialize, Serialize};

/// Movie document sent to `POST /api/movies`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    pub tagline: String,
    /// 1 to 3 distinct genre names
    pub genres: Vec<String>,
    pub overview: String,
    /// `YYYY-MM-DD`
    pub release_date: String,
    /// 4.0 to 9.0, one decimal
    pub vote_average: f64,
    pub vote_count: u32,
    /// 10.0 to 200.0, one decimal
    pub popularity: f64,
    /// Minutes
    pub runtime: u32,
    pub status: String,
}
