//! Request executors for each task
//!
//! Every behavior builds one request, sends it, classifies the outcome and
//! updates the user's known ids. Nothing here returns an error: transport
//! and status failures end the tick after being logged.

use rand::Rng;
use serde_json::Value;
use tracing::{debug, warn};

use super::tasks::Task;
use super::virtual_user::VirtualUser;
use crate::client::ApiRequest;
use crate::error::Outcome;
use crate::movie::generator::{pick, round1};
use crate::movie::generate_movie;
use crate::movie::vocab::{GENRES, RANDOM_WORDS, SEARCH_QUERIES};

pub const SEARCH_PATH: &str = "/api/search";
pub const GENRES_PATH: &str = "/api/genres";
pub const MOVIES_PATH: &str = "/api/movies";

pub fn movie_path(id: &str) -> String {
    format!("{}/{}", MOVIES_PATH, id)
}

pub fn similar_movies_path(id: &str) -> String {
    format!("{}/{}/similar", MOVIES_PATH, id)
}

/// Identifier of one movie entry; `_id` wins over `id`
pub fn movie_id(entry: &Value) -> Option<String> {
    ["_id", "id"]
        .iter()
        .find_map(|key| entry.get(*key).and_then(id_value))
}

fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Movie ids from a search body, reading `movies` or else `results`
pub fn extract_movie_ids(body: &Value) -> Vec<String> {
    body.get("movies")
        .or_else(|| body.get("results"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(movie_id)
        .collect()
}

/// `total` of a search body, 0 when absent
pub fn search_total(body: &Value) -> u64 {
    body.get("total").and_then(Value::as_u64).unwrap_or(0)
}

/// Length of the array under `key`, 0 when absent
pub fn array_len(body: &Value, key: &str) -> usize {
    body.get(key).and_then(Value::as_array).map_or(0, Vec::len)
}

impl VirtualUser {
    /// Plain search; remembers the ids of returned movies
    pub async fn search_movies(&mut self) {
        let query = pick(&mut self.rng, &SEARCH_QUERIES);
        let request =
            ApiRequest::get(SEARCH_PATH, self.settings.request_timeout).with_query("q", query);

        match self.send(Task::SearchMovies, request).await {
            Outcome::Success { body, .. } => {
                let added = self.known_ids.extend(extract_movie_ids(&body));
                debug!(
                    "Search for '{}' returned {} results ({} new ids)",
                    query,
                    search_total(&body),
                    added
                );
            }
            Outcome::Failure { status } => {
                warn!("Search for '{}' failed with status {}", query, status);
            }
            Outcome::Error(e) => warn!("Search for '{}' failed with error: {}", query, e),
        }
    }

    /// Hybrid search with a random semantic ratio in [0.3, 1.0]
    pub async fn semantic_search(&mut self) {
        let query = pick(&mut self.rng, &SEARCH_QUERIES);
        let ratio = round1(self.rng.random_range(0.3..=1.0));
        let request = ApiRequest::get(SEARCH_PATH, self.settings.semantic_timeout)
            .with_query("q", query)
            .with_query("semanticRatio", format!("{:.1}", ratio));

        match self.send(Task::SemanticSearch, request).await {
            Outcome::Success { body, .. } => debug!(
                "Semantic search for '{}' (ratio={:.1}) returned {} results",
                query,
                ratio,
                search_total(&body)
            ),
            Outcome::Failure { status } => warn!(
                "Semantic search for '{}' failed with status {}",
                query, status
            ),
            Outcome::Error(e) => warn!("Semantic search for '{}' failed with error: {}", query, e),
        }
    }

    pub async fn search_random_word(&mut self) {
        let query = pick(&mut self.rng, &RANDOM_WORDS);
        let request =
            ApiRequest::get(SEARCH_PATH, self.settings.request_timeout).with_query("q", query);

        match self.send(Task::SearchRandomWord, request).await {
            Outcome::Success { body, .. } => debug!(
                "Random search for '{}' returned {} results",
                query,
                search_total(&body)
            ),
            Outcome::Failure { status } => {
                debug!("Random search for '{}' got status {}", query, status)
            }
            Outcome::Error(e) => warn!("Random search for '{}' failed with error: {}", query, e),
        }
    }

    pub async fn search_with_genre_filter(&mut self) {
        let query = pick(&mut self.rng, &SEARCH_QUERIES);
        let genre = pick(&mut self.rng, &GENRES);
        let request = ApiRequest::get(SEARCH_PATH, self.settings.request_timeout)
            .with_query("q", query)
            .with_query("genres", genre);

        match self.send(Task::SearchWithGenreFilter, request).await {
            Outcome::Success { body, .. } => debug!(
                "Genre-filtered search for '{}' (genre={}) returned {} results",
                query,
                genre,
                search_total(&body)
            ),
            Outcome::Failure { status } => warn!(
                "Genre-filtered search for '{}' (genre={}) failed with status {}",
                query, genre, status
            ),
            Outcome::Error(e) => warn!("Genre-filtered search failed with error: {}", e),
        }
    }

    pub async fn get_genres(&mut self) {
        let request = ApiRequest::get(GENRES_PATH, self.settings.request_timeout);

        match self.send(Task::GetGenres, request).await {
            Outcome::Success { body, .. } => {
                debug!("Fetched {} genres", array_len(&body, "genres"))
            }
            Outcome::Failure { status } => debug!("Get genres got status {}", status),
            Outcome::Error(e) => warn!("Get genres failed with error: {}", e),
        }
    }

    /// Detail lookup of a known movie; a 404 forgets the id
    pub async fn get_movie_details(&mut self) {
        let Some(movie_id) = self.known_ids.choose(&mut self.rng) else {
            return;
        };
        let request = ApiRequest::get(movie_path(&movie_id), self.settings.request_timeout);

        match self.send(Task::GetMovieDetails, request).await {
            Outcome::Success { .. } => debug!("Fetched details for movie {}", movie_id),
            Outcome::Failure { status: 404 } => {
                self.known_ids.remove(&movie_id);
                debug!("Movie {} no longer exists, forgetting it", movie_id);
            }
            Outcome::Failure { status } => {
                debug!("Get movie {} got status {}", movie_id, status)
            }
            Outcome::Error(e) => warn!("Get movie {} failed with error: {}", movie_id, e),
        }
    }

    pub async fn get_similar_movies(&mut self) {
        let Some(movie_id) = self.known_ids.choose(&mut self.rng) else {
            return;
        };
        let request =
            ApiRequest::get(similar_movies_path(&movie_id), self.settings.request_timeout);

        match self.send(Task::GetSimilarMovies, request).await {
            Outcome::Success { body, .. } => debug!(
                "Found {} similar movies for {}",
                array_len(&body, "movies"),
                movie_id
            ),
            Outcome::Failure { status } => debug!(
                "Get similar movies for {} got status {}",
                movie_id, status
            ),
            Outcome::Error(e) => warn!(
                "Get similar movies for {} failed with error: {}",
                movie_id, e
            ),
        }
    }

    /// Create a synthetic movie; remembers the id the API assigns
    pub async fn create_movie(&mut self) {
        let movie = generate_movie(&mut self.rng);
        let payload = match serde_json::to_value(&movie) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode movie '{}': {}", movie.title, e);
                return;
            }
        };
        let request = ApiRequest::post(MOVIES_PATH, payload, self.settings.request_timeout);

        match self.send(Task::CreateMovie, request).await {
            Outcome::Success { body, .. } => match body.get("id").and_then(id_value) {
                Some(id) => {
                    debug!("Created movie '{}' with ID: {}", movie.title, id);
                    self.known_ids.insert(id);
                }
                None => debug!("Created movie '{}' without an ID", movie.title),
            },
            Outcome::Failure { status } => warn!(
                "Failed to create movie '{}' - Status: {}",
                movie.title, status
            ),
            Outcome::Error(e) => {
                warn!("Failed to create movie '{}' - Error: {}", movie.title, e)
            }
        }
    }
}
