//! Common Test Utilities for Integration Tests
//!
//! An in-process mock of the movie search API served on an ephemeral port.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared state behind the mock API
#[derive(Default)]
pub struct MockState {
    /// Ids the detail endpoint knows about
    pub movies: Mutex<Vec<String>>,
    /// Payloads received by POST /api/movies
    pub created: Mutex<Vec<Value>>,
    /// Query parameters of every search
    pub searches: Mutex<Vec<HashMap<String, String>>>,
    /// Remaining 503 answers from /api/genres
    pub genre_failures: AtomicUsize,
    pub genre_hits: AtomicUsize,
    /// Remaining 503 answers from POST /api/movies
    pub create_failures: AtomicUsize,
    pub create_hits: AtomicUsize,
    pub search_delay_ms: AtomicU64,
    next_id: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct MockApi {
    pub state: Arc<MockState>,
}

impl MockApi {
    pub fn with_movies(ids: &[&str]) -> Self {
        let api = Self::default();
        api.state
            .movies
            .lock()
            .unwrap()
            .extend(ids.iter().map(|s| s.to_string()));
        api
    }

    pub fn fail_genres(&self, times: usize) {
        self.state.genre_failures.store(times, Ordering::SeqCst);
    }

    pub fn fail_creates(&self, times: usize) {
        self.state.create_failures.store(times, Ordering::SeqCst);
    }

    pub fn create_hits(&self) -> usize {
        self.state.create_hits.load(Ordering::SeqCst)
    }

    pub fn delay_search(&self, delay: Duration) {
        self.state
            .search_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn genre_hits(&self) -> usize {
        self.state.genre_hits.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<Value> {
        self.state.created.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<HashMap<String, String>> {
        self.state.searches.lock().unwrap().clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/search", get(search))
            .route("/api/genres", get(genres))
            .route("/api/movies", axum::routing::post(create_movie))
            .route("/api/movies/:id", get(movie_details))
            .route("/api/movies/:id/similar", get(similar_movies))
            .with_state(self.clone())
    }

    /// Serve the mock and return its base URL
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

async fn search(
    State(api): State<MockApi>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let delay = api.state.search_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    api.state.searches.lock().unwrap().push(params);

    Json(json!({
        "total": 2,
        "movies": [{"id": "m1", "title": "The Matrix"}, {"id": "m2", "title": "Inception"}],
        "latency": 3
    }))
}

async fn genres(State(api): State<MockApi>) -> Result<Json<Value>, StatusCode> {
    api.state.genre_hits.fetch_add(1, Ordering::SeqCst);
    let remaining = api.state.genre_failures.load(Ordering::SeqCst);
    if remaining > 0 {
        api.state.genre_failures.store(remaining - 1, Ordering::SeqCst);
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(json!({"genres": ["Action", "Drama", "Science Fiction"]})))
}

async fn movie_details(
    State(api): State<MockApi>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    if api.state.movies.lock().unwrap().contains(&id) {
        Ok(Json(json!({"id": id, "title": "Known Movie"})))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn similar_movies(Path(id): Path<String>) -> Json<Value> {
    Json(json!({"movies": [{"id": format!("{}-similar", id)}]}))
}

async fn create_movie(
    State(api): State<MockApi>,
    Json(movie): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    api.state.create_hits.fetch_add(1, Ordering::SeqCst);
    let remaining = api.state.create_failures.load(Ordering::SeqCst);
    if remaining > 0 {
        api.state.create_failures.store(remaining - 1, Ordering::SeqCst);
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let n = api.state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let id = format!("created-{}", n);
    api.state.created.lock().unwrap().push(movie);
    api.state.movies.lock().unwrap().push(id.clone());
    Ok(Json(
        json!({"success": true, "id": id, "message": "Movie indexed successfully"}),
    ))
}
