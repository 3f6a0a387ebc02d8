//! Simulated user session
//!
//! Each virtual user runs its own sequential loop: think, pick a task, run
//! it, repeat. One request is in flight per user at a time. Users share the
//! transport and the task registry but nothing mutable.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::watch;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use super::known_ids::KnownMovieIds;
use super::tasks::{Task, TaskSet};
use crate::client::{ApiRequest, Transport};
use crate::config::{Config, ThinkTime};
use crate::error::Outcome;
use crate::report::Reporter;

/// Per-user pacing and timeouts
#[derive(Debug, Clone, Copy)]
pub struct UserSettings {
    pub think_time: ThinkTime,
    /// Timeout for every request except semantic searches
    pub request_timeout: Duration,
    pub semantic_timeout: Duration,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl UserSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            think_time: config.think_time,
            request_timeout: config.http.request_timeout,
            semantic_timeout: config.http.semantic_timeout,
        }
    }
}

/// What a user leaves behind when its session ends
#[derive(Debug, Clone)]
pub struct UserSummary {
    pub index: usize,
    pub session_id: Uuid,
    /// Tasks executed (including no-op lookups)
    pub ticks: u64,
    pub known_movie_ids: usize,
}

/// One simulated actor driving the movie API
pub struct VirtualUser {
    pub(super) index: usize,
    pub(super) session_id: Uuid,
    pub(super) transport: Arc<dyn Transport>,
    pub(super) tasks: Arc<TaskSet>,
    pub(super) settings: UserSettings,
    pub(super) known_ids: KnownMovieIds,
    pub(super) rng: ChaCha8Rng,
    pub(super) reporter: Reporter,
}

impl VirtualUser {
    /// Create a user; a `seed` makes its task choices and payloads reproducible
    pub fn new(
        index: usize,
        transport: Arc<dyn Transport>,
        tasks: Arc<TaskSet>,
        settings: UserSettings,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        Self {
            index,
            session_id: Uuid::new_v4(),
            transport,
            tasks,
            settings,
            known_ids: KnownMovieIds::new(),
            rng,
            reporter: Reporter::metrics_only(),
        }
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn known_ids(&self) -> &KnownMovieIds {
        &self.known_ids
    }

    pub fn known_ids_mut(&mut self) -> &mut KnownMovieIds {
        &mut self.known_ids
    }

    /// Random delay before the next task
    pub fn think_time(&mut self) -> Duration {
        let ThinkTime { min, max } = self.settings.think_time;
        if max <= min {
            return min;
        }
        Duration::from_secs_f64(
            self.rng
                .random_range(min.as_secs_f64()..=max.as_secs_f64()),
        )
    }

    /// Pick one task from the registry and run it
    pub async fn tick(&mut self) -> Task {
        let task = self.tasks.select(&mut self.rng);
        self.execute(task).await;
        task
    }

    pub async fn execute(&mut self, task: Task) {
        match task {
            Task::SearchMovies => self.search_movies().await,
            Task::SemanticSearch => self.semantic_search().await,
            Task::SearchRandomWord => self.search_random_word().await,
            Task::SearchWithGenreFilter => self.search_with_genre_filter().await,
            Task::GetGenres => self.get_genres().await,
            Task::GetMovieDetails => self.get_movie_details().await,
            Task::GetSimilarMovies => self.get_similar_movies().await,
            Task::CreateMovie => self.create_movie().await,
        }
    }

    /// Issue a request and report its outcome under `task`
    pub(super) async fn send(&self, task: Task, request: ApiRequest) -> Outcome {
        let start = Instant::now();
        let outcome = self.transport.send(request).await;
        self.reporter.record(task, start.elapsed(), &outcome);
        outcome
    }

    /// Run until `stop` turns true
    ///
    /// The stop signal is observed at loop boundaries only: while thinking or
    /// before the next task starts. An in-flight request always completes.
    /// A dropped sender also ends the session.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> UserSummary {
        let span = info_span!("user", index = self.index, session = %self.session_id);

        async move {
            info!("Starting load test session for movie search API");
            let mut ticks = 0;

            loop {
                if *stop.borrow() {
                    break;
                }

                let wait = self.think_time();
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    changed = stop.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                if *stop.borrow() {
                    break;
                }

                let task = self.tick().await;
                debug!("Completed task {}", task);
                ticks += 1;
            }

            info!(
                "Session ended after {} tasks with {} known movies",
                ticks,
                self.known_ids.len()
            );
            UserSummary {
                index: self.index,
                session_id: self.session_id,
                ticks,
                known_movie_ids: self.known_ids.len(),
            }
        }
        .instrument(span)
        .await
    }
}
