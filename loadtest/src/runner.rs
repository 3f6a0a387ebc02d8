//! Spawns virtual users and collects their reports

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::client::Transport;
use crate::config::Config;
use crate::report::{EVENT_CHANNEL_CAPACITY, Reporter, RunSummary};
use crate::user::{TaskSet, UserSettings, VirtualUser};

/// One load test run against a single target
pub struct LoadTest {
    config: Config,
    transport: Arc<dyn Transport>,
    tasks: Arc<TaskSet>,
}

impl LoadTest {
    pub fn new(config: Config, transport: Arc<dyn Transport>, tasks: TaskSet) -> Self {
        Self {
            config,
            transport,
            tasks: Arc::new(tasks),
        }
    }

    /// Run until `stop` turns true and every user has finished its current task
    pub async fn run(&self, mut stop: watch::Receiver<bool>) -> RunSummary {
        let start = Instant::now();
        let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let collector = tokio::spawn(async move {
            let mut summary = RunSummary::new();
            while let Some(event) = rx.recv().await {
                summary.record(&event);
            }
            summary
        });

        info!(
            "Starting {} users against {} ({} users/s)",
            self.config.users, self.config.target_host, self.config.spawn_rate
        );

        let reporter = Reporter::new(tx);
        let settings = UserSettings::from_config(&self.config);
        let spawn_interval = self.config.spawn_interval();
        let mut handles = Vec::with_capacity(self.config.users);

        for index in 0..self.config.users {
            if *stop.borrow() {
                break;
            }

            let seed = self.config.seed.map(|s| s.wrapping_add(index as u64));
            let user = VirtualUser::new(
                index,
                self.transport.clone(),
                self.tasks.clone(),
                settings,
                seed,
            )
            .with_reporter(reporter.clone());
            handles.push(tokio::spawn(user.run(stop.clone())));

            if index + 1 < self.config.users {
                tokio::select! {
                    _ = tokio::time::sleep(spawn_interval) => {}
                    changed = stop.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        // Only users hold senders now; the collector ends when they all finish
        let tally = reporter.detached();
        drop(reporter);

        let users = handles.len();
        for handle in handles {
            match handle.await {
                Ok(user) => debug!(
                    "User {} finished: {} tasks, {} known movies",
                    user.index, user.ticks, user.known_movie_ids
                ),
                Err(e) => warn!("User task failed: {}", e),
            }
        }

        let mut summary = match collector.await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Event collector failed: {}", e);
                RunSummary::new()
            }
        };
        summary.users = users;
        summary.dropped_events = tally.dropped_events();
        summary.duration = start.elapsed();
        summary
    }
}
