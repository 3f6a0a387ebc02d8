use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use moviesearch_loadtest::config::DEFAULT_LOG_FILTER;
use moviesearch_loadtest::{Config, HttpTransport, LoadTest, TaskSet};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Resolve once the run time has elapsed, or never
async fn run_time_elapsed(run_time: Option<Duration>) {
    match run_time {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = Config::from_env();
    config.validate()?;
    info!(
        "Loaded configuration: target={}, users={}, verify_tls={}",
        config.target_host, config.users, config.http.verify_tls
    );
    if let Some(seed) = config.seed {
        info!("Using base seed {}", seed);
    }

    if let Some(addr) = config.metrics_addr {
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        info!("Prometheus metrics exposed on {}", addr);
    }

    let transport = Arc::new(HttpTransport::new(&config.target_host, &config.http)?);
    let tasks = TaskSet::movie_search()?;

    // Stop on Ctrl-C or when the configured run time elapses
    let (stop_tx, stop_rx) = watch::channel(false);
    let run_time = config.run_time;
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Interrupt received, stopping users"),
            _ = run_time_elapsed(run_time) => info!("Run time elapsed, stopping users"),
        }
        let _ = stop_tx.send(true);
    });

    let summary = LoadTest::new(config, transport, tasks).run(stop_rx).await;

    summary.log_summary();
    info!("JSON: {}", summary.to_json());

    Ok(())
}
