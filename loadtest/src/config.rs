//! Load test configuration
//!
//! Configuration is loaded from environment variables on top of the defaults.
//! Unparseable values are ignored and the default is kept.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Log filter used when `RUST_LOG` is unset; covers the library and the binary
pub const DEFAULT_LOG_FILTER: &str = "moviesearch_loadtest=info,movie_loadtest=info";

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Target host must not be empty")]
    EmptyTargetHost,

    #[error("At least one virtual user is required")]
    NoUsers,

    #[error("Spawn rate must be positive")]
    InvalidSpawnRate,

    #[error("Spawn rate {0} is too low: the delay between users overflows")]
    SpawnRateTooLow(f64),

    #[error("Think time range is inverted: min={min:?}, max={max:?}")]
    InvertedThinkTime { min: Duration, max: Duration },
}

/// Main load test configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the movie search deployment (API paths are appended)
    pub target_host: String,
    /// Number of concurrent virtual users
    pub users: usize,
    /// Users started per second
    pub spawn_rate: f64,
    /// Stop automatically after this long (None = until interrupted)
    pub run_time: Option<Duration>,
    /// Base seed for per-user random sources
    pub seed: Option<u64>,
    /// Think-time bounds between tasks
    pub think_time: ThinkTime,
    /// HTTP transport configuration
    pub http: HttpConfig,
    /// Prometheus exporter listen address
    pub metrics_addr: Option<SocketAddr>,
}

/// Uniform think-time range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkTime {
    pub min: Duration,
    pub max: Duration,
}

impl ThinkTime {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// No waiting between tasks
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

impl Default for ThinkTime {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(3))
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whether to validate TLS certificates
    pub verify_tls: bool,
    /// Default per-request timeout
    pub request_timeout: Duration,
    /// Per-request timeout for semantic searches
    pub semantic_timeout: Duration,
    /// Retries on retryable statuses and connection failures
    pub max_retries: u32,
    /// Exponential backoff base
    pub backoff_factor: Duration,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            verify_tls: false,
            request_timeout: Duration::from_secs(10),
            semantic_timeout: Duration::from_secs(15),
            max_retries: 3,
            backoff_factor: Duration::from_secs(1),
            pool_max_idle_per_host: 200,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_host: "https://localhost:3000".to_string(),
            users: 10,
            spawn_rate: 10.0,
            run_time: None,
            seed: None,
            think_time: ThinkTime::default(),
            http: HttpConfig::default(),
            metrics_addr: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("TARGET_HOST")
            && !host.is_empty()
        {
            config.target_host = host;
        }
        if let Ok(val) = env::var("USERS")
            && let Ok(v) = val.parse()
        {
            config.users = v;
        }
        if let Ok(val) = env::var("SPAWN_RATE")
            && let Ok(v) = val.parse()
        {
            config.spawn_rate = v;
        }
        if let Ok(val) = env::var("RUN_TIME_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.run_time = Some(Duration::from_secs(secs));
        }
        if let Ok(val) = env::var("SEED")
            && let Ok(seed) = val.parse()
        {
            config.seed = Some(seed);
        }

        // Think time
        if let Ok(val) = env::var("THINK_TIME_MIN_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            config.think_time.min = Duration::from_millis(ms);
        }
        if let Ok(val) = env::var("THINK_TIME_MAX_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            config.think_time.max = Duration::from_millis(ms);
        }

        // HTTP config
        if let Ok(val) = env::var("REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.http.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(val) = env::var("SEMANTIC_TIMEOUT_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.http.semantic_timeout = Duration::from_secs(secs);
        }
        if let Ok(val) = env::var("MAX_RETRIES")
            && let Ok(v) = val.parse()
        {
            config.http.max_retries = v;
        }
        if let Ok(val) = env::var("BACKOFF_FACTOR_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            config.http.backoff_factor = Duration::from_millis(ms);
        }
        if let Ok(val) = env::var("VERIFY_TLS") {
            config.http.verify_tls = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = env::var("METRICS_ADDR")
            && let Ok(addr) = val.parse()
        {
            config.metrics_addr = Some(addr);
        }

        config
    }

    /// Check that the configuration describes a runnable load test
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_host.trim().is_empty() {
            return Err(ConfigError::EmptyTargetHost);
        }
        if self.users == 0 {
            return Err(ConfigError::NoUsers);
        }
        if self.spawn_rate.is_nan() || self.spawn_rate <= 0.0 {
            return Err(ConfigError::InvalidSpawnRate);
        }
        if Duration::try_from_secs_f64(1.0 / self.spawn_rate).is_err() {
            return Err(ConfigError::SpawnRateTooLow(self.spawn_rate));
        }
        if self.think_time.min > self.think_time.max {
            return Err(ConfigError::InvertedThinkTime {
                min: self.think_time.min,
                max: self.think_time.max,
            });
        }
        Ok(())
    }

    /// Delay between consecutive user spawns
    ///
    /// Zero for non-positive rates, saturating at `Duration::MAX` when the
    /// rate is too small to represent.
    pub fn spawn_interval(&self) -> Duration {
        if self.spawn_rate.is_nan() || self.spawn_rate <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(1.0 / self.spawn_rate).unwrap_or(Duration::MAX)
    }
}
