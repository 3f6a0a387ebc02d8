//! reqwest-backed transport with retries

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use serde_json::Value;
use tracing::debug;

use super::retry::{RetryPolicy, parse_retry_after};
use super::transport::{ApiRequest, Method, Transport};
use crate::config::HttpConfig;
use crate::error::{Outcome, TransportError};

/// Transport shared by all virtual users of a run
///
/// Holds one pooled `reqwest::Client`; cloning is cheap.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpTransport {
    /// Build a transport for `base_url` using the session-wide HTTP settings
    pub fn new(base_url: &str, config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn build(&self, request: &ApiRequest) -> reqwest::RequestBuilder {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self
            .client
            .request(method, self.url(&request.path))
            .timeout(request.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        builder
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Outcome {
        let mut attempt = 0;

        loop {
            match self.build(&request).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if RetryPolicy::is_retryable_status(status) && self.retry.can_retry(attempt) {
                        let retry_after = response
                            .headers()
                            .get(RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(parse_retry_after);
                        let delay = self.retry.delay_for(attempt, retry_after);
                        debug!(
                            "{} {} returned {}, retrying in {:?} (attempt {}/{})",
                            request.method.as_str(),
                            request.path,
                            status,
                            delay,
                            attempt + 1,
                            self.retry.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    if !response.status().is_success() {
                        return Outcome::Failure { status };
                    }

                    return match response.bytes().await {
                        Ok(bytes) => match decode_body(&bytes) {
                            Ok(body) => Outcome::Success { status, body },
                            Err(e) => Outcome::Error(e),
                        },
                        Err(e) => Outcome::Error(classify(&e, request.timeout)),
                    };
                }
                Err(e) if e.is_connect() && self.retry.can_retry(attempt) => {
                    let delay = self.retry.backoff(attempt);
                    debug!(
                        "{} {} connection failed, retrying in {:?}: {}",
                        request.method.as_str(),
                        request.path,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Outcome::Error(classify(&e, request.timeout)),
            }
        }
    }
}

/// Decode a success body; an empty body is JSON null
fn decode_body(bytes: &[u8]) -> Result<Value, TransportError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|e| TransportError::Decode(e.to_string()))
}

fn classify(error: &reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(timeout)
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else if error.is_decode() || error.is_body() {
        TransportError::Decode(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}
