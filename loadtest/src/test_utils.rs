//! Test Utilities Module
//!
//! Provides a scripted transport and user fixtures for unit tests.
//! This module is only compiled when running tests.

#![cfg(test)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::client::{ApiRequest, Transport};
use crate::config::ThinkTime;
use crate::error::Outcome;
use crate::user::{TaskSet, UserSettings, VirtualUser};

type Router = Box<dyn Fn(&ApiRequest) -> Outcome + Send + Sync>;

/// Transport that records requests and answers from a script
///
/// Queued outcomes are served first, then the router (if any), then an
/// empty JSON object with status 200.
pub struct ScriptedTransport {
    queue: Mutex<VecDeque<Outcome>>,
    requests: Mutex<Vec<ApiRequest>>,
    router: Option<Router>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            router: None,
        }
    }

    /// Answer every request by inspecting it
    pub fn routed(router: impl Fn(&ApiRequest) -> Outcome + Send + Sync + 'static) -> Self {
        Self {
            router: Some(Box::new(router)),
            ..Self::new()
        }
    }

    /// Queue the outcome for the next unanswered request
    pub fn push(&self, outcome: Outcome) {
        self.queue.lock().unwrap().push_back(outcome);
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Outcome {
        let queued = self.queue.lock().unwrap().pop_front();
        let outcome = queued.unwrap_or_else(|| match self.router {
            Some(ref router) => router(&request),
            None => Outcome::ok(json!({})),
        });
        self.requests.lock().unwrap().push(request);
        outcome
    }
}

/// Seeded user with no think time
pub fn test_user(transport: Arc<dyn Transport>, tasks: TaskSet) -> VirtualUser {
    let settings = UserSettings {
        think_time: ThinkTime::none(),
        ..UserSettings::default()
    };
    VirtualUser::new(0, transport, Arc::new(tasks), settings, Some(42))
}
