//! Scripted transport for unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::common::{Error, Result};

use super::transport::{ApiRequest, ApiResponse, Method, Transport};

pub const FAKE_API_BASE: &str = "http://api.test/api";

#[derive(Debug, Clone)]
enum Canned {
    Reply(ApiResponse),
    Timeout,
}

#[derive(Default)]
struct State {
    routes: HashMap<(Method, String), VecDeque<Canned>>,
    requests: Vec<ApiRequest>,
}

/// Serves queued replies per (method, path); the last reply on a route repeats.
/// Unrouted requests fail as refused connections.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, canned: Canned) {
        self.state
            .lock()
            .unwrap()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(canned);
    }

    pub fn reply(&self, method: Method, path: &str, status: u16, body: Value) {
        self.reply_raw(method, path, status, body.to_string());
    }

    pub fn reply_raw(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        self.push(method, path, Canned::Reply(ApiResponse::new(status, body)));
    }

    pub fn timeout(&self, method: Method, path: &str) {
        self.push(method, path, Canned::Timeout);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        let path = request
            .url
            .strip_prefix(FAKE_API_BASE)
            .unwrap_or(&request.url)
            .to_string();

        let canned = match state.routes.get_mut(&(request.method, path)) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match canned {
            Some(Canned::Reply(response)) => Ok(response),
            Some(Canned::Timeout) => Err(Error::Timeout(request.timeout)),
            None => Err(Error::connection_failed(&request.url, "connection refused")),
        }
    }
}
