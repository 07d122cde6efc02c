//! In-memory transport serving canned responses
//!
//! Lets callers exercise an `AtlasClient` without network access. Any URL
//! without a registered response answers 404, like a server would.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use crate::app::client::http::Transport;
use crate::errors::{TransportError, TransportResult};

/// Canned response for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureResponse {
    /// 200 with this body
    Body(String),
    /// Non-success status with no body
    Status(u16),
}

/// Transport that answers from a URL → response table and records requests
#[derive(Debug, Default)]
pub struct FixtureTransport {
    responses: HashMap<String, FixtureResponse>,
    requests: Mutex<Vec<String>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with a 200 and `body`
    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses
            .insert(url.into(), FixtureResponse::Body(body.into()));
        self
    }

    /// Answer `url` with a bare status code
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses
            .insert(url.into(), FixtureResponse::Status(status));
        self
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn get_text(&self, url: &Url) -> TransportResult<String> {
        let key = url.to_string();
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(key.clone());

        match self.responses.get(&key) {
            Some(FixtureResponse::Body(body)) => Ok(body.clone()),
            Some(FixtureResponse::Status(404)) | None => Err(TransportError::NotFound { url: key }),
            Some(FixtureResponse::Status(status)) if (200..300).contains(status) => Ok(String::new()),
            Some(FixtureResponse::Status(status)) => Err(TransportError::Status {
                url: key,
                status: *status,
            }),
        }
    }
}
