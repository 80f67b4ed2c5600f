//! GitHub contents API client.
//!
//! This module defines the [`ContentStore`] trait to abstract the two remote
//! calls the save flow makes (read the current file revision, write new
//! content), enabling testability with a mock implementation.
//!
//! The store is a dumb transport: it returns the upstream status and body
//! as-is and leaves interpretation (404 means "create new file", anything
//! else non-2xx is a failure) to the handler.

use crate::errors::Result;
use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};

/// Coordinates of the remote file being read or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub branch: String,
}

/// Raw outcome of a store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreResponse {
    /// HTTP status code returned by the store
    pub status: u16,
    /// Response body as a string
    pub body: String,
}

impl StoreResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Commit author/committer identity sent with every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Default for Author {
    fn default() -> Self {
        Self {
            name: "Map Bot".to_string(),
            email: "mapbot@example.com".to_string(),
        }
    }
}

/// Body of the contents-API PUT call.
///
/// `sha` is the revision pointer of the file being replaced; it is omitted
/// from the serialized JSON entirely when the file is being created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutFile {
    /// Human-readable commit message
    pub message: String,
    /// Base64-encoded file content
    pub content: String,
    /// Branch the commit lands on
    pub branch: String,
    /// Revision pointer of the file being replaced, absent on create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    pub committer: Author,
    pub author: Author,
}

/// Trait for the two remote calls against the content store.
///
/// This abstraction allows for different implementations (production vs.
/// testing) and makes the save flow testable without real GitHub calls.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch the current file metadata at `location`.
    ///
    /// # Errors
    /// Returns an error only for transport-level failures; upstream HTTP
    /// error statuses are reported through [`StoreResponse::status`].
    async fn get_file(&self, location: &FileLocation, token: &str) -> Result<StoreResponse>;

    /// Create or update the file at `location` with `file`.
    ///
    /// # Errors
    /// Returns an error only for transport-level failures; upstream HTTP
    /// error statuses are reported through [`StoreResponse::status`].
    async fn put_file(&self, location: &FileLocation, token: &str, file: &PutFile) -> Result<StoreResponse>;
}

// ============================================================================
// Production Implementation using reqwest
// ============================================================================

/// Production content store talking to the GitHub REST API.
#[derive(Clone)]
pub struct GithubContentStore {
    client: reqwest::Client,
    api_base: String,
}

impl GithubContentStore {
    /// Create a client against the given API base URL
    /// (`https://api.github.com` in production).
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    fn contents_url(&self, location: &FileLocation) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, location.owner, location.repo, location.path
        )
    }
}

#[async_trait]
impl ContentStore for GithubContentStore {
    #[tracing::instrument(skip(self, token), fields(path = %location.path, branch = %location.branch))]
    async fn get_file(&self, location: &FileLocation, token: &str) -> Result<StoreResponse> {
        let response = self
            .client
            .get(self.contents_url(location))
            .query(&[("ref", location.branch.as_str())])
            .bearer_auth(token)
            .header(header::USER_AGENT, "waypost")
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(status, response_len = body.len(), "Fetched file metadata");

        Ok(StoreResponse { status, body })
    }

    #[tracing::instrument(skip(self, token, file), fields(path = %location.path, branch = %location.branch, create = file.sha.is_none()))]
    async fn put_file(&self, location: &FileLocation, token: &str, file: &PutFile) -> Result<StoreResponse> {
        let response = self
            .client
            .put(self.contents_url(location))
            .bearer_auth(token)
            .header(header::USER_AGENT, "waypost")
            .header(header::ACCEPT, "application/vnd.github+json")
            .json(file)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::info!(status, response_len = body.len(), "Committed file content");

        Ok(StoreResponse { status, body })
    }
}

// ============================================================================
// Test/Mock Implementation
// ============================================================================

use std::sync::{Arc, Mutex};

/// Record of a call made to the mock content store.
#[derive(Debug, Clone)]
pub enum RecordedCall {
    Get {
        location: FileLocation,
        token: String,
    },
    Put {
        location: FileLocation,
        token: String,
        file: PutFile,
    },
}

/// Mock content store for testing.
///
/// Responses are queued per operation and returned in FIFO order; every call
/// is recorded for later inspection. An empty queue yields an error, so a
/// flow that must not reach the write call fails loudly if it does.
#[derive(Clone, Default)]
pub struct MockContentStore {
    get_responses: Arc<Mutex<Vec<Result<StoreResponse>>>>,
    put_responses: Arc<Mutex<Vec<Result<StoreResponse>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next `get_file` call.
    pub fn push_get_response(&self, response: Result<StoreResponse>) {
        self.get_responses.lock().unwrap().push(response);
    }

    /// Queue a response for the next `put_file` call.
    pub fn push_put_response(&self, response: Result<StoreResponse>) {
        self.put_responses.lock().unwrap().push(response);
    }

    /// Get all calls made against this mock.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The `put_file` calls made against this mock, in order.
    pub fn put_calls(&self) -> Vec<(FileLocation, String, PutFile)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Put { location, token, file } => Some((location, token, file)),
                RecordedCall::Get { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn get_file(&self, location: &FileLocation, token: &str) -> Result<StoreResponse> {
        self.calls.lock().unwrap().push(RecordedCall::Get {
            location: location.clone(),
            token: token.to_string(),
        });

        let mut responses = self.get_responses.lock().unwrap();
        if responses.is_empty() {
            return Err(anyhow::anyhow!("No mock response queued for get_file").into());
        }
        responses.remove(0)
    }

    async fn put_file(&self, location: &FileLocation, token: &str, file: &PutFile) -> Result<StoreResponse> {
        self.calls.lock().unwrap().push(RecordedCall::Put {
            location: location.clone(),
            token: token.to_string(),
            file: file.clone(),
        });

        let mut responses = self.put_responses.lock().unwrap();
        if responses.is_empty() {
            return Err(anyhow::anyhow!("No mock response queued for put_file").into());
        }
        responses.remove(0)
    }
}
