use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::FetchError;
use crate::retry::{FetchAttempt, RetryPolicy};
use crate::transport::ResourceTransport;

/// How a fetched body is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeMode {
    /// The whole body as one buffer.
    Buffer,
    /// An opaque handle carrying the body and its declared MIME type, for
    /// payloads that go straight to an [`OutputHandoff`](crate::OutputHandoff).
    Blob,
}

/// Opaque large-object handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHandle {
    bytes: Bytes,
    mime_type: Option<String>,
}

impl BlobHandle {
    pub fn new(bytes: Bytes, mime_type: Option<String>) -> Self {
        Self { bytes, mime_type }
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

/// A successfully fetched payload, shaped by the requested [`DecodeMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Buffer(Bytes),
    Blob(BlobHandle),
}

impl Fetched {
    pub fn len(&self) -> usize {
        match self {
            Fetched::Buffer(bytes) => bytes.len(),
            Fetched::Blob(blob) => blob.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            Fetched::Buffer(bytes) => bytes,
            Fetched::Blob(blob) => blob.bytes,
        }
    }

    pub fn into_blob(self) -> Option<BlobHandle> {
        match self {
            Fetched::Blob(blob) => Some(blob),
            Fetched::Buffer(_) => None,
        }
    }
}

/// Result of [`RetryingFetcher::fetch`]. `Unavailable` means "skip it".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(Fetched),
    Unavailable,
}

impl FetchOutcome {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FetchOutcome::Unavailable)
    }

    pub fn into_fetched(self) -> Option<Fetched> {
        match self {
            FetchOutcome::Fetched(fetched) => Some(fetched),
            FetchOutcome::Unavailable => None,
        }
    }
}

/// Bounded-retry fetch of one resource.
///
/// Holds no mutable state: every call owns its own [`FetchAttempt`], so one
/// fetcher can serve any number of independent fetches.
#[derive(Debug, Clone)]
pub struct RetryingFetcher<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: ResourceTransport> RetryingFetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch `resource`, re-issuing the identical request on failure.
    ///
    /// Transport errors and non-success statuses count the same. After
    /// `max_retries` re-issues the failure is logged with the resource
    /// reference and [`FetchOutcome::Unavailable`] is returned.
    pub async fn fetch(&self, resource: &str, mode: DecodeMode) -> FetchOutcome {
        let mut attempt = FetchAttempt::new(resource, mode, &self.policy);

        loop {
            match self.fetch_once(attempt.resource(), attempt.mode()).await {
                Ok(fetched) => {
                    debug!(
                        url = resource,
                        failures = attempt.failures(),
                        len = fetched.len(),
                        "fetch_success"
                    );
                    return FetchOutcome::Fetched(fetched);
                }
                Err(err) => {
                    if !attempt.record_failure() {
                        error!(
                            url = resource,
                            attempts = attempt.failures(),
                            error = %err,
                            "fetch_unavailable"
                        );
                        return FetchOutcome::Unavailable;
                    }
                    debug!(
                        url = resource,
                        attempt = attempt.failures(),
                        error = %err,
                        "fetch_retry"
                    );
                }
            }
        }
    }

    async fn fetch_once(&self, resource: &str, mode: DecodeMode) -> Result<Fetched, FetchError> {
        let response = self.transport.get(resource).await?;
        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
            });
        }

        Ok(match mode {
            DecodeMode::Buffer => Fetched::Buffer(response.body),
            DecodeMode::Blob => {
                Fetched::Blob(BlobHandle::new(response.body, response.content_type))
            }
        })
    }
}
