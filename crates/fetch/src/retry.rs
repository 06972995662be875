//! Retry budget for resource fetches.
//!
//! A failed request is re-issued immediately, with the same resource and the
//! same decode mode, until the attempt counter passes `max_retries`. There is
//! no backoff here: callers that fetch many independent resources space their
//! own requests.

use serde::{Deserialize, Serialize};

use crate::fetcher::DecodeMode;

/// Retries after the initial request before a resource is given up on.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of re-issued requests after the first one fails.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Upper bound on requests one logical fetch can issue.
    pub fn max_requests(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Transient state of one logical fetch.
///
/// Created per call and dropped when the fetch resolves. The resource and
/// decode mode are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt<'a> {
    resource: &'a str,
    mode: DecodeMode,
    failures: u32,
    max_retries: u32,
}

impl<'a> FetchAttempt<'a> {
    pub fn new(resource: &'a str, mode: DecodeMode, policy: &RetryPolicy) -> Self {
        Self {
            resource,
            mode,
            failures: 0,
            max_retries: policy.max_retries,
        }
    }

    pub fn resource(&self) -> &'a str {
        self.resource
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    /// Failed requests so far.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Count a failed request. Returns `true` while another request is allowed.
    /// The counter never wraps: once it is full no further request is allowed.
    pub fn record_failure(&mut self) -> bool {
        match self.failures.checked_add(1) {
            Some(failures) => {
                self.failures = failures;
                failures <= self.max_retries
            }
            None => false,
        }
    }
}
