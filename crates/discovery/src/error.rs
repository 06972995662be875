use thiserror::Error;

/// Failure to obtain or decode one upstream page.
///
/// The discovery loop never propagates this: it ends the run with
/// [`Termination::UpstreamError`](crate::Termination::UpstreamError).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PageSourceError {
    #[error("page request failed: {0}")]
    Transport(String),
    #[error("page request returned status {status}")]
    Status { status: u16 },
    #[error("page payload is not valid json: {0}")]
    Decode(String),
}

/// Configuration problems that stop a discovery run before any request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DiscoveryError {
    #[error("page budget must be -1 (unlimited) or positive, got {0}")]
    InvalidPageBudget(i64),
    #[error("collection name must not be empty")]
    EmptyCollection,
}
