use thiserror::Error;

/// Failures of a single request at the transport level.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportError {
    /// The resource reference could not be parsed as an absolute URL.
    #[error("invalid resource url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// The configured origin could not be parsed.
    #[error("invalid origin '{0}'")]
    InvalidOrigin(String),
    /// Credentials could not be encoded as a header value.
    #[error("invalid credentials header")]
    InvalidCredentials,
    /// Building the HTTP client failed.
    #[error("http client setup failed: {0}")]
    Client(String),
    /// The request did not produce a response (DNS, connect, reset, body read).
    #[error("request failed: {0}")]
    Request(String),
}

/// Why one fetch attempt failed.
///
/// Both variants feed the same retry path in
/// [`RetryingFetcher`](crate::RetryingFetcher); the split only exists so logs
/// say which one happened.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The server answered with a non-success status.
    #[error("unexpected status {status}")]
    Status { status: u16 },
}
