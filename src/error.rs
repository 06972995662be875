use thiserror::Error;

use crate::config::ConfigLoadError;

/// Errors surfaced by [`Crawler`](crate::Crawler) operations.
///
/// Upstream page failures and unavailable resources are not in here: they end
/// up in the per-run reports instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// Another run on the same [`RunGuard`](crate::RunGuard) is still active.
    #[error("a run is already in progress")]
    ConcurrentRunRejected,
    #[error("discovery failure: {0}")]
    Discovery(#[from] discovery::DiscoveryError),
    #[error("normalization failure: {0}")]
    Normalize(#[from] normalize::NormalizeError),
    #[error("transport setup failure: {0}")]
    Transport(#[from] fetch::TransportError),
    #[error("configuration failure: {0}")]
    Config(#[from] ConfigLoadError),
}
