//! Network-backed collaborators for the normalizer.

use async_trait::async_trait;
use fetch::{DecodeMode, FetchOutcome, ResourceTransport, RetryingFetcher};
use normalize::{AnimationMeta, AnimationSource, AnimationSourceError};
use serde::Deserialize;
use tracing::debug;

/// `{ error, message, body }` wrapper of upstream ajax responses.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    body: serde_json::Value,
}

/// Pulls animation frame metadata through a [`RetryingFetcher`].
///
/// The fetcher's retry budget is the only retry applied: once it is spent the
/// work is reported as [`AnimationSourceError::Unavailable`].
pub struct FetcherAnimationSource<T> {
    fetcher: RetryingFetcher<T>,
    origin: String,
}

impl<T: ResourceTransport> FetcherAnimationSource<T> {
    pub fn new(fetcher: RetryingFetcher<T>, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            fetcher,
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn meta_url(&self, id: &str) -> String {
        format!("{}/ajax/illust/{id}/ugoira_meta", self.origin)
    }
}

#[async_trait]
impl<T: ResourceTransport> AnimationSource for FetcherAnimationSource<T> {
    async fn animation_meta(&self, id: &str) -> Result<AnimationMeta, AnimationSourceError> {
        let url = self.meta_url(id);
        let payload = match self.fetcher.fetch(&url, DecodeMode::Buffer).await {
            FetchOutcome::Fetched(fetched) => fetched.into_bytes(),
            FetchOutcome::Unavailable => {
                return Err(AnimationSourceError::Unavailable { id: id.to_string() });
            }
        };

        let envelope: Envelope =
            serde_json::from_slice(&payload).map_err(|err| AnimationSourceError::Malformed {
                id: id.to_string(),
                reason: err.to_string(),
            })?;
        if envelope.error {
            return Err(AnimationSourceError::Upstream {
                id: id.to_string(),
                message: envelope.message,
            });
        }

        let meta: AnimationMeta =
            serde_json::from_value(envelope.body).map_err(|err| AnimationSourceError::Malformed {
                id: id.to_string(),
                reason: err.to_string(),
            })?;
        debug!(id, frames = meta.frames.len(), "animation_meta_loaded");
        Ok(meta)
    }
}
