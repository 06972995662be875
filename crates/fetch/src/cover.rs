use tracing::{debug, info};

use crate::fetcher::{DecodeMode, FetchOutcome, Fetched, RetryingFetcher};
use crate::handoff::{ConflictAction, OutputHandoff};
use crate::transport::ResourceTransport;

/// What happened to one cover download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverOutcome {
    /// Handed to the host under this file name.
    Delivered { file_name: String },
    /// Retry budget exhausted; nothing was handed off.
    Unavailable,
}

/// Downloads novel cover images and passes them to the host.
///
/// Spacing between consecutive downloads is the caller's job.
pub struct CoverDownloader<T, H> {
    fetcher: RetryingFetcher<T>,
    handoff: H,
    conflict: ConflictAction,
}

impl<T: ResourceTransport, H: OutputHandoff> CoverDownloader<T, H> {
    pub fn new(fetcher: RetryingFetcher<T>, handoff: H) -> Self {
        Self {
            fetcher,
            handoff,
            conflict: ConflictAction::default(),
        }
    }

    pub fn with_conflict_action(mut self, conflict: ConflictAction) -> Self {
        self.conflict = conflict;
        self
    }

    /// Fetch the cover at `cover_url` and deliver it next to `novel_name`,
    /// swapping the novel's extension for the cover's.
    pub async fn download(&self, cover_url: &str, novel_name: &str) -> CoverOutcome {
        let fetched = self.get_cover(cover_url, DecodeMode::Blob).await;
        let Some(blob) = fetched.and_then(Fetched::into_blob) else {
            return CoverOutcome::Unavailable;
        };

        let file_name = replace_suffix(novel_name, cover_url);
        debug!(url = cover_url, file_name = %file_name, len = blob.len(), "cover_handoff");
        self.handoff.deliver(blob, &file_name, self.conflict).await;
        info!(file_name = %file_name, "cover_delivered");
        CoverOutcome::Delivered { file_name }
    }

    /// Raw cover fetch, `None` once retries are spent.
    pub async fn get_cover(&self, cover_url: &str, mode: DecodeMode) -> Option<Fetched> {
        match self.fetcher.fetch(cover_url, mode).await {
            FetchOutcome::Fetched(fetched) => Some(fetched),
            FetchOutcome::Unavailable => None,
        }
    }
}

/// Replace the extension of `name` with the extension found at the end of
/// `url`'s path. Query strings and fragments are ignored. A name without an
/// extension gets one appended; a url without one leaves `name` as is.
pub fn replace_suffix(name: &str, url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    let Some((_, ext)) = last_segment.rsplit_once('.') else {
        return name.to_string();
    };
    if ext.is_empty() {
        return name.to_string();
    }

    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() && !stem.ends_with('/') => stem,
        _ => name,
    };
    format!("{stem}.{ext}")
}
