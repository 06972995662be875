use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::fetcher::BlobHandle;

/// What the host should do when the target file name already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictAction {
    /// Keep both; the host picks a unique name.
    #[default]
    Uniquify,
    Overwrite,
    Prompt,
}

/// Host-side sink for finished files.
///
/// Delivery is fire-and-forget from the caller's point of view: there is no
/// result to inspect, the host owns any failure from here on.
#[async_trait]
pub trait OutputHandoff: Send + Sync {
    async fn deliver(&self, blob: BlobHandle, file_name: &str, conflict: ConflictAction);
}

#[async_trait]
impl<T: OutputHandoff + ?Sized> OutputHandoff for &T {
    async fn deliver(&self, blob: BlobHandle, file_name: &str, conflict: ConflictAction) {
        (**self).deliver(blob, file_name, conflict).await
    }
}
