//! Collaborators the normalizer reads from.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Frame, RankInfo};

/// Looks up a previously recorded ranking slot by work id.
pub trait RankingLookup: Send + Sync {
    fn ranking(&self, id: &str) -> Option<RankInfo>;
}

/// No rankings known.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRankings;

impl RankingLookup for NoRankings {
    fn ranking(&self, _id: &str) -> Option<RankInfo> {
        None
    }
}

impl RankingLookup for HashMap<String, RankInfo> {
    fn ranking(&self, id: &str) -> Option<RankInfo> {
        self.get(id).copied()
    }
}

impl<T: RankingLookup + ?Sized> RankingLookup for &T {
    fn ranking(&self, id: &str) -> Option<RankInfo> {
        (**self).ranking(id)
    }
}

/// Frame timing and archive locations of an animated work, as served by the
/// upstream `ugoira_meta` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationMeta {
    /// Reduced-size frame archive.
    pub src: String,
    /// Full-size frame archive.
    #[serde(rename = "originalSrc")]
    pub original_src: String,
    pub mime_type: String,
    pub frames: Vec<Frame>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnimationSourceError {
    /// The resource could not be fetched at all.
    #[error("animation metadata for {id} unavailable")]
    Unavailable { id: String },
    #[error("upstream rejected animation metadata request for {id}: {message}")]
    Upstream { id: String, message: String },
    #[error("malformed animation metadata for {id}: {reason}")]
    Malformed { id: String, reason: String },
}

/// Secondary fetch for animated works, keyed by work id.
///
/// Called at most once per normalization; any retry discipline belongs to
/// the implementation.
#[async_trait]
pub trait AnimationSource: Send + Sync {
    async fn animation_meta(&self, id: &str) -> Result<AnimationMeta, AnimationSourceError>;
}

#[async_trait]
impl<T: AnimationSource + ?Sized> AnimationSource for &T {
    async fn animation_meta(&self, id: &str) -> Result<AnimationMeta, AnimationSourceError> {
        (**self).animation_meta(id).await
    }
}

/// For pipelines that never see animated works.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAnimations;

#[async_trait]
impl AnimationSource for NoAnimations {
    async fn animation_meta(&self, id: &str) -> Result<AnimationMeta, AnimationSourceError> {
        Err(AnimationSourceError::Unavailable { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upstream_meta_body() {
        let raw = r#"{
            "src": "https://i.example.net/ugoira/5_ugoira600x600.zip",
            "originalSrc": "https://i.example.net/ugoira/5_ugoira1920x1080.zip",
            "mime_type": "image/jpeg",
            "frames": [{"file": "000000.jpg", "delay": 80}, {"file": "000001.jpg", "delay": 120}]
        }"#;
        let meta: AnimationMeta = serde_json::from_str(raw).expect("meta");
        assert_eq!(meta.frames.len(), 2);
        assert_eq!(meta.frames[1].delay, 120);
        assert!(meta.original_src.ends_with("1920x1080.zip"));
    }

    #[test]
    fn map_lookup() {
        let mut ranks = HashMap::new();
        ranks.insert("5".to_string(), RankInfo { rank: 3 });
        assert_eq!(ranks.ranking("5"), Some(RankInfo { rank: 3 }));
        assert_eq!(NoRankings.ranking("5"), None);
    }
}
