use thiserror::Error;

/// Why a metadata/thumbnail pair could not become a [`Record`](crate::Record).
///
/// Every variant carries the offending work id, see
/// [`NormalizeError::identifier`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NormalizeError {
    #[error("metadata id {metadata} does not match thumbnail id {thumbnail}")]
    IdentifierMismatch { metadata: String, thumbnail: String },

    #[error("work id '{id}' is not numeric")]
    InvalidIdentifier { id: String },

    /// An illustration or manga without an original-resolution URL.
    #[error("work {id} has no {which} image url")]
    MissingImageUrl { id: String, which: &'static str },

    /// No file extension could be read from the URL an extension is taken from.
    #[error("work {id}: no file extension in '{url}'")]
    UnresolvedExtension { id: String, url: String },

    /// The secondary animation metadata fetch failed.
    #[error("work {id}: animation metadata unavailable: {reason}")]
    AnimationMetadata { id: String, reason: String },
}

impl NormalizeError {
    /// Id of the work that failed. For a mismatch this is the metadata id.
    pub fn identifier(&self) -> &str {
        match self {
            NormalizeError::IdentifierMismatch { metadata, .. } => metadata,
            NormalizeError::InvalidIdentifier { id }
            | NormalizeError::MissingImageUrl { id, .. }
            | NormalizeError::UnresolvedExtension { id, .. }
            | NormalizeError::AnimationMetadata { id, .. } => id,
        }
    }

    /// Whether the batch default is "log and skip this record".
    pub fn is_skippable(&self) -> bool {
        matches!(self, NormalizeError::MissingImageUrl { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_points_at_work() {
        let err = NormalizeError::AnimationMetadata {
            id: "42".into(),
            reason: "timeout".into(),
        };
        assert_eq!(err.identifier(), "42");
        assert_eq!(
            err.to_string(),
            "work 42: animation metadata unavailable: timeout"
        );
    }

    #[test]
    fn only_missing_url_is_skippable() {
        let missing = NormalizeError::MissingImageUrl {
            id: "1".into(),
            which: "original",
        };
        let mismatch = NormalizeError::IdentifierMismatch {
            metadata: "1".into(),
            thumbnail: "2".into(),
        };
        assert!(missing.is_skippable());
        assert!(!mismatch.is_skippable());
        assert_eq!(mismatch.identifier(), "1");
    }
}
