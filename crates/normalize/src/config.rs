//! Configuration for the normalizer.
//!
//! [`NormalizeConfig`] decides which asset size a record is prepared for, the
//! container an animated work is saved as, and which synthetic marker tags
//! are prepended during tag derivation.
//!
//! ```rust
//! use normalize::{AnimationFormat, ImageSize, NormalizeConfig};
//!
//! let config = NormalizeConfig {
//!     image_size: ImageSize::Regular,
//!     animation_format: AnimationFormat::Gif,
//!     ..Default::default()
//! };
//! config.validate().expect("valid normalize config");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Words the upstream and its users attach to AI-generated works.
///
/// Matching is case-insensitive on the whole tag.
pub const DEFAULT_AI_INDICATORS: &[&str] = &[
    "AI",
    "AI-generated",
    "AIgenerated",
    "AI生成",
    "AIイラスト",
    "AI绘画",
    "AI作品",
    "AIart",
    "AI art",
    "NovelAI",
    "NovelAIDiffusion",
    "StableDiffusion",
    "Stable Diffusion",
    "midjourney",
];

/// Which resolution downstream keeps for image works.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSize {
    #[default]
    Original,
    Regular,
    Small,
    /// Only the square listing thumbnail is kept. Thumbnails cannot be
    /// re-encoded, so the record's extension follows the thumbnail URL.
    Thumb,
}

/// Container an animated work is converted to when saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationFormat {
    Zip,
    #[default]
    Webm,
    Gif,
    Png,
}

impl AnimationFormat {
    pub fn extension(self) -> &'static str {
        match self {
            AnimationFormat::Zip => "zip",
            AnimationFormat::Webm => "webm",
            AnimationFormat::Gif => "gif",
            AnimationFormat::Png => "png",
        }
    }
}

/// Synthetic tags prepended during derivation and the indicator list that
/// upgrades a work's AI classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagMarkers {
    /// Prepended to all projections when upstream marks the work original.
    pub original_mark: String,
    /// Prepended after the original mark when the effective AI type is `Yes`.
    pub ai_mark: String,
    pub ai_indicators: Vec<String>,
}

impl Default for TagMarkers {
    fn default() -> Self {
        Self {
            original_mark: "original".to_string(),
            ai_mark: "AI-generated".to_string(),
            ai_indicators: DEFAULT_AI_INDICATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TagMarkers {
    /// Case-insensitive membership test against `ai_indicators`.
    pub fn is_ai_indicator(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.ai_indicators
            .iter()
            .any(|indicator| indicator.to_lowercase() == tag.to_lowercase())
    }
}

/// Runtime configuration for [`WorkNormalizer`](crate::WorkNormalizer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Configuration schema version.
    ///
    /// Default: `1`
    pub version: u32,

    /// Asset size downstream keeps. Only `Thumb` changes normalization: the
    /// extension is then taken from the thumbnail URL for every image kind.
    ///
    /// Default: [`ImageSize::Original`]
    pub image_size: ImageSize,

    /// Saved container for animated works; becomes the record extension.
    ///
    /// Default: [`AnimationFormat::Webm`]
    pub animation_format: AnimationFormat,

    pub markers: TagMarkers,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            image_size: ImageSize::default(),
            animation_format: AnimationFormat::default(),
            markers: TagMarkers::default(),
        }
    }
}

impl NormalizeConfig {
    /// Reject configurations that would produce broken tags.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 {
            return Err(ConfigError::InvalidVersion(self.version));
        }
        if self.markers.original_mark.trim().is_empty() {
            return Err(ConfigError::EmptyMarker("original_mark"));
        }
        if self.markers.ai_mark.trim().is_empty() {
            return Err(ConfigError::EmptyMarker("ai_mark"));
        }
        if self.markers.original_mark == self.markers.ai_mark {
            return Err(ConfigError::DuplicateMarker(self.markers.ai_mark.clone()));
        }
        if self.markers.ai_indicators.iter().any(|i| i.trim().is_empty()) {
            return Err(ConfigError::EmptyIndicator);
        }
        Ok(())
    }
}

/// Errors raised by [`NormalizeConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config version must be positive, got {0}")]
    InvalidVersion(u32),
    #[error("marker '{0}' must not be empty")]
    EmptyMarker(&'static str),
    #[error("original and ai markers must differ, both are '{0}'")]
    DuplicateMarker(String),
    #[error("ai indicator list contains an empty entry")]
    EmptyIndicator,
}
