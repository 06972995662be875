//! Canonical work records for workcrawl.
//!
//! A work is described upstream by two independently shaped payloads: a
//! [`WorkMetadata`] view and a [`ThumbnailView`]. [`WorkNormalizer`] joins the
//! pair into one [`Record`], a base plus exactly one [`WorkVariant`]:
//!
//! - still images (illustration, manga) keep their resolution URLs, with the
//!   listing thumbnail pointed at page one for multi-page works;
//! - animated images pull frame timing through an [`AnimationSource`];
//! - novels carry their cover and text counts.
//!
//! Tag derivation ([`TagProjections`] → [`DerivedTags`]) prepends the
//! original mark and the AI mark once per record. [`FilterEngine`] is the
//! admission gate, fed with [`AdmissionAttributes`].
//!
//! ```rust,no_run
//! use normalize::{NoAnimations, NoRankings, NormalizeConfig, WorkNormalizer};
//! # async fn run(meta: normalize::WorkMetadata, thumb: normalize::ThumbnailView)
//! #     -> Result<(), normalize::NormalizeError> {
//! let config = NormalizeConfig::default();
//! let normalizer = WorkNormalizer::new(&config, &NoAnimations, &NoRankings);
//! let record = normalizer.normalize(&meta, &thumb).await?;
//! println!("{} -> {:?}", record.id(), record.kind());
//! # Ok(())
//! # }
//! ```

mod admission;
mod config;
mod description;
mod error;
mod normalizer;
mod sources;
mod tags;
mod types;
mod urls;

pub use crate::admission::{AcceptAll, AcceptFirst, AdmissionAttributes, FilterEngine, FnFilter};
pub use crate::config::{
    AnimationFormat, ConfigError, ImageSize, NormalizeConfig, TagMarkers, DEFAULT_AI_INDICATORS,
};
pub use crate::description::decode_description;
pub use crate::error::NormalizeError;
pub use crate::normalizer::WorkNormalizer;
pub use crate::sources::{
    AnimationMeta, AnimationSource, AnimationSourceError, NoAnimations, NoRankings, RankingLookup,
};
pub use crate::tags::{unshift_tag, DerivedTags, TagProjections};
pub use crate::types::{
    AiType, AnimationInfo, BookmarkData, ContentRating, Frame, IllustType, ImageKind, ImageUrlSet,
    ImageUrls, ImageWork, NovelWork, RankInfo, Record, RecordBase, SeriesInfo, SeriesNav, TagEntry,
    ThumbnailView, WorkKind, WorkMetadata, WorkVariant,
};
pub use crate::urls::{first_page_thumb, url_suffix};
