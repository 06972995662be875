//! Upstream views and the canonical [`Record`] they are folded into.
//!
//! Two upstream payloads describe the same work:
//!
//! - [`ThumbnailView`]: the lightweight listing entry (title, kind, page count,
//!   listing thumbnail or novel cover, novel counts).
//! - [`WorkMetadata`]: the detailed per-work payload (tags with translations,
//!   owner, dates, engagement counts, resolution URLs, series navigation).
//!
//! Both deserialize from the upstream camelCase JSON. [`Record`] is the
//! persisted shape and always carries exactly one [`WorkVariant`].

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Image-like or text-like work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkKind {
    Illust,
    Novel,
}

impl WorkKind {
    /// Path segment used by the upstream API.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkKind::Illust => "illust",
            WorkKind::Novel => "novel",
        }
    }

    /// Type string stored alongside identifiers in the result list.
    pub fn list_type(self) -> &'static str {
        match self {
            WorkKind::Illust => "illusts",
            WorkKind::Novel => "novels",
        }
    }
}

impl fmt::Display for WorkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! numeric_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident = $value:literal),+ $(,)? }
        default = $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Upstream numeric code.
            pub fn code(self) -> u8 {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl TryFrom<u8> for $name {
            type Error = String;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok($name::$variant),)+
                    other => Err(format!(concat!("unknown ", stringify!($name), " code {}"), other)),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.code()
            }
        }
    };
}

numeric_enum! {
    /// AI-generation classifier as reported upstream.
    pub enum AiType { Unknown = 0, No = 1, Yes = 2 }
    default = Unknown
}

numeric_enum! {
    /// Maturity classifier (`xRestrict`).
    pub enum ContentRating { General = 0, R18 = 1, R18G = 2 }
    default = General
}

numeric_enum! {
    /// Image sub-kind (`illustType`).
    pub enum IllustType { Illustration = 0, Manga = 1, Animation = 2 }
    default = Illustration
}

/// One tag on the metadata view, with its optional translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl TagEntry {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            translation: None,
        }
    }

    pub fn translated(tag: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            translation: Some(translation.into()),
        }
    }
}

/// Present when the current account has bookmarked the work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkData {
    pub id: String,
    #[serde(default)]
    pub private: bool,
}

/// Resolution URLs on the metadata view. `original` is null for some
/// restricted works.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageUrls {
    #[serde(default)]
    pub mini: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub regular: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesNav {
    pub series_id: String,
    pub title: String,
    pub order: u32,
}

/// Detailed per-work payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkMetadata {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<TagEntry>,
    #[serde(default)]
    pub is_original: bool,
    #[serde(default)]
    pub ai_type: AiType,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub create_date: DateTime<FixedOffset>,
    pub upload_date: DateTime<FixedOffset>,
    #[serde(default)]
    pub x_restrict: ContentRating,
    #[serde(default)]
    pub bookmark_count: u32,
    #[serde(default)]
    pub bookmark_data: Option<BookmarkData>,
    #[serde(default)]
    pub view_count: u32,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub urls: Option<ImageUrls>,
    #[serde(default, rename = "seriesNavData")]
    pub series_nav: Option<SeriesNav>,
    #[serde(default)]
    pub sl: Option<u32>,
}

/// Listing entry for a work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailView {
    pub id: String,
    pub kind: WorkKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub illust_type: IllustType,
    #[serde(default)]
    pub ai_type: AiType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_page_count")]
    pub page_count: u32,
    /// Listing thumbnail for images, cover image for novels.
    pub url: String,
    #[serde(default)]
    pub text_count: Option<u32>,
    #[serde(default)]
    pub word_count: Option<u32>,
}

fn default_page_count() -> u32 {
    1
}

/// Best-known public ranking slot of a work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankInfo {
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub title: String,
    pub order: u32,
    pub series_id: String,
}

impl From<&SeriesNav> for SeriesInfo {
    fn from(nav: &SeriesNav) -> Self {
        Self {
            title: nav.title.clone(),
            order: nav.order,
            series_id: nav.series_id.clone(),
        }
    }
}

/// Fields shared by every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordBase {
    pub id: String,
    pub id_num: u64,
    pub ai_type: AiType,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub tags_with_transl: Vec<String>,
    pub tags_transl_only: Vec<String>,
    pub user_id: String,
    pub user_name: String,
    pub create_date: DateTime<FixedOffset>,
    pub upload_date: DateTime<FixedOffset>,
    pub x_restrict: ContentRating,
    pub bookmark_count: u32,
    pub bookmarked: bool,
    pub bookmark_id: Option<String>,
    pub view_count: u32,
    pub like_count: u32,
    pub comment_count: u32,
    pub rank: Option<RankInfo>,
    pub series: Option<SeriesInfo>,
    pub sl: Option<u32>,
    pub full_width: u32,
    pub full_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrlSet {
    pub original: String,
    pub regular: String,
    pub small: String,
}

/// One frame of an animated work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub file: String,
    /// Milliseconds.
    pub delay: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationInfo {
    pub frames: Vec<Frame>,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageKind {
    Illustration,
    Manga,
    Animation(AnimationInfo),
}

impl ImageKind {
    pub fn illust_type(&self) -> IllustType {
        match self {
            ImageKind::Illustration => IllustType::Illustration,
            ImageKind::Manga => IllustType::Manga,
            ImageKind::Animation(_) => IllustType::Animation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageWork {
    pub page_count: u32,
    pub urls: ImageUrlSet,
    pub thumb: String,
    pub ext: String,
    pub kind: ImageKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovelWork {
    pub cover_url: String,
    pub text_count: u32,
    pub word_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkVariant {
    Image(ImageWork),
    Novel(NovelWork),
}

/// Canonical, persisted work record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub base: RecordBase,
    pub variant: WorkVariant,
}

impl Record {
    pub fn id(&self) -> &str {
        &self.base.id
    }

    pub fn kind(&self) -> WorkKind {
        match self.variant {
            WorkVariant::Image(_) => WorkKind::Illust,
            WorkVariant::Novel(_) => WorkKind::Novel,
        }
    }

    pub fn image(&self) -> Option<&ImageWork> {
        match &self.variant {
            WorkVariant::Image(image) => Some(image),
            WorkVariant::Novel(_) => None,
        }
    }

    pub fn novel(&self) -> Option<&NovelWork> {
        match &self.variant {
            WorkVariant::Novel(novel) => Some(novel),
            WorkVariant::Image(_) => None,
        }
    }
}
