//! Owner dashboard export.
//!
//! The dashboard serves two lists per work kind: statistics (`works`) and
//! listing views (`thumbnails`). A row exists only where both agree on the id.

use std::collections::HashMap;
use std::fmt;

use normalize::{AiType, IllustType, WorkKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Moderation state shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DashboardRating {
    /// Not rated yet.
    #[default]
    Unrated,
    AllAges,
    Restricted,
}

impl TryFrom<u8> for DashboardRating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DashboardRating::Unrated),
            1 => Ok(DashboardRating::AllAges),
            2 => Ok(DashboardRating::Restricted),
            other => Err(format!("unknown content rating {other}")),
        }
    }
}

impl From<DashboardRating> for u8 {
    fn from(rating: DashboardRating) -> Self {
        match rating {
            DashboardRating::Unrated => 0,
            DashboardRating::AllAges => 1,
            DashboardRating::Restricted => 2,
        }
    }
}

/// Statistics half of a dashboard entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardWork {
    pub work_id: String,
    pub work_type: WorkKind,
    #[serde(default)]
    pub rating_count: u32,
    #[serde(default)]
    pub bookmark_count: u32,
    #[serde(default)]
    pub view_count: u32,
    #[serde(default)]
    pub comment_count: u32,
    /// `YYYY-MM-DD hh:mm:ss` as served.
    pub create_date: String,
    #[serde(default)]
    pub content_rating: DashboardRating,
    /// Best daily ranking slot; `0` means never ranked.
    #[serde(default)]
    pub daily_ranking_best_rank: u32,
    #[serde(default)]
    pub image_response_count: u32,
}

/// Listing half of a dashboard entry. Image-only and novel-only fields are
/// absent for the other kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardThumbnail {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ai_type: AiType,
    #[serde(default)]
    pub illust_type: Option<IllustType>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub text_count: Option<u32>,
    #[serde(default)]
    pub word_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardWorks {
    #[serde(default)]
    pub works: Vec<DashboardWork>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardThumbnails {
    #[serde(default)]
    pub illust: Vec<DashboardThumbnail>,
    #[serde(default)]
    pub novel: Vec<DashboardThumbnail>,
}

impl DashboardThumbnails {
    pub fn of_kind(&self, kind: WorkKind) -> &[DashboardThumbnail] {
        match kind {
            WorkKind::Illust => &self.illust,
            WorkKind::Novel => &self.novel,
        }
    }
}

/// Body of one dashboard request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardPayload {
    pub data: DashboardWorks,
    pub thumbnails: DashboardThumbnails,
}

/// A work joined with its listing view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardRow {
    pub work: DashboardWork,
    pub thumbnail: DashboardThumbnail,
}

impl DashboardRow {
    pub fn kind(&self) -> WorkKind {
        self.work.work_type
    }

    /// Illust type for image works. Upstream may omit it, which reads as an
    /// illustration.
    pub fn illust_type(&self) -> Option<IllustType> {
        match self.kind() {
            WorkKind::Illust => Some(self.thumbnail.illust_type.unwrap_or_default()),
            WorkKind::Novel => None,
        }
    }

    /// Date part of the creation timestamp.
    pub fn create_day(&self) -> &str {
        self.work
            .create_date
            .split(' ')
            .next()
            .unwrap_or(&self.work.create_date)
    }

    pub fn best_rank(&self) -> Option<u32> {
        match self.work.daily_ranking_best_rank {
            0 => None,
            rank => Some(rank),
        }
    }
}

/// Which rows an export keeps. Animations are listed with illustrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportScope {
    #[default]
    All,
    Illust,
    Manga,
    Novel,
}

impl ExportScope {
    /// Scope of a dashboard page path such as `/dashboard/works/manga`.
    pub fn from_path(path: &str) -> Self {
        if path.contains("/works/illustrations") {
            ExportScope::Illust
        } else if path.contains("/works/manga") {
            ExportScope::Manga
        } else if path.contains("/works/novels") {
            ExportScope::Novel
        } else {
            ExportScope::All
        }
    }

    /// Work kinds that have to be requested to fill this scope.
    pub fn work_kinds(self) -> &'static [WorkKind] {
        match self {
            ExportScope::All => &[WorkKind::Illust, WorkKind::Novel],
            ExportScope::Illust | ExportScope::Manga => &[WorkKind::Illust],
            ExportScope::Novel => &[WorkKind::Novel],
        }
    }

    pub fn includes(self, row: &DashboardRow) -> bool {
        match self {
            ExportScope::All => true,
            ExportScope::Illust => matches!(
                row.illust_type(),
                Some(IllustType::Illustration | IllustType::Animation)
            ),
            ExportScope::Manga => row.illust_type() == Some(IllustType::Manga),
            ExportScope::Novel => row.kind() == WorkKind::Novel,
        }
    }
}

impl fmt::Display for ExportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportScope::All => "all",
            ExportScope::Illust => "illust",
            ExportScope::Manga => "manga",
            ExportScope::Novel => "novel",
        })
    }
}

/// Join works with thumbnails of the same kind by id, keeping work order.
/// Works without a thumbnail are dropped.
pub fn pair_views(works: &[DashboardWork], thumbnails: &DashboardThumbnails) -> Vec<DashboardRow> {
    let mut by_id: HashMap<(WorkKind, &str), &DashboardThumbnail> = HashMap::new();
    for kind in [WorkKind::Illust, WorkKind::Novel] {
        for thumb in thumbnails.of_kind(kind) {
            by_id.entry((kind, thumb.id.as_str())).or_insert(thumb);
        }
    }

    works
        .iter()
        .filter_map(|work| {
            let Some(thumb) = by_id.get(&(work.work_type, work.work_id.as_str())) else {
                debug!(id = %work.work_id, "dashboard_unpaired_work");
                return None;
            };
            Some(DashboardRow {
                work: work.clone(),
                thumbnail: (*thumb).clone(),
            })
        })
        .collect()
}
