//! The admission gate consulted before a work enters the result set.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::tags::DerivedTags;
use crate::types::{AiType, BookmarkData, ContentRating, IllustType, WorkKind, WorkMetadata};

/// Fields a [`FilterEngine`] may inspect.
///
/// Discovery only knows the id; everything else is filled in once metadata
/// has been fetched. For multi-page image works the width, height and mini
/// preview are withheld because page one's geometry says nothing about the
/// remaining pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionAttributes {
    pub id: String,
    pub kind: Option<WorkKind>,
    pub illust_type: Option<IllustType>,
    pub ai_type: Option<AiType>,
    pub create_date: Option<DateTime<FixedOffset>>,
    pub tags: Option<Vec<String>>,
    pub page_count: Option<u32>,
    pub bookmark_count: Option<u32>,
    pub bookmark_data: Option<BookmarkData>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mini: Option<String>,
    pub user_id: Option<String>,
    pub x_restrict: Option<ContentRating>,
}

impl AdmissionAttributes {
    /// Thin attributes built during discovery.
    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Full attributes from fetched metadata and its derived tags.
    pub fn from_metadata(
        meta: &WorkMetadata,
        kind: WorkKind,
        illust_type: IllustType,
        page_count: u32,
        derived: &DerivedTags,
    ) -> Self {
        let single_page = kind == WorkKind::Illust && page_count == 1;
        Self {
            id: meta.id.clone(),
            kind: Some(kind),
            illust_type: (kind == WorkKind::Illust).then_some(illust_type),
            ai_type: Some(derived.ai_type()),
            create_date: Some(meta.create_date),
            tags: Some(derived.both().to_vec()),
            page_count: Some(page_count),
            bookmark_count: Some(meta.bookmark_count),
            bookmark_data: meta.bookmark_data.clone(),
            width: Some(if single_page { meta.width } else { 0 }),
            height: Some(if single_page { meta.height } else { 0 }),
            mini: if single_page {
                meta.urls.as_ref().and_then(|urls| urls.mini.clone())
            } else {
                None
            },
            user_id: Some(meta.user_id.clone()),
            x_restrict: Some(meta.x_restrict),
        }
    }
}

/// Accept/reject oracle for candidates.
///
/// Implementations may keep state across calls ("stop after N"); callers
/// consult it once per candidate, in order, and await each answer before
/// moving on.
#[async_trait]
pub trait FilterEngine: Send + Sync {
    async fn check(&self, attributes: &AdmissionAttributes) -> bool;
}

#[async_trait]
impl<T: FilterEngine + ?Sized> FilterEngine for &T {
    async fn check(&self, attributes: &AdmissionAttributes) -> bool {
        (**self).check(attributes).await
    }
}

/// Admits everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

#[async_trait]
impl FilterEngine for AcceptAll {
    async fn check(&self, _attributes: &AdmissionAttributes) -> bool {
        true
    }
}

/// Admits the first `limit` candidates it sees, then rejects the rest.
#[derive(Debug)]
pub struct AcceptFirst {
    limit: usize,
    seen: AtomicUsize,
}

impl AcceptFirst {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            seen: AtomicUsize::new(0),
        }
    }

    pub fn accepted(&self) -> usize {
        self.seen.load(Ordering::SeqCst).min(self.limit)
    }
}

#[async_trait]
impl FilterEngine for AcceptFirst {
    async fn check(&self, _attributes: &AdmissionAttributes) -> bool {
        self.seen.fetch_add(1, Ordering::SeqCst) < self.limit
    }
}

/// Synchronous predicate wrapped as a [`FilterEngine`].
pub struct FnFilter<F>(pub F);

#[async_trait]
impl<F> FilterEngine for FnFilter<F>
where
    F: Fn(&AdmissionAttributes) -> bool + Send + Sync,
{
    async fn check(&self, attributes: &AdmissionAttributes) -> bool {
        (self.0)(attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TagMarkers;
    use crate::tags::TagProjections;
    use crate::types::{ImageUrls, TagEntry};

    fn metadata() -> WorkMetadata {
        WorkMetadata {
            id: "77".into(),
            description: String::new(),
            tags: vec![TagEntry::translated("猫", "cat")],
            is_original: false,
            ai_type: AiType::No,
            user_id: "5".into(),
            user_name: "owner".into(),
            create_date: DateTime::parse_from_rfc3339("2024-03-01T00:00:00+09:00").unwrap(),
            upload_date: DateTime::parse_from_rfc3339("2024-03-01T00:00:00+09:00").unwrap(),
            x_restrict: ContentRating::General,
            bookmark_count: 40,
            bookmark_data: None,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            width: 1000,
            height: 1400,
            urls: Some(ImageUrls {
                mini: Some("mini.jpg".into()),
                ..Default::default()
            }),
            series_nav: None,
            sl: None,
        }
    }

    fn derived(meta: &WorkMetadata) -> DerivedTags {
        TagProjections::from_entries(&meta.tags, meta.is_original, meta.ai_type)
            .derive(&TagMarkers::default())
    }

    #[test]
    fn single_page_keeps_geometry() {
        let meta = metadata();
        let attrs = AdmissionAttributes::from_metadata(
            &meta,
            WorkKind::Illust,
            IllustType::Illustration,
            1,
            &derived(&meta),
        );
        assert_eq!(attrs.width, Some(1000));
        assert_eq!(attrs.height, Some(1400));
        assert_eq!(attrs.mini.as_deref(), Some("mini.jpg"));
        assert_eq!(attrs.tags, Some(vec!["猫".to_string(), "cat".to_string()]));
    }

    #[test]
    fn multi_page_withholds_geometry_and_preview() {
        let meta = metadata();
        let attrs = AdmissionAttributes::from_metadata(
            &meta,
            WorkKind::Illust,
            IllustType::Manga,
            4,
            &derived(&meta),
        );
        assert_eq!(attrs.width, Some(0));
        assert_eq!(attrs.height, Some(0));
        assert_eq!(attrs.mini, None);
    }

    #[test]
    fn id_only_leaves_everything_else_unset() {
        let attrs = AdmissionAttributes::id_only("9");
        assert_eq!(attrs.id, "9");
        assert_eq!(attrs, AdmissionAttributes { id: "9".into(), ..Default::default() });
    }

    #[tokio::test]
    async fn accept_first_is_stateful() {
        let filter = AcceptFirst::new(2);
        let attrs = AdmissionAttributes::id_only("1");
        assert!(filter.check(&attrs).await);
        assert!(filter.check(&attrs).await);
        assert!(!filter.check(&attrs).await);
        assert_eq!(filter.accepted(), 2);
    }

    #[tokio::test]
    async fn fn_filter_wraps_predicate() {
        let filter = FnFilter(|attrs: &AdmissionAttributes| attrs.id.ends_with('0'));
        assert!(filter.check(&AdmissionAttributes::id_only("10")).await);
        assert!(!filter.check(&AdmissionAttributes::id_only("11")).await);
    }
}
