use std::time::Instant;

use tracing::{debug, info_span, warn, Instrument};

use crate::admission::{AdmissionAttributes, FilterEngine};
use crate::config::{ImageSize, NormalizeConfig};
use crate::description::decode_description;
use crate::error::NormalizeError;
use crate::sources::{AnimationSource, RankingLookup};
use crate::tags::{DerivedTags, TagProjections};
use crate::types::{
    AnimationInfo, IllustType, ImageKind, ImageUrlSet, ImageWork, NovelWork, Record, RecordBase,
    SeriesInfo, ThumbnailView, WorkKind, WorkMetadata, WorkVariant,
};
use crate::urls::{first_page_thumb, url_suffix};

/// Folds a metadata view and a thumbnail view of one work into a [`Record`].
///
/// Only animated works touch the network, through the [`AnimationSource`].
/// Nothing here retries.
pub struct WorkNormalizer<'a> {
    config: &'a NormalizeConfig,
    animation: &'a dyn AnimationSource,
    ranking: &'a dyn RankingLookup,
}

/// Checked id plus tags with markers applied.
struct Prepared {
    id_num: u64,
    derived: DerivedTags,
}

impl<'a> WorkNormalizer<'a> {
    pub fn new(
        config: &'a NormalizeConfig,
        animation: &'a dyn AnimationSource,
        ranking: &'a dyn RankingLookup,
    ) -> Self {
        Self {
            config,
            animation,
            ranking,
        }
    }

    pub fn config(&self) -> &NormalizeConfig {
        self.config
    }

    /// Build the record for a metadata/thumbnail pair.
    pub async fn normalize(
        &self,
        meta: &WorkMetadata,
        thumb: &ThumbnailView,
    ) -> Result<Record, NormalizeError> {
        let span = info_span!("normalize.normalize", id = %meta.id, kind = %thumb.kind);
        let start = Instant::now();
        let result = async {
            let prepared = self.prepare(meta, thumb)?;
            self.build(meta, thumb, prepared).await
        }
        .instrument(span)
        .await;
        log_result(&meta.id, &result, start);
        result
    }

    /// Build full admission attributes, ask `filter`, and only normalize an
    /// admitted work. `Ok(None)` means rejected.
    pub async fn admit_and_normalize(
        &self,
        meta: &WorkMetadata,
        thumb: &ThumbnailView,
        filter: &dyn FilterEngine,
    ) -> Result<Option<Record>, NormalizeError> {
        let span = info_span!("normalize.admit", id = %meta.id, kind = %thumb.kind);
        let start = Instant::now();
        let result = async {
            let prepared = self.prepare(meta, thumb)?;
            let attributes = AdmissionAttributes::from_metadata(
                meta,
                thumb.kind,
                thumb.illust_type,
                thumb.page_count,
                &prepared.derived,
            );
            if !filter.check(&attributes).await {
                debug!(id = %meta.id, "normalize_rejected");
                return Ok(None);
            }
            self.build(meta, thumb, prepared).await.map(Some)
        }
        .instrument(span)
        .await;
        if let Err(err) = &result {
            warn!(error = %err, id = %err.identifier(), "normalize_failure");
        } else if let Ok(Some(record)) = &result {
            debug!(
                id = %record.id(),
                elapsed_micros = start.elapsed().as_micros(),
                "normalize_success"
            );
        }
        result
    }

    fn prepare(
        &self,
        meta: &WorkMetadata,
        thumb: &ThumbnailView,
    ) -> Result<Prepared, NormalizeError> {
        if meta.id != thumb.id {
            return Err(NormalizeError::IdentifierMismatch {
                metadata: meta.id.clone(),
                thumbnail: thumb.id.clone(),
            });
        }
        let id_num = meta
            .id
            .parse::<u64>()
            .map_err(|_| NormalizeError::InvalidIdentifier { id: meta.id.clone() })?;

        let derived = TagProjections::from_entries(&meta.tags, meta.is_original, meta.ai_type)
            .derive(&self.config.markers);
        Ok(Prepared { id_num, derived })
    }

    async fn build(
        &self,
        meta: &WorkMetadata,
        thumb: &ThumbnailView,
        prepared: Prepared,
    ) -> Result<Record, NormalizeError> {
        let variant = match thumb.kind {
            WorkKind::Novel => WorkVariant::Novel(NovelWork {
                cover_url: thumb.url.clone(),
                text_count: thumb.text_count.unwrap_or(0),
                word_count: thumb.word_count.unwrap_or(0),
            }),
            WorkKind::Illust => match thumb.illust_type {
                IllustType::Illustration | IllustType::Manga => {
                    WorkVariant::Image(self.still_image(meta, thumb)?)
                }
                IllustType::Animation => {
                    WorkVariant::Image(self.animated_image(meta, thumb).await?)
                }
            },
        };

        Ok(Record {
            base: self.base(meta, thumb, prepared),
            variant,
        })
    }

    fn base(&self, meta: &WorkMetadata, thumb: &ThumbnailView, prepared: Prepared) -> RecordBase {
        let ai_type = prepared.derived.ai_type();
        let (tags, tags_with_transl, tags_transl_only) = prepared.derived.into_lists();

        RecordBase {
            id: meta.id.clone(),
            id_num: prepared.id_num,
            ai_type,
            title: thumb.title.clone(),
            description: decode_description(&meta.description),
            tags,
            tags_with_transl,
            tags_transl_only,
            user_id: meta.user_id.clone(),
            user_name: meta.user_name.clone(),
            create_date: meta.create_date,
            upload_date: meta.upload_date,
            x_restrict: meta.x_restrict,
            bookmark_count: meta.bookmark_count,
            bookmarked: meta.bookmark_data.is_some(),
            bookmark_id: meta.bookmark_data.as_ref().map(|b| b.id.clone()),
            view_count: meta.view_count,
            like_count: meta.like_count,
            comment_count: meta.comment_count,
            rank: self.ranking.ranking(&meta.id),
            series: meta.series_nav.as_ref().map(SeriesInfo::from),
            sl: meta.sl,
            full_width: meta.width,
            full_height: meta.height,
        }
    }

    fn still_image(
        &self,
        meta: &WorkMetadata,
        thumb: &ThumbnailView,
    ) -> Result<ImageWork, NormalizeError> {
        let urls = meta.urls.clone().unwrap_or_default();
        let original = urls.original.ok_or_else(|| NormalizeError::MissingImageUrl {
            id: meta.id.clone(),
            which: "original",
        })?;

        let thumb_url = if thumb.page_count > 1 {
            first_page_thumb(&thumb.url)
        } else {
            thumb.url.clone()
        };

        let ext_source = match self.config.image_size {
            ImageSize::Thumb => &thumb_url,
            _ => &original,
        };
        let ext = self.extension_from(&meta.id, ext_source)?;

        let kind = match thumb.illust_type {
            IllustType::Manga => ImageKind::Manga,
            _ => ImageKind::Illustration,
        };

        Ok(ImageWork {
            page_count: thumb.page_count,
            urls: ImageUrlSet {
                regular: urls.regular.unwrap_or_default(),
                small: urls.small.unwrap_or_default(),
                original,
            },
            thumb: thumb_url,
            ext,
            kind,
        })
    }

    async fn animated_image(
        &self,
        meta: &WorkMetadata,
        thumb: &ThumbnailView,
    ) -> Result<ImageWork, NormalizeError> {
        let animation = self
            .animation
            .animation_meta(&meta.id)
            .await
            .map_err(|err| NormalizeError::AnimationMetadata {
                id: meta.id.clone(),
                reason: err.to_string(),
            })?;

        let ext = match self.config.image_size {
            ImageSize::Thumb => self.extension_from(&meta.id, &thumb.url)?,
            _ => self.config.animation_format.extension().to_string(),
        };

        Ok(ImageWork {
            page_count: thumb.page_count,
            urls: ImageUrlSet {
                original: animation.original_src,
                regular: animation.src.clone(),
                small: animation.src,
            },
            thumb: thumb.url.clone(),
            ext,
            kind: ImageKind::Animation(AnimationInfo {
                frames: animation.frames,
                mime_type: animation.mime_type,
            }),
        })
    }

    fn extension_from(&self, id: &str, url: &str) -> Result<String, NormalizeError> {
        url_suffix(url)
            .map(str::to_string)
            .ok_or_else(|| NormalizeError::UnresolvedExtension {
                id: id.to_string(),
                url: url.to_string(),
            })
    }
}

fn log_result(id: &str, result: &Result<Record, NormalizeError>, start: Instant) {
    let elapsed_micros = start.elapsed().as_micros();
    match result {
        Ok(record) => debug!(id, kind = %record.kind(), elapsed_micros, "normalize_success"),
        Err(err) => {
            warn!(error = %err, id = %err.identifier(), elapsed_micros, "normalize_failure")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::DateTime;

    use super::*;
    use crate::admission::{AcceptAll, FnFilter};
    use crate::sources::{AnimationMeta, AnimationSourceError, NoAnimations, NoRankings};
    use crate::types::{AiType, ContentRating, Frame, ImageUrls, RankInfo, SeriesNav, TagEntry};

    const THUMB: &str =
        "https://i.example.net/c/250x250_80_a2/custom-thumb/img/2024/05/01/10/00/00/101_p0_custom1200.jpg";

    fn metadata(id: &str) -> WorkMetadata {
        WorkMetadata {
            id: id.to_string(),
            description: "first<br />second".into(),
            tags: vec![TagEntry::translated("風景", "scenery")],
            is_original: true,
            ai_type: AiType::No,
            user_id: "7".into(),
            user_name: "painter".into(),
            create_date: DateTime::parse_from_rfc3339("2024-05-01T10:00:00+09:00").unwrap(),
            upload_date: DateTime::parse_from_rfc3339("2024-05-02T10:00:00+09:00").unwrap(),
            x_restrict: ContentRating::General,
            bookmark_count: 12,
            bookmark_data: None,
            view_count: 100,
            like_count: 20,
            comment_count: 1,
            width: 1200,
            height: 900,
            urls: Some(ImageUrls {
                mini: Some("https://i.example.net/mini/101_p0.jpg".into()),
                thumb: Some(THUMB.into()),
                small: Some("https://i.example.net/small/101_p0.jpg".into()),
                regular: Some("https://i.example.net/regular/101_p0.jpg".into()),
                original: Some("https://i.example.net/img-original/101_p0.png".into()),
            }),
            series_nav: None,
            sl: Some(2),
        }
    }

    fn thumbnail(id: &str, illust_type: IllustType, page_count: u32) -> ThumbnailView {
        ThumbnailView {
            id: id.to_string(),
            kind: WorkKind::Illust,
            title: "sunset".into(),
            illust_type,
            ai_type: AiType::No,
            tags: vec!["風景".into()],
            page_count,
            url: THUMB.into(),
            text_count: None,
            word_count: None,
        }
    }

    struct CountingAnimations {
        fail: bool,
        calls: AtomicU32,
    }

    impl CountingAnimations {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl AnimationSource for CountingAnimations {
        async fn animation_meta(&self, id: &str) -> Result<AnimationMeta, AnimationSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AnimationSourceError::Unavailable { id: id.to_string() });
            }
            Ok(AnimationMeta {
                src: "https://i.example.net/ugoira/101_ugoira600x600.zip".into(),
                original_src: "https://i.example.net/ugoira/101_ugoira1920x1080.zip".into(),
                mime_type: "image/jpeg".into(),
                frames: vec![Frame {
                    file: "000000.jpg".into(),
                    delay: 100,
                }],
            })
        }
    }

    #[tokio::test]
    async fn single_page_keeps_thumbnail_and_original_suffix() {
        let config = NormalizeConfig::default();
        let normalizer = WorkNormalizer::new(&config, &NoAnimations, &NoRankings);

        let record = normalizer
            .normalize(&metadata("101"), &thumbnail("101", IllustType::Illustration, 1))
            .await
            .expect("record");

        let image = record.image().expect("image variant");
        assert_eq!(image.thumb, THUMB);
        assert_eq!(image.ext, "png");
        assert_eq!(image.kind, ImageKind::Illustration);
        assert_eq!(record.base.id_num, 101);
        assert_eq!(record.base.description, "first\nsecond");
        assert_eq!(record.base.tags, ["original", "風景"]);
        assert_eq!(record.base.series, None);
        assert_eq!(record.base.rank, None);
    }

    #[tokio::test]
    async fn multi_page_thumbnail_points_at_first_page() {
        let config = NormalizeConfig::default();
        let normalizer = WorkNormalizer::new(&config, &NoAnimations, &NoRankings);
        let mut thumb = thumbnail("101", IllustType::Manga, 3);
        thumb.url = thumb.url.replace("_p0_", "_p2_");

        let record = normalizer
            .normalize(&metadata("101"), &thumb)
            .await
            .expect("record");

        let image = record.image().expect("image variant");
        assert!(image.thumb.contains("/img-master/"));
        assert!(image.thumb.ends_with("101_p0_master1200.jpg"));
        assert_eq!(image.kind, ImageKind::Manga);
        assert_eq!(image.page_count, 3);
    }

    #[tokio::test]
    async fn thumb_size_takes_extension_from_thumbnail() {
        let config = NormalizeConfig {
            image_size: ImageSize::Thumb,
            ..Default::default()
        };
        let normalizer = WorkNormalizer::new(&config, &NoAnimations, &NoRankings);

        let record = normalizer
            .normalize(&metadata("101"), &thumbnail("101", IllustType::Illustration, 1))
            .await
            .expect("record");
        assert_eq!(record.image().unwrap().ext, "jpg");
    }

    #[tokio::test]
    async fn missing_original_url_is_reported_with_id() {
        let config = NormalizeConfig::default();
        let normalizer = WorkNormalizer::new(&config, &NoAnimations, &NoRankings);
        let mut meta = metadata("101");
        meta.urls.as_mut().unwrap().original = None;

        let err = normalizer
            .normalize(&meta, &thumbnail("101", IllustType::Illustration, 1))
            .await
            .expect_err("missing url");
        assert_eq!(
            err,
            NormalizeError::MissingImageUrl {
                id: "101".into(),
                which: "original"
            }
        );
        assert!(err.is_skippable());
    }

    #[tokio::test]
    async fn mismatched_ids_are_rejected() {
        let config = NormalizeConfig::default();
        let normalizer = WorkNormalizer::new(&config, &NoAnimations, &NoRankings);

        let err = normalizer
            .normalize(&metadata("101"), &thumbnail("102", IllustType::Illustration, 1))
            .await
            .expect_err("mismatch");
        assert_eq!(err.identifier(), "101");
        assert!(matches!(err, NormalizeError::IdentifierMismatch { .. }));
    }

    #[tokio::test]
    async fn non_numeric_id_is_rejected() {
        let config = NormalizeConfig::default();
        let normalizer = WorkNormalizer::new(&config, &NoAnimations, &NoRankings);

        let err = normalizer
            .normalize(&metadata("abc"), &thumbnail("abc", IllustType::Illustration, 1))
            .await
            .expect_err("bad id");
        assert_eq!(err, NormalizeError::InvalidIdentifier { id: "abc".into() });
    }

    #[tokio::test]
    async fn animated_work_uses_secondary_metadata() {
        let config = NormalizeConfig::default();
        let animations = CountingAnimations::new(false);
        let normalizer = WorkNormalizer::new(&config, &animations, &NoRankings);

        let record = normalizer
            .normalize(&metadata("101"), &thumbnail("101", IllustType::Animation, 1))
            .await
            .expect("record");

        let image = record.image().expect("image variant");
        assert_eq!(image.ext, "webm");
        assert!(image.urls.original.ends_with("1920x1080.zip"));
        assert_eq!(image.urls.regular, image.urls.small);
        assert_eq!(image.thumb, THUMB);
        match &image.kind {
            ImageKind::Animation(info) => {
                assert_eq!(info.mime_type, "image/jpeg");
                assert_eq!(info.frames.len(), 1);
            }
            other => panic!("expected animation, got {other:?}"),
        }
        assert_eq!(animations.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_animation_fetch_fails_normalization() {
        let config = NormalizeConfig::default();
        let animations = CountingAnimations::new(true);
        let normalizer = WorkNormalizer::new(&config, &animations, &NoRankings);

        let err = normalizer
            .normalize(&metadata("101"), &thumbnail("101", IllustType::Animation, 1))
            .await
            .expect_err("animation failure");
        assert!(matches!(err, NormalizeError::AnimationMetadata { ref id, .. } if id == "101"));
        assert_eq!(animations.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn novel_takes_cover_and_counts_from_thumbnail() {
        let config = NormalizeConfig::default();
        let normalizer = WorkNormalizer::new(&config, &NoAnimations, &NoRankings);
        let mut meta = metadata("300");
        meta.urls = None;
        let thumb = ThumbnailView {
            kind: WorkKind::Novel,
            url: "https://i.example.net/novel-cover/300.jpg".into(),
            text_count: Some(5400),
            word_count: Some(1800),
            ..thumbnail("300", IllustType::Illustration, 1)
        };

        let record = normalizer.normalize(&meta, &thumb).await.expect("record");
        assert_eq!(record.kind(), WorkKind::Novel);
        let novel = record.novel().expect("novel variant");
        assert_eq!(novel.cover_url, "https://i.example.net/novel-cover/300.jpg");
        assert_eq!(novel.text_count, 5400);
        assert!(record.image().is_none());
    }

    #[tokio::test]
    async fn ranking_and_series_are_copied() {
        let config = NormalizeConfig::default();
        let mut ranks = std::collections::HashMap::new();
        ranks.insert("101".to_string(), RankInfo { rank: 4 });
        let normalizer = WorkNormalizer::new(&config, &NoAnimations, &ranks);
        let mut meta = metadata("101");
        meta.series_nav = Some(SeriesNav {
            series_id: "9".into(),
            title: "Trip".into(),
            order: 2,
        });
        meta.bookmark_data = Some(crate::types::BookmarkData {
            id: "555".into(),
            private: false,
        });

        let record = normalizer
            .normalize(&meta, &thumbnail("101", IllustType::Illustration, 1))
            .await
            .expect("record");
        assert_eq!(record.base.rank, Some(RankInfo { rank: 4 }));
        assert_eq!(record.base.series.as_ref().map(|s| s.order), Some(2));
        assert!(record.base.bookmarked);
        assert_eq!(record.base.bookmark_id.as_deref(), Some("555"));
    }

    #[tokio::test]
    async fn rejected_work_skips_secondary_fetch() {
        let config = NormalizeConfig::default();
        let animations = CountingAnimations::new(false);
        let normalizer = WorkNormalizer::new(&config, &animations, &NoRankings);
        let reject = FnFilter(|_: &AdmissionAttributes| false);

        let outcome = normalizer
            .admit_and_normalize(
                &metadata("101"),
                &thumbnail("101", IllustType::Animation, 1),
                &reject,
            )
            .await
            .expect("no error");
        assert!(outcome.is_none());
        assert_eq!(animations.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn filter_sees_derived_ai_type() {
        let config = NormalizeConfig::default();
        let normalizer = WorkNormalizer::new(&config, &NoAnimations, &NoRankings);
        let mut meta = metadata("101");
        meta.tags.push(TagEntry::new("NovelAI"));
        let only_ai = FnFilter(|attrs: &AdmissionAttributes| attrs.ai_type == Some(AiType::Yes));

        let record = normalizer
            .admit_and_normalize(&meta, &thumbnail("101", IllustType::Illustration, 1), &only_ai)
            .await
            .expect("no error")
            .expect("admitted");
        assert_eq!(record.base.ai_type, AiType::Yes);
        assert_eq!(&record.base.tags[..2], ["original", "AI-generated"]);

        let accepted = normalizer
            .admit_and_normalize(
                &metadata("101"),
                &thumbnail("101", IllustType::Illustration, 1),
                &AcceptAll,
            )
            .await
            .expect("no error");
        assert!(accepted.is_some());
    }
}
