//! Run orchestration over the stage crates.

use discovery::{
    CollectionScan, DiscoveryConfig, DiscoveryReport, HttpPageSource, PageDiscoveryLoop,
    ResultStore, ScanOutcome, UpstreamPageSource,
};
use fetch::{CoverDownloader, CoverOutcome, OutputHandoff, ResourceTransport};
use normalize::{
    AnimationSource, FilterEngine, NormalizeConfig, NormalizeError, Record, ThumbnailView,
    WorkKind, WorkMetadata, WorkNormalizer,
};
use tracing::{Instrument, info, info_span, warn};

use crate::config::{ConfigLoadError, WorkcrawlConfig};
use crate::dashboard::{DashboardPayload, DashboardRow, ExportScope, pair_views};
use crate::error::PipelineError;
use crate::guard::RunGuard;

/// A contest addressed by its page path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestTarget {
    pub kind: WorkKind,
    pub name: String,
}

impl ContestTarget {
    /// `/contest/<name>` is an image contest, `/novel/contest/<name>` a
    /// novel one. Anything after the name is ignored.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        let kind = if path.contains("/novel/") {
            WorkKind::Novel
        } else {
            WorkKind::Illust
        };
        segments.find(|segment| *segment == "contest")?;
        let name = segments.next()?;
        Some(Self {
            kind,
            name: name.to_string(),
        })
    }
}

/// Outcome of [`Crawler::save_works`].
///
/// Works with no usable image URL are skipped and listed by id; every other
/// normalization failure is kept whole in `failures`.
#[derive(Debug, Default)]
pub struct SaveReport {
    pub saved: usize,
    pub rejected: usize,
    /// Records already in the store.
    pub duplicates: usize,
    pub skipped: Vec<String>,
    pub failures: Vec<NormalizeError>,
}

/// Outcome of [`Crawler::download_covers`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CoverReport {
    pub delivered: Vec<String>,
    /// Ids of novels whose cover could not be fetched.
    pub unavailable: Vec<String>,
}

/// Entry point for discovery, normalization and export runs.
///
/// Every operation claims the crawler's [`RunGuard`] for its duration, so
/// overlapping runs fail fast with [`PipelineError::ConcurrentRunRejected`].
#[derive(Debug, Clone)]
pub struct Crawler {
    normalize: NormalizeConfig,
    discovery: DiscoveryConfig,
    guard: RunGuard,
}

impl Crawler {
    pub fn new(
        normalize: NormalizeConfig,
        discovery: DiscoveryConfig,
    ) -> Result<Self, PipelineError> {
        normalize.validate().map_err(ConfigLoadError::from)?;
        discovery.validate().map_err(ConfigLoadError::from)?;
        Ok(Self {
            normalize,
            discovery,
            guard: RunGuard::new(),
        })
    }

    pub fn from_config(config: &WorkcrawlConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Self::new(config.normalize.clone(), config.discovery.clone())
    }

    /// Share a guard with other crawlers so they exclude each other too.
    pub fn with_guard(mut self, guard: RunGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn guard(&self) -> &RunGuard {
        &self.guard
    }

    pub fn normalize_config(&self) -> &NormalizeConfig {
        &self.normalize
    }

    pub fn discovery_config(&self) -> &DiscoveryConfig {
        &self.discovery
    }

    /// Page source for the configured origin and entries template.
    pub fn page_source<T: ResourceTransport>(&self, transport: T) -> HttpPageSource<T> {
        HttpPageSource::new(transport, self.discovery.origin.clone())
            .with_template(self.discovery.entries_template.clone())
    }

    /// Collect contest entry ids page by page into `store`.
    pub async fn discover_contest<P, F>(
        &self,
        source: P,
        filter: F,
        target: &ContestTarget,
        store: &mut dyn ResultStore,
    ) -> Result<DiscoveryReport, PipelineError>
    where
        P: UpstreamPageSource,
        F: FilterEngine,
    {
        let _ticket = self.guard.try_begin()?;
        let budget = self.discovery.page_budget()?;
        let discovery = PageDiscoveryLoop::new(source, filter, budget);
        let report = discovery
            .discover(target.kind, &target.name, self.discovery.order, store)
            .await?;
        Ok(report)
    }

    /// Collect winner ids from a rendered contest page into `store`.
    pub async fn scan_winners<F: FilterEngine>(
        &self,
        filter: F,
        kind: WorkKind,
        html: &str,
        store: &mut dyn ResultStore,
    ) -> Result<ScanOutcome, PipelineError> {
        let _ticket = self.guard.try_begin()?;
        let scan = CollectionScan::new(filter);
        Ok(scan.scan(kind, html, store).await)
    }

    /// Normalize fetched metadata/thumbnail pairs and append the admitted
    /// records to `store`, in input order.
    pub async fn save_works<S, I>(
        &self,
        pairs: I,
        animation: &dyn AnimationSource,
        filter: &dyn FilterEngine,
        store: &mut S,
    ) -> Result<SaveReport, PipelineError>
    where
        S: ResultStore,
        I: IntoIterator<Item = (WorkMetadata, ThumbnailView)>,
    {
        let _ticket = self.guard.try_begin()?;
        let span = info_span!("crawler.save_works");
        let report = self
            .save_all(pairs, animation, filter, store)
            .instrument(span)
            .await;
        Ok(report)
    }

    async fn save_all<S, I>(
        &self,
        pairs: I,
        animation: &dyn AnimationSource,
        filter: &dyn FilterEngine,
        store: &mut S,
    ) -> SaveReport
    where
        S: ResultStore,
        I: IntoIterator<Item = (WorkMetadata, ThumbnailView)>,
    {
        let mut report = SaveReport::default();
        for (meta, thumb) in pairs {
            let result = {
                let normalizer = WorkNormalizer::new(&self.normalize, animation, &*store);
                normalizer.admit_and_normalize(&meta, &thumb, filter).await
            };
            match result {
                Ok(Some(record)) => {
                    if store.append_record(record) {
                        report.saved += 1;
                    } else {
                        report.duplicates += 1;
                    }
                }
                Ok(None) => report.rejected += 1,
                Err(err) if err.is_skippable() => {
                    warn!(id = %err.identifier(), "save_skipped");
                    report.skipped.push(err.identifier().to_string());
                }
                Err(err) => report.failures.push(err),
            }
        }
        info!(
            saved = report.saved,
            rejected = report.rejected,
            duplicates = report.duplicates,
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "save_complete"
        );
        report
    }

    /// Download the cover of every novel record through `downloader`.
    /// `file_name` names the saved novel a cover sits next to.
    pub async fn download_covers<T, H, N>(
        &self,
        downloader: &CoverDownloader<T, H>,
        records: &[Record],
        file_name: N,
    ) -> Result<CoverReport, PipelineError>
    where
        T: ResourceTransport,
        H: OutputHandoff,
        N: Fn(&Record) -> String,
    {
        let _ticket = self.guard.try_begin()?;
        let mut report = CoverReport::default();
        for record in records {
            let Some(novel) = record.novel() else {
                continue;
            };
            if novel.cover_url.is_empty() {
                continue;
            }
            match downloader.download(&novel.cover_url, &file_name(record)).await {
                CoverOutcome::Delivered { file_name } => report.delivered.push(file_name),
                CoverOutcome::Unavailable => report.unavailable.push(record.id().to_string()),
            }
        }
        Ok(report)
    }

    /// Pair dashboard statistics with their listing views and keep the rows
    /// in `scope`.
    pub fn export_dashboard(
        &self,
        payloads: &[DashboardPayload],
        scope: ExportScope,
    ) -> Result<Vec<DashboardRow>, PipelineError> {
        let _ticket = self.guard.try_begin()?;
        let rows: Vec<DashboardRow> = payloads
            .iter()
            .flat_map(|payload| pair_views(&payload.data.works, &payload.thumbnails))
            .filter(|row| scope.includes(row))
            .collect();
        if rows.is_empty() {
            warn!(scope = %scope, "dashboard_export_empty");
        } else {
            info!(scope = %scope, rows = rows.len(), "dashboard_export");
        }
        Ok(rows)
    }
}
