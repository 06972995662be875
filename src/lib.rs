//! Workspace umbrella crate for workcrawl.
//!
//! Stitches the stage crates together behind one [`Crawler`]:
//!
//! - [`discovery`] finds work ids in paged contest listings or a rendered
//!   winners section and gates them through a [`FilterEngine`];
//! - [`normalize`] turns a work's metadata and thumbnail views into one
//!   [`Record`];
//! - [`fetch`] pulls secondary resources with a bounded retry budget.
//!
//! ```rust,no_run
//! use workcrawl::{AcceptAll, ContestTarget, Crawler, MemoryStore, WorkcrawlConfig};
//!
//! # async fn run() -> Result<(), workcrawl::PipelineError> {
//! let config = WorkcrawlConfig::default();
//! let crawler = Crawler::from_config(&config)?;
//! let source = crawler.page_source(config.http_transport()?);
//! let target = ContestTarget::from_path("/contest/starseed").expect("contest path");
//!
//! let mut store = MemoryStore::new();
//! let report = crawler
//!     .discover_contest(source, AcceptAll, &target, &mut store)
//!     .await?;
//! println!("{} ids over {} pages", report.accepted, report.pages_processed);
//! # Ok(())
//! # }
//! ```

mod config;
mod crawler;
mod dashboard;
mod error;
mod guard;
mod sources;

pub use crate::config::{ConfigLoadError, FetchYamlConfig, OutputYamlConfig, WorkcrawlConfig};
pub use crate::crawler::{ContestTarget, CoverReport, Crawler, SaveReport};
pub use crate::dashboard::{
    DashboardPayload, DashboardRating, DashboardRow, DashboardThumbnail, DashboardThumbnails,
    DashboardWork, DashboardWorks, ExportScope, pair_views,
};
pub use crate::error::PipelineError;
pub use crate::guard::{RunGuard, RunTicket};
pub use crate::sources::FetcherAnimationSource;

pub use discovery::{
    CollectionScan, ContestOrder, DiscoveryConfig, DiscoveryReport, HttpPageSource, IdEntry,
    MemoryStore, PageBudget, PageDiscoveryLoop, PageResponse, ResultStore, ScanOutcome,
    Termination, UpstreamPageSource,
};
pub use fetch::{
    BlobHandle, ConflictAction, CoverDownloader, CoverOutcome, DecodeMode, FetchOutcome, Fetched,
    HttpTransport, OutputHandoff, ResourceTransport, RetryPolicy, RetryingFetcher,
};
pub use normalize::{
    AcceptAll, AcceptFirst, AdmissionAttributes, AiType, AnimationSource, FilterEngine, FnFilter,
    IllustType, NormalizeConfig, NormalizeError, Record, ThumbnailView, WorkKind, WorkMetadata,
    WorkNormalizer, WorkVariant,
};
