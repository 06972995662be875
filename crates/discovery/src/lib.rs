//! Candidate discovery for workcrawl.
//!
//! Two ways to find works in a collection:
//!
//! - [`PageDiscoveryLoop`] walks a paged upstream listing from page 1 until
//!   the [`PageBudget`] is spent, upstream stops returning a continuation, or
//!   a page fails;
//! - [`CollectionScan`] reads an already rendered winners section once.
//!
//! Both gate every candidate through a [`normalize::FilterEngine`] and append
//! admitted ids to a [`ResultStore`], in upstream order and without
//! duplicates.
//!
//! ```rust,no_run
//! use discovery::{ContestOrder, MemoryStore, PageBudget, PageDiscoveryLoop, UpstreamPageSource};
//! use normalize::{AcceptAll, WorkKind};
//!
//! # async fn run(source: impl UpstreamPageSource) -> Result<(), discovery::DiscoveryError> {
//! let discovery = PageDiscoveryLoop::new(source, AcceptAll, PageBudget::Limited(5));
//! let mut store = MemoryStore::new();
//! let report = discovery
//!     .discover(WorkKind::Illust, "spring", ContestOrder::DateDesc, &mut store)
//!     .await?;
//! println!("{} pages, {} ids", report.pages_processed, report.accepted);
//! # Ok(())
//! # }
//! ```

mod config;
mod discover;
mod error;
mod extract;
mod gate;
mod page;
mod scan;
mod store;

pub use crate::config::{ConfigError, DiscoveryConfig};
pub use crate::discover::{DiscoveryReport, PageBudget, PageDiscoveryLoop, Termination};
pub use crate::error::{DiscoveryError, PageSourceError};
pub use crate::extract::{extract_candidates, novel_id_from_href, Candidate};
pub use crate::gate::AdmissionTally;
pub use crate::page::{
    ContestOrder, HttpPageSource, PageBody, PageResponse, UpstreamPageSource,
    DEFAULT_ENTRIES_TEMPLATE,
};
pub use crate::scan::{CollectionScan, ScanOutcome};
pub use crate::store::{IdEntry, MemoryStore, ResultStore};
