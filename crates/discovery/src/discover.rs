use normalize::{FilterEngine, WorkKind};
use tracing::{error, info, info_span, Instrument};

use crate::error::DiscoveryError;
use crate::extract::extract_candidates;
use crate::gate::{admit, AdmissionTally};
use crate::page::{ContestOrder, UpstreamPageSource};
use crate::store::ResultStore;

/// How many pages one run may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBudget {
    Unlimited,
    /// At most this many pages. Zero is not a valid budget.
    Limited(u32),
}

impl PageBudget {
    /// `-1` is unlimited, positive values are a page count.
    pub fn from_crawl_number(value: i64) -> Result<Self, DiscoveryError> {
        match value {
            -1 => Ok(PageBudget::Unlimited),
            n if n > 0 && n <= i64::from(u32::MAX) => Ok(PageBudget::Limited(n as u32)),
            other => Err(DiscoveryError::InvalidPageBudget(other)),
        }
    }

    fn validate(self) -> Result<Self, DiscoveryError> {
        match self {
            PageBudget::Limited(0) => Err(DiscoveryError::InvalidPageBudget(0)),
            budget => Ok(budget),
        }
    }

    /// Whether `page` (1-based) would be past the budget.
    fn exceeded_by(self, page: u32) -> bool {
        match self {
            PageBudget::Unlimited => false,
            PageBudget::Limited(limit) => page > limit,
        }
    }
}

/// Why a discovery run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The page budget was used up.
    BudgetExhausted,
    /// Upstream returned no continuation token.
    EndOfData,
    /// Upstream failed on `page`; earlier pages' ids stay stored.
    UpstreamError { page: u32, message: String },
}

/// Summary of one [`PageDiscoveryLoop::discover`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Pages whose candidates were processed.
    pub pages_processed: u32,
    pub candidates_seen: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub termination: Termination,
}

/// Walks a paged source from page 1, gating every candidate through a
/// [`FilterEngine`] and appending admitted ids to a [`ResultStore`].
///
/// Candidates are checked one at a time in page order, so stateful filters
/// see them in the order upstream listed them.
pub struct PageDiscoveryLoop<P, F> {
    source: P,
    filter: F,
    budget: PageBudget,
}

impl<P: UpstreamPageSource, F: FilterEngine> PageDiscoveryLoop<P, F> {
    pub fn new(source: P, filter: F, budget: PageBudget) -> Self {
        Self {
            source,
            filter,
            budget,
        }
    }

    pub fn budget(&self) -> PageBudget {
        self.budget
    }

    /// Run discovery for one collection.
    ///
    /// Upstream failures end the run and are reported in
    /// [`DiscoveryReport::termination`]; `Err` is only returned for
    /// configuration problems caught before the first request.
    pub async fn discover(
        &self,
        kind: WorkKind,
        collection: &str,
        order: ContestOrder,
        store: &mut dyn ResultStore,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        let budget = self.budget.validate()?;
        if collection.trim().is_empty() {
            return Err(DiscoveryError::EmptyCollection);
        }

        let span = info_span!("discovery.discover", kind = ?kind, collection, order = %order);
        let report = self.run(kind, collection, order, budget, store).instrument(span).await;
        Ok(report)
    }

    async fn run(
        &self,
        kind: WorkKind,
        collection: &str,
        order: ContestOrder,
        budget: PageBudget,
        store: &mut dyn ResultStore,
    ) -> DiscoveryReport {
        let mut tally = AdmissionTally::default();
        let mut page: u32 = 1;

        let termination = loop {
            let body = match self.source.get_page(kind, collection, page, order).await {
                Ok(response) => response.into_body(),
                Err(err) => Err(err.to_string()),
            };
            let body = match body {
                Ok(body) => body,
                Err(message) => {
                    error!(page, error = %message, "discovery_upstream_error");
                    break Termination::UpstreamError { page, message };
                }
            };

            let candidates = extract_candidates(kind, &body.html);
            let found = candidates.len();
            let accepted_before = tally.accepted;
            for candidate in candidates {
                let admission = admit(&self.filter, store, candidate).await;
                tally.count(admission);
            }
            info!(
                page,
                candidates = found,
                accepted = tally.accepted - accepted_before,
                "discovery_page"
            );

            if budget.exceeded_by(page.saturating_add(1)) {
                break Termination::BudgetExhausted;
            }
            if body.next_url.is_none() {
                break Termination::EndOfData;
            }
            page += 1;
        };

        let pages_processed = match termination {
            Termination::UpstreamError { page, .. } => page - 1,
            _ => page,
        };
        info!(
            pages = pages_processed,
            accepted = tally.accepted,
            duplicates = tally.duplicates,
            rejected = tally.rejected,
            termination = ?termination,
            "discovery_complete"
        );

        DiscoveryReport {
            pages_processed,
            candidates_seen: tally.seen,
            accepted: tally.accepted,
            duplicates: tally.duplicates,
            termination,
        }
    }
}
