use normalize::{FilterEngine, WorkKind};
use tracing::{debug, info, warn};

use crate::extract::{winner_links, Candidate};
use crate::gate::{admit, AdmissionTally};
use crate::store::ResultStore;

/// Result of a [`CollectionScan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// No matching element at all, usually because the collection has not
    /// been published yet. The store was not touched.
    Empty,
    Completed {
        /// Elements that matched the selector.
        matched: usize,
        /// Newly stored ids.
        accepted: usize,
        duplicates: usize,
    },
}

/// Single pass over an already rendered collection (a contest's winners
/// section), without pagination.
pub struct CollectionScan<F> {
    filter: F,
}

impl<F: FilterEngine> CollectionScan<F> {
    pub fn new(filter: F) -> Self {
        Self { filter }
    }

    /// Scan `html` for winner links of `kind` and admit each mapped id.
    pub async fn scan(
        &self,
        kind: WorkKind,
        html: &str,
        store: &mut dyn ResultStore,
    ) -> ScanOutcome {
        let links = winner_links(kind, html);
        if links.is_empty() {
            warn!(kind = %kind, "collection_scan_empty");
            return ScanOutcome::Empty;
        }

        let matched = links.len();
        let mut tally = AdmissionTally::default();
        for id in links {
            let Some(id) = id else {
                debug!(kind = %kind, "collection_link_without_id");
                continue;
            };
            let admission = admit(&self.filter, store, Candidate { kind, id }).await;
            tally.count(admission);
        }

        info!(
            kind = %kind,
            matched,
            accepted = tally.accepted,
            duplicates = tally.duplicates,
            "collection_scan_complete"
        );
        ScanOutcome::Completed {
            matched,
            accepted: tally.accepted,
            duplicates: tally.duplicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use normalize::{AcceptAll, AdmissionAttributes, FnFilter};

    use super::*;
    use crate::store::MemoryStore;

    const NOVEL_WINNERS: &str = r#"
        <div class="winner">
          <h3>Grand prize</h3>
          <a class="novel-title" href="/novel/show.php?id=321">Tale</a>
          <a class="novel-title" href="https://www.example.net/novel/show.php?id=654">Other</a>
          <a class="novel-title" href="/tags/fantasy">Tag link</a>
        </div>"#;

    #[tokio::test]
    async fn empty_collection_is_reported_and_store_untouched() {
        let scan = CollectionScan::new(AcceptAll);
        let mut store = MemoryStore::new();

        let outcome = scan
            .scan(WorkKind::Illust, "<main><p>Results soon</p></main>", &mut store)
            .await;

        assert_eq!(outcome, ScanOutcome::Empty);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn novel_winners_are_taken_from_links() {
        let scan = CollectionScan::new(AcceptAll);
        let mut store = MemoryStore::new();

        let outcome = scan.scan(WorkKind::Novel, NOVEL_WINNERS, &mut store).await;

        assert_eq!(
            outcome,
            ScanOutcome::Completed {
                matched: 3,
                accepted: 2,
                duplicates: 0
            }
        );
        let ids: Vec<&str> = store.id_list().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["321", "654"]);
    }

    #[tokio::test]
    async fn rejected_winners_are_not_stored() {
        let scan = CollectionScan::new(FnFilter(|attrs: &AdmissionAttributes| attrs.id != "321"));
        let mut store = MemoryStore::new();

        scan.scan(WorkKind::Novel, NOVEL_WINNERS, &mut store).await;

        assert!(!store.contains_identifier(WorkKind::Novel, "321"));
        assert!(store.contains_identifier(WorkKind::Novel, "654"));
    }
}
