use normalize::{AdmissionAttributes, FilterEngine};
use tracing::trace;

use crate::extract::Candidate;
use crate::store::ResultStore;

/// What the filter-and-append step did with one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    Accepted,
    Duplicate,
    Rejected,
}

/// Ask `filter` about `candidate` with id-only attributes and append it to
/// `store` when admitted.
pub(crate) async fn admit(
    filter: &dyn FilterEngine,
    store: &mut dyn ResultStore,
    candidate: Candidate,
) -> Admission {
    let attributes = AdmissionAttributes::id_only(candidate.id.clone());
    if !filter.check(&attributes).await {
        trace!(id = %candidate.id, "candidate_rejected");
        return Admission::Rejected;
    }
    if store.append_identifier(candidate.into()) {
        Admission::Accepted
    } else {
        Admission::Duplicate
    }
}

/// Running totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdmissionTally {
    /// Candidates shown to the filter.
    pub seen: usize,
    /// Newly stored ids.
    pub accepted: usize,
    /// Admitted but already stored.
    pub duplicates: usize,
    pub rejected: usize,
}

impl AdmissionTally {
    pub(crate) fn count(&mut self, admission: Admission) {
        self.seen += 1;
        match admission {
            Admission::Accepted => self.accepted += 1,
            Admission::Duplicate => self.duplicates += 1,
            Admission::Rejected => self.rejected += 1,
        }
    }
}
