//! Append-only result set of a crawl.

use std::collections::{HashMap, HashSet};

use normalize::{RankInfo, RankingLookup, Record, WorkKind};
use serde::{Deserialize, Serialize};

use crate::extract::Candidate;

/// An admitted work id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdEntry {
    pub kind: WorkKind,
    pub id: String,
}

impl IdEntry {
    pub fn new(kind: WorkKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    /// `illusts` or `novels`.
    pub fn list_type(&self) -> &'static str {
        self.kind.list_type()
    }
}

impl From<Candidate> for IdEntry {
    fn from(candidate: Candidate) -> Self {
        Self {
            kind: candidate.kind,
            id: candidate.id,
        }
    }
}

/// Ordered, append-only store of admitted ids and normalized records.
///
/// Both lists are keyed by `(kind, id)` and silently ignore repeats. One
/// writer per run.
pub trait ResultStore: RankingLookup {
    /// Append an admitted id. Returns `false` if it was already present.
    fn append_identifier(&mut self, entry: IdEntry) -> bool;

    /// Append a record. Returns `false` if one with the same kind and id exists.
    fn append_record(&mut self, record: Record) -> bool;

    fn id_list(&self) -> &[IdEntry];

    fn records(&self) -> &[Record];

    fn contains_identifier(&self, kind: WorkKind, id: &str) -> bool {
        self.id_list().iter().any(|entry| entry.kind == kind && entry.id == id)
    }
}

/// In-memory [`ResultStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    ids: Vec<IdEntry>,
    id_keys: HashSet<(WorkKind, String)>,
    records: Vec<Record>,
    record_keys: HashSet<(WorkKind, String)>,
    rankings: HashMap<String, RankInfo>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a work's ranking slot for later normalization.
    pub fn record_ranking(&mut self, id: impl Into<String>, rank: u32) {
        self.rankings.insert(id.into(), RankInfo { rank });
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.records.is_empty()
    }
}

impl RankingLookup for MemoryStore {
    fn ranking(&self, id: &str) -> Option<RankInfo> {
        self.rankings.get(id).copied()
    }
}

impl ResultStore for MemoryStore {
    fn append_identifier(&mut self, entry: IdEntry) -> bool {
        if !self.id_keys.insert((entry.kind, entry.id.clone())) {
            return false;
        }
        self.ids.push(entry);
        true
    }

    fn append_record(&mut self, record: Record) -> bool {
        if !self.record_keys.insert((record.kind(), record.id().to_string())) {
            return false;
        }
        self.records.push(record);
        true
    }

    fn id_list(&self) -> &[IdEntry] {
        &self.ids
    }

    fn records(&self) -> &[Record] {
        &self.records
    }

    fn contains_identifier(&self, kind: WorkKind, id: &str) -> bool {
        self.id_keys.contains(&(kind, id.to_string()))
    }
}
