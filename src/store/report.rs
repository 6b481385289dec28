//! Ingestion outcome reports

use serde::Serialize;

/// Why a record was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing or malformed fields
    Validation,
    /// Valid, but its id is already taken
    DuplicateId,
}

/// One rejected record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestFailure {
    /// Position of the record in the submitted batch
    pub index: usize,
    /// The record's id, when it had one
    pub id: Option<String>,
    pub kind: FailureKind,
    pub reasons: Vec<String>,
}

/// Result of a bulk ingest: what went in and everything that did not
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Ids inserted, in batch order
    pub inserted_ids: Vec<String>,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    /// True when every record was inserted
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn inserted(&self) -> usize {
        self.inserted_ids.len()
    }
}

/// Result of reconciling the live collection with a fresh load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub inserted_ids: Vec<String>,
    pub replaced_ids: Vec<String>,
    pub removed_ids: Vec<String>,
    pub unchanged: usize,
    pub failures: Vec<IngestFailure>,
}

impl SyncReport {
    /// True when the load changed nothing
    pub fn is_noop(&self) -> bool {
        self.inserted_ids.is_empty() && self.replaced_ids.is_empty() && self.removed_ids.is_empty()
    }
}
