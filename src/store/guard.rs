//! Batch screening at the ingest boundary
//!
//! Every record in a batch is judged before anything is committed: field
//! validation first, then id uniqueness against the collection and against
//! earlier records of the same batch. The first record to carry an id claims
//! it, whether or not that record is valid.

use std::collections::HashSet;

use super::report::{FailureKind, IngestFailure};
use crate::config::CollectionConfig;
use crate::content::{Post, RawRecord};

/// Outcome of screening one batch
#[derive(Debug, Default)]
pub(crate) struct Screened {
    /// Valid posts with their batch positions, in batch order
    pub accepted: Vec<(usize, Post)>,
    pub failures: Vec<IngestFailure>,
}

/// Judge each record of a batch. `is_taken` reports ids already in the collection.
pub(crate) fn screen<F>(records: &[RawRecord], config: &CollectionConfig, is_taken: F) -> Screened
where
    F: Fn(&str) -> bool,
{
    let mut screened = Screened::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        let validated = record.validate_with(config);
        let id = record.id().map(str::to_string);

        let duplicate = id.as_deref().and_then(|id| {
            if seen.contains(id) {
                Some(format!("duplicate id '{}' appears earlier in this batch", id))
            } else if is_taken(id) {
                Some(format!("duplicate id '{}' already exists in the collection", id))
            } else {
                None
            }
        });

        if let Some(id) = &id {
            seen.insert(id.clone());
        }

        match (validated, duplicate) {
            (Ok(post), None) => {
                screened.accepted.push((index, post));
            }
            (Ok(_), Some(reason)) => {
                tracing::warn!("Rejected record #{}: {}", index, reason);
                screened.failures.push(IngestFailure {
                    index,
                    id,
                    kind: FailureKind::DuplicateId,
                    reasons: vec![reason],
                });
            }
            (Err(failure), duplicate) => {
                let mut reasons = failure.reasons;
                reasons.extend(duplicate);
                tracing::warn!("Rejected record #{}: {}", index, reasons.join("; "));
                screened.failures.push(IngestFailure {
                    index,
                    id,
                    kind: FailureKind::Validation,
                    reasons,
                });
            }
        }
    }

    screened
}
