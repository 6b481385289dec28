//! Collection store - the single owner of all posts
//!
//! Committed state is an immutable [`Snapshot`]. Mutations are serialized by a
//! writer lock: the writer copies the current snapshot, applies the change to
//! the post table and every index, verifies the result, then swaps it in.
//! Readers only clone an `Arc`, so they see either the old or the new
//! snapshot, never a half-applied one.

mod guard;
mod report;
mod snapshot;

pub use report::{FailureKind, IngestFailure, IngestReport, SyncReport};
pub use snapshot::Snapshot;

use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::CollectionConfig;
use crate::content::{Post, RawRecord};
use crate::error::{CollectionError, Result};
use crate::query::{Page, QuerySpec};

/// In-memory, indexed collection of posts
pub struct CollectionStore {
    config: CollectionConfig,
    current: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
    halted: AtomicBool,
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionStore {
    /// Create an empty store with default tag normalization
    pub fn new() -> Self {
        Self::with_config(CollectionConfig::default())
    }

    /// Create an empty store that validates records with `config`
    pub fn with_config(config: CollectionConfig) -> Self {
        Self {
            config,
            current: RwLock::new(Arc::new(Snapshot::default())),
            writer: Mutex::new(()),
            halted: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// The latest committed snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    /// Whether a consistency failure has stopped all further mutation
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Validate and insert a batch. Valid records go in even when others fail;
    /// the report lists every rejected record with all of its reasons.
    ///
    /// Only errors that stop the store itself are returned as `Err`.
    pub fn ingest(&self, records: &[RawRecord]) -> Result<IngestReport> {
        let report = self.mutate(|next| {
            let screened = guard::screen(records, &self.config, |id| next.contains(id));
            let mut report = IngestReport {
                inserted_ids: Vec::with_capacity(screened.accepted.len()),
                failures: screened.failures,
            };
            for (_, post) in screened.accepted {
                tracing::debug!("Inserting post {}", post.id);
                report.inserted_ids.push(post.id.clone());
                next.insert_post(post);
            }
            Ok(report)
        })?;

        tracing::info!(
            "Ingested {} of {} record(s), {} rejected",
            report.inserted(),
            records.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Insert a single record, rejecting an id that is already present
    pub fn insert(&self, record: &RawRecord) -> Result<Arc<Post>> {
        self.mutate(|next| {
            let post = record.validate_with(&self.config)?;
            if next.contains(&post.id) {
                return Err(CollectionError::DuplicateId(post.id));
            }
            Ok(next.insert_post(post))
        })
    }

    /// Remove a post and retract its index entries
    pub fn remove(&self, id: &str) -> Result<Arc<Post>> {
        let removed = self.mutate(|next| {
            next.remove_post(id)
                .ok_or_else(|| CollectionError::NotFound(id.to_string()))
        })?;
        tracing::debug!("Removed post {}", id);
        Ok(removed)
    }

    /// Edit a post: retract the old version and insert the new one under the
    /// same id in one step. If the replacement is invalid, the old post stays.
    pub fn replace(&self, id: &str, record: &RawRecord) -> Result<Arc<Post>> {
        self.mutate(|next| {
            if !next.contains(id) {
                return Err(CollectionError::NotFound(id.to_string()));
            }
            let post = record.validate_with(&self.config)?;
            if post.id != id {
                return Err(CollectionError::Validation {
                    id: post.id.clone(),
                    reasons: vec![format!(
                        "id '{}' does not match the replaced post '{}'",
                        post.id, id
                    )],
                });
            }
            next.remove_post(id);
            Ok(next.insert_post(post))
        })
    }

    /// Rebuild every index from the post table
    pub fn rebuild_all(&self) -> Result<()> {
        self.mutate(|next| {
            next.rebuild_indices();
            Ok(())
        })?;
        tracing::debug!("Rebuilt indices");
        Ok(())
    }

    /// Reconcile the collection with a complete fresh load: new ids are
    /// inserted, changed posts replaced, and ids absent from the load removed.
    /// A record that fails validation keeps its previous version in place.
    pub fn sync(&self, records: &[RawRecord]) -> Result<SyncReport> {
        self.reconcile(records, true)
    }

    /// Like [`sync`](Self::sync), for a load known to be incomplete (some
    /// source failed to read): posts missing from `records` are kept.
    pub fn merge(&self, records: &[RawRecord]) -> Result<SyncReport> {
        self.reconcile(records, false)
    }

    fn reconcile(&self, records: &[RawRecord], retract_missing: bool) -> Result<SyncReport> {
        let report = self.mutate(|next| {
            let screened = guard::screen(records, &self.config, |_| false);
            let mentioned: HashSet<&str> = records.iter().filter_map(RawRecord::id).collect();

            let mut report = SyncReport {
                failures: screened.failures,
                ..Default::default()
            };

            if retract_missing {
                let stale: Vec<String> = next
                    .posts()
                    .filter(|p| !mentioned.contains(p.id.as_str()))
                    .map(|p| p.id.clone())
                    .collect();
                for id in stale {
                    next.remove_post(&id);
                    report.removed_ids.push(id);
                }
            }

            for (_, post) in screened.accepted {
                match next.get(&post.id) {
                    Some(existing) if *existing == post => report.unchanged += 1,
                    Some(_) => {
                        next.remove_post(&post.id);
                        report.replaced_ids.push(post.id.clone());
                        next.insert_post(post);
                    }
                    None => {
                        report.inserted_ids.push(post.id.clone());
                        next.insert_post(post);
                    }
                }
            }
            Ok(report)
        })?;

        tracing::info!(
            "Synced: {} inserted, {} replaced, {} removed, {} unchanged, {} rejected",
            report.inserted_ids.len(),
            report.replaced_ids.len(),
            report.removed_ids.len(),
            report.unchanged,
            report.failures.len()
        );
        Ok(report)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Post>> {
        self.snapshot().get(id)
    }

    /// All posts in insertion order
    pub fn all(&self) -> Vec<Arc<Post>> {
        self.snapshot().all()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<Arc<Post>> {
        self.snapshot().find_by_slug(slug)
    }

    /// Run a query; tag filters go through this store's tag normalization
    pub fn query(&self, spec: &QuerySpec) -> Vec<Arc<Post>> {
        self.query_page(spec).items
    }

    pub fn query_page(&self, spec: &QuerySpec) -> Page {
        let spec = self.normalize(spec);
        self.snapshot().query_page(&spec)
    }

    pub fn neighbors(&self, id: &str) -> Option<(Option<Arc<Post>>, Option<Arc<Post>>)> {
        self.snapshot().neighbors(id)
    }

    pub fn related(&self, id: &str, limit: usize) -> Vec<Arc<Post>> {
        self.snapshot().related(id, limit)
    }

    fn normalize(&self, spec: &QuerySpec) -> QuerySpec {
        let mut spec = spec.clone();
        if let Some(tag) = spec.tag.take() {
            // A blank tag can match nothing; keep it so the result is empty
            spec.tag = Some(self.config.normalize_tag(&tag).unwrap_or(tag));
        }
        spec
    }

    /// The single mutation path. `apply` works on a private copy; the copy is
    /// published only if `apply` succeeds and the indices still agree with the
    /// post table. A disagreement halts the store.
    fn mutate<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Snapshot) -> Result<T>,
    {
        let _writer = self.writer.lock();
        if self.is_halted() {
            return Err(CollectionError::Halted);
        }

        let mut next: Snapshot = (**self.current.read()).clone();
        let out = apply(&mut next)?;

        if let Err(e) = next.verify() {
            self.halted.store(true, Ordering::SeqCst);
            tracing::error!("{}; refusing further mutations", e);
            return Err(e);
        }

        *self.current.write() = Arc::new(next);
        Ok(out)
    }
}
