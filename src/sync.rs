//! Incremental synchronization of a subject's graph with the triple store.
//!
//! The baseline is the graph last pushed for a subject. A run computes the
//! delta against it, removes stale facts, adds new ones, and only then
//! advances the baseline. A failure at any step leaves the old baseline in
//! place, so the next run recomputes and re-sends the same change; both
//! operations are idempotent on the store side.

use crate::error::{SyncError, SyncResult};
use crate::graph::{Graph, GraphDelta};
use crate::store::{SnapshotStore, TripleStore};

pub struct SyncEngine<'a> {
    remote: &'a dyn TripleStore,
    snapshots: &'a dyn SnapshotStore,
}

impl<'a> SyncEngine<'a> {
    pub fn new(remote: &'a dyn TripleStore, snapshots: &'a dyn SnapshotStore) -> Self {
        Self { remote, snapshots }
    }

    fn baseline(&self, key: &str) -> SyncResult<Graph> {
        let previous = self
            .snapshots
            .load(key)
            .map_err(|source| SyncError::LoadBaseline {
                key: key.to_string(),
                source,
            })?;
        Ok(previous.unwrap_or_default())
    }

    /// The delta `sync` would apply, without applying it.
    pub fn plan(&self, key: &str, next: &Graph) -> SyncResult<GraphDelta> {
        Ok(GraphDelta::compute(&self.baseline(key)?, next))
    }

    /// Bring the store in line with `next` and record it as the baseline.
    pub fn sync(&self, key: &str, next: &Graph) -> SyncResult<GraphDelta> {
        let delta = self.plan(key, next)?;
        tracing::info!(
            key,
            added = delta.additions.len(),
            deleted = delta.deletions.len(),
            "syncing subject"
        );

        self.remote
            .delete(&delta.deletions)
            .map_err(|source| SyncError::Delete {
                key: key.to_string(),
                count: delta.deletions.len(),
                source,
            })?;
        self.remote
            .insert(&delta.additions)
            .map_err(|source| SyncError::Insert {
                key: key.to_string(),
                count: delta.additions.len(),
                source,
            })?;
        self.snapshots
            .save(key, next)
            .map_err(|source| SyncError::SaveBaseline {
                key: key.to_string(),
                source,
            })?;
        Ok(delta)
    }
}

impl std::fmt::Debug for SyncEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::error::{StoreError, StoreResult};
    use crate::graph::{Iri, Literal};
    use crate::store::MemorySnapshotStore;
    use crate::vocab::rdfs;

    /// Records every call; inserts fail while `fail_insert` is set.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(&'static str, usize)>>,
        fail_insert: AtomicBool,
    }

    impl TripleStore for Recorder {
        fn insert(&self, facts: &Graph) -> StoreResult<()> {
            self.calls.lock().unwrap().push(("insert", facts.len()));
            if self.fail_insert.load(Ordering::SeqCst) {
                return Err(StoreError::Remote {
                    endpoint: "test".into(),
                    message: "HTTP 500".into(),
                });
            }
            Ok(())
        }

        fn delete(&self, facts: &Graph) -> StoreResult<()> {
            self.calls.lock().unwrap().push(("delete", facts.len()));
            Ok(())
        }
    }

    fn labels(values: &[&str]) -> Graph {
        let mut g = Graph::new();
        let s = Iri::from("http://x/s");
        for v in values {
            g.add(&s, rdfs::LABEL, Literal::plain(*v));
        }
        g
    }

    #[test]
    fn first_sync_adds_everything() {
        let remote = Recorder::default();
        let snapshots = MemorySnapshotStore::new();
        let engine = SyncEngine::new(&remote, &snapshots);

        let delta = engine.sync("k", &labels(&["a", "b"])).unwrap();
        assert_eq!(delta.additions.len(), 2);
        assert!(delta.deletions.is_empty());
        assert_eq!(snapshots.load("k").unwrap(), Some(labels(&["a", "b"])));
        assert_eq!(*remote.calls.lock().unwrap(), vec![("delete", 0), ("insert", 2)]);
    }

    #[test]
    fn second_identical_sync_is_empty() {
        let remote = Recorder::default();
        let snapshots = MemorySnapshotStore::new();
        let engine = SyncEngine::new(&remote, &snapshots);

        engine.sync("k", &labels(&["a"])).unwrap();
        assert!(engine.sync("k", &labels(&["a"])).unwrap().is_empty());
    }

    #[test]
    fn deletes_before_inserts() {
        let remote = Recorder::default();
        let snapshots = MemorySnapshotStore::new();
        let engine = SyncEngine::new(&remote, &snapshots);

        engine.sync("k", &labels(&["a", "b"])).unwrap();
        remote.calls.lock().unwrap().clear();
        let delta = engine.sync("k", &labels(&["a", "c"])).unwrap();
        assert_eq!(delta.deletions, labels(&["b"]));
        assert_eq!(delta.additions, labels(&["c"]));
        assert_eq!(*remote.calls.lock().unwrap(), vec![("delete", 1), ("insert", 1)]);
    }

    #[test]
    fn failed_insert_keeps_baseline() {
        let remote = Recorder::default();
        let snapshots = MemorySnapshotStore::new();
        let engine = SyncEngine::new(&remote, &snapshots);
        engine.sync("k", &labels(&["a", "b"])).unwrap();

        remote.fail_insert.store(true, Ordering::SeqCst);
        let err = engine.sync("k", &labels(&["a", "c"])).unwrap_err();
        assert!(matches!(err, SyncError::Insert { count: 1, .. }));
        assert_eq!(snapshots.load("k").unwrap(), Some(labels(&["a", "b"])));

        // The retry recomputes the same delta.
        remote.fail_insert.store(false, Ordering::SeqCst);
        let delta = engine.sync("k", &labels(&["a", "c"])).unwrap();
        assert_eq!(delta.deletions, labels(&["b"]));
        assert_eq!(delta.additions, labels(&["c"]));
    }

    #[test]
    fn plan_does_not_apply() {
        let remote = Recorder::default();
        let snapshots = MemorySnapshotStore::new();
        let engine = SyncEngine::new(&remote, &snapshots);

        let delta = engine.plan("k", &labels(&["a"])).unwrap();
        assert_eq!(delta.additions.len(), 1);
        assert!(remote.calls.lock().unwrap().is_empty());
        assert!(snapshots.is_empty());
    }

    #[test]
    fn subjects_are_isolated() {
        let remote = Recorder::default();
        let snapshots = MemorySnapshotStore::new();
        let engine = SyncEngine::new(&remote, &snapshots);

        engine.sync("one", &labels(&["a"])).unwrap();
        let delta = engine.sync("two", &labels(&["b"])).unwrap();
        assert!(delta.deletions.is_empty());
        assert_eq!(snapshots.len(), 2);
    }
}
