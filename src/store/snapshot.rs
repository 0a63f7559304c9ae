//! Sync baselines: the last fact-set pushed to the remote store per subject.

use dashmap::DashMap;
use redb::TableDefinition;

use crate::error::{StoreError, StoreResult};
use crate::graph::Graph;

use super::durable::{DurableStore, Table};

/// Stores and retrieves the last-synced graph of a subject. `load` returns
/// `None` when the subject has never been synced, which is distinct from an
/// empty baseline.
pub trait SnapshotStore: Send + Sync {
    fn load(&self, key: &str) -> StoreResult<Option<Graph>>;

    fn save(&self, key: &str, graph: &Graph) -> StoreResult<()>;

    /// Forget a baseline. Returns whether there was one.
    fn remove(&self, key: &str) -> StoreResult<bool>;
}

const SNAPSHOTS: Table = TableDefinition::new("snapshots");

/// Baselines as JSON in the shared redb database.
#[derive(Debug, Clone)]
pub struct RedbSnapshotStore {
    store: DurableStore,
}

impl RedbSnapshotStore {
    pub fn new(store: DurableStore) -> Self {
        Self { store }
    }

    /// Subjects that have a baseline.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .store
            .entries(SNAPSHOTS)?
            .into_iter()
            .map(|(k, _)| k)
            .collect())
    }
}

impl SnapshotStore for RedbSnapshotStore {
    fn load(&self, key: &str) -> StoreResult<Option<Graph>> {
        let Some(bytes) = self.store.get(SNAPSHOTS, key)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Serialization {
                message: format!("snapshot for {key}: {e}"),
            })
    }

    fn save(&self, key: &str, graph: &Graph) -> StoreResult<()> {
        let bytes = serde_json::to_vec(graph).map_err(|e| StoreError::Serialization {
            message: format!("snapshot for {key}: {e}"),
        })?;
        self.store.put(SNAPSHOTS, key, &bytes)
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        self.store.remove(SNAPSHOTS, key)
    }
}

/// Baselines held in memory, for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    graphs: DashMap<String, Graph>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> StoreResult<Option<Graph>> {
        Ok(self.graphs.get(key).map(|g| g.value().clone()))
    }

    fn save(&self, key: &str, graph: &Graph) -> StoreResult<()> {
        self.graphs.insert(key.to_string(), graph.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        Ok(self.graphs.remove(key).is_some())
    }
}
