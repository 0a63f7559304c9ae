//! Storage for orcid-vivo.
//!
//! Two kinds of storage serve different purposes:
//!
//! - triple stores receive the facts: [`SparqlUpdateStore`] talks to a
//!   VIVO SPARQL Update endpoint, [`OxigraphStore`] keeps them in process
//! - [`DurableStore`] (redb) holds local state: sync baselines
//!   ([`RedbSnapshotStore`]) and the subject registry ([`SubjectRegistry`])

pub mod durable;
pub mod local;
pub mod registry;
pub mod snapshot;
pub mod sparql;

use crate::error::StoreResult;
use crate::graph::Graph;

pub use durable::DurableStore;
pub use local::OxigraphStore;
pub use registry::{SubjectRecord, SubjectRegistry};
pub use snapshot::{MemorySnapshotStore, RedbSnapshotStore, SnapshotStore};
pub use sparql::SparqlUpdateStore;

/// The remote graph a subject's facts are written to.
///
/// Each call applies the whole fact set or fails; a failed call may have
/// applied nothing or everything, never a mix the caller has to track.
/// Adding a present fact or removing an absent one is a no-op.
pub trait TripleStore: Send + Sync {
    fn insert(&self, facts: &Graph) -> StoreResult<()>;

    fn delete(&self, facts: &Graph) -> StoreResult<()>;
}
