//! Suffix-counter identifiers.
//!
//! Mints `{namespace}{tag}-{n}` with a counter per tag. Identical attribute
//! sets get the same identifier for the lifetime of the strategy, but the
//! numbering depends on the order entities are first seen, so identifiers are
//! only stable within one process. Useful for readable one-off crosswalks.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::graph::Iri;

use super::{kind_tag, Attributes, IdentifierStrategy};

#[derive(Debug)]
pub struct CounterIdentifierStrategy {
    namespace: String,
    assigned: DashMap<(String, Vec<String>), Iri>,
    counters: DashMap<String, AtomicU64>,
}

impl CounterIdentifierStrategy {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            assigned: DashMap::new(),
            counters: DashMap::new(),
        }
    }

    /// Number of distinct identifiers minted so far.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    fn next_suffix(&self, tag: &str) -> u64 {
        self.counters
            .entry(tag.to_string())
            .or_insert_with(|| AtomicU64::new(1))
            .fetch_add(1, Ordering::Relaxed)
    }
}

impl IdentifierStrategy for CounterIdentifierStrategy {
    fn identifier_for(&self, kind: &str, attrs: &Attributes, general_kind: Option<&str>) -> Iri {
        let tag = kind_tag(general_kind.unwrap_or(kind));
        let values: Vec<String> = attrs.identity_values().map(str::to_string).collect();
        self.assigned
            .entry((tag.clone(), values))
            .or_insert_with(|| {
                let n = self.next_suffix(&tag);
                Iri::new(format!("{}{tag}-{n}", self.namespace))
            })
            .clone()
    }
}
