//! Entity identity: deterministic identifiers and the create-once policy.
//!
//! Every entity the crosswalk emits is named by an [`IdentifierStrategy`]
//! from its kind and a set of identifying [`Attributes`]. Independent
//! crosswalk passes (bio, education, funding, works, and later runs) agree on
//! an identifier without a central allocator because the identifier is a pure
//! function of its inputs.
//!
//! - [`hash`]: content-addressed identifiers (the canonical strategy)
//! - [`counter`]: per-process suffix counters
//! - [`create`]: which entities get their "exists" facts asserted

pub mod counter;
pub mod create;
pub mod hash;

use std::collections::BTreeMap;

use crate::graph::Iri;

pub use counter::CounterIdentifierStrategy;
pub use create::{CreateAll, CreateStrategy, SimpleCreateStrategy};
pub use hash::HashIdentifierStrategy;

/// Maps (kind, identifying attributes) to a stable IRI.
pub trait IdentifierStrategy: Send + Sync {
    /// Mint the identifier for an entity of `kind` described by `attrs`.
    ///
    /// When `general_kind` is given it replaces `kind` as the identifier tag so
    /// that differently-typed entities can share one identifier family.
    fn identifier_for(&self, kind: &str, attrs: &Attributes, general_kind: Option<&str>) -> Iri;
}

/// One identifying attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    /// Another entity's identifier; stringifies to the bare IRI.
    Ref(Iri),
    Absent,
}

impl AttrValue {
    /// The string fed to the identifier digest, or `None` if the value does
    /// not take part in identity.
    pub fn identity_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) if !s.is_empty() => Some(s),
            AttrValue::Ref(iri) => Some(iri.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<&String> for AttrValue {
    fn from(s: &String) -> Self {
        AttrValue::Text(s.clone())
    }
}

impl From<&Iri> for AttrValue {
    fn from(iri: &Iri) -> Self {
        AttrValue::Ref(iri.clone())
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::Absent, Into::into)
    }
}

/// Identifying attributes of an entity, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: BTreeMap<String, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Values that take part in identity, in attribute-name order.
    pub fn identity_values(&self) -> impl Iterator<Item = &str> {
        self.values.values().filter_map(AttrValue::identity_text)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Single-attribute shorthand.
pub fn attrs(name: &str, value: impl Into<AttrValue>) -> Attributes {
    Attributes::new().with(name, value)
}

/// The short tag a kind contributes to its identifiers: the IRI fragment if
/// there is one, else the last path segment, lower-cased.
pub fn kind_tag(kind: &str) -> String {
    let local = match kind.rsplit_once('#') {
        Some((_, fragment)) if !fragment.is_empty() => fragment,
        _ => kind.trim_end_matches('/').rsplit('/').next().unwrap_or(kind),
    };
    local.to_lowercase()
}
