//! Fact model: the set of RDF statements produced for one subject.
//!
//! A [`Graph`] is a plain set of [`Fact`]s. Duplicates collapse and order is
//! irrelevant, so two crosswalk runs over the same profile compare equal no
//! matter in which order the entity crosswalkers emitted their facts.
//!
//! - [`diff`]: set difference between two runs ([`GraphDelta`])
//! - [`rdf`]: conversion to oxigraph terms and N-Triples

pub mod diff;
pub mod rdf;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vocab::xsd;

pub use diff::GraphDelta;

/// An absolute IRI naming an entity, a class or a property.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Iri {
    fn from(iri: &str) -> Self {
        Self(iri.to_string())
    }
}

impl From<String> for Iri {
    fn from(iri: String) -> Self {
        Self(iri)
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// A literal value. A literal without a datatype is a plain string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<Iri>,
}

impl Literal {
    /// A plain string literal.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: &str) -> Self {
        Self {
            value: value.into(),
            datatype: Some(Iri::from(datatype)),
        }
    }

    pub fn date_time(value: impl Into<String>) -> Self {
        Self::typed(value, xsd::DATE_TIME)
    }

    pub fn any_uri(value: impl Into<String>) -> Self {
        Self::typed(value, xsd::ANY_URI)
    }
}

/// Object position of a fact: another resource or a literal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Object {
    Iri(Iri),
    Literal(Literal),
}

impl Object {
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Object::Iri(iri) => Some(iri),
            Object::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Object::Literal(lit) => Some(lit),
            Object::Iri(_) => None,
        }
    }
}

impl From<Iri> for Object {
    fn from(iri: Iri) -> Self {
        Object::Iri(iri)
    }
}

impl From<&Iri> for Object {
    fn from(iri: &Iri) -> Self {
        Object::Iri(iri.clone())
    }
}

impl From<Literal> for Object {
    fn from(lit: Literal) -> Self {
        Object::Literal(lit)
    }
}

/// A single statement (subject, predicate, object).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fact {
    pub subject: Iri,
    pub predicate: Iri,
    pub object: Object,
}

impl Fact {
    pub fn new(subject: &Iri, predicate: &str, object: impl Into<Object>) -> Self {
        Self {
            subject: subject.clone(),
            predicate: Iri::from(predicate),
            object: object.into(),
        }
    }
}

/// A set of facts.
///
/// Backed by a `BTreeSet` so that iteration (and therefore N-Triples output
/// and snapshot encoding) is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    facts: BTreeSet<Fact>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fact. Returns `false` if it was already present.
    pub fn add(&mut self, subject: &Iri, predicate: &str, object: impl Into<Object>) -> bool {
        self.facts.insert(Fact::new(subject, predicate, object))
    }

    pub fn insert(&mut self, fact: Fact) -> bool {
        self.facts.insert(fact)
    }

    pub fn remove(&mut self, fact: &Fact) -> bool {
        self.facts.remove(fact)
    }

    pub fn contains(&self, fact: &Fact) -> bool {
        self.facts.contains(fact)
    }

    /// Whether any fact matches the given subject, predicate and object.
    pub fn has(&self, subject: &Iri, predicate: &str, object: impl Into<Object>) -> bool {
        self.contains(&Fact::new(subject, predicate, object))
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    /// Merge all facts of `other` into this graph.
    pub fn extend(&mut self, other: Graph) {
        self.facts.extend(other.facts);
    }

    /// Facts in `self` that are not in `other`.
    pub fn difference(&self, other: &Graph) -> Graph {
        self.facts.difference(&other.facts).cloned().collect()
    }

    /// All facts with the given subject.
    pub fn about<'a>(&'a self, subject: &Iri) -> impl Iterator<Item = &'a Fact> {
        self.facts.iter().filter(move |f| &f.subject == subject)
    }

    /// Objects of every `(subject, predicate, ?o)` fact.
    pub fn objects<'a>(
        &'a self,
        subject: &Iri,
        predicate: &str,
    ) -> impl Iterator<Item = &'a Object> {
        self.about(subject)
            .filter(move |f| f.predicate.as_str() == predicate)
            .map(|f| &f.object)
    }

    /// Subjects of every `(?s, predicate, object)` fact.
    pub fn subjects<'a>(
        &'a self,
        predicate: &str,
        object: &Object,
    ) -> impl Iterator<Item = &'a Iri> {
        self.facts
            .iter()
            .filter(move |f| f.predicate.as_str() == predicate && &f.object == object)
            .map(|f| &f.subject)
    }

    /// The first `(subject, predicate, ?o)` object that is a literal.
    pub fn literal(&self, subject: &Iri, predicate: &str) -> Option<&str> {
        self.objects(subject, predicate)
            .find_map(Object::as_literal)
            .map(|lit| lit.value.as_str())
    }
}

impl FromIterator<Fact> for Graph {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        Self {
            facts: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Fact;
    type IntoIter = std::collections::btree_set::IntoIter<Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Fact;
    type IntoIter = std::collections::btree_set::Iter<'a, Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{rdf, rdfs, vivo};

    fn iri(s: &str) -> Iri {
        Iri::from(s)
    }

    #[test]
    fn duplicates_collapse() {
        let mut g = Graph::new();
        let s = iri("http://example.org/a");
        assert!(g.add(&s, rdfs::LABEL, Literal::plain("A")));
        assert!(!g.add(&s, rdfs::LABEL, Literal::plain("A")));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn typed_and_plain_literals_differ() {
        let s = iri("http://example.org/a");
        let plain = Fact::new(&s, vivo::DATE_TIME, Literal::plain("2000-01-01T00:00:00"));
        let typed = Fact::new(&s, vivo::DATE_TIME, Literal::date_time("2000-01-01T00:00:00"));
        assert_ne!(plain, typed);
    }

    #[test]
    fn pattern_accessors() {
        let mut g = Graph::new();
        let s = iri("http://example.org/a");
        let t = iri("http://example.org/Thing");
        g.add(&s, rdf::TYPE, &t);
        g.add(&s, rdfs::LABEL, Literal::plain("A"));

        assert_eq!(g.literal(&s, rdfs::LABEL), Some("A"));
        let typed: Vec<_> = g.subjects(rdf::TYPE, &Object::Iri(t)).collect();
        assert_eq!(typed, vec![&s]);
        assert_eq!(g.about(&s).count(), 2);
    }

    #[test]
    fn serde_roundtrip_preserves_set() {
        let mut g = Graph::new();
        let s = iri("http://example.org/a");
        g.add(&s, rdfs::LABEL, Literal::plain("A"));
        g.add(&s, vivo::DATE_TIME, Literal::date_time("2000-01-01T00:00:00"));

        let json = serde_json::to_string(&g).unwrap();
        let back: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(g, back);
    }
}
