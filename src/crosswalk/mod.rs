//! Entity crosswalkers: ORCID profile sections to VIVO facts.
//!
//! Each crosswalker turns one section of a profile into a [`Graph`]. They do
//! no I/O: Crossref records are fetched beforehand into a [`LookupCache`] and
//! passed in through the [`CrosswalkContext`], which also carries the one
//! identifier and create strategy shared by every crosswalker of a run.
//!
//! - [`bio`]: person, overview, identifiers, keywords, vCard
//! - [`affiliations`]: education
//! - [`fundings`]: grants
//! - [`works`]: publications
//! - [`profile`]: runs all of the above

pub mod affiliations;
pub mod bio;
pub mod date;
pub mod fundings;
pub mod profile;
pub mod works;

use std::collections::HashMap;

use crate::graph::{Graph, Iri, Literal};
use crate::identity::{Attributes, CreateStrategy, IdentifierStrategy, attrs};
use crate::resolve::FieldResolver;
use crate::source::{CitationParser, CrossrefWork, OrcidProfile};
use crate::vocab::{foaf, obo, rdf, rdfs, vcard};

pub use affiliations::AffiliationsCrosswalker;
pub use bio::BioCrosswalker;
pub use fundings::FundingsCrosswalker;
pub use profile::ProfileCrosswalker;
pub use works::WorksCrosswalker;

/// Crossref records keyed by DOI. A DOI mapped to `None` was looked up and
/// not found.
#[derive(Debug, Clone, Default)]
pub struct LookupCache {
    records: HashMap<String, Option<CrossrefWork>>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, doi: &str, record: Option<CrossrefWork>) {
        self.records.insert(normalize_doi(doi), record);
    }

    pub fn get(&self, doi: &str) -> Option<&CrossrefWork> {
        self.records.get(&normalize_doi(doi))?.as_ref()
    }

    pub fn contains(&self, doi: &str) -> bool {
        self.records.contains_key(&normalize_doi(doi))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// DOIs are case-insensitive.
pub fn normalize_doi(doi: &str) -> String {
    doi.trim().to_lowercase()
}

/// Shared, read-only state of one crosswalk run.
pub struct CrosswalkContext<'a> {
    pub ids: &'a dyn IdentifierStrategy,
    pub create: &'a dyn CreateStrategy,
    pub resolver: &'a FieldResolver,
    pub citations: &'a dyn CitationParser,
    pub lookups: &'a LookupCache,
    /// The subject person.
    pub person: Iri,
    /// Class asserted for the subject person, `foaf:Person` by default.
    pub person_class: String,
}

impl<'a> CrosswalkContext<'a> {
    pub fn new(
        ids: &'a dyn IdentifierStrategy,
        create: &'a dyn CreateStrategy,
        resolver: &'a FieldResolver,
        citations: &'a dyn CitationParser,
        lookups: &'a LookupCache,
        person: Iri,
    ) -> Self {
        Self {
            ids,
            create,
            resolver,
            citations,
            lookups,
            person,
            person_class: foaf::PERSON.to_string(),
        }
    }

    pub fn with_person_class(mut self, class: impl Into<String>) -> Self {
        self.person_class = class.into();
        self
    }

    /// Mint the identifier of an entity.
    pub fn id(&self, kind: &str, attrs: &Attributes) -> Iri {
        self.ids.identifier_for(kind, attrs, None)
    }

    /// Assert type and label of a shared entity, if the create policy allows.
    pub fn declare(&self, graph: &mut Graph, kind: &str, iri: &Iri, label: &str) {
        if self.create.should_create(kind, iri) {
            graph.add(iri, rdf::TYPE, Iri::from(kind));
            graph.add(iri, rdfs::LABEL, Literal::plain(label));
        }
    }

    /// The organization named `name`, declared if allowed.
    pub fn organization(&self, graph: &mut Graph, name: &str) -> Iri {
        let iri = self.id(foaf::ORGANIZATION, &attrs("name", name));
        self.declare(graph, foaf::ORGANIZATION, &iri, name);
        iri
    }

    /// Attach `url` to `subject` through a `vcard:Kind` carrying a `vcard:URL`.
    pub fn url_card(&self, graph: &mut Graph, subject: &Iri, url: &str) {
        let kind = self.id(vcard::KIND, &attrs("url", url));
        graph.add(&kind, rdf::TYPE, Iri::from(vcard::KIND));
        graph.add(subject, obo::ARG_2000028, &kind);
        let url_node = self.id(vcard::URL, &attrs("vcard_uri", &kind));
        graph.add(&url_node, rdf::TYPE, Iri::from(vcard::URL));
        graph.add(&kind, vcard::HAS_URL, &url_node);
        graph.add(&url_node, vcard::URL_PROP, Literal::any_uri(url));
    }
}

/// One profile section to facts.
pub trait EntityCrosswalker: Send + Sync {
    fn name(&self) -> &'static str;

    fn crosswalk(&self, ctx: &CrosswalkContext<'_>, profile: &OrcidProfile) -> Graph;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by the crosswalker tests.

    use super::*;
    use crate::identity::{HashIdentifierStrategy, SimpleCreateStrategy};
    use crate::source::BibtexParser;

    pub const NS: &str = "http://vivo.example.edu/individual/";

    pub struct Fixture {
        pub ids: HashIdentifierStrategy,
        pub create: SimpleCreateStrategy,
        pub resolver: FieldResolver,
        pub lookups: LookupCache,
        pub person: Iri,
    }

    impl Fixture {
        pub fn new(skip_person: bool) -> Self {
            let ids = HashIdentifierStrategy::new(NS);
            let person = Iri::new(format!("{NS}test"));
            let create = SimpleCreateStrategy::new(&ids, &person, skip_person);
            Self {
                ids,
                create,
                resolver: FieldResolver::default(),
                lookups: LookupCache::new(),
                person,
            }
        }

        pub fn ctx(&self) -> CrosswalkContext<'_> {
            CrosswalkContext::new(
                &self.ids,
                &self.create,
                &self.resolver,
                &BibtexParser,
                &self.lookups,
                self.person.clone(),
            )
        }

        pub fn id(&self, kind: &str, attrs: &Attributes) -> Iri {
            self.ids.identifier_for(kind, attrs, None)
        }
    }

    pub fn profile(json: &str) -> OrcidProfile {
        OrcidProfile::from_json(json).unwrap()
    }
}
