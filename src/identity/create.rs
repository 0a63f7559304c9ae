//! Create-once policy.
//!
//! Crosswalkers consult a [`CreateStrategy`] before emitting the "entity
//! exists" facts (type and label) of entities that may be shared across runs
//! or across people, and of the subject person itself.

use crate::graph::Iri;
use crate::vocab::vcard;

use super::{attrs, IdentifierStrategy};

/// Decides whether the existence facts of an entity are emitted this run.
pub trait CreateStrategy: Send + Sync {
    fn should_create(&self, kind: &str, iri: &Iri) -> bool;
}

/// Emit every entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateAll;

impl CreateStrategy for CreateAll {
    fn should_create(&self, _kind: &str, _iri: &Iri) -> bool {
        true
    }
}

/// Emit every entity except, when `skip_person` is set, the subject person
/// and the person's name card. Used when the person record is managed by
/// another system of record.
#[derive(Debug, Clone)]
pub struct SimpleCreateStrategy {
    skip_person: bool,
    person: Iri,
    name_card: Iri,
}

impl SimpleCreateStrategy {
    pub fn new(ids: &dyn IdentifierStrategy, person: &Iri, skip_person: bool) -> Self {
        Self {
            skip_person,
            person: person.clone(),
            name_card: name_card_for(ids, person),
        }
    }

    pub fn skip_person(&self) -> bool {
        self.skip_person
    }
}

impl CreateStrategy for SimpleCreateStrategy {
    fn should_create(&self, _kind: &str, iri: &Iri) -> bool {
        !(self.skip_person && (iri == &self.person || iri == &self.name_card))
    }
}

/// Identifier of the vCard name belonging to `person`.
pub fn name_card_for(ids: &dyn IdentifierStrategy, person: &Iri) -> Iri {
    ids.identifier_for(vcard::NAME, &attrs("person_uri", person), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::HashIdentifierStrategy;
    use crate::vocab::foaf;

    fn setup(skip: bool) -> (HashIdentifierStrategy, Iri, SimpleCreateStrategy) {
        let ids = HashIdentifierStrategy::new("http://x/");
        let person = Iri::from("http://x/person-1");
        let create = SimpleCreateStrategy::new(&ids, &person, skip);
        (ids, person, create)
    }

    #[test]
    fn skip_person_excludes_person_and_name_card() {
        let (ids, person, create) = setup(true);
        assert!(!create.should_create(foaf::PERSON, &person));
        assert!(!create.should_create(vcard::NAME, &name_card_for(&ids, &person)));
        assert!(create.should_create(foaf::ORGANIZATION, &Iri::from("http://x/organization-1")));
    }

    #[test]
    fn without_skip_everything_is_created() {
        let (ids, person, create) = setup(false);
        assert!(create.should_create(foaf::PERSON, &person));
        assert!(create.should_create(vcard::NAME, &name_card_for(&ids, &person)));
    }

    #[test]
    fn create_all_allows_person() {
        assert!(CreateAll.should_create(foaf::PERSON, &Iri::from("http://x/person-1")));
    }
}
