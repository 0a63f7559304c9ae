//! Whole-profile crosswalk.

use crate::graph::{Graph, Iri};
use crate::identity::{IdentifierStrategy, attrs};
use crate::source::{OrcidProfile, non_empty};
use crate::vocab::{ORCID_BASE, foaf, owl, rdf, vivo};

use super::{
    AffiliationsCrosswalker, BioCrosswalker, CrosswalkContext, EntityCrosswalker,
    FundingsCrosswalker, WorksCrosswalker,
};

/// Runs every section crosswalker against one shared context and adds the
/// subject's ORCID iD.
pub struct ProfileCrosswalker {
    sections: Vec<Box<dyn EntityCrosswalker>>,
}

impl Default for ProfileCrosswalker {
    fn default() -> Self {
        Self::new(vec![
            Box::new(BioCrosswalker),
            Box::new(WorksCrosswalker),
            Box::new(AffiliationsCrosswalker),
            Box::new(FundingsCrosswalker),
        ])
    }
}

impl std::fmt::Debug for ProfileCrosswalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileCrosswalker")
            .field("sections", &self.section_names())
            .finish()
    }
}

impl ProfileCrosswalker {
    pub fn new(sections: Vec<Box<dyn EntityCrosswalker>>) -> Self {
        Self { sections }
    }

    pub fn section_names(&self) -> Vec<&'static str> {
        self.sections.iter().map(|s| s.name()).collect()
    }

    /// Crosswalk `profile` for the subject in `ctx`.
    ///
    /// `confirmed` records that the person has proven ownership of the iD
    /// (e.g. by signing in with it).
    pub fn crosswalk(
        &self,
        ctx: &CrosswalkContext<'_>,
        profile: &OrcidProfile,
        orcid_id: &str,
        confirmed: bool,
    ) -> Graph {
        let mut graph = Graph::new();
        for section in &self.sections {
            let facts = section.crosswalk(ctx, profile);
            tracing::debug!(section = section.name(), facts = facts.len(), "crosswalked section");
            graph.extend(facts);
        }

        let orcid = Iri::new(format!("{ORCID_BASE}{orcid_id}"));
        graph.add(&ctx.person, vivo::ORCID_ID, &orcid);
        graph.add(&orcid, rdf::TYPE, Iri::from(owl::THING));
        if confirmed {
            graph.add(&orcid, vivo::CONFIRMED_ORCID_ID, &ctx.person);
        }
        graph
    }
}

/// The subject's identifier: `person_uri` when given, otherwise minted from
/// the local person id or, failing that, the ORCID iD.
pub fn person_iri(
    ids: &dyn IdentifierStrategy,
    person_uri: Option<&str>,
    person_id: Option<&str>,
    orcid_id: &str,
) -> Iri {
    if let Some(uri) = person_uri.and_then(non_empty) {
        return Iri::from(uri);
    }
    let id = person_id.and_then(non_empty).unwrap_or(orcid_id);
    ids.identifier_for(foaf::PERSON, &attrs("id", id), None)
}

/// Class of the subject: a VIVO core local name such as `FacultyMember`, a
/// full IRI, or `foaf:Person` when unset.
pub fn person_class(name: Option<&str>) -> String {
    match name.and_then(non_empty) {
        None => foaf::PERSON.to_string(),
        Some(iri) if iri.contains(':') => iri.to_string(),
        Some(local) => format!("{}{local}", vivo::NS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crosswalk::testing::{Fixture, profile};

    const PROFILE: &str = r#"{"orcid-profile": {
        "orcid-bio": {"personal-details": {"given-names": {"value": "Laurel"},
                                           "family-name": {"value": "Haak"}}},
        "orcid-activities": {
            "affiliations": {"affiliation": [
                {"type": "EDUCATION", "role-title": "PhD",
                 "organization": {"name": "Alfred P. Sloan Foundation"}}]},
            "funding-list": {"funding": [
                {"funding-type": "GRANT", "funding-title": {"title": {"value": "G"}},
                 "organization": {"name": "Alfred P. Sloan Foundation"}}]}
        }
    }}"#;

    #[test]
    fn orcid_facts() {
        let fx = Fixture::new(false);
        let g = ProfileCrosswalker::default().crosswalk(&fx.ctx(), &profile("{}"), "0000-0001-5109-3700", false);
        let orcid = Iri::from("http://orcid.org/0000-0001-5109-3700");
        assert!(g.has(&fx.person, vivo::ORCID_ID, &orcid));
        assert!(g.has(&orcid, rdf::TYPE, Iri::from(owl::THING)));
        assert!(!g.has(&orcid, vivo::CONFIRMED_ORCID_ID, &fx.person));
        assert_eq!(g.len(), 2);

        let g = ProfileCrosswalker::default().crosswalk(&fx.ctx(), &profile("{}"), "0000-0001-5109-3700", true);
        assert!(g.has(&orcid, vivo::CONFIRMED_ORCID_ID, &fx.person));
    }

    #[test]
    fn sections_share_identifiers() {
        let fx = Fixture::new(false);
        let g = ProfileCrosswalker::default().crosswalk(&fx.ctx(), &profile(PROFILE), "0000-0001-5109-3700", false);
        let org = fx.id(foaf::ORGANIZATION, &attrs("name", "Alfred P. Sloan Foundation"));
        let orgs = g.subjects(rdf::TYPE, &Iri::from(foaf::ORGANIZATION).into()).count();
        assert_eq!(orgs, 1);
        let grant = fx.id(vivo::GRANT, &attrs("title", "G"));
        assert!(g.has(&grant, vivo::ASSIGNED_BY, &org));
        assert!(g.has(&fx.person, rdf::TYPE, Iri::from(foaf::PERSON)));
    }

    #[test]
    fn section_order_does_not_matter() {
        let fx = Fixture::new(false);
        let forward = ProfileCrosswalker::default();
        let reverse = ProfileCrosswalker::new(vec![
            Box::new(FundingsCrosswalker),
            Box::new(AffiliationsCrosswalker),
            Box::new(WorksCrosswalker),
            Box::new(BioCrosswalker),
        ]);
        let id = "0000-0001-5109-3700";
        assert_eq!(
            forward.crosswalk(&fx.ctx(), &profile(PROFILE), id, true),
            reverse.crosswalk(&fx.ctx(), &profile(PROFILE), id, true)
        );
        assert_eq!(forward.section_names(), vec!["bio", "works", "affiliations", "fundings"]);
    }

    #[test]
    fn person_identifier_sources() {
        let fx = Fixture::new(false);
        let orcid = "0000-0001-5109-3700";
        assert_eq!(
            person_iri(&fx.ids, Some("http://x/people/lhaak"), Some("lhaak"), orcid),
            Iri::from("http://x/people/lhaak")
        );
        assert_eq!(
            person_iri(&fx.ids, None, Some("lhaak"), orcid),
            fx.id(foaf::PERSON, &attrs("id", "lhaak"))
        );
        assert_eq!(
            person_iri(&fx.ids, Some(""), None, orcid),
            fx.id(foaf::PERSON, &attrs("id", orcid))
        );
    }

    #[test]
    fn person_classes() {
        assert_eq!(person_class(None), foaf::PERSON);
        assert_eq!(person_class(Some("FacultyMember")), format!("{}FacultyMember", vivo::NS));
        assert_eq!(person_class(Some("http://x/Researcher")), "http://x/Researcher");
    }
}
