//! Biography: the person, their identifiers and keywords, and the vCard.

use crate::graph::{Graph, Iri, Literal};
use crate::identity::{attrs, create::name_card_for};
use crate::source::OrcidProfile;
use crate::source::profile::text;
use crate::vocab::{obo, rdf, rdfs, vcard, vivo};

use super::{CrosswalkContext, EntityCrosswalker};

#[derive(Debug, Clone, Copy, Default)]
pub struct BioCrosswalker;

impl EntityCrosswalker for BioCrosswalker {
    fn name(&self) -> &'static str {
        "bio"
    }

    fn crosswalk(&self, ctx: &CrosswalkContext<'_>, profile: &OrcidProfile) -> Graph {
        let mut graph = Graph::new();
        let person = &ctx.person;
        let given = profile.given_names();
        let family = profile.family_name();

        let full_name: Vec<&str> = given.into_iter().chain(family).collect();
        if !full_name.is_empty() && ctx.create.should_create(&ctx.person_class, person) {
            graph.add(person, rdf::TYPE, Iri::new(ctx.person_class.as_str()));
            graph.add(person, rdfs::LABEL, Literal::plain(full_name.join(" ")));
        }

        if let Some(biography) = profile.biography() {
            graph.add(person, vivo::OVERVIEW, Literal::plain(biography));
        }

        // VIVO has properties for only these two.
        for id in profile.external_identifiers() {
            let Some(value) = text(&id.external_id_reference) else {
                continue;
            };
            match text(&id.external_id_common_name) {
                Some("Scopus Author ID") => {
                    graph.add(person, vivo::SCOPUS_ID, Literal::plain(value));
                }
                Some("ResearcherID") => {
                    graph.add(person, vivo::RESEARCHER_ID, Literal::plain(value));
                }
                _ => {}
            }
        }

        for keyword in profile.keywords() {
            graph.add(person, vivo::FREETEXT_KEYWORD, Literal::plain(keyword));
        }

        let card = ctx.id(vcard::INDIVIDUAL, &attrs("person_uri", person));
        let mut has_child = false;

        let name_card = name_card_for(ctx.ids, person);
        if (given.is_some() || family.is_some()) && ctx.create.should_create(vcard::NAME, &name_card)
        {
            graph.add(&name_card, rdf::TYPE, Iri::from(vcard::NAME));
            graph.add(&card, vcard::HAS_NAME, &name_card);
            if let Some(given) = given {
                graph.add(&name_card, vcard::GIVEN_NAME, Literal::plain(given));
            }
            if let Some(family) = family {
                graph.add(&name_card, vcard::FAMILY_NAME, Literal::plain(family));
            }
            has_child = true;
        }

        for site in profile.researcher_urls() {
            let Some(url) = text(&site.url) else {
                tracing::debug!(orcid = ?profile.orcid_id(), "skipping researcher url without address");
                continue;
            };
            let website = ctx.id(vcard::URL, &attrs("url", url));
            graph.add(&website, rdf::TYPE, Iri::from(vcard::URL));
            graph.add(&card, vcard::HAS_URL, &website);
            graph.add(&website, vcard::URL_PROP, Literal::any_uri(url));
            if let Some(name) = text(&site.url_name) {
                graph.add(&website, rdfs::LABEL, Literal::plain(name));
            }
            has_child = true;
        }

        if has_child && ctx.create.should_create(vcard::INDIVIDUAL, &card) {
            graph.add(&card, rdf::TYPE, Iri::from(vcard::INDIVIDUAL));
            graph.add(&card, obo::ARG_2000029, person);
        }

        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crosswalk::testing::{Fixture, profile};
    use crate::vocab::foaf;

    const HAAK: &str = r#"{"orcid-profile": {
        "orcid-identifier": {"path": "0000-0001-5109-3700"},
        "orcid-bio": {
            "personal-details": {
                "given-names": {"value": "Laurel"},
                "family-name": {"value": "Haak"}
            },
            "biography": {"value": "Executive Director of ORCID."},
            "researcher-urls": {"researcher-url": [
                {"url-name": {"value": "LinkedIn"}, "url": {"value": "http://www.linkedin.com/in/lhaak"}}
            ]},
            "keywords": {"keyword": [{"value": "persistent identifiers, research policy"}]},
            "external-identifiers": {"external-identifier": [
                {"external-id-common-name": {"value": "Scopus Author ID"},
                 "external-id-reference": {"value": "6602258586"}},
                {"external-id-common-name": {"value": "ResearcherID"},
                 "external-id-reference": {"value": "B-3990-2009"}},
                {"external-id-common-name": {"value": "Loop profile"},
                 "external-id-reference": {"value": "12345"}}
            ]}
        }
    }}"#;

    #[test]
    fn person_and_bio_facts() {
        let fx = Fixture::new(false);
        let g = BioCrosswalker.crosswalk(&fx.ctx(), &profile(HAAK));
        let p = &fx.person;

        assert!(g.has(p, rdf::TYPE, Iri::from(foaf::PERSON)));
        assert_eq!(g.literal(p, rdfs::LABEL), Some("Laurel Haak"));
        assert_eq!(g.literal(p, vivo::OVERVIEW), Some("Executive Director of ORCID."));
        assert_eq!(g.literal(p, vivo::SCOPUS_ID), Some("6602258586"));
        assert_eq!(g.literal(p, vivo::RESEARCHER_ID), Some("B-3990-2009"));
        assert_eq!(g.objects(p, vivo::FREETEXT_KEYWORD).count(), 2);
    }

    #[test]
    fn vcard_with_name_and_website() {
        let fx = Fixture::new(false);
        let g = BioCrosswalker.crosswalk(&fx.ctx(), &profile(HAAK));
        let card = fx.id(vcard::INDIVIDUAL, &attrs("person_uri", &fx.person));
        let name = name_card_for(&fx.ids, &fx.person);

        assert!(g.has(&card, rdf::TYPE, Iri::from(vcard::INDIVIDUAL)));
        assert!(g.has(&card, obo::ARG_2000029, &fx.person));
        assert!(g.has(&card, vcard::HAS_NAME, &name));
        assert_eq!(g.literal(&name, vcard::GIVEN_NAME), Some("Laurel"));

        let site = fx.id(vcard::URL, &attrs("url", "http://www.linkedin.com/in/lhaak"));
        assert!(g.has(&card, vcard::HAS_URL, &site));
        assert_eq!(g.literal(&site, rdfs::LABEL), Some("LinkedIn"));
    }

    #[test]
    fn skip_person_omits_person_and_name_card() {
        let fx = Fixture::new(true);
        let g = BioCrosswalker.crosswalk(&fx.ctx(), &profile(HAAK));
        let name = name_card_for(&fx.ids, &fx.person);

        assert!(!g.has(&fx.person, rdf::TYPE, Iri::from(foaf::PERSON)));
        assert_eq!(g.about(&name).count(), 0);
        // The website still makes the main card worth creating.
        let card = fx.id(vcard::INDIVIDUAL, &attrs("person_uri", &fx.person));
        assert!(g.has(&card, rdf::TYPE, Iri::from(vcard::INDIVIDUAL)));
    }

    #[test]
    fn empty_profile_yields_nothing() {
        let fx = Fixture::new(false);
        assert!(BioCrosswalker.crosswalk(&fx.ctx(), &profile("{}")).is_empty());
    }
}
