//! End-to-end crosswalk tests through the public API, with in-memory
//! profile and DOI sources standing in for ORCID and Crossref.

use std::collections::HashMap;

use orcid_vivo::config::Config;
use orcid_vivo::crosswalk::ProfileCrosswalker;
use orcid_vivo::error::{FetchError, FetchResult, LoadError};
use orcid_vivo::fetch::{DoiLookup, NoLookup, ProfileSource};
use orcid_vivo::graph::{Graph, Iri, Literal};
use orcid_vivo::identity::create::name_card_for;
use orcid_vivo::identity::{HashIdentifierStrategy, IdentifierStrategy, attrs};
use orcid_vivo::loader::{Crosswalked, Subject, crosswalk_subject};
use orcid_vivo::source::{CrossrefWork, OrcidProfile};
use orcid_vivo::vocab::{bibo, foaf, rdf, rdfs, vcard, vivo};

const NS: &str = "http://vivo.example.edu/individual/";
const ORCID: &str = "0000-0001-5109-3700";

const PROFILE: &str = r#"{"orcid-profile": {
    "orcid-identifier": {"path": "0000-0001-5109-3700"},
    "orcid-bio": {
        "personal-details": {"given-names": {"value": "Laurel"}, "family-name": {"value": "Haak"}},
        "keywords": {"keyword": [{"value": "persistent identifiers"}]}
    },
    "orcid-activities": {
        "orcid-works": {"orcid-work": [
            {"work-type": "JOURNAL_ARTICLE",
             "work-title": {"title": {"value": "Standards and infrastructure for innovation data exchange"}},
             "work-citation": {"work-citation-type": "BIBTEX",
                "citation": "@article{haak2012, title={Standards and infrastructure for innovation data exchange}, journal={Academic Medicine}, issn={1040-2446}, year={2012}, author={Haak, Laurel L. and Baker, David}}"}},
            {"work-type": "JOURNAL_ARTICLE",
             "work-title": {"title": {"value": "Profile title"}},
             "work-external-identifiers": {"work-external-identifier": [
                {"work-external-identifier-type": "DOI",
                 "work-external-identifier-id": {"value": "10.1000/real"}}]}}
        ]},
        "affiliations": {"affiliation": [
            {"type": "EDUCATION", "role-title": "PhD",
             "start-date": {"year": {"value": "1990"}}, "end-date": {"year": {"value": "1995"}},
             "organization": {"name": "Stanford University"}}
        ]},
        "funding-list": {"funding": [
            {"funding-type": "GRANT", "funding-title": {"title": {"value": "Persistent Identifiers"}},
             "organization": {"name": "Alfred P. Sloan Foundation"}}
        ]}
    }
}}"#;

struct Profiles(HashMap<&'static str, &'static str>);

impl ProfileSource for Profiles {
    fn fetch(&self, orcid: &str) -> FetchResult<OrcidProfile> {
        let json = self.0.get(orcid).ok_or(FetchError::Status {
            url: format!("memory:{orcid}"),
            code: 404,
        })?;
        OrcidProfile::from_json(json).map_err(|e| FetchError::Decode {
            url: format!("memory:{orcid}"),
            message: e.to_string(),
        })
    }
}

struct Lookups(HashMap<&'static str, CrossrefWork>);

impl DoiLookup for Lookups {
    fn lookup(&self, doi: &str) -> FetchResult<Option<CrossrefWork>> {
        Ok(self.0.get(doi).cloned())
    }
}

struct BrokenLookup;

impl DoiLookup for BrokenLookup {
    fn lookup(&self, doi: &str) -> FetchResult<Option<CrossrefWork>> {
        Err(FetchError::Status {
            url: format!("memory:{doi}"),
            code: 503,
        })
    }
}

fn config() -> Config {
    Config {
        namespace: NS.into(),
        ..Config::default()
    }
}

fn real_title() -> Lookups {
    Lookups(HashMap::from([(
        "10.1000/real",
        CrossrefWork {
            title: vec!["Real Title".into()],
            ..Default::default()
        },
    )]))
}

fn run(subject: &Subject, lookups: &dyn DoiLookup) -> Crosswalked {
    let profiles = Profiles(HashMap::from([(ORCID, PROFILE)]));
    crosswalk_subject(
        &config(),
        &ProfileCrosswalker::default(),
        &profiles,
        lookups,
        subject,
    )
    .unwrap()
}

fn id(kind: &str, name: &str) -> Iri {
    HashIdentifierStrategy::new(NS).identifier_for(kind, &attrs("name", name), None)
}

#[test]
fn journal_from_embedded_citation() {
    let out = run(&Subject::new(ORCID), &NoLookup);
    let g = &out.graph;

    let work = id(bibo::ACADEMIC_ARTICLE, "Standards and infrastructure for innovation data exchange");
    let journal = id(bibo::JOURNAL, "Academic Medicine");
    assert!(g.has(&work, vivo::HAS_PUBLICATION_VENUE, &journal));
    assert_eq!(g.literal(&journal, rdfs::LABEL), Some("Academic Medicine"));
    assert_eq!(g.literal(&journal, bibo::ISSN), Some("1040-2446"));

    // The co-author from the citation gets a person and an authorship.
    let coauthors = g
        .subjects(rdf::TYPE, &Iri::from(foaf::PERSON).into())
        .filter(|p| **p != out.person)
        .count();
    assert_eq!(coauthors, 1);
}

#[test]
fn lookup_title_beats_profile_title() {
    let out = run(&Subject::new(ORCID), &real_title());
    let g = &out.graph;
    let work = id(bibo::ACADEMIC_ARTICLE, "Real Title");
    assert_eq!(g.literal(&work, rdfs::LABEL), Some("Real Title"));
    assert_eq!(g.about(&id(bibo::ACADEMIC_ARTICLE, "Profile title")).count(), 0);

    let without = run(&Subject::new(ORCID), &NoLookup);
    let fallback = id(bibo::ACADEMIC_ARTICLE, "Profile title");
    assert_eq!(without.graph.literal(&fallback, rdfs::LABEL), Some("Profile title"));
}

#[test]
fn crosswalk_is_deterministic() {
    let a = run(&Subject::new(ORCID), &real_title());
    let b = run(&Subject::new(format!("http://orcid.org/{ORCID}")), &real_title());
    assert_eq!(a.graph, b.graph);
    assert_eq!(a.graph.to_ntriples().unwrap(), b.graph.to_ntriples().unwrap());
}

#[test]
fn person_and_orcid_facts() {
    let out = run(
        &Subject {
            confirmed: true,
            ..Subject::new(ORCID)
        },
        &NoLookup,
    );
    let g = &out.graph;
    let expected = HashIdentifierStrategy::new(NS).identifier_for(foaf::PERSON, &attrs("id", ORCID), None);
    assert_eq!(out.person, expected);
    assert_eq!(g.literal(&out.person, rdfs::LABEL), Some("Laurel Haak"));

    let orcid = Iri::new(format!("http://orcid.org/{ORCID}"));
    assert!(g.has(&out.person, vivo::ORCID_ID, &orcid));
    assert!(g.has(&orcid, vivo::CONFIRMED_ORCID_ID, &out.person));
}

#[test]
fn skip_person_drops_only_person_and_name() {
    let full = run(&Subject::new(ORCID), &NoLookup);
    let skipped = run(
        &Subject {
            skip_person: true,
            ..Subject::new(ORCID)
        },
        &NoLookup,
    );
    let missing: Graph = full.graph.difference(&skipped.graph);
    assert!(skipped.graph.difference(&full.graph).is_empty());

    let person = &full.person;
    let ids = HashIdentifierStrategy::new(NS);
    let card = ids.identifier_for(vcard::INDIVIDUAL, &attrs("person_uri", person), None);
    let name_card = name_card_for(&ids, person);
    assert!(!missing.is_empty());
    for fact in &missing {
        assert!(
            [person, &card, &name_card].contains(&&fact.subject),
            "unexpected missing fact {fact:?}"
        );
    }
    // Other facts about the person stay.
    assert!(skipped.graph.has(person, vivo::FREETEXT_KEYWORD, Literal::plain("persistent identifiers")));
}

#[test]
fn shared_organization_declared_once() {
    let out = run(&Subject::new(ORCID), &NoLookup);
    let orgs = out
        .graph
        .subjects(rdf::TYPE, &Iri::from(foaf::ORGANIZATION).into())
        .count();
    assert_eq!(orgs, 2);
}

#[test]
fn lookup_failure_aborts_subject() {
    let profiles = Profiles(HashMap::from([(ORCID, PROFILE)]));
    let err = crosswalk_subject(
        &config(),
        &ProfileCrosswalker::default(),
        &profiles,
        &BrokenLookup,
        &Subject::new(ORCID),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LoadError::Fetch {
            source: FetchError::Status { code: 503, .. },
            ..
        }
    ));
}

#[test]
fn unknown_orcid_is_fetch_error() {
    let profiles = Profiles(HashMap::new());
    let err = crosswalk_subject(
        &config(),
        &ProfileCrosswalker::default(),
        &profiles,
        &NoLookup,
        &Subject::new("0000-0002-1825-0097"),
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::Fetch { .. }));
}
