//! Works: publications and other research outputs.
//!
//! A work's metadata may come from three records: the Crossref lookup for its
//! DOI, the BibTeX citation stored with it, and the profile work itself.
//! Field-by-field choice between them is made by [`FieldResolver`]; this
//! module maps the chosen values to VIVO.
//!
//! Works whose type has no class in [`work_class`] are skipped, as are works
//! without any title (the title is part of the work's identity).
//!
//! [`FieldResolver`]: crate::resolve::FieldResolver

use std::sync::LazyLock;

use regex::Regex;

use crate::graph::{Graph, Iri, Literal};
use crate::identity::{Attributes, attrs};
use crate::resolve::{Contributor, ContributorRole, Resolved, SourceKind, Venue, WorkSources};
use crate::source::profile::Work;
use crate::source::{CitationRecord, OrcidProfile};
use crate::vocab::{bibo, foaf, obo, rdf, rdfs, skos, vivo};

use super::date::add_date;
use super::{CrosswalkContext, EntityCrosswalker};

static PAGE_RANGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" *-+ *").unwrap());

// ---------------------------------------------------------------------------
// Classification tables
// ---------------------------------------------------------------------------

/// Class of a work by its ORCID work type. `None` means the type is not
/// crosswalked.
pub fn work_class(work_type: &str) -> Option<&'static str> {
    Some(match work_type {
        "BOOK" => bibo::BOOK,
        "BOOK_CHAPTER" => bibo::CHAPTER,
        "BOOK_REVIEW" => bibo::REVIEW,
        "DICTIONARY_ENTRY" | "ENCYCLOPEDIA_ENTRY" => bibo::DOCUMENT_PART,
        "DISSERTATION" => bibo::THESIS,
        "EDITED_BOOK" => bibo::EDITED_BOOK,
        "JOURNAL_ARTICLE" => bibo::ACADEMIC_ARTICLE,
        "JOURNAL_ISSUE" => bibo::ISSUE_CLASS,
        "MAGAZINE_ARTICLE"
        | "NEWSLETTER_ARTICLE"
        | "NEWSPAPER_ARTICLE"
        | "SUPERVISED_STUDENT_PUBLICATION" => bibo::ARTICLE,
        "MANUAL" => bibo::MANUAL,
        "ONLINE_RESOURCE" | "WEBSITE" => bibo::WEBSITE,
        "REPORT" => bibo::REPORT,
        "RESEARCH_TOOL" | "TRANSLATION" | "OTHER" => bibo::DOCUMENT,
        "WORKING_PAPER" => vivo::WORKING_PAPER,
        "CONFERENCE_ABSTRACT" => vivo::ABSTRACT,
        "CONFERENCE_PAPER" => vivo::CONFERENCE_PAPER,
        "CONFERENCE_POSTER" => vivo::CONFERENCE_POSTER,
        "PATENT" => bibo::PATENT,
        "ARTISTIC_PERFORMANCE" => bibo::PERFORMANCE,
        "DATA_SET" => vivo::DATASET,
        "LECTURE_SPEECH" => vivo::SPEECH,
        "RESEARCH_TECHNIQUE" => obo::RESEARCH_TECHNIQUE,
        "STANDARDS_AND_POLICY" => bibo::STANDARD,
        _ => return None,
    })
}

/// Class of a work by its BibTeX entry type. Used to reclassify translations,
/// whose ORCID type says nothing about what was translated.
pub fn citation_class(entry_type: &str) -> Option<&'static str> {
    Some(match entry_type.to_lowercase().as_str() {
        "article" => bibo::ARTICLE,
        "book" => bibo::BOOK,
        "conference" | "proceedings" => vivo::CONFERENCE_PAPER,
        "manual" => bibo::MANUAL,
        "mastersthesis" | "phdthesis" => bibo::THESIS,
        "techreport" => bibo::REPORT,
        _ => return None,
    })
}

/// Venue class for periodical work types. Other types only get a venue
/// from Crossref, typed `bibo:Journal`.
pub fn venue_class(work_type: &str) -> Option<&'static str> {
    Some(match work_type {
        "JOURNAL_ARTICLE" | "SUPERVISED_STUDENT_PUBLICATION" => bibo::JOURNAL,
        "MAGAZINE_ARTICLE" => bibo::MAGAZINE,
        "NEWSLETTER_ARTICLE" => vivo::NEWSLETTER,
        "NEWSPAPER_ARTICLE" => bibo::NEWSPAPER,
        _ => return None,
    })
}

/// External identifier types with a predicate and, for some, a resolver URL
/// (`{id}` is replaced by the identifier).
const IDENTIFIERS: &[(&str, &str, Option<&str>)] = &[
    ("DOI", bibo::DOI, Some("http://dx.doi.org/{id}")),
    ("ASIN", bibo::ASIN, Some("http://www.amazon.com/dp/{id}")),
    ("OCLC", bibo::OCLCNUM, Some("http://www.worldcat.org/oclc/{id}")),
    ("LCCN", bibo::LCCN, None),
    ("PMC", vivo::PMCID, Some("http://www.ncbi.nlm.nih.gov/pmc/articles/{id}/")),
    ("PMID", bibo::PMID, Some("http://www.ncbi.nlm.nih.gov/pubmed/{id}")),
    ("ISSN", bibo::ISSN, None),
];

/// Where an external identifier goes on the work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierMapping {
    pub predicate: &'static str,
    pub url: Option<String>,
}

/// Map an external identifier of a work of `work_type` to its predicate and
/// resolver URL. Unknown types map to `None`.
pub fn identifier_predicate(kind: &str, value: &str, work_type: &str) -> Option<IdentifierMapping> {
    let predicate = match kind {
        "PAT" | "OTHER_ID" if work_type == "PATENT" => vivo::PATENT_NUMBER,
        "ISBN" if value.replace('-', "").len() <= 10 => bibo::ISBN10,
        "ISBN" => bibo::ISBN13,
        _ => {
            let &(_, predicate, template) = IDENTIFIERS.iter().find(|(k, _, _)| *k == kind)?;
            return Some(IdentifierMapping {
                predicate,
                url: template.map(|t| t.replace("{id}", value)),
            });
        }
    };
    Some(IdentifierMapping {
        predicate,
        url: None,
    })
}

/// Whether `url` is a resolver URL for one of the mapped identifier types.
/// Such URLs are already added through the identifier.
pub fn is_identifier_url(url: &str) -> bool {
    IDENTIFIERS
        .iter()
        .filter_map(|(_, _, template)| template.and_then(|t| t.split("{id}").next()))
        .any(|base| url.starts_with(base))
}

// ---------------------------------------------------------------------------
// Crosswalker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct WorksCrosswalker;

impl EntityCrosswalker for WorksCrosswalker {
    fn name(&self) -> &'static str {
        "works"
    }

    fn crosswalk(&self, ctx: &CrosswalkContext<'_>, profile: &OrcidProfile) -> Graph {
        let mut graph = Graph::new();
        for work in profile.works() {
            crosswalk_work(ctx, &mut graph, profile, work);
        }
        graph
    }
}

fn crosswalk_work(ctx: &CrosswalkContext<'_>, graph: &mut Graph, profile: &OrcidProfile, work: &Work) {
    let Some(work_type) = work.work_type() else {
        tracing::warn!(person = %ctx.person, "skipping work without type");
        return;
    };
    let Some(mut class) = work_class(work_type) else {
        tracing::debug!(work_type, "skipping unmapped work type");
        return;
    };

    let citation = work.bibtex().and_then(|raw| match ctx.citations.parse(raw) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unparseable citation");
            None
        }
    });
    let sources = WorkSources {
        profile: work,
        citation: citation.as_ref(),
        lookup: work.doi().and_then(|doi| ctx.lookups.get(doi)),
    };
    let resolver = ctx.resolver;

    let Some(title) = sources.title(resolver).value() else {
        tracing::warn!(work_type, "skipping work without title");
        return;
    };

    if work_type == "TRANSLATION"
        && let Some(translated) = citation.as_ref().and_then(|c| citation_class(&c.entry_type))
    {
        class = translated;
    }

    let work_iri = ctx.id(class, &attrs("name", title.as_str()));
    graph.add(&work_iri, rdf::TYPE, Iri::from(class));
    graph.add(&work_iri, rdfs::LABEL, Literal::plain(title.as_str()));

    if let Some(date) = sources.publication_date(resolver).value() {
        let date = add_date(ctx.ids, graph, &work_iri, "date", &date);
        graph.add(&work_iri, vivo::DATE_TIME_VALUE_PROP, date);
    }

    if let Some(lookup) = sources.lookup {
        for subject in lookup.subjects() {
            let concept = ctx.id(skos::CONCEPT, &attrs("name", subject));
            graph.add(&work_iri, vivo::HAS_SUBJECT_AREA, &concept);
            ctx.declare(graph, skos::CONCEPT, &concept, subject);
        }
    }

    let contributors = sources
        .contributors(resolver)
        .value()
        .unwrap_or_else(|| vec![Contributor::subject(default_role(work_type))]);
    for contributor in &contributors {
        add_contributor(ctx, graph, profile, &work_iri, work_type, contributor);
    }

    if let Some(publisher) = sources.publisher(resolver).value() {
        let org = ctx.organization(graph, &publisher);
        graph.add(&work_iri, vivo::PUBLISHER, &org);
    }
    if let Some(volume) = sources.volume(resolver).value() {
        graph.add(&work_iri, bibo::VOLUME, Literal::plain(volume));
    }
    if let Some(issue) = sources.issue(resolver).value() {
        graph.add(&work_iri, bibo::ISSUE, Literal::plain(issue));
    }
    if let Some(pages) = sources.pages(resolver).value() {
        add_pages(graph, &work_iri, &pages);
    }

    add_identifiers(ctx, graph, &work_iri, work, citation.as_ref(), work_type);

    let profile_url = work.url();
    if let Some(url) = profile_url.filter(|u| !is_identifier_url(u)) {
        ctx.url_card(graph, &work_iri, url);
    }
    if let Some(link) = citation.as_ref().and_then(|c| c.field("link"))
        && !is_identifier_url(link)
        && profile_url != Some(link)
    {
        ctx.url_card(graph, &work_iri, link);
    }

    let venue = sources.venue(resolver, venue_class(work_type).is_some());
    if let Resolved::Found { value, source } = venue {
        let class = venue_class(work_type).unwrap_or(bibo::JOURNAL);
        add_journal(ctx, graph, &work_iri, class, &value, source);
    }

    match work_type {
        "BOOK_CHAPTER" => {
            if let Some(book) = citation.as_ref().and_then(|c| c.field("booktitle")) {
                add_venue(ctx, graph, &work_iri, bibo::BOOK, book);
            }
        }
        "CONFERENCE_PAPER" => {
            let proceedings = citation
                .as_ref()
                .and_then(|c| c.field("journal"))
                .or_else(|| work.journal_title());
            if let Some(proceedings) = proceedings {
                add_venue(ctx, graph, &work_iri, bibo::PROCEEDINGS, proceedings);
            }
        }
        _ => {}
    }
}

/// Role of the subject on a work that names no contributors.
fn default_role(work_type: &str) -> ContributorRole {
    match work_type {
        "EDITED_BOOK" => ContributorRole::Editor,
        "TRANSLATION" => ContributorRole::Translator,
        _ => ContributorRole::Author,
    }
}

fn add_contributor(
    ctx: &CrosswalkContext<'_>,
    graph: &mut Graph,
    profile: &OrcidProfile,
    work: &Iri,
    work_type: &str,
    contributor: &Contributor,
) {
    let subject_family = profile.family_name().map(str::to_lowercase);
    let person = match contributor.family.as_deref() {
        None => ctx.person.clone(),
        Some(family) if subject_family.as_deref() == Some(family.to_lowercase().as_str()) => {
            ctx.person.clone()
        }
        Some(family) => {
            let given = contributor.given.as_deref();
            let iri = ctx.id(
                foaf::PERSON,
                &Attributes::new()
                    .with("first_name", given)
                    .with("surname", family),
            );
            let label: Vec<&str> = given.into_iter().chain([family]).collect();
            ctx.declare(graph, foaf::PERSON, &iri, &label.join(" "));
            iri
        }
    };

    if contributor.role == ContributorRole::Translator {
        graph.add(&person, bibo::TRANSLATOR, work);
        return;
    }
    if work_type == "PATENT" {
        graph.add(&person, vivo::ASSIGNEE_FOR, work);
        return;
    }
    let ship_class = match contributor.role {
        ContributorRole::Editor => vivo::EDITORSHIP,
        _ => vivo::AUTHORSHIP,
    };
    let ship = ctx.id(
        ship_class,
        &Attributes::new().with("contributor", &person).with("work", work),
    );
    graph.add(&ship, rdf::TYPE, Iri::from(ship_class));
    graph.add(&ship, vivo::RELATES, work);
    graph.add(&ship, vivo::RELATES, &person);
}

/// Only ranges are recorded; a lone page number is too ambiguous.
fn add_pages(graph: &mut Graph, work: &Iri, pages: &str) {
    if !pages.contains('-') {
        return;
    }
    let mut parts = PAGE_RANGE.splitn(pages, 2).map(str::trim);
    if let Some(start) = parts.next().filter(|p| !p.is_empty()) {
        graph.add(work, bibo::PAGE_START, Literal::plain(start));
    }
    if let Some(end) = parts.next().filter(|p| !p.is_empty()) {
        graph.add(work, bibo::PAGE_END, Literal::plain(end));
    }
}

fn add_identifiers(
    ctx: &CrosswalkContext<'_>,
    graph: &mut Graph,
    work_iri: &Iri,
    work: &Work,
    citation: Option<&CitationRecord>,
    work_type: &str,
) {
    let mut ids: Vec<(&str, &str)> = Vec::new();
    for (kind, value) in work.external_ids() {
        if !ids.iter().any(|(k, _)| *k == kind) {
            ids.push((kind, value));
        }
    }
    // The citation fills in identifiers the profile lacks.
    if let Some(citation) = citation {
        for (kind, field) in [("DOI", "doi"), ("ISBN", "isbn")] {
            if let Some(value) = citation.field(field)
                && !ids.iter().any(|(k, _)| *k == kind)
            {
                ids.push((kind, value));
            }
        }
    }

    for (kind, value) in ids {
        let Some(mapping) = identifier_predicate(kind, value, work_type) else {
            continue;
        };
        graph.add(work_iri, mapping.predicate, Literal::plain(value));
        if let Some(url) = mapping.url {
            ctx.url_card(graph, work_iri, &url);
        }
    }
}

/// Periodical venue. ISSNs from Crossref are part of the venue's identity so
/// that journals sharing a name stay apart.
fn add_journal(
    ctx: &CrosswalkContext<'_>,
    graph: &mut Graph,
    work: &Iri,
    class: &str,
    venue: &Venue,
    source: SourceKind,
) {
    let mut identity = attrs("name", venue.name.as_str());
    if source == SourceKind::Lookup && !venue.issns.is_empty() {
        identity.insert("issn", venue.issns.join(" "));
    }
    let journal = ctx.id(class, &identity);
    graph.add(work, vivo::HAS_PUBLICATION_VENUE, &journal);
    if ctx.create.should_create(class, &journal) {
        ctx.declare(graph, class, &journal, &venue.name);
        for issn in &venue.issns {
            graph.add(&journal, bibo::ISSN, Literal::plain(issn.as_str()));
        }
    }
}

fn add_venue(ctx: &CrosswalkContext<'_>, graph: &mut Graph, work: &Iri, class: &str, name: &str) {
    let venue = ctx.id(class, &attrs("name", name));
    graph.add(work, vivo::HAS_PUBLICATION_VENUE, &venue);
    ctx.declare(graph, class, &venue, name);
}
