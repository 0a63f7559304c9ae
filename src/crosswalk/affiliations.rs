//! Education: organization, educational process, awarded degree.
//!
//! Employment affiliations are not crosswalked.

use crate::graph::{Graph, Iri, Literal};
use crate::identity::{Attributes, attrs};
use crate::source::OrcidProfile;
use crate::source::non_empty;
use crate::source::profile::{Affiliation, FuzzyDate};
use crate::vocab::{foaf, obo, rdf, rdfs, vivo};

use super::date::{DateParts, add_date_interval};
use super::{CrosswalkContext, EntityCrosswalker};

#[derive(Debug, Clone, Copy, Default)]
pub struct AffiliationsCrosswalker;

impl EntityCrosswalker for AffiliationsCrosswalker {
    fn name(&self) -> &'static str {
        "affiliations"
    }

    fn crosswalk(&self, ctx: &CrosswalkContext<'_>, profile: &OrcidProfile) -> Graph {
        let mut graph = Graph::new();
        for affiliation in profile.affiliations().iter().filter(|a| a.is_education()) {
            education(ctx, &mut graph, affiliation);
        }
        graph
    }
}

fn education(ctx: &CrosswalkContext<'_>, graph: &mut Graph, affiliation: &Affiliation) {
    let Some(org_name) = affiliation.organization_name() else {
        tracing::warn!(person = %ctx.person, "skipping education without organization name");
        return;
    };
    let degree = affiliation.degree();

    let org = ctx.id(foaf::ORGANIZATION, &attrs("name", org_name));
    if ctx.create.should_create(foaf::ORGANIZATION, &org) {
        ctx.declare(graph, foaf::ORGANIZATION, &org, org_name);
        location(ctx, graph, &org, affiliation);
    }

    // Dates stay out of the identity so that editing them keeps the process.
    let process = ctx.id(
        vivo::EDUCATIONAL_PROCESS,
        &Attributes::new()
            .with("person", &ctx.person)
            .with("organization_name", org_name)
            .with("degree_name", degree),
    );
    graph.add(&process, rdf::TYPE, Iri::from(vivo::EDUCATIONAL_PROCESS));
    graph.add(&process, obo::HAS_PARTICIPANT, &org);
    graph.add(&process, obo::HAS_PARTICIPANT, &ctx.person);
    if let Some(department) = affiliation.department() {
        graph.add(&process, vivo::DEPARTMENT_OR_SCHOOL, Literal::plain(department));
    }

    let start = year_of(affiliation.start_date.as_ref());
    let end = year_of(affiliation.end_date.as_ref());
    add_date_interval(ctx.ids, graph, &process, start.as_ref(), end.as_ref());

    let Some(degree) = degree else {
        return;
    };
    let awarded = ctx.id(vivo::AWARDED_DEGREE, &attrs("educational_process", &process));
    graph.add(&awarded, rdf::TYPE, Iri::from(vivo::AWARDED_DEGREE));
    graph.add(&awarded, rdfs::LABEL, Literal::plain(degree));
    graph.add(&awarded, vivo::ASSIGNED_BY, &org);
    graph.add(&awarded, obo::SPECIFIED_OUTPUT_OF, &process);

    let academic = ctx.id(vivo::ACADEMIC_DEGREE, &attrs("name", degree));
    graph.add(&awarded, vivo::RELATES, &academic);
    ctx.declare(graph, vivo::ACADEMIC_DEGREE, &academic, degree);

    graph.add(&awarded, vivo::RELATES, &ctx.person);
}

fn location(ctx: &CrosswalkContext<'_>, graph: &mut Graph, org: &Iri, affiliation: &Affiliation) {
    let Some(address) = affiliation
        .organization
        .as_ref()
        .and_then(|o| o.address.as_ref())
    else {
        return;
    };
    let city = address.city.as_deref().and_then(non_empty);
    let region = address.region.as_deref().and_then(non_empty);
    let label: Vec<&str> = city.into_iter().chain(region).collect();
    if label.is_empty() {
        return;
    }
    let geo = ctx.id(
        vivo::GEOGRAPHIC_LOCATION,
        &Attributes::new().with("city", city).with("region", region),
    );
    graph.add(&geo, rdf::TYPE, Iri::from(vivo::GEOGRAPHIC_LOCATION));
    graph.add(org, obo::LOCATED_IN, &geo);
    graph.add(&geo, rdfs::LABEL, Literal::plain(label.join(", ")));
}

/// Education dates are crosswalked to year precision.
fn year_of(date: Option<&FuzzyDate>) -> Option<DateParts> {
    DateParts::parse(date?.year(), None, None)
}
