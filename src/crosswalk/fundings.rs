//! Funding: grants, the subject's PI role, awarding organization.

use crate::graph::{Graph, Iri, Literal};
use crate::identity::attrs;
use crate::source::OrcidProfile;
use crate::source::non_empty;
use crate::source::profile::{Funding, FuzzyDate, text};
use crate::vocab::{obo, rdf, rdfs, vivo};

use super::date::{DateParts, add_date_interval};
use super::{CrosswalkContext, EntityCrosswalker};

#[derive(Debug, Clone, Copy, Default)]
pub struct FundingsCrosswalker;

impl EntityCrosswalker for FundingsCrosswalker {
    fn name(&self) -> &'static str {
        "fundings"
    }

    fn crosswalk(&self, ctx: &CrosswalkContext<'_>, profile: &OrcidProfile) -> Graph {
        let mut graph = Graph::new();
        for funding in profile.fundings().iter().filter(|f| f.is_grant()) {
            grant(ctx, &mut graph, funding);
        }
        graph
    }
}

fn grant(ctx: &CrosswalkContext<'_>, graph: &mut Graph, funding: &Funding) {
    let Some(title) = funding.title() else {
        tracing::warn!(person = %ctx.person, "skipping grant without title");
        return;
    };
    let person = &ctx.person;

    let grant = ctx.id(vivo::GRANT, &attrs("title", title));
    graph.add(&grant, rdf::TYPE, Iri::from(vivo::GRANT));
    graph.add(&grant, vivo::RELATES, person);
    graph.add(&grant, rdfs::LABEL, Literal::plain(title));

    let role = ctx.id(vivo::PRINCIPAL_INVESTIGATOR_ROLE, &attrs("grant_uri", &grant));
    graph.add(&role, rdf::TYPE, Iri::from(vivo::PRINCIPAL_INVESTIGATOR_ROLE));
    graph.add(&role, obo::INHERES_IN, person);
    graph.add(&role, vivo::RELATED_BY, &grant);

    let start = date_of(funding.start_date.as_ref());
    let end = date_of(funding.end_date.as_ref());
    add_date_interval(ctx.ids, graph, &grant, start.as_ref(), end.as_ref());

    if let Some(amount) = funding.amount() {
        match award_amount(amount) {
            Some(formatted) => {
                graph.add(&grant, vivo::TOTAL_AWARD_AMOUNT, Literal::plain(formatted));
            }
            None => tracing::warn!(grant = %grant, amount, "ignoring non-integer award amount"),
        }
    }

    if let Some(name) = funding.organization_name() {
        let org = ctx.organization(graph, name);
        graph.add(&grant, vivo::ASSIGNED_BY, &org);
    }

    for id in funding.external_ids() {
        if let Some(value) = id.funding_external_identifier_value.as_deref().and_then(non_empty) {
            graph.add(&grant, vivo::SPONSOR_AWARD_ID, Literal::plain(value));
        }
        if let Some(url) = text(&id.funding_external_identifier_url) {
            ctx.url_card(graph, &grant, url);
        }
    }
}

fn date_of(date: Option<&FuzzyDate>) -> Option<DateParts> {
    let date = date?;
    DateParts::parse(date.year(), date.month(), date.day())
}

/// Whole-dollar amount with thousands separators: `"1500000"` to `"$1,500,000"`.
pub fn award_amount(value: &str) -> Option<String> {
    let amount: i64 = value.trim().parse().ok()?;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    Some(format!("{sign}${grouped}"))
}
