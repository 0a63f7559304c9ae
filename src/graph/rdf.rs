//! Conversion between [`Fact`]s and oxigraph's RDF model.
//!
//! N-Triples output goes through oxigraph's `Display` impls so literal
//! escaping follows the RDF standard rather than ad-hoc string formatting.

use oxigraph::model::{Literal as RdfLiteral, NamedNode, Term, Triple};

use crate::error::{GraphError, GraphResult};
use crate::vocab::xsd;

use super::{Fact, Graph, Iri, Literal, Object};

/// Convert an IRI to an oxigraph named node, validating it.
pub fn named_node(iri: &Iri) -> GraphResult<NamedNode> {
    NamedNode::new(iri.as_str()).map_err(|e| GraphError::InvalidIri {
        iri: iri.as_str().to_string(),
        message: e.to_string(),
    })
}

fn literal(lit: &Literal) -> GraphResult<RdfLiteral> {
    Ok(match &lit.datatype {
        Some(datatype) => RdfLiteral::new_typed_literal(lit.value.as_str(), named_node(datatype)?),
        None => RdfLiteral::new_simple_literal(lit.value.as_str()),
    })
}

fn term(object: &Object) -> GraphResult<Term> {
    Ok(match object {
        Object::Iri(iri) => named_node(iri)?.into(),
        Object::Literal(lit) => literal(lit)?.into(),
    })
}

/// Convert a fact to an oxigraph triple.
pub fn to_triple(fact: &Fact) -> GraphResult<Triple> {
    Ok(Triple::new(
        named_node(&fact.subject)?,
        named_node(&fact.predicate)?,
        term(&fact.object)?,
    ))
}

/// Convert an oxigraph term back to an object. Blank nodes have no
/// counterpart in the fact model and yield `None`.
pub fn from_term(term: &Term) -> Option<Object> {
    match term {
        Term::NamedNode(node) => Some(Object::Iri(Iri::from(node.as_str()))),
        Term::Literal(lit) => {
            let datatype = lit.datatype();
            let datatype = (lit.language().is_none() && datatype.as_str() != xsd::STRING)
                .then(|| Iri::from(datatype.as_str()));
            Some(Object::Literal(Literal {
                value: lit.value().to_string(),
                datatype,
            }))
        }
        _ => None,
    }
}

/// Serialize facts as N-Triples, one statement per line.
pub fn to_ntriples<'a>(facts: impl IntoIterator<Item = &'a Fact>) -> GraphResult<String> {
    let mut out = String::new();
    for fact in facts {
        out.push_str(&to_triple(fact)?.to_string());
        out.push_str(" .\n");
    }
    Ok(out)
}

impl Graph {
    /// Serialize the whole graph as N-Triples.
    pub fn to_ntriples(&self) -> GraphResult<String> {
        to_ntriples(self)
    }
}
