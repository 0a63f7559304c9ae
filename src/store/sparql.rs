//! VIVO SPARQL Update endpoint.
//!
//! VIVO's `/api/sparqlUpdate` takes a form-encoded POST with the root
//! account's `email` and `password` next to the `update` text. Each insert or
//! delete is one `INSERT DATA`/`DELETE DATA` request against the target
//! named graph, which the endpoint applies as a unit.

use std::time::Duration;

use crate::error::{StoreError, StoreResult};
use crate::graph::Graph;

use super::TripleStore;

#[derive(Clone)]
pub struct SparqlUpdateStore {
    endpoint: String,
    email: String,
    password: String,
    graph: String,
    agent: ureq::Agent,
}

impl std::fmt::Debug for SparqlUpdateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparqlUpdateStore")
            .field("endpoint", &self.endpoint)
            .field("email", &self.email)
            .field("graph", &self.graph)
            .finish_non_exhaustive()
    }
}

/// Build the update text for one operation (`"INSERT DATA"` or
/// `"DELETE DATA"`). Returns `None` for an empty graph.
pub fn update_text(operation: &str, graph: &str, facts: &Graph) -> StoreResult<Option<String>> {
    if facts.is_empty() {
        return Ok(None);
    }
    let body = facts.to_ntriples().map_err(|e| StoreError::Serialization {
        message: e.to_string(),
    })?;
    Ok(Some(format!("{operation} {{ GRAPH <{graph}> {{\n{body}}} }}")))
}

impl SparqlUpdateStore {
    pub fn new(
        endpoint: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        graph: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            email: email.into(),
            password: password.into(),
            graph: graph.into(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, update: &str) -> StoreResult<()> {
        let result = self.agent.post(&self.endpoint).send_form(&[
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
            ("update", update),
        ]);
        match result {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(StoreError::Remote {
                    endpoint: self.endpoint.clone(),
                    message: format!("HTTP {code}: {}", body.trim()),
                })
            }
            Err(ureq::Error::Transport(t)) => Err(StoreError::Remote {
                endpoint: self.endpoint.clone(),
                message: t.to_string(),
            }),
        }
    }

    fn apply(&self, operation: &str, facts: &Graph) -> StoreResult<()> {
        let Some(update) = update_text(operation, &self.graph, facts)? else {
            return Ok(());
        };
        tracing::debug!(endpoint = %self.endpoint, operation, facts = facts.len(), "posting SPARQL update");
        self.post(&update)
    }
}

impl TripleStore for SparqlUpdateStore {
    fn insert(&self, facts: &Graph) -> StoreResult<()> {
        self.apply("INSERT DATA", facts)
    }

    fn delete(&self, facts: &Graph) -> StoreResult<()> {
        self.apply("DELETE DATA", facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Iri, Literal};
    use crate::vocab::rdfs;

    const GRAPH: &str = "http://vitro.mannlib.cornell.edu/default/vitro-kb-2";

    #[test]
    fn empty_graph_sends_nothing() {
        assert_eq!(update_text("INSERT DATA", GRAPH, &Graph::new()).unwrap(), None);
        // No request is made, so an unreachable endpoint does not matter.
        let store = SparqlUpdateStore::new("http://127.0.0.1:9/api", "root", "pw", GRAPH, Duration::from_millis(50));
        store.insert(&Graph::new()).unwrap();
        store.delete(&Graph::new()).unwrap();
    }

    #[test]
    fn update_wraps_ntriples_in_named_graph() {
        let mut g = Graph::new();
        g.add(&Iri::from("http://x/a"), rdfs::LABEL, Literal::plain("A"));
        let text = update_text("DELETE DATA", GRAPH, &g).unwrap().unwrap();
        assert_eq!(
            text,
            "DELETE DATA { GRAPH <http://vitro.mannlib.cornell.edu/default/vitro-kb-2> {\n\
             <http://x/a> <http://www.w3.org/2000/01/rdf-schema#label> \"A\" .\n} }"
        );
    }

    #[test]
    fn unreachable_endpoint_is_remote_error() {
        let mut g = Graph::new();
        g.add(&Iri::from("http://x/a"), rdfs::LABEL, Literal::plain("A"));
        let store = SparqlUpdateStore::new("http://127.0.0.1:9/api", "root", "pw", GRAPH, Duration::from_millis(200));
        let err = store.insert(&g).unwrap_err();
        assert!(matches!(err, StoreError::Remote { ref endpoint, .. } if endpoint == "http://127.0.0.1:9/api"));
    }

    #[test]
    fn debug_hides_password() {
        let store = SparqlUpdateStore::new("http://x/api", "root", "secret", GRAPH, Duration::from_secs(1));
        assert!(!format!("{store:?}").contains("secret"));
    }
}
