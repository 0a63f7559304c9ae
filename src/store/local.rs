//! In-process triple store backed by oxigraph.
//!
//! Applies the same fact sets a remote endpoint would receive, so a whole
//! sync can run without a VIVO instance and the result can be read back.

use oxigraph::model::{GraphNameRef, NamedNode, Quad};
use oxigraph::store::Store;

use crate::error::{StoreError, StoreResult};
use crate::graph::rdf::{from_term, named_node, to_triple};
use crate::graph::{Fact, Graph, Iri};

use super::TripleStore;

pub struct OxigraphStore {
    store: Store,
    graph: NamedNode,
}

impl OxigraphStore {
    /// Create an empty in-memory store writing to the named graph `graph`.
    pub fn in_memory(graph: &str) -> StoreResult<Self> {
        let store = Store::new().map_err(|e| StoreError::Local {
            message: format!("failed to create oxigraph store: {e}"),
        })?;
        let graph = named_node(&Iri::from(graph)).map_err(|e| StoreError::Local {
            message: e.to_string(),
        })?;
        Ok(Self { store, graph })
    }

    fn quads(&self, facts: &Graph) -> StoreResult<Vec<Quad>> {
        facts
            .iter()
            .map(|fact| {
                to_triple(fact)
                    .map(|t| t.in_graph(self.graph.clone()))
                    .map_err(|e| StoreError::Local {
                        message: e.to_string(),
                    })
            })
            .collect()
    }

    pub fn contains(&self, fact: &Fact) -> StoreResult<bool> {
        let quad = self.quads(&Graph::from_iter([fact.clone()]))?;
        let Some(quad) = quad.first() else {
            return Ok(false);
        };
        self.store.contains(quad).map_err(|e| StoreError::Local {
            message: format!("contains failed: {e}"),
        })
    }

    /// Number of statements in the target graph.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.graph()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Read back the target graph. Statements with blank nodes are skipped.
    pub fn graph(&self) -> StoreResult<Graph> {
        let mut graph = Graph::new();
        let name = GraphNameRef::NamedNode(self.graph.as_ref());
        for quad in self.store.quads_for_pattern(None, None, None, Some(name)) {
            let quad = quad.map_err(|e| StoreError::Local {
                message: format!("read failed: {e}"),
            })?;
            let subject = quad.subject.to_string();
            let Some(subject) = subject.strip_prefix('<').and_then(|s| s.strip_suffix('>')) else {
                continue;
            };
            let Some(object) = from_term(&quad.object) else {
                continue;
            };
            graph.insert(Fact {
                subject: Iri::from(subject),
                predicate: Iri::from(quad.predicate.as_str()),
                object,
            });
        }
        Ok(graph)
    }
}

impl TripleStore for OxigraphStore {
    fn insert(&self, facts: &Graph) -> StoreResult<()> {
        let quads = self.quads(facts)?;
        self.store.extend(quads).map_err(|e| StoreError::Local {
            message: format!("insert failed: {e}"),
        })
    }

    fn delete(&self, facts: &Graph) -> StoreResult<()> {
        for quad in self.quads(facts)? {
            self.store.remove(&quad).map_err(|e| StoreError::Local {
                message: format!("delete failed: {e}"),
            })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for OxigraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OxigraphStore")
            .field("graph", &self.graph.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Literal;
    use crate::vocab::{rdfs, vivo};

    const GRAPH: &str = "http://vitro.mannlib.cornell.edu/default/vitro-kb-2";

    fn sample() -> Graph {
        let mut g = Graph::new();
        let s = Iri::from("http://vivo.example.edu/individual/grant-1");
        g.add(&s, rdfs::LABEL, Literal::plain("Persistent \"Identifiers\""));
        g.add(&s, vivo::TOTAL_AWARD_AMOUNT, Literal::plain("$1,500,000"));
        g.add(&s, vivo::DATE_TIME, Literal::date_time("2012-09-01T00:00:00"));
        g
    }

    #[test]
    fn insert_then_read_back() {
        let store = OxigraphStore::in_memory(GRAPH).unwrap();
        assert!(store.is_empty().unwrap());
        store.insert(&sample()).unwrap();
        assert_eq!(store.len().unwrap(), 3);
        assert_eq!(store.graph().unwrap(), sample());
    }

    #[test]
    fn insert_and_delete_are_idempotent() {
        let store = OxigraphStore::in_memory(GRAPH).unwrap();
        store.insert(&sample()).unwrap();
        store.insert(&sample()).unwrap();
        assert_eq!(store.len().unwrap(), 3);

        let fact = sample().iter().next().unwrap().clone();
        let one = Graph::from_iter([fact.clone()]);
        store.delete(&one).unwrap();
        store.delete(&one).unwrap();
        assert!(!store.contains(&fact).unwrap());
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn invalid_iri_writes_nothing() {
        let store = OxigraphStore::in_memory(GRAPH).unwrap();
        let mut bad = sample();
        bad.add(&Iri::from("not an iri"), rdfs::LABEL, Literal::plain("x"));
        assert!(matches!(store.insert(&bad), Err(StoreError::Local { .. })));
        assert!(store.is_empty().unwrap());
    }
}
