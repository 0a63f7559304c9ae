//! Benchmarks for identifier minting, snapshot diffing, and N-Triples output.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use orcid_vivo::graph::{Graph, GraphDelta, Iri, Literal};
use orcid_vivo::identity::{Attributes, HashIdentifierStrategy, IdentifierStrategy};
use orcid_vivo::vocab::{bibo, rdf, rdfs, vivo};

const NS: &str = "http://vivo.example.edu/individual/";

fn works(ids: &HashIdentifierStrategy, count: usize, offset: usize) -> Graph {
    let mut graph = Graph::new();
    for i in offset..offset + count {
        let work = ids.identifier_for(
            bibo::ACADEMIC_ARTICLE,
            &Attributes::new().with("name", format!("Work {i}")),
            None,
        );
        graph.add(&work, rdf::TYPE, Iri::from(bibo::ACADEMIC_ARTICLE));
        graph.add(&work, rdfs::LABEL, Literal::plain(format!("Work {i}")));
        graph.add(&work, bibo::DOI, Literal::plain(format!("10.1000/{i}")));
    }
    graph
}

fn bench_mint(c: &mut Criterion) {
    let ids = HashIdentifierStrategy::new(NS);
    let attrs = Attributes::new()
        .with("person", "http://vivo.example.edu/individual/person-1")
        .with("organization_name", "Brown University")
        .with("degree_name", "PhD");

    c.bench_function("mint_identifier", |bench| {
        bench.iter(|| black_box(ids.identifier_for(vivo::EDUCATIONAL_PROCESS, &attrs, None)))
    });
}

fn bench_delta(c: &mut Criterion) {
    let ids = HashIdentifierStrategy::new(NS);
    let previous = works(&ids, 1000, 0);
    let next = works(&ids, 1000, 50);

    c.bench_function("delta_3k_facts", |bench| {
        bench.iter(|| black_box(GraphDelta::compute(&previous, &next)))
    });
}

fn bench_ntriples(c: &mut Criterion) {
    let ids = HashIdentifierStrategy::new(NS);
    let graph = works(&ids, 1000, 0);

    c.bench_function("ntriples_3k_facts", |bench| {
        bench.iter(|| black_box(graph.to_ntriples().unwrap()))
    });
}

criterion_group!(benches, bench_mint, bench_delta, bench_ntriples);
criterion_main!(benches);
