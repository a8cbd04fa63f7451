use criterion::{criterion_group, criterion_main, Criterion};
use maya_core::tokens::NodeToken;
use maya_graph::{NodeGraph, NodeKind};

fn process_block_with_modulator(c: &mut Criterion) {
    let mut graph = NodeGraph::new();
    let modulator = graph.create_node(NodeKind::sine(2.0, 1.0), NodeToken::AudioRate);
    let carrier = graph.create_node(NodeKind::sine(440.0, 1.0), NodeToken::AudioRate);
    graph.connect_modulator(carrier, modulator).unwrap();

    let mut out = vec![0.0f64; 512];
    c.bench_function("process_block_512_with_modulator", |b| {
        b.iter(|| {
            graph.process_block(carrier, &mut out, 48_000.0).unwrap();
        });
    });
}

criterion_group!(benches, process_block_with_modulator);
criterion_main!(benches);
