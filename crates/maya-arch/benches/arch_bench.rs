use criterion::{criterion_group, criterion_main, Criterion};
use maya_arch::{SubsystemProcessingHandle, SubsystemTokens};
use maya_buffers::{BufferManager, EnforcementStrategy};
use maya_core::tokens::{BufferToken, NodeToken, TaskToken};
use maya_graph::{NodeGraph, NodeKind};
use maya_scheduler::Scheduler;

fn handle_scoped_node_process(c: &mut Criterion) {
    let mut buffer_manager = BufferManager::new(2, 512, 48_000.0, EnforcementStrategy::Ignore);
    let mut graph = NodeGraph::new();
    let mut scheduler = Scheduler::new(64);
    let tokens = SubsystemTokens::new(NodeToken::AudioRate, BufferToken::AUDIO_BACKEND, TaskToken::SampleAccurate);
    let mut handle =
        SubsystemProcessingHandle::new(&mut buffer_manager, &mut graph, &mut scheduler, 48_000.0, tokens).unwrap();
    let node = handle.nodes.create_node(NodeKind::sine(440.0, 1.0));

    c.bench_function("arch_handle_process_sample", |b| {
        b.iter(|| {
            handle.nodes.reset_processed_state();
            handle.nodes.process_sample(node).unwrap();
        });
    });
}

criterion_group!(benches, handle_scoped_node_process);
criterion_main!(benches);
