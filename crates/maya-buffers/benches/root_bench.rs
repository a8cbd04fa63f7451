use criterion::{criterion_group, criterion_main, Criterion};
use maya_buffers::{Buffer, EnforcementStrategy, RootBuffer};
use maya_core::tokens::BufferToken;

fn root_aggregation_pass(c: &mut Criterion) {
    let mut root = RootBuffer::new(512, BufferToken::AUDIO_BACKEND, EnforcementStrategy::Ignore);
    for _ in 0..4 {
        let mut child = Buffer::new(0, 512);
        child.data_mut().fill(0.3);
        root.add_child(child, BufferToken::AUDIO_BACKEND).unwrap();
    }
    root.write_node_output(&vec![0.2; 512]);

    c.bench_function("root_process_512_4children", |b| {
        b.iter(|| {
            root.write_node_output(&[0.2; 512]);
            root.process();
        });
    });
}

criterion_group!(benches, root_aggregation_pass);
criterion_main!(benches);
