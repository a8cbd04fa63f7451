use criterion::{criterion_group, criterion_main, Criterion};
use maya_core::tokens::TaskToken;
use maya_core::Clock;
use maya_scheduler::{metro, Scheduler};

fn dispatch_many_routines(c: &mut Criterion) {
    let mut scheduler = Scheduler::new(64);
    scheduler.set_clock(TaskToken::SampleAccurate, Clock::new(48_000.0));
    for _ in 0..256 {
        let routine = metro(TaskToken::SampleAccurate, 64, |_| {});
        scheduler.add_task(routine, None, true);
    }

    c.bench_function("scheduler_process_token_256_routines", |b| {
        b.iter(|| {
            scheduler.process_token(TaskToken::SampleAccurate, 64).unwrap();
        });
    });
}

criterion_group!(benches, dispatch_many_routines);
criterion_main!(benches);
