use criterion::{criterion_group, criterion_main, Criterion};
use physics::{PhysicsSim, Ragdoll, RagdollConfig, Vec3};

fn bench_ragdoll_step(c: &mut Criterion) {
    c.bench_function("ragdoll_step", |b| {
        b.iter(|| {
            let mut sim = PhysicsSim::new();
            for i in 0..10 {
                #[allow(clippy::cast_precision_loss)]
                let x = i as f32 * 2.0;
                Ragdoll::build(&mut sim, Vec3::new(x, 0.0, 0.0), &RagdollConfig::default());
            }
            sim.run_cpu(1.0 / 60.0, 10).unwrap();
        })
    });
}

criterion_group!(benches, bench_ragdoll_step);
criterion_main!(benches);
