// cargo bench --bench fk
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kdiff::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_angles(batch_size: usize, dof: usize) -> DMatrix<f64> {
    let mut rng = StdRng::seed_from_u64(batch_size as u64);
    DMatrix::from_fn(batch_size, dof, |_, _| rng.gen_range(-3.0..3.0))
}

fn sample_chain(parallelism: Parallelism) -> Chain<f64> {
    let robot = urdf_rs::read_file("urdf/sample.urdf").unwrap();
    let config = KinematicsConfig::new().parallelism(parallelism);
    Chain::from_description_with_config(&ChainDescription::from(&robot), config).unwrap()
}

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward");
    for parallelism in [Parallelism::Sequential, Parallelism::Rayon] {
        let chain = sample_chain(parallelism);
        let fk = ForwardKinematics::with_links(&chain, &["camera", "slider_link"]).unwrap();
        for batch_size in [1, 64, 1024] {
            let angles = random_angles(batch_size, chain.dof());
            group.bench_with_input(
                BenchmarkId::new(parallelism.to_string(), batch_size),
                &angles,
                |b, angles| b.iter(|| fk.forward(black_box(angles)).unwrap()),
            );
        }
    }
    group.finish();
}

fn bench_jacobian(c: &mut Criterion) {
    let mut group = c.benchmark_group("jacobian");
    for parallelism in [Parallelism::Sequential, Parallelism::Rayon] {
        let chain = sample_chain(parallelism);
        let fk = chain.kinematics();
        for batch_size in [1, 1024] {
            let angles = random_angles(batch_size, chain.dof());
            group.bench_with_input(
                BenchmarkId::new(parallelism.to_string(), batch_size),
                &angles,
                |b, angles| b.iter(|| fk.jacobian(black_box(angles)).unwrap()),
            );
        }
    }
    group.finish();
}

fn bench_gradient(c: &mut Criterion) {
    let chain = sample_chain(Parallelism::Rayon);
    let fk = ForwardKinematics::with_links(&chain, &["camera"]).unwrap();
    let batch_size = 1024;
    let angles = random_angles(batch_size, chain.dof());
    let state = fk.forward_state(&angles).unwrap();
    let upstream = vec![vec![Matrix3x4::from_element(0.1); batch_size]];
    c.bench_function("gradient/1024", |b| {
        b.iter(|| fk.gradient(black_box(&state), black_box(&upstream)).unwrap())
    });
}

criterion_group!(benches, bench_forward, bench_jacobian, bench_gradient);
criterion_main!(benches);
