//! Benchmarks for bending force operations.

use criterion::{criterion_group, criterion_main, Criterion};
use helfrich::mesh::primitives;
use helfrich::prelude::*;

fn sphere(subdivisions: usize) -> (MeshTopology, ParticleData) {
    let soup = primitives::icosphere(subdivisions, 10.0);
    let topology: MeshTopology = soup.to_topology().unwrap();
    (topology, ParticleData::new(soup.positions))
}

fn bench_topology_construction(c: &mut Criterion) {
    let soup = primitives::icosphere(4, 1.0);

    c.bench_function("build_icosphere_4", |b| {
        b.iter(|| soup.to_topology::<u32>().unwrap());
    });
}

fn bench_curvature(c: &mut Criterion) {
    let (topology, particles) = sphere(4);
    let bx = PeriodicBox::open();

    for (name, options) in [
        ("precompute_sequential", HelfrichOptions::sequential()),
        ("precompute_parallel", HelfrichOptions::default()),
    ] {
        c.bench_function(name, |b| {
            b.iter(|| {
                helfrich::algo::helfrich::precompute_curvature(&topology, &particles, &bx, &options)
                    .unwrap()
            });
        });
    }
}

fn bench_forces(c: &mut Criterion) {
    let (topology, particles) = sphere(4);
    let bx = PeriodicBox::cube(100.0).unwrap();

    let cases = [
        ("forces_pair_local_sequential", HelfrichOptions::sequential()),
        ("forces_pair_local_parallel", HelfrichOptions::default()),
        (
            "forces_full_gradient_parallel",
            HelfrichOptions::default().with_scheme(ForceScheme::FullGradient),
        ),
    ];

    for (name, options) in cases {
        let mut force = HelfrichForce::with_options(topology.clone(), options).unwrap();
        force.set_params("mesh", 20.0).unwrap();
        let mut output = ForceOutput::zeroed(particles.num_slots());

        c.bench_function(name, |b| {
            b.iter(|| {
                output.clear();
                force.compute(&particles, &bx, &mut output).unwrap()
            });
        });
    }
}

criterion_group!(benches, bench_topology_construction, bench_curvature, bench_forces);
criterion_main!(benches);
