//! Property-based tests for bending forces.
//!
//! These tests perturb a small icosphere at random and check invariants that
//! must hold for any membrane shape.
//!
//! Run with: cargo test --test proptest_forces

use helfrich::mesh::primitives;
use helfrich::nalgebra::{Point3, Vector3};
use helfrich::prelude::*;
use proptest::prelude::*;

const RADIUS: f64 = 2.0;

// =============================================================================
// Strategies
// =============================================================================

fn sphere_soup() -> TriangleSoup {
    primitives::icosphere(1, RADIUS)
}

/// Per-vertex displacements small enough to keep every triangle well formed.
fn arb_jitter() -> impl Strategy<Value = Vec<[f64; 3]>> {
    let n = sphere_soup().positions.len();
    prop::collection::vec(prop::array::uniform3(-0.08..0.08f64), n)
}

fn arb_permutation() -> impl Strategy<Value = Vec<usize>> {
    let n = sphere_soup().positions.len();
    Just((0..n).collect::<Vec<_>>()).prop_shuffle()
}

fn arb_scheme() -> impl Strategy<Value = ForceScheme> {
    prop_oneof![Just(ForceScheme::PairLocal), Just(ForceScheme::FullGradient)]
}

// =============================================================================
// Helpers
// =============================================================================

fn bumpy_sphere(jitter: &[[f64; 3]]) -> (MeshTopology, Vec<Point3<f64>>) {
    let soup = sphere_soup();
    let topology = soup.to_topology().unwrap();
    let positions = soup
        .positions
        .iter()
        .zip(jitter)
        .map(|(p, j)| *p + Vector3::new(j[0], j[1], j[2]))
        .collect();
    (topology, positions)
}

fn forces<B: MinImage>(
    topology: &MeshTopology,
    particles: &ParticleData,
    bx: &B,
    kappa: f64,
    options: HelfrichOptions,
) -> ForceOutput {
    let mut force = HelfrichForce::with_options(topology.clone(), options).unwrap();
    force.set_params("mesh", kappa).unwrap();
    force.evaluate(particles, bx).unwrap()
}

fn wrap(x: f64, l: f64) -> f64 {
    x - l * (x / l).floor()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every bond's forces sum to zero, so the total force vanishes.
    #[test]
    fn net_force_vanishes(jitter in arb_jitter(), scheme in arb_scheme()) {
        let (topology, positions) = bumpy_sphere(&jitter);
        let particles = ParticleData::new(positions);
        let options = HelfrichOptions::sequential().with_scheme(scheme);
        let out = forces(&topology, &particles, &PeriodicBox::open(), 1.0, options);

        prop_assert!(
            out.net_force().norm() <= 1e-9 * out.max_force().max(1.0),
            "net force {:?}", out.net_force()
        );
    }

    /// Doubling the modulus doubles every force and energy exactly.
    #[test]
    fn modulus_scales_linearly(jitter in arb_jitter(), kappa in 0.1..50.0f64) {
        let (topology, positions) = bumpy_sphere(&jitter);
        let particles = ParticleData::new(positions);
        let bx = PeriodicBox::open();
        let one = forces(&topology, &particles, &bx, kappa, HelfrichOptions::sequential());
        let two = forces(&topology, &particles, &bx, 2.0 * kappa, HelfrichOptions::sequential());

        for v in 0..particles.num_slots() {
            prop_assert_eq!(two.force[v], one.force[v] * 2.0);
            prop_assert_eq!(two.energy[v], one.energy[v] * 2.0);
        }
    }

    /// Reordering particle slots does not change the result per tag.
    #[test]
    fn slot_order_is_irrelevant(jitter in arb_jitter(), order in arb_permutation()) {
        let (topology, positions) = bumpy_sphere(&jitter);
        let particles = ParticleData::new(positions);
        let bx = PeriodicBox::open();
        let reference = forces(&topology, &particles, &bx, 3.0, HelfrichOptions::sequential());

        let mut permuted = particles.clone();
        permuted.permute(&order).unwrap();
        let out = forces(&topology, &permuted, &bx, 3.0, HelfrichOptions::sequential());

        for tag in 0..particles.num_slots() {
            let slot = permuted.slot(tag).unwrap();
            prop_assert!((out.force[slot] - reference.force[tag]).norm() < 1e-9);
            prop_assert!((out.energy[slot] - reference.energy[tag]).abs() < 1e-9);
        }
    }

    /// Shifting the membrane and wrapping it into the box changes nothing.
    #[test]
    fn periodic_translation_invariance(
        jitter in arb_jitter(),
        shift in prop::array::uniform3(-20.0..20.0f64),
        scheme in arb_scheme(),
    ) {
        let l = 3.0 * RADIUS;
        let bx = PeriodicBox::cube(l).unwrap();
        let options = HelfrichOptions::sequential().with_scheme(scheme);

        let (topology, positions) = bumpy_sphere(&jitter);
        let reference = forces(
            &topology,
            &ParticleData::new(positions.clone()),
            &bx,
            1.0,
            options.clone(),
        );

        let wrapped: Vec<Point3<f64>> = positions
            .iter()
            .map(|p| {
                Point3::new(
                    wrap(p.x + shift[0], l),
                    wrap(p.y + shift[1], l),
                    wrap(p.z + shift[2], l),
                )
            })
            .collect();
        let out = forces(&topology, &ParticleData::new(wrapped), &bx, 1.0, options);

        let scale = reference.max_force().max(1.0);
        for v in 0..out.len() {
            prop_assert!((out.force[v] - reference.force[v]).norm() < 1e-8 * scale);
            prop_assert!((out.energy[v] - reference.energy[v]).abs() < 1e-8 * scale);
        }
    }

    /// Parallel and sequential evaluation agree bit for bit.
    #[test]
    fn parallel_is_deterministic(jitter in arb_jitter(), scheme in arb_scheme()) {
        let (topology, positions) = bumpy_sphere(&jitter);
        let particles = ParticleData::new(positions);
        let bx = PeriodicBox::open();

        let seq = forces(&topology, &particles, &bx, 1.0, HelfrichOptions::sequential().with_scheme(scheme));
        let par = forces(&topology, &particles, &bx, 1.0, HelfrichOptions::default().with_scheme(scheme));
        prop_assert_eq!(seq, par);
    }
}
