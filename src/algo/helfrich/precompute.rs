//! Phase 1: per-vertex area weights and mean-curvature vectors.
//!
//! For every non-boundary bond `(a, b)` with cotangent weight `w`:
//!
//! ```text
//! area_weight[a]      += w |d_ab|^2 / 4
//! area_weight[b]      += w |d_ab|^2 / 4
//! curvature_vector[a] += w d_ab
//! curvature_vector[b] -= w d_ab
//! ```
//!
//! Summed over all bonds this gives the mixed area and `2 A H n` at every
//! vertex.

use nalgebra::Vector3;

use super::stencil::BondStencil;
use super::{map_bonds, HelfrichOptions};
use crate::domain::{MinImage, ParticleView};
use crate::error::Result;
use crate::mesh::{BondId, MeshIndex, MeshTopology};

/// Per-vertex curvature accumulated over all bonds, indexed by particle slot.
#[derive(Debug, Clone)]
pub struct CurvatureState<I: MeshIndex = u32> {
    area_weight: Vec<f64>,
    curvature_vector: Vec<Vector3<f64>>,
    folded_bonds: Vec<BondId<I>>,
}

impl<I: MeshIndex> CurvatureState<I> {
    /// A zeroed state for `num_slots` particles.
    pub fn zeroed(num_slots: usize) -> Self {
        Self {
            area_weight: vec![0.0; num_slots],
            curvature_vector: vec![Vector3::zeros(); num_slots],
            folded_bonds: Vec::new(),
        }
    }

    /// Number of particle slots covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.area_weight.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.area_weight.is_empty()
    }

    /// Mixed area weight of the particle in `slot`.
    #[inline]
    pub fn area_weight(&self, slot: usize) -> f64 {
        self.area_weight[slot]
    }

    /// Mean-curvature vector of the particle in `slot`.
    #[inline]
    pub fn curvature_vector(&self, slot: usize) -> Vector3<f64> {
        self.curvature_vector[slot]
    }

    /// All area weights in slot order.
    #[inline]
    pub fn area_weights(&self) -> &[f64] {
        &self.area_weight
    }

    /// All curvature vectors in slot order.
    #[inline]
    pub fn curvature_vectors(&self) -> &[Vector3<f64>] {
        &self.curvature_vector
    }

    /// Bonds whose two triangles fold onto each other.
    pub fn folded_bonds(&self) -> &[BondId<I>] {
        &self.folded_bonds
    }

    /// Bending energy density term `|curvature_vector|^2 / (2 area_weight)`
    /// of the particle in `slot`, without the modulus.
    ///
    /// Returns `None` if the area weight is zero.
    pub fn vertex_energy(&self, slot: usize) -> Option<f64> {
        let sigma = self.area_weight[slot];
        (sigma != 0.0).then(|| 0.5 * self.curvature_vector[slot].norm_squared() / sigma)
    }
}

/// What one bond adds to the curvature state.
#[derive(Debug, Clone, Copy)]
struct CurvatureContribution {
    a: usize,
    b: usize,
    area: f64,
    curvature: Vector3<f64>,
    fold_cosine: Option<f64>,
}

fn bond_contribution<I, P, B>(
    topology: &MeshTopology<I>,
    particles: &P,
    bx: &B,
    id: BondId<I>,
    min_sine: f64,
) -> Result<Option<CurvatureContribution>>
where
    I: MeshIndex,
    P: ParticleView + ?Sized,
    B: MinImage + ?Sized,
{
    let Some(s) = BondStencil::resolve(topology, particles, bx, id)? else {
        return Ok(None);
    };

    let w = s.cotangent_weight(min_sine);
    Ok(Some(CurvatureContribution {
        a: s.slots[0],
        b: s.slots[1],
        area: 0.25 * w * s.r_ab * s.r_ab,
        curvature: s.d_ab * w,
        fold_cosine: s.fold_cosine(),
    }))
}

/// Accumulate area weights and curvature vectors over every bond.
///
/// Boundary bonds contribute nothing. Folded triangle pairs are logged and
/// recorded but do not change the result.
pub fn precompute_curvature<I, P, B>(
    topology: &MeshTopology<I>,
    particles: &P,
    bx: &B,
    options: &HelfrichOptions,
) -> Result<CurvatureState<I>>
where
    I: MeshIndex,
    P: ParticleView + ?Sized,
    B: MinImage + ?Sized,
{
    let n = topology.num_bonds();
    let contributions = map_bonds(n, options.parallel, |i| {
        bond_contribution(topology, particles, bx, BondId::new(i), options.min_sine)
    })?;

    let mut state = CurvatureState::zeroed(particles.num_slots());
    for (i, contrib) in contributions.iter().enumerate() {
        let Some(c) = contrib else { continue };

        state.area_weight[c.a] += c.area;
        state.area_weight[c.b] += c.area;
        state.curvature_vector[c.a] += c.curvature;
        state.curvature_vector[c.b] -= c.curvature;

        if let Some(cos) = c.fold_cosine {
            let id = BondId::new(i);
            log::debug!(
                "triangles {:?} of bond {:?} overlap (normal cosine {:.4})",
                topology.bond(id).triangles,
                id,
                cos
            );
            state.folded_bonds.push(id);
        }
    }

    log::trace!("curvature accumulated over {} bonds", n);
    Ok(state)
}
