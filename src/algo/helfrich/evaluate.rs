//! Phase 2: forces, per-vertex energies and virials.
//!
//! The bending energy is
//!
//! ```text
//! E = 1/2 sum_v K |curvature_vector[v]|^2 / area_weight[v]
//! ```
//!
//! Two force schemes are available, see [`ForceScheme`]. Both read the
//! completed [`CurvatureState`] and add into caller-owned [`ForceOutput`]
//! buffers. Per-vertex energies are overwritten, not added: a vertex visited
//! by several bonds ends up holding exactly one energy value. Ghost slots are
//! never written.

use nalgebra::Vector3;

use super::precompute::CurvatureState;
use super::stencil::{clamp_cosine, cotangent_gradient, inverse_sine, BondStencil};
use super::{map_bonds, ForceScheme, HelfrichOptions};
use crate::domain::{MinImage, ParticleView};
use crate::error::{MeshError, Result};
use crate::mesh::{BondId, MeshIndex, MeshTopology};

/// Per-slot force, energy and virial buffers.
///
/// Virial components are ordered `(xx, xy, xz, yy, yz, zz)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceOutput {
    /// Force per slot.
    pub force: Vec<Vector3<f64>>,
    /// Energy per slot.
    pub energy: Vec<f64>,
    /// Virial per slot.
    pub virial: Vec<[f64; 6]>,
}

impl ForceOutput {
    /// Zeroed buffers for `num_slots` particles.
    pub fn zeroed(num_slots: usize) -> Self {
        Self {
            force: vec![Vector3::zeros(); num_slots],
            energy: vec![0.0; num_slots],
            virial: vec![[0.0; 6]; num_slots],
        }
    }

    /// Reset every buffer to zero.
    pub fn clear(&mut self) {
        self.force.fill(Vector3::zeros());
        self.energy.fill(0.0);
        self.virial.fill([0.0; 6]);
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.force.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.force.is_empty()
    }

    /// Sum of the per-slot energies.
    pub fn total_energy(&self) -> f64 {
        self.energy.iter().sum()
    }

    /// Sum of the per-slot forces.
    pub fn net_force(&self) -> Vector3<f64> {
        self.force.iter().sum()
    }

    /// Largest force magnitude.
    pub fn max_force(&self) -> f64 {
        self.force.iter().map(|f| f.norm()).fold(0.0, f64::max)
    }

    /// Component-wise sum of the per-slot virials.
    pub fn total_virial(&self) -> [f64; 6] {
        let mut total = [0.0; 6];
        for v in &self.virial {
            for (t, x) in total.iter_mut().zip(v) {
                *t += x;
            }
        }
        total
    }
}

/// What one bond writes into the output buffers.
#[derive(Debug, Clone, Copy)]
struct BondForces {
    slots: [usize; 4],
    /// Number of leading slots that receive force and virial.
    targets: usize,
    force: [Vector3<f64>; 4],
    /// Energies of `a` and `b`.
    energy: [f64; 2],
    /// Virial share given to every target.
    virial: [f64; 6],
}

/// Outer product `r ⊗ f` in `(xx, xy, xz, yy, yz, zz)` order.
#[inline]
fn virial_of(r: &Vector3<f64>, f: &Vector3<f64>) -> [f64; 6] {
    [
        r.x * f.x,
        r.y * f.x,
        r.z * f.x,
        r.y * f.y,
        r.z * f.y,
        r.z * f.z,
    ]
}

fn area_weights<I: MeshIndex>(
    s: &BondStencil,
    state: &CurvatureState<I>,
    count: usize,
) -> Result<[f64; 4]> {
    let mut sigma = [0.0; 4];
    for k in 0..count {
        sigma[k] = state.area_weight(s.slots[k]);
        if sigma[k] == 0.0 {
            return Err(MeshError::ZeroAreaWeight { tag: s.tags[k] });
        }
    }
    Ok(sigma)
}

/// Forces on `a` and `b` only, with `F_b = -F_a`.
fn pair_local<I: MeshIndex>(
    s: &BondStencil,
    state: &CurvatureState<I>,
    kappa: f64,
    options: &HelfrichOptions,
) -> Result<BondForces> {
    let eps = options.min_sine;
    let sigma = area_weights(s, state, 4)?;
    let cv = s.slots.map(|slot| state.curvature_vector(slot));

    let n_ab = s.d_ab / s.r_ab;
    let n_ac = s.d_ac / s.r_ac;
    let n_ad = s.d_ad / s.r_ad;
    let n_bc = s.d_bc / s.r_bc;
    let n_bd = s.d_bd / s.r_bd;

    // Angles at b and at a in both triangles
    let c_abbc = clamp_cosine(-n_ab.dot(&n_bc));
    let c_abbd = clamp_cosine(-n_ab.dot(&n_bd));
    let c_baac = clamp_cosine(n_ab.dot(&n_ac));
    let c_baad = clamp_cosine(n_ab.dot(&n_ad));

    let inv_abbc = inverse_sine(c_abbc, eps);
    let inv_abbd = inverse_sine(c_abbd, eps);
    let inv_baac = inverse_sine(c_baac, eps);
    let inv_baad = inverse_sine(c_baad, eps);

    let w = s.cotangent_weight(eps);

    let dc_abbc = -n_bc / s.r_ab - n_ab * (c_abbc / s.r_ab);
    let dc_abbd = -n_bd / s.r_ab - n_ab * (c_abbd / s.r_ab);
    let dc_baac = n_ac / s.r_ab - n_ab * (c_baac / s.r_ab);
    let dc_baad = n_ad / s.r_ab - n_ab * (c_baad / s.r_ab);

    let g_ac = dc_abbc * (0.5 * inv_abbc.powi(3));
    let g_ad = dc_abbd * (0.5 * inv_abbd.powi(3));
    let g_bc = dc_baac * (0.5 * inv_baac.powi(3));
    let g_bd = dc_baad * (0.5 * inv_baad.powi(3));

    let r2_ac = s.r_ac * s.r_ac;
    let r2_ad = s.r_ad * s.r_ad;
    let r2_bc = s.r_bc * s.r_bc;
    let r2_bd = s.r_bd * s.r_bd;

    let area_grad = [
        (g_ac * r2_ac + g_ad * r2_ad + s.d_ab * (2.0 * w)) * 0.25,
        (g_bc * r2_bc + g_bd * r2_bd + s.d_ab * (2.0 * w)) * 0.25,
        (g_ac * r2_ac + g_bc * r2_bc) * 0.25,
        (g_ad * r2_ad + g_bd * r2_bd) * 0.25,
    ];
    let curv_scalar = [
        g_ac.dot(&s.d_ac) + g_ad.dot(&s.d_ad) + w,
        g_bc.dot(&s.d_bc) + g_bd.dot(&s.d_bd) - w,
        -g_ac.dot(&s.d_ac) - g_bc.dot(&s.d_bc),
        -g_ad.dot(&s.d_ad) - g_bd.dot(&s.d_bd),
    ];

    let mut f_a = Vector3::zeros();
    for k in 0..4 {
        let inv_sigma = 1.0 / sigma[k];
        f_a += cv[k] * (curv_scalar[k] * inv_sigma)
            - area_grad[k] * (0.5 * cv[k].norm_squared() * inv_sigma * inv_sigma);
    }
    f_a *= kappa;

    let virial = virial_of(&s.d_ab, &f_a).map(|x| 0.5 * x);

    Ok(BondForces {
        slots: s.slots,
        targets: 2,
        force: [f_a, -f_a, Vector3::zeros(), Vector3::zeros()],
        energy: [
            0.5 * kappa * cv[0].norm_squared() / sigma[0],
            0.5 * kappa * cv[1].norm_squared() / sigma[1],
        ],
        virial,
    })
}

/// Exact negative energy gradient on all four stencil vertices.
fn full_gradient<I: MeshIndex>(
    s: &BondStencil,
    state: &CurvatureState<I>,
    kappa: f64,
    options: &HelfrichOptions,
) -> Result<BondForces> {
    let eps = options.min_sine;
    let sigma = area_weights(s, state, 2)?;
    let cv_a = state.curvature_vector(s.slots[0]);
    let cv_b = state.curvature_vector(s.slots[1]);

    let w = s.cotangent_weight(eps);

    // Gradient of w with respect to a, b, c, d
    let (gca, gcb) = cotangent_gradient(&s.d_ac, &s.d_bc, eps);
    let (gda, gdb) = cotangent_gradient(&s.d_ad, &s.d_bd, eps);
    let grad_w = [
        (gca + gda) * 0.5,
        (gcb + gdb) * 0.5,
        -(gca + gcb) * 0.5,
        -(gda + gdb) * 0.5,
    ];

    let e_a = 0.5 * cv_a.norm_squared() / (sigma[0] * sigma[0]);
    let e_b = 0.5 * cv_b.norm_squared() / (sigma[1] * sigma[1]);
    let du = cv_a / sigma[0] - cv_b / sigma[1];

    let coef = du.dot(&s.d_ab) - 0.25 * (e_a + e_b) * s.r_ab * s.r_ab;
    let direct = (du - s.d_ab * (0.5 * (e_a + e_b))) * w;

    let force = [
        -(grad_w[0] * coef + direct) * kappa,
        -(grad_w[1] * coef - direct) * kappa,
        -grad_w[2] * (coef * kappa),
        -grad_w[3] * (coef * kappa),
    ];

    // Positions relative to a
    let rel = [Vector3::zeros(), -s.d_ab, -s.d_ac, -s.d_ad];
    let mut virial = [0.0; 6];
    for (r, f) in rel.iter().zip(&force) {
        for (v, x) in virial.iter_mut().zip(virial_of(r, f)) {
            *v += 0.25 * x;
        }
    }

    Ok(BondForces {
        slots: s.slots,
        targets: 4,
        force,
        energy: [
            0.5 * kappa * cv_a.norm_squared() / sigma[0],
            0.5 * kappa * cv_b.norm_squared() / sigma[1],
        ],
        virial,
    })
}

fn bond_forces<I, P, B>(
    topology: &MeshTopology<I>,
    particles: &P,
    bx: &B,
    state: &CurvatureState<I>,
    moduli: &[f64],
    options: &HelfrichOptions,
    id: BondId<I>,
) -> Result<Option<BondForces>>
where
    I: MeshIndex,
    P: ParticleView + ?Sized,
    B: MinImage + ?Sized,
{
    let Some(s) = BondStencil::resolve(topology, particles, bx, id)? else {
        return Ok(None);
    };

    let type_id = topology.bond(id).bond_type.index();
    let kappa = *moduli.get(type_id).ok_or_else(|| {
        MeshError::InvalidState(format!("no modulus for bond type {}", type_id))
    })?;

    let forces = match options.scheme {
        ForceScheme::PairLocal => pair_local(&s, state, kappa, options)?,
        ForceScheme::FullGradient => full_gradient(&s, state, kappa, options)?,
    };
    Ok(Some(forces))
}

/// Add bending forces, energies and virials for every bond into `output`.
///
/// `state` must hold the completed curvature of the same configuration.
/// `moduli` is indexed by bond type ID. `output` must cover every slot; its
/// force and virial buffers are added to, its energy buffer is overwritten at
/// visited vertices.
pub fn evaluate_forces<I, P, B>(
    topology: &MeshTopology<I>,
    particles: &P,
    bx: &B,
    state: &CurvatureState<I>,
    moduli: &[f64],
    options: &HelfrichOptions,
    output: &mut ForceOutput,
) -> Result<()>
where
    I: MeshIndex,
    P: ParticleView + ?Sized,
    B: MinImage + ?Sized,
{
    let num_slots = particles.num_slots();
    if state.len() != num_slots || output.len() != num_slots {
        return Err(MeshError::InvalidState(format!(
            "curvature state ({}) and output ({}) must cover {} particle slots",
            state.len(),
            output.len(),
            num_slots
        )));
    }

    let contributions = map_bonds(topology.num_bonds(), options.parallel, |i| {
        bond_forces(topology, particles, bx, state, moduli, options, BondId::new(i))
    })?;

    let num_local = particles.num_local();
    for c in contributions.iter().flatten() {
        for (k, &slot) in c.slots[..c.targets].iter().enumerate() {
            if slot >= num_local {
                continue;
            }
            output.force[slot] += c.force[k];
            if k < 2 {
                output.energy[slot] = c.energy[k];
            }
            if options.compute_virial {
                for (v, x) in output.virial[slot].iter_mut().zip(&c.virial) {
                    *v += x;
                }
            }
        }
    }

    log::trace!("bending forces evaluated over {} bonds", topology.num_bonds());
    Ok(())
}
