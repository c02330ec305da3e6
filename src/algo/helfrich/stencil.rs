//! Per-bond geometry shared by both phases.
//!
//! A non-boundary bond `(a, b)` with incident triangles `(a, b, c)` and
//! `(a, b, d)` forms a four-vertex stencil. Displacements follow the
//! convention `d_xy = min_image(x_x - x_y)`:
//!
//! ```text
//!         c
//!        / \
//!       /   \
//!      a --- b
//!       \   /
//!        \ /
//!         d
//! ```
//!
//! Cosines are clamped to `[-1, 1]` and sines are floored at `min_sine`, so
//! nearly flat or folded triangles produce large but finite cotangents.

use nalgebra::Vector3;

use crate::domain::{MinImage, ParticleView};
use crate::error::{MeshError, Result};
use crate::mesh::{BondId, MeshIndex, MeshTopology, VertexTag};

/// Clamp a cosine into `[-1, 1]`.
#[inline]
pub fn clamp_cosine(c: f64) -> f64 {
    c.clamp(-1.0, 1.0)
}

/// `1 / max(sqrt(1 - c^2), min_sine)` for an already clamped cosine.
#[inline]
pub fn inverse_sine(c: f64, min_sine: f64) -> f64 {
    1.0 / (1.0 - c * c).sqrt().max(min_sine)
}

/// Cotangent of the angle whose (clamped) cosine is `c`.
#[inline]
pub fn cotangent(c: f64, min_sine: f64) -> f64 {
    c * inverse_sine(c, min_sine)
}

/// Gradient of the cotangent of the angle at an apex `p` between the legs
/// `u = x_a - x_p` and `v = x_b - x_p`.
///
/// Returns the gradients with respect to `x_a` and `x_b`. The gradient with
/// respect to the apex is the negative of their sum. The derivative follows
/// the same clamped cosine and floored sine used for the cotangent itself:
/// it is zero where the cosine was clamped and `1/min_sine` on the floor.
pub fn cotangent_gradient(
    u: &Vector3<f64>,
    v: &Vector3<f64>,
    min_sine: f64,
) -> (Vector3<f64>, Vector3<f64>) {
    let lu = u.norm();
    let lv = v.norm();
    let uh = u / lu;
    let vh = v / lv;

    let raw = uh.dot(&vh);
    let c = clamp_cosine(raw);
    let dcot = if raw != c {
        0.0
    } else {
        let s = (1.0 - c * c).sqrt();
        if s < min_sine {
            1.0 / min_sine
        } else {
            1.0 / (s * s * s)
        }
    };

    let grad_a = (vh - uh * c) * (dcot / lu);
    let grad_b = (uh - vh * c) * (dcot / lv);
    (grad_a, grad_b)
}

/// Resolved geometry of one non-boundary bond.
#[derive(Debug, Clone, Copy)]
pub struct BondStencil {
    /// Vertex tags of `a`, `b`, `c`, `d`.
    pub tags: [usize; 4],
    /// Particle slots of `a`, `b`, `c`, `d`.
    pub slots: [usize; 4],
    /// Minimum-image `x_a - x_b`.
    pub d_ab: Vector3<f64>,
    /// Minimum-image `x_a - x_c`.
    pub d_ac: Vector3<f64>,
    /// Minimum-image `x_a - x_d`.
    pub d_ad: Vector3<f64>,
    /// Minimum-image `x_b - x_c`.
    pub d_bc: Vector3<f64>,
    /// Minimum-image `x_b - x_d`.
    pub d_bd: Vector3<f64>,
    /// `|d_ab|`
    pub r_ab: f64,
    /// `|d_ac|`
    pub r_ac: f64,
    /// `|d_ad|`
    pub r_ad: f64,
    /// `|d_bc|`
    pub r_bc: f64,
    /// `|d_bd|`
    pub r_bd: f64,
}

impl BondStencil {
    /// Resolve the stencil of `id`.
    ///
    /// Returns `Ok(None)` for boundary bonds. A tag without a slot or a
    /// triangle without an opposite vertex is an error.
    pub fn resolve<I, P, B>(
        topology: &MeshTopology<I>,
        particles: &P,
        bx: &B,
        id: BondId<I>,
    ) -> Result<Option<Self>>
    where
        I: MeshIndex,
        P: ParticleView + ?Sized,
        B: MinImage + ?Sized,
    {
        let bond = topology.bond(id);
        if bond.is_boundary() {
            return Ok(None);
        }

        let (c, d) = topology.opposite_vertices(id)?;
        let tags = [bond.a, bond.b, c, d].map(VertexTag::index);
        let slot = |tag: usize| particles.slot(tag).ok_or(MeshError::UnresolvedTag { tag });
        let slots = [slot(tags[0])?, slot(tags[1])?, slot(tags[2])?, slot(tags[3])?];

        let [xa, xb, xc, xd] = slots.map(|s| particles.position(s));
        let d_ab = bx.min_image(xa - xb);
        let d_ac = bx.min_image(xa - xc);
        let d_ad = bx.min_image(xa - xd);
        let d_bc = bx.min_image(xb - xc);
        let d_bd = bx.min_image(xb - xd);

        Ok(Some(Self {
            tags,
            slots,
            d_ab,
            d_ac,
            d_ad,
            d_bc,
            d_bd,
            r_ab: d_ab.norm(),
            r_ac: d_ac.norm(),
            r_ad: d_ad.norm(),
            r_bc: d_bc.norm(),
            r_bd: d_bd.norm(),
        }))
    }

    /// Clamped cosines of the angles opposite the bond, at `c` and at `d`.
    pub fn opposite_cosines(&self) -> (f64, f64) {
        let c_accb = self.d_ac.dot(&self.d_bc) / (self.r_ac * self.r_bc);
        let c_addb = self.d_ad.dot(&self.d_bd) / (self.r_ad * self.r_bd);
        (clamp_cosine(c_accb), clamp_cosine(c_addb))
    }

    /// Cotangent weight `(cot(angle at c) + cot(angle at d)) / 2`.
    pub fn cotangent_weight(&self, min_sine: f64) -> f64 {
        let (c_accb, c_addb) = self.opposite_cosines();
        0.5 * (cotangent(c_accb, min_sine) + cotangent(c_addb, min_sine))
    }

    /// Check whether the two triangles fold onto each other.
    ///
    /// Returns the cosine between the normals of `(b, a, c)` and `(b, a, d)`
    /// when it exceeds `0.9`. For a well-formed bond `c` and `d` lie on
    /// opposite sides and the cosine is negative.
    pub fn fold_cosine(&self) -> Option<f64> {
        let n_bac = self.d_ab.cross(&self.d_ac);
        let n_bad = self.d_ab.cross(&self.d_ad);
        let norms = n_bac.norm() * n_bad.norm();
        let dot = n_bac.dot(&n_bad);
        (dot > 0.9 * norms).then(|| dot / norms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ParticleData, PeriodicBox};
    use crate::mesh::primitives;
    use approx::assert_relative_eq;

    const EPS: f64 = 1e-3;

    #[test]
    fn test_clamped_cosine_matches_unit() {
        let over = cotangent(clamp_cosine(1.0000001), EPS);
        let exact = cotangent(1.0, EPS);
        assert!(over.is_finite());
        assert_eq!(over, exact);
        assert_eq!(exact, 1.0 / EPS);

        let under = cotangent(clamp_cosine(-1.0000001), EPS);
        assert_eq!(under, -1.0 / EPS);
    }

    #[test]
    fn test_cotangent_of_sixty_degrees() {
        assert_relative_eq!(cotangent(0.5, EPS), 1.0 / 3.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(cotangent(0.0, EPS), 0.0);
    }

    #[test]
    fn test_inverse_sine_floor() {
        assert_relative_eq!(inverse_sine(0.0, EPS), 1.0);
        assert_eq!(inverse_sine(1.0 - 1e-9, EPS), 1.0 / EPS);
    }

    #[test]
    fn test_cotangent_gradient_matches_finite_difference() {
        let p = Vector3::new(0.1, -0.2, 0.05);
        let a = Vector3::new(1.0, 0.3, 0.0);
        let b = Vector3::new(0.2, 0.9, 0.4);

        let cot = |a: Vector3<f64>, b: Vector3<f64>| {
            let u = a - p;
            let v = b - p;
            cotangent(clamp_cosine(u.dot(&v) / (u.norm() * v.norm())), EPS)
        };

        let (ga, gb) = cotangent_gradient(&(a - p), &(b - p), EPS);
        let h = 1e-6;
        for k in 0..3 {
            let mut e = Vector3::zeros();
            e[k] = h;
            let fd_a = (cot(a + e, b) - cot(a - e, b)) / (2.0 * h);
            let fd_b = (cot(a, b + e) - cot(a, b - e)) / (2.0 * h);
            assert_relative_eq!(ga[k], fd_a, epsilon = 1e-7);
            assert_relative_eq!(gb[k], fd_b, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_tetrahedron_stencil() {
        let soup = primitives::tetrahedron(1.0);
        let topo: MeshTopology = soup.to_topology().unwrap();
        let particles = ParticleData::new(soup.positions);

        let s = BondStencil::resolve(&topo, &particles, &PeriodicBox::open(), BondId::new(0))
            .unwrap()
            .unwrap();
        assert_eq!(s.slots, [0, 1, 2, 3]);
        assert_relative_eq!(s.r_ab, 1.0, epsilon = 1e-12);
        assert_relative_eq!(s.d_ab, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);

        let (c1, c2) = s.opposite_cosines();
        assert_relative_eq!(c1, 0.5, epsilon = 1e-12);
        assert_relative_eq!(c2, 0.5, epsilon = 1e-12);
        assert_relative_eq!(s.cotangent_weight(EPS), 1.0 / 3.0_f64.sqrt(), epsilon = 1e-12);
        assert!(s.fold_cosine().is_none());
    }

    #[test]
    fn test_boundary_bond_has_no_stencil() {
        let faces = vec![[0, 1, 2]];
        let topo: MeshTopology = crate::mesh::build_topology(3, &faces).unwrap();
        let particles = ParticleData::new(primitives::tetrahedron(1.0).positions[..3].to_vec());

        for id in topo.bond_ids() {
            let s = BondStencil::resolve(&topo, &particles, &PeriodicBox::open(), id).unwrap();
            assert!(s.is_none());
        }
    }

    #[test]
    fn test_unresolved_tag() {
        let soup = primitives::tetrahedron(1.0);
        let topo: MeshTopology = soup.to_topology().unwrap();
        // Tag 3 is missing from the store
        let particles = ParticleData::with_ghosts(soup.positions[..3].to_vec(), vec![0, 1, 2], 3)
            .unwrap();

        let result = BondStencil::resolve(&topo, &particles, &PeriodicBox::open(), BondId::new(0));
        assert!(matches!(result, Err(MeshError::UnresolvedTag { tag: 3 })));
    }

    #[test]
    fn test_folded_pair_is_detected() {
        use nalgebra::Point3;

        // c and d on the same side of the bond
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.8, 0.1),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        let topo: MeshTopology = crate::mesh::build_topology(4, &faces).unwrap();
        let particles = ParticleData::new(positions);

        let s = BondStencil::resolve(&topo, &particles, &PeriodicBox::open(), BondId::new(0))
            .unwrap()
            .unwrap();
        let cos = s.fold_cosine().unwrap();
        assert!(cos > 0.9 && cos <= 1.0 + 1e-12);
    }
}
