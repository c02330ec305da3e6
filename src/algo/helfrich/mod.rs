//! Helfrich bending forces on triangulated membranes.
//!
//! This module computes forces, per-vertex energies and virials from the
//! discrete bending energy
//!
//! ```text
//! E = 1/2 sum_v K |curvature_vector[v]|^2 / area_weight[v]
//! ```
//!
//! where `area_weight` is the cotangent mixed area of a vertex and
//! `curvature_vector` its cotangent Laplacian (`2 A H n`).
//!
//! # Phases
//!
//! 1. [`precompute_curvature`] walks every bond and accumulates
//!    `area_weight` and `curvature_vector` at both endpoints.
//! 2. [`evaluate_forces`] walks every bond again and turns the completed
//!    per-vertex state into forces, energies and virials.
//!
//! Phase 2 reads curvature contributed by every bond around its four
//! stencil vertices, so phase 1 always finishes before phase 2 starts.
//! Each phase is a pure function per bond; results are gathered in bond
//! order, which makes parallel and sequential runs bit-identical.
//!
//! # Example
//!
//! ```
//! use helfrich::prelude::*;
//! use helfrich::mesh::primitives;
//!
//! let soup = primitives::icosphere(1, 2.0);
//! let topology: MeshTopology = soup.to_topology().unwrap();
//! let particles = ParticleData::new(soup.positions);
//!
//! let mut force = HelfrichForce::new(topology);
//! force.set_params("mesh", 20.0).unwrap();
//!
//! let output = force.evaluate(&particles, &PeriodicBox::open()).unwrap();
//! assert!(output.net_force().norm() < 1e-9);
//! ```
//!
//! # References
//!
//! - Meyer, M., et al. (2003). "Discrete Differential-Geometry Operators for
//!   Triangulated 2-Manifolds." Visualization and Mathematics III.
//! - Helfrich, W. (1973). "Elastic Properties of Lipid Bilayers: Theory and
//!   Possible Experiments." Z. Naturforsch. C 28.

mod evaluate;
mod params;
mod precompute;
pub mod stencil;

pub use evaluate::{evaluate_forces, ForceOutput};
pub use params::{BendingParams, ParameterWarning};
pub use precompute::{precompute_curvature, CurvatureState};

use rayon::prelude::*;

use crate::domain::{MinImage, ParticleView};
use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, MeshTopology};

/// How phase 2 turns curvature into forces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceScheme {
    /// Forces on the two bond endpoints only, equal and opposite.
    ///
    /// The gradient terms of all four stencil vertices are folded into the
    /// force on `a`; `b` receives its negative and `c`, `d` nothing. The
    /// virial per bond is `d_ab ⊗ F_a`, split between `a` and `b`.
    #[default]
    PairLocal,

    /// The exact negative energy gradient on all four stencil vertices.
    ///
    /// Forces per bond still sum to zero. The virial per bond is
    /// `sum_i (x_i - x_a) ⊗ F_i`, split equally over the four vertices.
    FullGradient,
}

/// Options for the bending force computation.
#[derive(Debug, Clone)]
pub struct HelfrichOptions {
    /// Use parallel computation.
    pub parallel: bool,

    /// Lower bound on the sine of any triangle angle.
    pub min_sine: f64,

    /// Write virial contributions.
    pub compute_virial: bool,

    /// Force scheme for phase 2.
    pub scheme: ForceScheme,
}

impl Default for HelfrichOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            min_sine: 1e-3,
            compute_virial: true,
            scheme: ForceScheme::PairLocal,
        }
    }
}

impl HelfrichOptions {
    /// Default options with single-threaded execution.
    pub fn sequential() -> Self {
        Self::default().with_parallel(false)
    }

    /// Enable or disable parallel computation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the floor applied to triangle angle sines.
    pub fn with_min_sine(mut self, min_sine: f64) -> Self {
        self.min_sine = min_sine;
        self
    }

    /// Enable or disable virial output.
    pub fn with_virial(mut self, compute_virial: bool) -> Self {
        self.compute_virial = compute_virial;
        self
    }

    /// Set the force scheme.
    pub fn with_scheme(mut self, scheme: ForceScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Check that the options are usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_sine > 0.0 && self.min_sine <= 1.0) {
            return Err(MeshError::invalid_param(
                "min_sine",
                self.min_sine,
                "must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Run `f` on every bond index, in parallel or sequentially.
///
/// Results come back in bond order either way.
fn map_bonds<T, F>(num_bonds: usize, parallel: bool, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    if parallel {
        (0..num_bonds).into_par_iter().map(f).collect()
    } else {
        (0..num_bonds).map(f).collect()
    }
}

/// Bending force on a membrane mesh.
///
/// Owns the mesh topology and the per-type bending moduli. Particle
/// positions and the periodic box are passed to each computation.
#[derive(Debug, Clone)]
pub struct HelfrichForce<I: MeshIndex = u32> {
    topology: MeshTopology<I>,
    params: BendingParams,
    options: HelfrichOptions,
}

impl<I: MeshIndex> HelfrichForce<I> {
    /// Create a bending force with default options.
    pub fn new(topology: MeshTopology<I>) -> Self {
        let params = BendingParams::new(topology.bond_type_names());
        log::debug!(
            "bending force on {} bonds ({} boundary), {} triangles, {} bond types",
            topology.num_bonds(),
            topology.num_boundary_bonds(),
            topology.num_triangles(),
            params.num_types()
        );
        Self {
            topology,
            params,
            options: HelfrichOptions::default(),
        }
    }

    /// Create a bending force with the given options.
    pub fn with_options(topology: MeshTopology<I>, options: HelfrichOptions) -> Result<Self> {
        options.validate()?;
        let mut force = Self::new(topology);
        force.options = options;
        Ok(force)
    }

    /// The mesh topology.
    pub fn topology(&self) -> &MeshTopology<I> {
        &self.topology
    }

    /// The current options.
    pub fn options(&self) -> &HelfrichOptions {
        &self.options
    }

    /// The bending moduli.
    pub fn params(&self) -> &BendingParams {
        &self.params
    }

    /// Set the bending modulus of a bond type.
    pub fn set_params(&mut self, type_name: &str, kappa: f64) -> Result<Option<ParameterWarning>> {
        self.params.set(type_name, kappa)
    }

    /// Get the bending modulus of a bond type.
    pub fn get_params(&self, type_name: &str) -> Result<f64> {
        self.params.get(type_name)
    }

    /// Compute bending forces and add them into `output`.
    ///
    /// Runs phase 1 to completion, then phase 2. Returns the curvature
    /// state of phase 1. Every bond type that some bond uses needs a
    /// modulus; unused types may stay unset. On error the contents of
    /// `output` are unspecified.
    pub fn compute<P, B>(
        &self,
        particles: &P,
        bx: &B,
        output: &mut ForceOutput,
    ) -> Result<CurvatureState<I>>
    where
        P: ParticleView + ?Sized,
        B: MinImage + ?Sized,
    {
        let moduli = self.params.moduli(&self.topology.bond_types_in_use())?;
        log::debug!(
            "computing bending forces: {} bonds, {:?}, parallel = {}",
            self.topology.num_bonds(),
            self.options.scheme,
            self.options.parallel
        );

        let state = precompute_curvature(&self.topology, particles, bx, &self.options)?;
        evaluate_forces(
            &self.topology,
            particles,
            bx,
            &state,
            &moduli,
            &self.options,
            output,
        )?;
        Ok(state)
    }

    /// Compute bending forces into freshly zeroed buffers.
    pub fn evaluate<P, B>(&self, particles: &P, bx: &B) -> Result<ForceOutput>
    where
        P: ParticleView + ?Sized,
        B: MinImage + ?Sized,
    {
        let mut output = ForceOutput::zeroed(particles.num_slots());
        self.compute(particles, bx, &mut output)?;
        Ok(output)
    }
}
