//! # Helfrich
//!
//! Discrete Helfrich bending forces for triangulated membranes in periodic
//! simulation boxes.
//!
//! A membrane is a triangle mesh whose vertices are particles of a larger
//! simulation. This crate turns the mesh connectivity and the current
//! particle positions into per-vertex bending forces, energies and virials
//! using the cotangent discretisation of the mean curvature.
//!
//! ## Features
//!
//! - **Bond/triangle topology**: type-safe indices, built from plain triangle lists
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Periodic boxes**: triclinic minimum-image convention
//! - **Reorderable particles**: vertices are looked up by stable tag, ghosts are never written
//! - **Two force schemes**: pair-local endpoint forces or the full four-vertex gradient
//! - **Deterministic parallelism**: parallel and sequential runs agree bit for bit
//! - **File formats**: STL, PLY
//!
//! ## Quick Start
//!
//! ```
//! use helfrich::prelude::*;
//! use helfrich::mesh::primitives;
//!
//! // A regular tetrahedron with unit edges
//! let soup = primitives::tetrahedron(1.0);
//! let topology: MeshTopology = soup.to_topology().unwrap();
//! let particles = ParticleData::new(soup.positions);
//!
//! let mut force = HelfrichForce::new(topology);
//! force.set_params("mesh", 2.0).unwrap();
//!
//! let output = force.evaluate(&particles, &PeriodicBox::open()).unwrap();
//! assert!((output.energy[0] - 8.0 / 3.0_f64.sqrt()).abs() < 1e-10);
//! ```
//!
//! ## Periodic Meshes
//!
//! ```
//! use helfrich::prelude::*;
//! use helfrich::mesh::primitives;
//!
//! // A flat sheet that closes on itself through the box
//! let soup = primitives::periodic_sheet(8, 1.0);
//! let topology: MeshTopology = soup.to_topology().unwrap();
//! assert_eq!(topology.num_boundary_bonds(), 0);
//!
//! let particles = ParticleData::new(soup.positions);
//! let bx = PeriodicBox::new(8.0, 8.0, 20.0).unwrap();
//!
//! let mut force = HelfrichForce::new(topology);
//! force.set_params("mesh", 1.0).unwrap();
//! let output = force.evaluate(&particles, &bx).unwrap();
//! assert!(output.max_force() < 1e-10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod domain;
pub mod error;
pub mod io;
pub mod mesh;

pub use error::{MeshError, Result};

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use helfrich::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::helfrich::{
        BendingParams, CurvatureState, ForceOutput, ForceScheme, HelfrichForce, HelfrichOptions,
    };
    pub use crate::domain::{MinImage, ParticleData, ParticleView, PeriodicBox, TagResolver};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_topology, BondId, BondTypeId, MeshBond, MeshIndex, MeshTopology, TriangleId,
        TriangleSoup, VertexTag,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
