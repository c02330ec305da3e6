//! Membrane mesh connectivity.
//!
//! This module provides the bond/triangle topology consumed by the bending
//! force, plus builders and reference shapes.
//!
//! # Overview
//!
//! The primary type is [`MeshTopology`]. It stores, for every mesh bond, its
//! two endpoint tags and the two triangles sharing it, and for every triangle
//! its three vertex tags. Positions are not part of the topology: they live
//! in a particle store and are looked up by tag each step.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexTag`] - Stable identity of a vertex
//! - [`TriangleId`] - Identifies a triangle
//! - [`BondId`] - Identifies a bond
//! - [`BondTypeId`] - Identifies a bond parameter type
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use helfrich::mesh::{build_topology, MeshTopology};
//!
//! let faces = vec![[0, 1, 2], [0, 2, 3]];
//! let topo: MeshTopology = build_topology(4, &faces).unwrap();
//! assert_eq!(topo.num_bonds(), 5);
//! ```

mod builder;
mod index;
pub mod primitives;
mod topology;

pub use builder::{build_topology, to_triangle_list, TriangleSoup};
pub use index::{ensure_capacity, BondId, BondTypeId, MeshIndex, TriangleId, VertexTag};
pub use topology::{opposite_vertex, MeshBond, MeshTopology, DEFAULT_BOND_TYPE};
