//! Error types for helfrich.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building meshes, configuring parameters, or
/// computing bending forces.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no triangles.
    #[error("mesh has no triangles")]
    EmptyMesh,

    /// A triangle references an invalid vertex index.
    #[error("triangle {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The triangle index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A triangle has duplicate vertex indices.
    #[error("triangle {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The triangle index.
        face: usize,
    },

    /// An edge has more than two incident triangles.
    #[error("edge ({v0}, {v1}) has more than two incident triangles")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// The mesh has more elements than the index type can address.
    #[error("{count} {what} do not fit {index_type} indices")]
    IndexOverflow {
        /// The kind of element.
        what: &'static str,
        /// The number of elements.
        count: usize,
        /// The index type.
        index_type: &'static str,
    },

    /// A bond type name is not registered with the mesh.
    #[error("unknown bond type: {name}")]
    UnknownType {
        /// The requested type name.
        name: String,
    },

    /// A bond type was never given a bending modulus.
    #[error("no bending modulus set for bond type {name}")]
    MissingParameter {
        /// The type name.
        name: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// A vertex tag has no slot in the particle store.
    #[error("vertex tag {tag} does not resolve to a particle slot")]
    UnresolvedTag {
        /// The unresolved tag.
        tag: usize,
    },

    /// A triangle incident to a bond has no vertex outside the bond.
    #[error("triangle {triangle} has no vertex opposite bond {bond}")]
    MissingOppositeVertex {
        /// The bond index.
        bond: usize,
        /// The triangle index.
        triangle: usize,
    },

    /// A vertex of an interior bond has no accumulated area weight.
    #[error("vertex tag {tag} has zero area weight; every vertex needs a non-boundary bond")]
    ZeroAreaWeight {
        /// The vertex tag.
        tag: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Inconsistent inputs for the requested operation.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
