//! Membrane force algorithms.
//!
//! - **Helfrich bending**: curvature accumulation, forces, energies and
//!   virials from the discrete bending energy of a triangulated membrane

pub mod helfrich;
