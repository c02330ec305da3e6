//! Simulation domain: periodic box geometry and particle storage.
//!
//! The bending force only needs two things from its surroundings: a way to
//! fold displacements into the minimum image ([`MinImage`]) and a way to find
//! the current position of a tagged vertex ([`ParticleView`]).

mod particles;
mod periodic_box;

pub use particles::{ParticleData, ParticleView, TagResolver};
pub use periodic_box::{MinImage, PeriodicBox};
