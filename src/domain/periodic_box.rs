//! Periodic simulation box and the minimum-image convention.
//!
//! The box is triclinic: three edge lengths plus the tilt factors `xy`, `xz`
//! and `yz`, with periodicity switchable per axis. Lattice vectors are
//!
//! ```text
//! a1 = (Lx, 0, 0)
//! a2 = (xy Ly, Ly, 0)
//! a3 = (xz Lz, yz Lz, Lz)
//! ```

use nalgebra::Vector3;

use crate::error::{MeshError, Result};

/// Maps a raw displacement to its shortest periodic image.
pub trait MinImage: Sync {
    /// Fold `v` into the minimum image.
    fn min_image(&self, v: Vector3<f64>) -> Vector3<f64>;
}

/// A triclinic periodic box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicBox {
    lengths: Vector3<f64>,
    inv_lengths: Vector3<f64>,
    xy: f64,
    xz: f64,
    yz: f64,
    periodic: [bool; 3],
}

impl PeriodicBox {
    /// Create an orthorhombic box periodic in all three directions.
    pub fn new(lx: f64, ly: f64, lz: f64) -> Result<Self> {
        for (name, l) in [("lx", lx), ("ly", ly), ("lz", lz)] {
            if !(l.is_finite() && l > 0.0) {
                return Err(MeshError::invalid_param(name, l, "box length must be positive"));
            }
        }
        Ok(Self {
            lengths: Vector3::new(lx, ly, lz),
            inv_lengths: Vector3::new(1.0 / lx, 1.0 / ly, 1.0 / lz),
            xy: 0.0,
            xz: 0.0,
            yz: 0.0,
            periodic: [true; 3],
        })
    }

    /// Create a cubic box with edge length `l`.
    pub fn cube(l: f64) -> Result<Self> {
        Self::new(l, l, l)
    }

    /// Create a box that applies no wrapping at all.
    pub fn open() -> Self {
        Self {
            lengths: Vector3::new(1.0, 1.0, 1.0),
            inv_lengths: Vector3::new(1.0, 1.0, 1.0),
            xy: 0.0,
            xz: 0.0,
            yz: 0.0,
            periodic: [false; 3],
        }
    }

    /// Set the tilt factors.
    pub fn with_tilt(mut self, xy: f64, xz: f64, yz: f64) -> Self {
        self.xy = xy;
        self.xz = xz;
        self.yz = yz;
        self
    }

    /// Set periodicity per axis.
    pub fn with_periodic(mut self, x: bool, y: bool, z: bool) -> Self {
        self.periodic = [x, y, z];
        self
    }

    /// Edge lengths (Lx, Ly, Lz).
    #[inline]
    pub fn lengths(&self) -> Vector3<f64> {
        self.lengths
    }

    /// Tilt factors (xy, xz, yz).
    #[inline]
    pub fn tilt(&self) -> (f64, f64, f64) {
        (self.xy, self.xz, self.yz)
    }

    /// Per-axis periodicity.
    #[inline]
    pub fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    /// Box volume, infinite unless every axis is periodic.
    pub fn volume(&self) -> f64 {
        if self.periodic.iter().all(|&p| p) {
            self.lengths.x * self.lengths.y * self.lengths.z
        } else {
            f64::INFINITY
        }
    }
}

impl MinImage for PeriodicBox {
    /// Folds z first, then y, then x so that tilt shifts are applied along
    /// the lattice vectors before the axes they leak into.
    fn min_image(&self, mut v: Vector3<f64>) -> Vector3<f64> {
        let l = &self.lengths;
        let inv = &self.inv_lengths;

        if self.periodic[2] {
            let img = (v.z * inv.z).round_ties_even();
            v.z -= l.z * img;
            v.y -= l.z * self.yz * img;
            v.x -= l.z * self.xz * img;
        }

        if self.periodic[1] {
            let img = (v.y * inv.y).round_ties_even();
            v.y -= l.y * img;
            v.x -= l.y * self.xy * img;
        }

        if self.periodic[0] {
            let img = (v.x * inv.x).round_ties_even();
            v.x -= l.x * img;
        }

        v
    }
}
