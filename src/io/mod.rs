//! Membrane mesh input.
//!
//! Loads triangle meshes from files into a [`TriangleSoup`] (positions plus
//! a triangle list) that the mesh builder turns into bonds.
//!
//! # Supported Formats
//!
//! | Format | Extension | Notes |
//! |--------|-----------|-------|
//! | STL | `.stl` | Binary and ASCII, shared corners are merged |
//! | PLY | `.ply` | Polygons are split into triangle fans |
//!
//! # Usage
//!
//! ```no_run
//! use helfrich::io::load;
//! use helfrich::mesh::MeshTopology;
//!
//! let soup = load("vesicle.ply").unwrap();
//! let topology: MeshTopology = soup.to_topology().unwrap();
//! ```

pub mod ply;
pub mod stl;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::TriangleSoup;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// STL (stereolithography) format.
    Stl,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "stl" => Some(Format::Stl),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

/// Load a mesh with the format chosen by file extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriangleSoup> {
    let path = path.as_ref();
    let format = Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;

    let soup = match format {
        Format::Stl => stl::load(path)?,
        Format::Ply => ply::load(path)?,
    };
    log::debug!(
        "loaded {}: {} vertices, {} triangles",
        path.display(),
        soup.positions.len(),
        soup.faces.len()
    );
    Ok(soup)
}

fn load_error(path: &Path, message: impl Into<String>) -> MeshError {
    MeshError::LoadError {
        path: path.to_path_buf(),
        message: message.into(),
    }
}
