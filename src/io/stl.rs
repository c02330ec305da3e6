//! STL (stereolithography) input.
//!
//! STL stores every triangle with its own copy of the corner coordinates.
//! Corners are merged into shared vertices on load so that neighbouring
//! triangles share bonds. Both binary and ASCII files are accepted.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use nalgebra::Point3;

use super::load_error;
use crate::error::Result;
use crate::mesh::TriangleSoup;

/// Load a membrane mesh from an STL file.
///
/// # Example
///
/// ```no_run
/// use helfrich::io::stl;
///
/// let soup = stl::load("vesicle.stl").unwrap();
/// println!("{} triangles", soup.faces.len());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriangleSoup> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    read(&mut file, path)
}

/// Parse STL data from a reader. `path` is only used in error messages.
pub fn read<R: Read + Seek>(reader: &mut R, path: &Path) -> Result<TriangleSoup> {
    let stl = stl_io::read_stl(reader).map_err(|e| load_error(path, e.to_string()))?;

    // The indexed mesh already merges bit-identical corners
    let positions: Vec<Point3<f64>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();

    let mut faces = Vec::with_capacity(stl.faces.len());
    let mut skipped = 0usize;
    for tri in &stl.faces {
        let [i0, i1, i2] = tri.vertices;
        if i0 != i1 && i1 != i2 && i0 != i2 {
            faces.push([i0, i1, i2]);
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        log::debug!("{}: skipped {} degenerate triangles", path.display(), skipped);
    }

    if faces.is_empty() {
        return Err(load_error(path, "STL file contains no valid triangles"));
    }

    Ok(TriangleSoup::new(positions, faces))
}
