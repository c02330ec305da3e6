//! PLY (Stanford polygon) input.
//!
//! Reads the `vertex` element (`x`, `y`, `z`) and the `face` element
//! (`vertex_indices` or `vertex_index`). Polygons with more than three
//! corners are split into a triangle fan.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use super::load_error;
use crate::error::Result;
use crate::mesh::TriangleSoup;

/// Load a membrane mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use helfrich::io::ply;
///
/// let soup = ply::load("vesicle.ply").unwrap();
/// println!("{} vertices", soup.positions.len());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriangleSoup> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read(&mut BufReader::new(file), path)
}

/// Parse PLY data from a reader. `path` is only used in error messages.
pub fn read<R: Read>(reader: &mut R, path: &Path) -> Result<TriangleSoup> {
    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(reader)
        .map_err(|e| load_error(path, e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error(path, "PLY file has no vertex element"))?;

    let mut positions = Vec::with_capacity(vertex_element.len());
    for (i, vertex) in vertex_element.iter().enumerate() {
        let coord = |name: &str| {
            float_property(vertex, name)
                .ok_or_else(|| load_error(path, format!("vertex {} has no {} coordinate", i, name)))
        };
        positions.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error(path, "PLY file has no face element"))?;

    let mut faces = Vec::with_capacity(face_element.len());
    for (i, face) in face_element.iter().enumerate() {
        let indices = list_property(face, "vertex_indices")
            .or_else(|| list_property(face, "vertex_index"))
            .ok_or_else(|| load_error(path, format!("face {} has no vertex list", i)))?;

        for k in 1..indices.len().saturating_sub(1) {
            faces.push([indices[0], indices[k], indices[k + 1]]);
        }
    }

    if faces.is_empty() {
        return Err(load_error(path, "PLY file contains no triangles"));
    }

    Ok(TriangleSoup::new(positions, faces))
}

fn float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;

    const QUAD_PYRAMID: &str = "ply
format ascii 1.0
element vertex 5
property float x
property float y
property float z
element face 5
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
0 1 0
0.5 0.5 1
4 0 3 2 1
3 0 1 4
3 1 2 4
3 2 3 4
3 3 0 4
";

    #[test]
    fn test_read_fans_polygons() {
        let soup = read(&mut QUAD_PYRAMID.as_bytes(), Path::new("pyramid.ply")).unwrap();
        assert_eq!(soup.positions.len(), 5);
        // Quad base becomes two triangles
        assert_eq!(soup.faces.len(), 6);
        assert_eq!(soup.faces[0], [0, 3, 2]);
        assert_eq!(soup.faces[1], [0, 2, 1]);
        assert_eq!(soup.positions[4], Point3::new(0.5, 0.5, 1.0));

        let topo: crate::mesh::MeshTopology = soup.to_topology().unwrap();
        assert_eq!(topo.num_boundary_bonds(), 0);
    }

    #[test]
    fn test_missing_faces() {
        let data = "ply
format ascii 1.0
element vertex 1
property float x
property float y
property float z
end_header
0 0 0
";
        let result = read(&mut data.as_bytes(), Path::new("points.ply"));
        assert!(matches!(result, Err(MeshError::LoadError { .. })));
    }
}
