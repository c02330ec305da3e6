//! Mesh construction utilities.
//!
//! This module derives the bond list of a membrane from a plain triangle
//! list, as commonly found in mesh file formats.

use std::collections::HashMap;

use nalgebra::Point3;

use super::index::{ensure_capacity, MeshIndex, TriangleId, VertexTag};
use super::topology::{MeshBond, MeshTopology};
use crate::error::{MeshError, Result};

/// Vertex positions plus a face-vertex triangle list.
///
/// Position `i` belongs to the vertex tagged `i`.
#[derive(Debug, Clone, Default)]
pub struct TriangleSoup {
    /// Vertex positions, indexed by tag.
    pub positions: Vec<Point3<f64>>,
    /// Triangles as vertex indices.
    pub faces: Vec<[usize; 3]>,
}

impl TriangleSoup {
    /// Create a soup from positions and faces.
    pub fn new(positions: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Self {
        Self { positions, faces }
    }

    /// Derive the bond/triangle topology of this soup.
    pub fn to_topology<I: MeshIndex>(&self) -> Result<MeshTopology<I>> {
        build_topology(self.positions.len(), &self.faces)
    }
}

/// Build a bond/triangle topology from triangle faces.
///
/// Every undirected edge becomes one bond with endpoints ordered `a < b`.
/// Bonds appear in the order their edge is first met while walking the
/// faces. An edge with a single incident triangle becomes a boundary bond
/// (both triangle references equal). All bonds get the default bond type.
///
/// # Arguments
/// * `num_vertices` - Number of vertices; tags are `0..num_vertices`
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Example
/// ```
/// use helfrich::mesh::{build_topology, MeshTopology};
///
/// let faces = vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
/// let topo: MeshTopology = build_topology(4, &faces).unwrap();
/// assert_eq!(topo.num_bonds(), 6);
/// assert_eq!(topo.num_boundary_bonds(), 0);
/// ```
pub fn build_topology<I: MeshIndex>(
    num_vertices: usize,
    faces: &[[usize; 3]],
) -> Result<MeshTopology<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    ensure_capacity::<I>("vertices", num_vertices)?;
    ensure_capacity::<I>("triangles", faces.len())?;

    // Validate vertex indices
    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= num_vertices {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    // Undirected edge -> slot in `edges`, plus incident faces per edge
    let mut edge_map: HashMap<(usize, usize), usize> = HashMap::with_capacity(faces.len() * 2);
    let mut edges: Vec<((usize, usize), Vec<usize>)> = Vec::with_capacity(faces.len() * 2);

    for (fi, face) in faces.iter().enumerate() {
        for k in 0..3 {
            let v0 = face[k];
            let v1 = face[(k + 1) % 3];
            let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };

            let slot = *edge_map.entry(key).or_insert_with(|| {
                edges.push((key, Vec::with_capacity(2)));
                edges.len() - 1
            });

            let incident = &mut edges[slot].1;
            if incident.len() == 2 {
                return Err(MeshError::NonManifoldEdge {
                    v0: key.0,
                    v1: key.1,
                });
            }
            incident.push(fi);
        }
    }

    ensure_capacity::<I>("bonds", edges.len())?;

    let mut topology = MeshTopology::with_capacity(edges.len(), faces.len());
    for face in faces {
        topology.add_triangle(face.map(VertexTag::new))?;
    }

    for ((a, b), incident) in &edges {
        let tr1 = TriangleId::new(incident[0]);
        let tr2 = TriangleId::new(*incident.get(1).unwrap_or(&incident[0]));
        topology.add_bond(MeshBond::new(VertexTag::new(*a), VertexTag::new(*b), tr1, tr2))?;
    }

    Ok(topology)
}

/// Recover the triangle list of a topology as plain vertex indices.
pub fn to_triangle_list<I: MeshIndex>(topology: &MeshTopology<I>) -> Vec<[usize; 3]> {
    topology
        .triangles()
        .map(|(_, t)| [t[0].index(), t[1].index(), t[2].index()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::BondId;

    #[test]
    fn test_tetrahedron_bonds() {
        let faces = vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
        let topo: MeshTopology = build_topology(4, &faces).unwrap();

        assert_eq!(topo.num_vertices(), 4);
        assert_eq!(topo.num_triangles(), 4);
        assert_eq!(topo.num_bonds(), 6);
        assert_eq!(topo.num_boundary_bonds(), 0);

        // First-appearance order with a < b
        let expected = [
            (0, 1, 0, 1),
            (1, 2, 0, 3),
            (0, 2, 0, 2),
            (1, 3, 1, 3),
            (0, 3, 1, 2),
            (2, 3, 2, 3),
        ];
        for (i, &(a, b, t1, t2)) in expected.iter().enumerate() {
            let bond = topo.bond(BondId::new(i));
            assert_eq!(bond.a.index(), a);
            assert_eq!(bond.b.index(), b);
            assert_eq!(bond.triangles[0].index(), t1);
            assert_eq!(bond.triangles[1].index(), t2);
        }
    }

    #[test]
    fn test_open_patch_has_boundary_bonds() {
        // Two triangles sharing the diagonal of a square
        let faces = vec![[0, 1, 2], [0, 2, 3]];
        let topo: MeshTopology = build_topology(4, &faces).unwrap();

        assert_eq!(topo.num_bonds(), 5);
        assert_eq!(topo.num_boundary_bonds(), 4);

        let interior: Vec<_> = topo.bonds().filter(|(_, b)| !b.is_boundary()).collect();
        assert_eq!(interior.len(), 1);
        assert_eq!(interior[0].1.a.index(), 0);
        assert_eq!(interior[0].1.b.index(), 2);
    }

    #[test]
    fn test_empty_mesh() {
        let result: Result<MeshTopology> = build_topology(3, &[]);
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_invalid_vertex_index() {
        let result: Result<MeshTopology> = build_topology(3, &[[0, 1, 5]]);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 0, vertex: 5 })
        ));
    }

    #[test]
    fn test_degenerate_face() {
        let result: Result<MeshTopology> = build_topology(3, &[[0, 1, 2], [1, 1, 2]]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 1 })));
    }

    #[test]
    fn test_non_manifold_edge() {
        let faces = vec![[0, 1, 2], [0, 1, 3], [1, 0, 4]];
        let result: Result<MeshTopology> = build_topology(5, &faces);
        assert!(matches!(
            result,
            Err(MeshError::NonManifoldEdge { v0: 0, v1: 1 })
        ));
    }

    #[test]
    fn test_too_many_vertices_for_index_width() {
        // Tag 65536 would wrap to 0 in a u16 and make triangle 0 degenerate
        let faces = [[0, 1, 65536], [1, 0, 2]];
        let result: Result<MeshTopology<u16>> = build_topology(65537, &faces);
        assert!(matches!(
            result,
            Err(MeshError::IndexOverflow { what: "vertices", count: 65537, index_type: "u16" })
        ));

        let wide: MeshTopology<u32> = build_topology(65537, &faces).unwrap();
        assert_eq!(wide.triangle(TriangleId::new(0))[2].index(), 65536);
        assert!(wide.opposite_vertices(BondId::new(0)).is_ok());
    }

    #[test]
    fn test_largest_u16_mesh_is_accepted() {
        let faces = [[0, 1, 65535], [1, 0, 2]];
        let topo: MeshTopology<u16> = build_topology(65536, &faces).unwrap();
        assert_eq!(topo.triangle(TriangleId::new(0))[2].index(), 65535);
    }

    #[test]
    fn test_triangle_list_roundtrip() {
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let topo: MeshTopology<u16> = build_topology(4, &faces).unwrap();
        assert_eq!(to_triangle_list(&topo), faces);
    }
}
