//! Bond/triangle mesh topology.
//!
//! This module provides the connectivity a membrane force needs: every mesh
//! bond stores its two endpoint tags plus the (at most two) triangles sharing
//! it, and every triangle stores its three vertex tags.
//!
//! # Boundary Handling
//!
//! A bond on the mesh boundary has only one incident triangle. It is stored
//! with both triangle references equal (`tr1 == tr2`), and
//! [`MeshBond::is_boundary`] reports it. Force computations skip such bonds.
//!
//! # Bond Types
//!
//! Bonds carry a [`BondTypeId`] naming the parameter set they use. A new
//! topology registers a single type called [`DEFAULT_BOND_TYPE`].

use super::index::{ensure_capacity, BondId, BondTypeId, MeshIndex, TriangleId, VertexTag};
use crate::error::{MeshError, Result};

/// Name of the bond type every topology starts with.
pub const DEFAULT_BOND_TYPE: &str = "mesh";

/// A mesh bond: an edge between two vertices and its incident triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshBond<I: MeshIndex = u32> {
    /// First endpoint.
    pub a: VertexTag<I>,

    /// Second endpoint.
    pub b: VertexTag<I>,

    /// The two triangles sharing this bond. Equal for boundary bonds.
    pub triangles: [TriangleId<I>; 2],

    /// The parameter type of this bond.
    pub bond_type: BondTypeId<I>,
}

impl<I: MeshIndex> MeshBond<I> {
    /// Create a bond of the default type.
    pub fn new(
        a: VertexTag<I>,
        b: VertexTag<I>,
        tr1: TriangleId<I>,
        tr2: TriangleId<I>,
    ) -> Self {
        Self {
            a,
            b,
            triangles: [tr1, tr2],
            bond_type: BondTypeId::new(0),
        }
    }

    /// Check if this bond lies on the mesh boundary (no second triangle).
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.triangles[0] == self.triangles[1]
    }
}

/// Find the vertex of `triangle` that is neither `a` nor `b`.
///
/// Returns `None` when every vertex of the triangle is `a` or `b`, which
/// means the triangle does not actually contain the bond.
///
/// # Example
///
/// ```
/// use helfrich::mesh::{opposite_vertex, VertexTag};
///
/// let tri: [VertexTag; 3] = [VertexTag::new(4), VertexTag::new(7), VertexTag::new(9)];
/// let c = opposite_vertex(&tri, VertexTag::new(9), VertexTag::new(4));
/// assert_eq!(c, Some(VertexTag::new(7)));
/// ```
#[inline]
pub fn opposite_vertex<I: MeshIndex>(
    triangle: &[VertexTag<I>; 3],
    a: VertexTag<I>,
    b: VertexTag<I>,
) -> Option<VertexTag<I>> {
    triangle.iter().copied().find(|&v| v != a && v != b)
}

/// Bond and triangle connectivity of a membrane mesh.
#[derive(Debug, Clone)]
pub struct MeshTopology<I: MeshIndex = u32> {
    pub(crate) bonds: Vec<MeshBond<I>>,
    pub(crate) triangles: Vec<[VertexTag<I>; 3]>,
    type_names: Vec<String>,
    num_vertices: usize,
}

impl<I: MeshIndex> Default for MeshTopology<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> MeshTopology<I> {
    /// Create an empty topology with the default bond type registered.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create an empty topology with pre-allocated capacity.
    pub fn with_capacity(num_bonds: usize, num_triangles: usize) -> Self {
        Self {
            bonds: Vec::with_capacity(num_bonds),
            triangles: Vec::with_capacity(num_triangles),
            type_names: vec![DEFAULT_BOND_TYPE.to_string()],
            num_vertices: 0,
        }
    }

    // ==================== Element Access ====================

    /// Get the number of vertices (one past the largest referenced tag).
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Get the number of bonds, including boundary bonds.
    #[inline]
    pub fn num_bonds(&self) -> usize {
        self.bonds.len()
    }

    /// Get the number of triangles.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Count bonds with a single incident triangle.
    pub fn num_boundary_bonds(&self) -> usize {
        self.bonds.iter().filter(|b| b.is_boundary()).count()
    }

    /// Get a bond by ID.
    #[inline]
    pub fn bond(&self, id: BondId<I>) -> &MeshBond<I> {
        &self.bonds[id.index()]
    }

    /// Get the vertex tags of a triangle.
    #[inline]
    pub fn triangle(&self, id: TriangleId<I>) -> &[VertexTag<I>; 3] {
        &self.triangles[id.index()]
    }

    /// Iterate over all bond IDs.
    pub fn bond_ids(&self) -> impl Iterator<Item = BondId<I>> + '_ {
        (0..self.bonds.len()).map(BondId::new)
    }

    /// Iterate over all bonds with their IDs.
    pub fn bonds(&self) -> impl Iterator<Item = (BondId<I>, &MeshBond<I>)> + '_ {
        self.bonds
            .iter()
            .enumerate()
            .map(|(i, b)| (BondId::new(i), b))
    }

    /// Iterate over all triangles with their IDs.
    pub fn triangles(&self) -> impl Iterator<Item = (TriangleId<I>, &[VertexTag<I>; 3])> + '_ {
        self.triangles
            .iter()
            .enumerate()
            .map(|(i, t)| (TriangleId::new(i), t))
    }

    // ==================== Construction ====================

    /// Add a triangle and return its ID.
    pub fn add_triangle(&mut self, tags: [VertexTag<I>; 3]) -> Result<TriangleId<I>> {
        ensure_capacity::<I>("triangles", self.triangles.len() + 1)?;
        for tag in tags {
            self.num_vertices = self.num_vertices.max(tag.index() + 1);
        }
        let id = TriangleId::new(self.triangles.len());
        self.triangles.push(tags);
        Ok(id)
    }

    /// Add a bond and return its ID.
    ///
    /// Both triangle references must already exist.
    pub fn add_bond(&mut self, bond: MeshBond<I>) -> Result<BondId<I>> {
        ensure_capacity::<I>("bonds", self.bonds.len() + 1)?;
        for tri in bond.triangles {
            if tri.index() >= self.triangles.len() {
                return Err(MeshError::InvalidState(format!(
                    "bond ({}, {}) references missing triangle {}",
                    bond.a.index(),
                    bond.b.index(),
                    tri.index()
                )));
            }
        }
        if bond.bond_type.index() >= self.type_names.len() {
            return Err(MeshError::InvalidState(format!(
                "bond ({}, {}) references missing bond type {}",
                bond.a.index(),
                bond.b.index(),
                bond.bond_type.index()
            )));
        }
        self.num_vertices = self
            .num_vertices
            .max(bond.a.index() + 1)
            .max(bond.b.index() + 1);
        let id = BondId::new(self.bonds.len());
        self.bonds.push(bond);
        Ok(id)
    }

    // ==================== Bond Types ====================

    /// Get the names of all registered bond types, indexed by type ID.
    pub fn bond_type_names(&self) -> &[String] {
        &self.type_names
    }

    /// For every registered type, whether at least one bond has it.
    pub fn bond_types_in_use(&self) -> Vec<bool> {
        let mut in_use = vec![false; self.type_names.len()];
        for bond in &self.bonds {
            in_use[bond.bond_type.index()] = true;
        }
        in_use
    }

    /// Look up a bond type by name.
    pub fn type_id_by_name(&self, name: &str) -> Option<BondTypeId<I>> {
        self.type_names
            .iter()
            .position(|n| n == name)
            .map(BondTypeId::new)
    }

    /// Get the name of a bond type.
    pub fn type_name(&self, id: BondTypeId<I>) -> Option<&str> {
        self.type_names.get(id.index()).map(String::as_str)
    }

    /// Register a bond type, returning the existing ID if the name is taken.
    pub fn add_bond_type(&mut self, name: &str) -> BondTypeId<I> {
        if let Some(id) = self.type_id_by_name(name) {
            return id;
        }
        self.type_names.push(name.to_string());
        BondTypeId::new(self.type_names.len() - 1)
    }

    /// Assign a registered type to a bond.
    pub fn set_bond_type(&mut self, bond: BondId<I>, bond_type: BondTypeId<I>) -> Result<()> {
        if bond_type.index() >= self.type_names.len() {
            return Err(MeshError::InvalidState(format!(
                "bond type {} is not registered",
                bond_type.index()
            )));
        }
        let b = self.bonds.get_mut(bond.index()).ok_or_else(|| {
            MeshError::InvalidState(format!("bond {} does not exist", bond.index()))
        })?;
        b.bond_type = bond_type;
        Ok(())
    }

    // ==================== Stencil Queries ====================

    /// Get the vertices opposite a bond in its two triangles (`c`, `d`).
    ///
    /// For boundary bonds both values come from the same triangle.
    pub fn opposite_vertices(&self, id: BondId<I>) -> Result<(VertexTag<I>, VertexTag<I>)> {
        let bond = self.bond(id);
        let [tr1, tr2] = bond.triangles;
        let find = |tri: TriangleId<I>| {
            opposite_vertex(self.triangle(tri), bond.a, bond.b).ok_or(
                MeshError::MissingOppositeVertex {
                    bond: id.index(),
                    triangle: tri.index(),
                },
            )
        };
        Ok((find(tr1)?, find(tr2)?))
    }
}
