//! Index types for mesh elements.
//!
//! Vertex tags, triangles, bonds and bond types each get their own id type so
//! they cannot be mixed up. The ids are generic over the stored integer width:
//! `u16` for small patches, `u32` for typical membranes, `u64` for very large
//! ones. A mesh that does not fit the chosen width is rejected when it is
//! built, see [`ensure_capacity`].
//!
//! A [`VertexTag`] is a stable logical identity. It is never a position in a
//! particle array: particle slots may be reordered between steps and are
//! looked up through a [`TagResolver`](crate::domain::TagResolver).

use std::fmt::{self, Debug};
use std::hash::Hash;

use crate::error::{MeshError, Result};

/// Integer widths usable as mesh indices.
pub trait MeshIndex: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Name of the integer type, for error messages.
    const NAME: &'static str;

    /// Convert from `usize`, or `None` if `v` does not fit.
    fn try_from_usize(v: usize) -> Option<Self>;

    /// Convert from `usize` without a range check in release builds.
    ///
    /// Only used for values already covered by [`ensure_capacity`].
    fn from_usize(v: usize) -> Self;

    /// Convert to `usize`.
    fn to_usize(self) -> usize;
}

macro_rules! impl_mesh_index {
    ($($t:ty),*) => {
        $(
            impl MeshIndex for $t {
                const NAME: &'static str = stringify!($t);

                #[inline]
                fn try_from_usize(v: usize) -> Option<Self> {
                    <$t>::try_from(v).ok()
                }

                #[inline]
                fn from_usize(v: usize) -> Self {
                    debug_assert!(
                        Self::try_from_usize(v).is_some(),
                        "index {} too large for {}",
                        v,
                        Self::NAME
                    );
                    v as $t
                }

                #[inline]
                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_mesh_index!(u16, u32, u64);

/// Check that `count` elements of kind `what` can be addressed with `I`.
pub fn ensure_capacity<I: MeshIndex>(what: &'static str, count: usize) -> Result<()> {
    match count.checked_sub(1) {
        Some(last) if I::try_from_usize(last).is_none() => Err(MeshError::IndexOverflow {
            what,
            count,
            index_type: I::NAME,
        }),
        _ => Ok(()),
    }
}

/// A stable vertex identity.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexTag<I: MeshIndex = u32>(I);

/// A triangle of the mesh.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TriangleId<I: MeshIndex = u32>(I);

/// A bond (undirected edge) of the mesh.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct BondId<I: MeshIndex = u32>(I);

/// A registered bond type.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct BondTypeId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Wrap `index`, which must fit the index width.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Wrap `index`, or `None` if it does not fit the index width.
            #[inline]
            pub fn try_new(index: usize) -> Option<Self> {
                I::try_from_usize(index).map(Self)
            }

            /// The index as `usize`.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.index())
            }
        }
    };
}

impl_index_type!(VertexTag, "T");
impl_index_type!(TriangleId, "Tri");
impl_index_type!(BondId, "B");
impl_index_type!(BondTypeId, "Ty");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_distinct_types() {
        let v: VertexTag = VertexTag::new(3);
        let b: BondId = BondId::new(3);
        assert_eq!(v.index(), b.index());
        assert_eq!(format!("{:?} {:?}", v, b), "T(3) B(3)");
    }

    #[test]
    fn test_try_new_respects_width() {
        assert_eq!(VertexTag::<u16>::try_new(65535).map(|t| t.index()), Some(65535));
        assert!(VertexTag::<u16>::try_new(65536).is_none());
        assert!(TriangleId::<u32>::try_new(1 << 20).is_some());
    }

    #[test]
    fn test_capacity_check() {
        assert!(ensure_capacity::<u16>("vertices", 0).is_ok());
        assert!(ensure_capacity::<u16>("vertices", 65536).is_ok());
        assert!(matches!(
            ensure_capacity::<u16>("vertices", 65537),
            Err(MeshError::IndexOverflow { what: "vertices", count: 65537, index_type: "u16" })
        ));
        assert!(ensure_capacity::<u64>("bonds", usize::MAX).is_ok());
    }
}
