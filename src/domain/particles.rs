//! Particle positions and tag resolution.
//!
//! Positions are stored by *slot*. Slots may be reordered between steps, so
//! mesh code never indexes positions by tag directly: it asks a
//! [`TagResolver`] for the current slot of a tag first.
//!
//! Slots `0..num_local` hold locally owned particles; slots after that hold
//! ghosts, read-only replicas owned by a neighbouring partition. Forces and
//! energies are never written to ghost slots.

use nalgebra::Point3;

use crate::error::{MeshError, Result};

/// Maps a stable particle tag to its current slot.
pub trait TagResolver {
    /// The current slot of `tag`, or `None` if the tag is not present.
    fn slot(&self, tag: usize) -> Option<usize>;
}

/// Read access to slot-ordered particle positions.
pub trait ParticleView: TagResolver + Sync {
    /// Position of the particle in `slot`.
    fn position(&self, slot: usize) -> Point3<f64>;

    /// Number of locally owned slots. Slots at or after this are ghosts.
    fn num_local(&self) -> usize;

    /// Total number of slots, ghosts included.
    fn num_slots(&self) -> usize;

    /// Check whether `slot` is locally owned.
    #[inline]
    fn is_local(&self, slot: usize) -> bool {
        slot < self.num_local()
    }
}

/// An in-memory particle store.
#[derive(Debug, Clone)]
pub struct ParticleData {
    positions: Vec<Point3<f64>>,
    slot_to_tag: Vec<usize>,
    tag_to_slot: Vec<Option<usize>>,
    num_local: usize,
}

impl ParticleData {
    /// Create a store where every particle is local and tag `i` sits in slot `i`.
    pub fn new(positions: Vec<Point3<f64>>) -> Self {
        let n = positions.len();
        Self {
            positions,
            slot_to_tag: (0..n).collect(),
            tag_to_slot: (0..n).map(Some).collect(),
            num_local: n,
        }
    }

    /// Create a store with explicit slot tags and ghost slots.
    ///
    /// `tags[s]` is the tag held by slot `s`. The first `num_local` slots are
    /// local; the rest are ghosts. Tags must be unique.
    pub fn with_ghosts(
        positions: Vec<Point3<f64>>,
        tags: Vec<usize>,
        num_local: usize,
    ) -> Result<Self> {
        if tags.len() != positions.len() {
            return Err(MeshError::InvalidState(format!(
                "{} tags given for {} positions",
                tags.len(),
                positions.len()
            )));
        }
        if num_local > positions.len() {
            return Err(MeshError::InvalidState(format!(
                "num_local {} exceeds slot count {}",
                num_local,
                positions.len()
            )));
        }

        let max_tag = tags.iter().copied().max().map_or(0, |t| t + 1);
        let mut tag_to_slot = vec![None; max_tag];
        for (slot, &tag) in tags.iter().enumerate() {
            if tag_to_slot[tag].replace(slot).is_some() {
                return Err(MeshError::InvalidState(format!(
                    "tag {} appears in more than one slot",
                    tag
                )));
            }
        }

        Ok(Self {
            positions,
            slot_to_tag: tags,
            tag_to_slot,
            num_local,
        })
    }

    /// Reorder slots: new slot `i` takes the particle from old slot `order[i]`.
    ///
    /// `order` must be a permutation that keeps local particles in local slots.
    pub fn permute(&mut self, order: &[usize]) -> Result<()> {
        let n = self.positions.len();
        if order.len() != n {
            return Err(MeshError::InvalidState(format!(
                "permutation has {} entries for {} slots",
                order.len(),
                n
            )));
        }

        let mut seen = vec![false; n];
        for (new_slot, &old_slot) in order.iter().enumerate() {
            if old_slot >= n || std::mem::replace(&mut seen[old_slot], true) {
                return Err(MeshError::InvalidState(format!(
                    "slot order is not a permutation at entry {}",
                    new_slot
                )));
            }
            if (new_slot < self.num_local) != (old_slot < self.num_local) {
                return Err(MeshError::InvalidState(format!(
                    "permutation moves slot {} across the local/ghost boundary",
                    old_slot
                )));
            }
        }

        self.positions = order.iter().map(|&s| self.positions[s]).collect();
        self.slot_to_tag = order.iter().map(|&s| self.slot_to_tag[s]).collect();
        for (slot, &tag) in self.slot_to_tag.iter().enumerate() {
            self.tag_to_slot[tag] = Some(slot);
        }
        Ok(())
    }

    /// The tag held by `slot`.
    #[inline]
    pub fn tag(&self, slot: usize) -> usize {
        self.slot_to_tag[slot]
    }

    /// Position of the particle tagged `tag`, if present.
    pub fn position_of(&self, tag: usize) -> Option<Point3<f64>> {
        self.slot(tag).map(|s| self.positions[s])
    }

    /// Mutable position of the particle in `slot`.
    #[inline]
    pub fn position_mut(&mut self, slot: usize) -> &mut Point3<f64> {
        &mut self.positions[slot]
    }

    /// All positions in slot order.
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }
}

impl TagResolver for ParticleData {
    #[inline]
    fn slot(&self, tag: usize) -> Option<usize> {
        self.tag_to_slot.get(tag).copied().flatten()
    }
}

impl ParticleView for ParticleData {
    #[inline]
    fn position(&self, slot: usize) -> Point3<f64> {
        self.positions[slot]
    }

    #[inline]
    fn num_local(&self) -> usize {
        self.num_local
    }

    #[inline]
    fn num_slots(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Point3<f64>> {
        (0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_identity_ordering() {
        let p = ParticleData::new(line(3));
        assert_eq!(p.num_local(), 3);
        assert_eq!(p.num_slots(), 3);
        assert_eq!(p.slot(2), Some(2));
        assert_eq!(p.slot(3), None);
        assert!(p.is_local(2));
    }

    #[test]
    fn test_ghost_slots() {
        let p = ParticleData::with_ghosts(line(4), vec![7, 2, 5, 0], 2).unwrap();
        assert_eq!(p.slot(7), Some(0));
        assert_eq!(p.slot(0), Some(3));
        assert_eq!(p.slot(1), None);
        assert!(p.is_local(1));
        assert!(!p.is_local(2));
        assert_eq!(p.position_of(5), Some(Point3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_duplicate_tags_rejected() {
        let result = ParticleData::with_ghosts(line(3), vec![1, 4, 1], 3);
        assert!(matches!(result, Err(MeshError::InvalidState(_))));
    }

    #[test]
    fn test_permute_tracks_tags() {
        let mut p = ParticleData::new(line(4));
        p.permute(&[2, 0, 3, 1]).unwrap();

        assert_eq!(p.tag(0), 2);
        assert_eq!(p.slot(2), Some(0));
        assert_eq!(p.slot(1), Some(3));
        assert_eq!(p.position_of(3), Some(Point3::new(3.0, 0.0, 0.0)));
        assert_eq!(p.position(1), Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_permute_rejects_bad_orders() {
        let mut p = ParticleData::with_ghosts(line(3), vec![0, 1, 2], 2).unwrap();
        assert!(p.permute(&[0, 0, 2]).is_err());
        assert!(p.permute(&[0, 1]).is_err());
        // Ghost slot 2 may not move into the local range
        assert!(p.permute(&[2, 1, 0]).is_err());
        assert!(p.permute(&[1, 0, 2]).is_ok());
    }
}
