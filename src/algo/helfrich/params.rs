//! Bending modulus per bond type.

use std::fmt;

use crate::error::{MeshError, Result};
use crate::mesh::{BondTypeId, MeshIndex};

/// A non-fatal problem with a parameter value.
///
/// The value is still stored and used.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterWarning {
    /// A bending modulus of zero or less was set.
    NonPositiveModulus {
        /// The bond type name.
        name: String,
        /// The modulus that was set.
        value: f64,
    },
}

impl fmt::Display for ParameterWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterWarning::NonPositiveModulus { name, value } => write!(
                f,
                "bending modulus K = {} for bond type {} is not positive",
                value, name
            ),
        }
    }
}

/// Bending moduli keyed by bond type.
///
/// The set of type names is fixed when the store is created; only the
/// moduli change afterwards.
#[derive(Debug, Clone)]
pub struct BendingParams {
    names: Vec<String>,
    moduli: Vec<Option<f64>>,
}

impl BendingParams {
    /// Create a store for the given type names with no modulus set.
    pub fn new(type_names: &[String]) -> Self {
        Self {
            names: type_names.to_vec(),
            moduli: vec![None; type_names.len()],
        }
    }

    /// Number of bond types.
    pub fn num_types(&self) -> usize {
        self.names.len()
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| MeshError::UnknownType {
                name: name.to_string(),
            })
    }

    /// Set the modulus of a named bond type.
    ///
    /// Unknown names are an error. A non-positive modulus is accepted but
    /// logged and reported back as a warning.
    pub fn set(&mut self, name: &str, kappa: f64) -> Result<Option<ParameterWarning>> {
        let idx = self.position(name)?;
        Ok(self.store(idx, kappa))
    }

    /// Set the modulus of a bond type by ID.
    pub fn set_by_id<I: MeshIndex>(
        &mut self,
        id: BondTypeId<I>,
        kappa: f64,
    ) -> Result<Option<ParameterWarning>> {
        if id.index() >= self.names.len() {
            return Err(MeshError::UnknownType {
                name: format!("#{}", id.index()),
            });
        }
        Ok(self.store(id.index(), kappa))
    }

    fn store(&mut self, idx: usize, kappa: f64) -> Option<ParameterWarning> {
        self.moduli[idx] = Some(kappa);
        if kappa <= 0.0 {
            log::warn!(
                "bending modulus K = {} for bond type {} is not positive",
                kappa,
                self.names[idx]
            );
            return Some(ParameterWarning::NonPositiveModulus {
                name: self.names[idx].clone(),
                value: kappa,
            });
        }
        None
    }

    /// Get the modulus of a named bond type.
    pub fn get(&self, name: &str) -> Result<f64> {
        let idx = self.position(name)?;
        self.moduli[idx].ok_or_else(|| MeshError::MissingParameter {
            name: name.to_string(),
        })
    }

    /// Dense table of moduli indexed by bond type ID.
    ///
    /// `in_use[t]` marks the types some bond refers to. Those must have a
    /// modulus; an unset type that no bond uses reads as zero.
    pub fn moduli(&self, in_use: &[bool]) -> Result<Vec<f64>> {
        self.moduli
            .iter()
            .zip(&self.names)
            .enumerate()
            .map(|(t, (k, name))| match k {
                Some(k) => Ok(*k),
                None if in_use.get(t).copied().unwrap_or(false) => {
                    Err(MeshError::MissingParameter { name: name.clone() })
                }
                None => Ok(0.0),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["mesh".to_string(), "stiff".to_string()]
    }

    #[test]
    fn test_set_and_get() {
        let mut params = BendingParams::new(&names());
        assert_eq!(params.set("stiff", 20.0).unwrap(), None);
        assert_eq!(params.get("stiff").unwrap(), 20.0);

        // Later values replace earlier ones
        params.set("stiff", 5.0).unwrap();
        assert_eq!(params.get("stiff").unwrap(), 5.0);
    }

    #[test]
    fn test_unknown_type() {
        let mut params = BendingParams::new(&names());
        assert!(matches!(
            params.set("skin", 1.0),
            Err(MeshError::UnknownType { .. })
        ));
        assert!(matches!(
            params.get("skin"),
            Err(MeshError::UnknownType { .. })
        ));
        let bad: BondTypeId = BondTypeId::new(7);
        assert!(params.set_by_id(bad, 1.0).is_err());
    }

    #[test]
    fn test_unset_type() {
        let mut params = BendingParams::new(&names());
        params.set("mesh", 1.0).unwrap();
        assert!(matches!(
            params.get("stiff"),
            Err(MeshError::MissingParameter { .. })
        ));
        assert!(matches!(
            params.moduli(&[true, true]),
            Err(MeshError::MissingParameter { name }) if name == "stiff"
        ));

        // No bond of the unset type, nothing to complain about
        assert_eq!(params.moduli(&[true, false]).unwrap(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_non_positive_modulus_warns() {
        let mut params = BendingParams::new(&names());
        let warning = params.set("mesh", -1.0).unwrap();
        assert_eq!(
            warning,
            Some(ParameterWarning::NonPositiveModulus {
                name: "mesh".to_string(),
                value: -1.0
            })
        );
        // Stored anyway
        assert_eq!(params.get("mesh").unwrap(), -1.0);
        assert!(params.set("stiff", 0.0).unwrap().is_some());
    }

    #[test]
    fn test_dense_table() {
        let mut params = BendingParams::new(&names());
        let stiff: BondTypeId = BondTypeId::new(1);
        params.set_by_id(stiff, 3.0).unwrap();
        params.set("mesh", 1.5).unwrap();
        assert_eq!(params.moduli(&[true, true]).unwrap(), vec![1.5, 3.0]);
    }
}
