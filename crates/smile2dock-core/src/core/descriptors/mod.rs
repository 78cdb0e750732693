//! Physicochemical descriptors reported for every converted molecule.

pub mod crippen;
pub mod lipinski;
pub mod mass;
pub mod rings;
pub mod tpsa;

use crate::core::models::molecule::Molecule;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use thiserror::Error;
use tracing::instrument;

pub const MOLECULAR_WEIGHT: &str = "Molecular Weight";
pub const CRIPPEN_LOGP: &str = "Crippen_LogP";
pub const CRIPPEN_MR: &str = "Crippen_MR";
pub const H_BOND_DONORS: &str = "H-Bond Donors";
pub const H_BOND_ACCEPTORS: &str = "H-Bond Acceptors";
pub const TPSA: &str = "TPSA";
pub const ROTATABLE_BONDS: &str = "Rotatable Bonds";
pub const ALIPHATIC_RINGS: &str = "#Aliphatic Rings";
pub const AROMATIC_RINGS: &str = "#Aromatic Rings";
pub const HETEROAROMATIC_RINGS: &str = "#Heteroaromatic Rings";

/// Every descriptor label in report order.
pub const LABELS: [&str; 10] = [
    MOLECULAR_WEIGHT,
    CRIPPEN_LOGP,
    CRIPPEN_MR,
    H_BOND_DONORS,
    H_BOND_ACCEPTORS,
    TPSA,
    ROTATABLE_BONDS,
    ALIPHATIC_RINGS,
    AROMATIC_RINGS,
    HETEROAROMATIC_RINGS,
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Cannot compute descriptors of an empty molecule")]
    EmptyMolecule,
}

/// Descriptor values keyed by label, kept in insertion order.
///
/// Serialises as a map so JSON or TOML output keeps the report order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(&'static str, f64)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, replacing an existing entry with the same label in place.
    pub fn insert(&mut self, label: &'static str, value: f64) {
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|&(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Computes every descriptor of [`LABELS`].
///
/// Works on a hydrogen-completed molecule as well as on one with implicit
/// hydrogens; both give the same values.
#[instrument(skip_all, fields(atoms = mol.atom_count()))]
pub fn calculate(mol: &Molecule) -> Result<Properties, DescriptorError> {
    if mol.is_empty() {
        return Err(DescriptorError::EmptyMolecule);
    }
    let ring_counts = rings::ring_counts(mol);
    let mut props = Properties::new();
    props.insert(MOLECULAR_WEIGHT, mass::exact_mass(mol));
    props.insert(CRIPPEN_LOGP, crippen::log_p(mol));
    props.insert(CRIPPEN_MR, crippen::molar_refractivity(mol));
    props.insert(H_BOND_DONORS, lipinski::h_bond_donors(mol) as f64);
    props.insert(H_BOND_ACCEPTORS, lipinski::h_bond_acceptors(mol) as f64);
    props.insert(TPSA, tpsa::tpsa(mol));
    props.insert(ROTATABLE_BONDS, lipinski::rotatable_bonds(mol) as f64);
    props.insert(ALIPHATIC_RINGS, ring_counts.aliphatic as f64);
    props.insert(AROMATIC_RINGS, ring_counts.aromatic as f64);
    props.insert(HETEROAROMATIC_RINGS, ring_counts.heterocycles as f64);
    Ok(props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::perception::add_hydrogens;
    use crate::core::smiles;

    #[test]
    fn reports_every_label_in_order() {
        let mol = add_hydrogens(&smiles::parse("CC(=O)Oc1ccccc1C(=O)O").unwrap());
        let props = calculate(&mol).unwrap();
        let labels: Vec<&str> = props.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, LABELS);
        assert!((props.get(MOLECULAR_WEIGHT).unwrap() - 180.0423).abs() < 1e-3);
        assert_eq!(props.get(H_BOND_DONORS), Some(1.0));
        assert_eq!(props.get(AROMATIC_RINGS), Some(1.0));
        assert_eq!(props.get(ALIPHATIC_RINGS), Some(0.0));
    }

    #[test]
    fn empty_molecule_is_an_error() {
        assert_eq!(
            calculate(&Molecule::new()),
            Err(DescriptorError::EmptyMolecule)
        );
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut props = Properties::new();
        props.insert(TPSA, 1.0);
        props.insert(CRIPPEN_LOGP, 2.0);
        props.insert(TPSA, 3.0);
        assert_eq!(props.len(), 2);
        assert_eq!(props.iter().next(), Some((TPSA, 3.0)));
    }
}
