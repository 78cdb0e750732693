//! Writers for the structure file formats consumed by docking and visualization
//! tools.
//!
//! Every writer implements [`traits::MolecularFile`] over a [`Structure`]: one
//! molecule, one of its conformers and per-atom partial charges. The
//! [`OutputFormat`] enum ties a format to its file extension and dispatches to the
//! right writer.

pub mod mol2;
pub mod pdb;
pub mod pdbqt;
pub mod sdf;
pub mod traits;

use crate::core::models::conformer::Conformer;
use crate::core::models::molecule::Molecule;
use crate::core::perception::KekulizeError;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use traits::MolecularFile;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Conformer has {positions} positions but the molecule has {atoms} atoms")]
    PositionMismatch { atoms: usize, positions: usize },
    #[error("Expected {atoms} partial charges, got {charges}")]
    ChargeMismatch { atoms: usize, charges: usize },
    #[error("Cannot assign bond orders: {0}")]
    Kekulize(#[from] KekulizeError),
    #[error("{format} cannot hold {count} atoms")]
    TooManyAtoms { format: &'static str, count: usize },
}

/// One conformer of a molecule, ready to be written.
#[derive(Debug, Clone, Copy)]
pub struct Structure<'a> {
    pub molecule: &'a Molecule,
    pub conformer: &'a Conformer,
    /// Partial charges, one per atom.
    pub charges: &'a [f64],
    pub title: &'a str,
}

impl<'a> Structure<'a> {
    pub fn new(
        molecule: &'a Molecule,
        conformer: &'a Conformer,
        charges: &'a [f64],
        title: &'a str,
    ) -> Result<Self, WriteError> {
        let atoms = molecule.atom_count();
        if conformer.len() != atoms {
            return Err(WriteError::PositionMismatch {
                atoms,
                positions: conformer.len(),
            });
        }
        if charges.len() != atoms {
            return Err(WriteError::ChargeMismatch {
                atoms,
                charges: charges.len(),
            });
        }
        Ok(Self {
            molecule,
            conformer,
            charges,
            title,
        })
    }

    #[inline]
    pub fn position(&self, idx: usize) -> &Point3<f64> {
        self.conformer.position(idx)
    }
}

/// Atom names unique within the molecule: the element symbol followed by a
/// per-element counter (`C1`, `C2`, `O1`, `H1`, ...).
pub(crate) fn atom_names(mol: &Molecule) -> Vec<String> {
    let mut counters: HashMap<&'static str, usize> = HashMap::new();
    mol.atoms()
        .iter()
        .map(|atom| {
            let count = counters.entry(atom.symbol()).or_insert(0);
            *count += 1;
            format!("{}{}", atom.symbol(), count)
        })
        .collect()
}

/// Pads an atom name into the four PDB name columns. One-letter elements start
/// in the second column.
pub(crate) fn pdb_atom_name(name: &str, symbol: &str) -> String {
    if symbol.len() == 1 && name.len() < 4 {
        format!(" {name:<3}")
    } else {
        format!("{name:<4.4}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pdb,
    Mol2,
    Sdf,
    Pdbqt,
}

impl OutputFormat {
    /// Every format, in the order files are written.
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Pdb,
        OutputFormat::Mol2,
        OutputFormat::Sdf,
        OutputFormat::Pdbqt,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdb => "pdb",
            OutputFormat::Mol2 => "mol2",
            OutputFormat::Sdf => "sdf",
            OutputFormat::Pdbqt => "pdbqt",
        }
    }

    /// Writes the structures to `path`. Only SDF holds several records; the
    /// other formats write the first structure.
    pub fn write_to_path(
        self,
        structures: &[Structure<'_>],
        path: impl AsRef<Path>,
    ) -> Result<(), WriteError> {
        let Some(first) = structures.first() else {
            return Ok(());
        };
        match self {
            OutputFormat::Pdb => pdb::PdbFile::write_structure_to_path(first, path),
            OutputFormat::Mol2 => mol2::Mol2File::write_structure_to_path(first, path),
            OutputFormat::Sdf => {
                sdf::SdfFile::write_records_to_path(structures, &Default::default(), path)
            }
            OutputFormat::Pdbqt => pdbqt::PdbqtFile::write_structure_to_path(first, path),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown output format '{0}' (expected pdb, mol2, sdf or pdbqt)")]
pub struct ParseFormatError(pub String);

impl FromStr for OutputFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().trim_start_matches('.').to_ascii_lowercase();
        OutputFormat::ALL
            .into_iter()
            .find(|f| f.extension() == lower)
            .ok_or_else(|| ParseFormatError(s.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::charges::gasteiger_charges;
    use crate::core::embed::{EmbedParams, embed_multiple};
    use crate::core::perception::add_hydrogens;
    use crate::core::smiles;

    /// A hydrogen-completed molecule with one embedded conformer and charges.
    pub fn prepared(s: &str) -> (Molecule, Conformer, Vec<f64>) {
        let mol = add_hydrogens(&smiles::parse(s).unwrap());
        let params = EmbedParams {
            num_conformers: 1,
            ..EmbedParams::default()
        };
        let conf = embed_multiple(&mol, &params).unwrap().remove(0);
        let charges = gasteiger_charges(&mol);
        (mol, conf, charges)
    }

    pub fn render<F: MolecularFile>(structure: &Structure<'_>) -> String {
        let mut out = Vec::new();
        F::write_structure_to(structure, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::prepared;
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn formats_parse_from_extensions() {
        assert_eq!("PDBQT".parse(), Ok(OutputFormat::Pdbqt));
        assert_eq!(".sdf".parse(), Ok(OutputFormat::Sdf));
        assert!("xyz".parse::<OutputFormat>().is_err());
        let order: Vec<_> = OutputFormat::ALL.iter().map(|f| f.extension()).collect();
        assert_eq!(order, ["pdb", "mol2", "sdf", "pdbqt"]);
    }

    #[test]
    fn atom_names_count_per_element() {
        let (mol, _, _) = prepared("OCC");
        let names = atom_names(&mol);
        assert_eq!(&names[..3], &["O1", "C1", "C2"]);
        assert_eq!(names[3], "H1");
        assert_eq!(pdb_atom_name("C1", "C"), " C1 ");
        assert_eq!(pdb_atom_name("Cl1", "Cl"), "Cl1 ");
    }

    #[test]
    fn structure_checks_lengths() {
        let (mol, conf, charges) = prepared("CO");
        assert!(Structure::new(&mol, &conf, &charges, "x").is_ok());
        assert!(matches!(
            Structure::new(&mol, &conf, &charges[1..], "x"),
            Err(WriteError::ChargeMismatch { .. })
        ));
    }

    #[test]
    fn every_format_writes_a_file() {
        let (mol, conf, charges) = prepared("CC(=O)Nc1ccccc1");
        let structure = Structure::new(&mol, &conf, &charges, "acetanilide").unwrap();
        let dir = tempdir().unwrap();
        for format in OutputFormat::ALL {
            let path = dir.path().join(format!("out.{format}"));
            format.write_to_path(&[structure], &path).unwrap();
            assert!(std::fs::metadata(&path).unwrap().len() > 0, "{format}");
        }
    }
}
