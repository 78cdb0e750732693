//! Binary fingerprints and Tanimoto similarity.
//!
//! Fingerprints are always taken over the heavy-atom graph: explicit hydrogens
//! are folded back into counts first, so a hydrogen-completed molecule and its
//! SMILES form give identical bits.

mod bitvec;
mod hash;
pub mod morgan;
pub mod path;

pub use bitvec::{Fingerprint, tanimoto};

use crate::core::models::molecule::Molecule;
use crate::core::perception::hydrogens::remove_hydrogens;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_RADIUS: usize = 2;
pub const DEFAULT_BITS: usize = 2048;
/// The path fingerprint always uses this length.
pub const PATH_BITS: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintKind {
    /// Circular fingerprint with configurable radius and length.
    #[default]
    Morgan,
    /// Linear-path fingerprint.
    Rdkit,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown fingerprint type '{0}' (expected 'morgan' or 'rdkit')")]
pub struct ParseFingerprintKindError(String);

impl FromStr for FingerprintKind {
    type Err = ParseFingerprintKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "morgan" => Ok(Self::Morgan),
            "rdkit" | "path" => Ok(Self::Rdkit),
            _ => Err(ParseFingerprintKindError(s.to_string())),
        }
    }
}

impl fmt::Display for FingerprintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Morgan => "morgan",
            Self::Rdkit => "rdkit",
        })
    }
}

/// Fingerprint of `mol` of the requested kind. `radius` and `n_bits` only apply
/// to Morgan fingerprints.
pub fn fingerprint(
    mol: &Molecule,
    kind: FingerprintKind,
    radius: usize,
    n_bits: usize,
) -> Fingerprint {
    let heavy: Cow<'_, Molecule> = if mol.has_explicit_hydrogens() {
        Cow::Owned(remove_hydrogens(mol))
    } else {
        Cow::Borrowed(mol)
    };
    match kind {
        FingerprintKind::Morgan => morgan::morgan(&heavy, radius, n_bits),
        FingerprintKind::Rdkit => path::path_fingerprint(&heavy, PATH_BITS),
    }
}
