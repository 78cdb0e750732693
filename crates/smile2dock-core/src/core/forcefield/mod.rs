//! # Force Field Module
//!
//! Molecular-mechanics energy and geometry optimization in the style of MMFF94.
//!
//! ## Overview
//!
//! Setting up a [`ForceField`] types every atom ([`typing`]), assigns Gasteiger
//! charges and enumerates the terms once. The result can then be evaluated on any
//! conformer of that molecule. Energies are in kcal/mol and split by term
//! ([`term::EnergyTerms`]):
//!
//! - **Bond stretch** (quartic) and **angle bend** (cubic, with a linear form for
//!   sp centres)
//! - **Torsion**, a three-term Fourier series
//! - **Out-of-plane** Wilson bends at trigonal centres
//! - **Van der Waals** through the buffered 14-7 potential
//! - **Electrostatics** through a buffered Coulomb term, with 1-4 pairs scaled
//!
//! Every term has an analytic gradient, which the BFGS [`minimizer`] uses.
//!
//! ## Variants
//!
//! [`ForceFieldVariant::Mmff94s`] is the default. It differs from `Mmff94` in the
//! out-of-plane and torsion constants of delocalised trivalent nitrogen, which it
//! keeps planar.

pub mod energy;
pub mod minimizer;
pub mod params;
pub(crate) mod potentials;
pub mod term;
pub mod typing;

pub use energy::ForceField;
pub use minimizer::{MinimizeOptions, Minimized, minimize};
pub use term::EnergyTerms;

use crate::core::models::conformer::Conformer;
use crate::core::models::molecule::Molecule;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceFieldVariant {
    Mmff94,
    #[default]
    Mmff94s,
}

impl fmt::Display for ForceFieldVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForceFieldVariant::Mmff94 => write!(f, "MMFF94"),
            ForceFieldVariant::Mmff94s => write!(f, "MMFF94s"),
        }
    }
}

impl FromStr for ForceFieldVariant {
    type Err = ForceFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mmff94" => Ok(ForceFieldVariant::Mmff94),
            "mmff94s" => Ok(ForceFieldVariant::Mmff94s),
            _ => Err(ForceFieldError::UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForceFieldError {
    #[error("No force-field parameters for atom {atom} ({symbol})")]
    MissingParameters { atom: usize, symbol: &'static str },
    #[error("Conformer has {found} positions but the molecule has {expected} atoms")]
    ConformerMismatch { expected: usize, found: usize },
    #[error("Energy is not finite")]
    NonFiniteEnergy,
    #[error("Unknown force field variant '{0}' (expected mmff94 or mmff94s)")]
    UnknownVariant(String),
}

/// Minimizes every conformer in parallel.
///
/// A conformer that cannot be optimized is logged and returned unchanged, with
/// `energy` left as it was. Conformers that hit the iteration cap are kept too.
#[instrument(skip_all, fields(conformers = conformers.len(), %variant))]
pub fn optimize_conformers(
    mol: &Molecule,
    conformers: Vec<Conformer>,
    variant: ForceFieldVariant,
    options: &MinimizeOptions,
) -> Vec<Conformer> {
    let ff = match ForceField::setup(mol, variant) {
        Ok(ff) => ff,
        Err(e) => {
            warn!("Force field setup failed, keeping unoptimized conformers: {e}");
            return conformers;
        }
    };

    conformers
        .into_par_iter()
        .enumerate()
        .map(|(conf_id, conformer)| match minimize(&ff, &conformer, options) {
            Ok(result) => {
                if !result.converged {
                    warn!(
                        "Optimization of conformer {conf_id} did not converge in {} iterations",
                        result.iterations
                    );
                }
                debug!(conf_id, energy = result.energy(), "Conformer minimized");
                result.conformer
            }
            Err(e) => {
                warn!("Optimization failed for conformer {conf_id}: {e}");
                conformer
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::embed::{EmbedParams, embed_multiple};
    use crate::core::perception::add_hydrogens;
    use crate::core::smiles;

    #[test]
    fn variant_parses_case_insensitively() {
        assert_eq!("MMFF94s".parse(), Ok(ForceFieldVariant::Mmff94s));
        assert_eq!("mmff94".parse(), Ok(ForceFieldVariant::Mmff94));
        assert!("uff".parse::<ForceFieldVariant>().is_err());
        assert_eq!(ForceFieldVariant::default().to_string(), "MMFF94s");
    }

    #[test]
    fn optimize_conformers_sets_energies_in_order() {
        let mol = add_hydrogens(&smiles::parse("CCO").unwrap());
        let params = EmbedParams {
            num_conformers: 3,
            ..EmbedParams::default()
        };
        let confs = embed_multiple(&mol, &params).unwrap();
        let optimized = optimize_conformers(
            &mol,
            confs.clone(),
            ForceFieldVariant::Mmff94s,
            &MinimizeOptions::default(),
        );
        assert_eq!(optimized.len(), confs.len());
        assert!(optimized.iter().all(|c| c.energy.is_some()));
    }

    #[test]
    fn untyped_atoms_leave_conformers_untouched() {
        let mol = smiles::parse("[Na+].[Cl-]").unwrap();
        let confs = embed_multiple(&mol, &EmbedParams::default()).unwrap();
        let out = optimize_conformers(
            &mol,
            confs.clone(),
            ForceFieldVariant::Mmff94s,
            &MinimizeOptions::default(),
        );
        assert_eq!(out, confs);
    }
}
