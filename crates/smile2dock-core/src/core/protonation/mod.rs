//! Protonation-state enumeration for a pH window.
//!
//! The input is neutralised, its ionisable sites are matched against a site
//! library with mean pKa values, and every combination of populated site forms
//! is written as canonical SMILES.

pub mod enumerate;
pub mod sites;

pub use enumerate::{SiteState, classify};
pub use sites::{SiteDefinition, SiteKind, SiteLibrary, SiteLibraryError};

use crate::core::perception::hydrogens::remove_hydrogens;
use crate::core::smiles::{self, SmilesError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProtonationParams {
    pub ph_min: f64,
    pub ph_max: f64,
    /// Multiples of a site's pKa spread treated as uncertain.
    pub precision: f64,
    pub max_variants: usize,
}

impl Default for ProtonationParams {
    fn default() -> Self {
        Self {
            ph_min: 6.4,
            ph_max: 8.4,
            precision: 1.0,
            max_variants: 128,
        }
    }
}

impl ProtonationParams {
    pub fn validate(&self) -> Result<(), ProtonationError> {
        if !(self.ph_min <= self.ph_max) {
            return Err(ProtonationError::InvalidPhRange {
                min: self.ph_min,
                max: self.ph_max,
            });
        }
        if !(self.precision >= 0.0) {
            return Err(ProtonationError::InvalidPrecision(self.precision));
        }
        if self.max_variants == 0 {
            return Err(ProtonationError::NoVariantsAllowed);
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ProtonationError {
    #[error("Invalid SMILES: {0}")]
    InvalidSmiles(#[from] SmilesError),
    #[error("Invalid pH range: minimum {min} is above maximum {max}")]
    InvalidPhRange { min: f64, max: f64 },
    #[error("Precision must be a non-negative number, got {0}")]
    InvalidPrecision(f64),
    #[error("The maximum number of variants must be at least 1")]
    NoVariantsAllowed,
    #[error("Failed to load protonation sites: {0}")]
    Library(#[from] SiteLibraryError),
}

/// Protonation variants of `smiles` using the built-in site library.
pub fn protonate(
    smiles: &str,
    params: &ProtonationParams,
) -> Result<Vec<String>, ProtonationError> {
    let library = SiteLibrary::builtin()?;
    protonate_with(smiles, params, &library)
}

/// Protonation variants of `smiles` using a custom site library.
///
/// Variants come back in generation order. A molecule without ionisable sites
/// yields its own canonical SMILES.
#[instrument(skip(params, library), fields(ph_min = params.ph_min, ph_max = params.ph_max))]
pub fn protonate_with(
    smiles: &str,
    params: &ProtonationParams,
    library: &SiteLibrary,
) -> Result<Vec<String>, ProtonationError> {
    params.validate()?;
    let parsed = smiles::parse(smiles)?;
    let mut neutral = if parsed.has_explicit_hydrogens() {
        remove_hydrogens(&parsed)
    } else {
        parsed
    };
    enumerate::neutralize(&mut neutral);

    let sites = library.find_sites(&neutral);
    for site in &sites {
        let def = site.definition;
        debug!(
            atom = site.atom,
            site = %def.name,
            pka = def.pka,
            state = ?classify(def.pka, def.stdev, params),
            "Ionisable site"
        );
    }
    Ok(enumerate::enumerate_variants(&neutral, &sites, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(smiles: &str) -> Vec<String> {
        protonate(smiles, &ProtonationParams::default()).unwrap()
    }

    fn canon(smiles: &str) -> String {
        smiles::canonicalize(smiles).unwrap()
    }

    #[test]
    fn acids_and_amines_at_physiological_ph() {
        assert_eq!(run("CC(=O)O"), vec![canon("CC(=O)[O-]")]);
        assert_eq!(run("CCN"), vec![canon("CC[NH3+]")]);
        assert_eq!(run("NCC(=O)O"), vec![canon("[NH3+]CC(=O)[O-]")]);
    }

    #[test]
    fn charged_input_is_neutralised_first() {
        assert_eq!(run("[O-]C(=O)C"), run("CC(=O)O"));
    }

    #[test]
    fn ambiguous_sites_give_both_forms() {
        let variants = run("Cc1c[nH]cn1");
        assert_eq!(variants.len(), 2);
        assert!(variants.contains(&canon("Cc1c[nH]cn1")));
        assert!(variants.contains(&canon("Cc1c[nH]c[nH+]1")));
    }

    #[test]
    fn no_sites_returns_canonical_input() {
        assert_eq!(run("OCC1CCCCC1"), run("C1CCCCC1CO"));
        assert_eq!(run("c1ccccc1"), vec![canon("c1ccccc1")]);
    }

    #[test]
    fn variant_cap_is_respected() {
        let params = ProtonationParams {
            max_variants: 1,
            ..Default::default()
        };
        let many = protonate("Cc1c[nH]cn1.Cc1c[nH]cn1CCS", &params).unwrap();
        assert_eq!(many.len(), 1);
    }

    #[test]
    fn invalid_input_is_reported() {
        assert!(matches!(
            protonate("C1CC", &ProtonationParams::default()),
            Err(ProtonationError::InvalidSmiles(_))
        ));
        let reversed = ProtonationParams {
            ph_min: 9.0,
            ph_max: 5.0,
            ..Default::default()
        };
        assert!(matches!(
            protonate("CCO", &reversed),
            Err(ProtonationError::InvalidPhRange { .. })
        ));
    }
}
