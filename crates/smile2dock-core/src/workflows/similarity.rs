use crate::core::fingerprint::{
    DEFAULT_BITS, DEFAULT_RADIUS, Fingerprint, FingerprintKind, fingerprint, tanimoto,
};
use crate::core::models::molecule::Molecule;
use crate::core::smiles;
use crate::engine::config::SimilarityConfig;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityParams {
    pub kind: FingerprintKind,
    pub radius: usize,
    pub n_bits: usize,
}

impl Default for SimilarityParams {
    fn default() -> Self {
        Self {
            kind: FingerprintKind::Morgan,
            radius: DEFAULT_RADIUS,
            n_bits: DEFAULT_BITS,
        }
    }
}

impl From<&SimilarityConfig> for SimilarityParams {
    fn from(config: &SimilarityConfig) -> Self {
        Self {
            kind: config.kind,
            radius: config.radius,
            n_bits: config.n_bits,
        }
    }
}

impl SimilarityParams {
    pub fn fingerprint(&self, mol: &Molecule) -> Fingerprint {
        fingerprint(mol, self.kind, self.radius, self.n_bits)
    }
}

/// Tanimoto similarity of two molecules.
pub fn score(a: &Molecule, b: &Molecule, params: &SimilarityParams) -> f64 {
    tanimoto(&params.fingerprint(a), &params.fingerprint(b))
}

/// A parsed reference molecule with its fingerprint computed once.
#[derive(Debug, Clone)]
pub struct Reference {
    pub smiles: String,
    params: SimilarityParams,
    fingerprint: Fingerprint,
}

impl Reference {
    /// Parses the reference. An invalid reference is logged and yields `None`,
    /// which turns similarity scoring off for the run.
    pub fn new(config: &SimilarityConfig) -> Option<Self> {
        let mol = match smiles::parse(&config.reference) {
            Ok(mol) => mol,
            Err(e) => {
                error!("Invalid reference SMILES: {} ({e})", config.reference);
                return None;
            }
        };
        let params = SimilarityParams::from(config);
        let fingerprint = params.fingerprint(&mol);
        debug!(
            reference = %config.reference,
            kind = %params.kind,
            bits_set = fingerprint.count_ones(),
            "Reference fingerprint ready"
        );
        Some(Self {
            smiles: config.reference.clone(),
            params,
            fingerprint,
        })
    }

    pub fn score(&self, mol: &Molecule) -> f64 {
        tanimoto(&self.fingerprint, &self.params.fingerprint(mol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::perception::add_hydrogens;

    fn config(reference: &str, kind: FingerprintKind) -> SimilarityConfig {
        SimilarityConfig {
            reference: reference.to_string(),
            kind,
            radius: 2,
            n_bits: 2048,
        }
    }

    #[test]
    fn identical_molecules_score_one() {
        let a = smiles::parse("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        let b = add_hydrogens(&a);
        for kind in [FingerprintKind::Morgan, FingerprintKind::Rdkit] {
            let params = SimilarityParams {
                kind,
                ..SimilarityParams::default()
            };
            assert!((score(&a, &b, &params) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn related_molecules_score_between_zero_and_one() {
        let reference = Reference::new(&config("c1ccccc1O", FingerprintKind::Morgan)).unwrap();
        let s = reference.score(&smiles::parse("c1ccccc1N").unwrap());
        assert!(s > 0.0 && s < 1.0);
    }

    #[test]
    fn invalid_reference_disables_scoring() {
        assert!(Reference::new(&config("C1CC", FingerprintKind::Morgan)).is_none());
    }
}
