use crate::core::embed::EmbedParams;
use crate::core::fingerprint::{DEFAULT_BITS, DEFAULT_RADIUS, FingerprintKind};
use crate::core::forcefield::ForceFieldVariant;
use crate::core::io::OutputFormat;
use crate::core::protonation::ProtonationParams;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {parameter}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationConfig {
    pub enabled: bool,
    pub variant: ForceFieldVariant,
    pub max_iterations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityConfig {
    pub reference: String,
    pub kind: FingerprintKind,
    pub radius: usize,
    pub n_bits: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Formats to write, in writing order.
    pub formats: Vec<OutputFormat>,
    /// Write every conformer to the SDF instead of only the exported one.
    pub write_all_conformers: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtonationConfig {
    pub params: ProtonationParams,
    /// Custom site library replacing the built-in one.
    pub site_library: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionConfig {
    pub embedding: EmbedParams,
    pub optimization: OptimizationConfig,
    pub protonation: Option<ProtonationConfig>,
    pub similarity: Option<SimilarityConfig>,
    pub output: OutputConfig,
}

#[derive(Default)]
pub struct ConversionConfigBuilder {
    num_conformers: Option<usize>,
    random_seed: Option<u64>,
    enforce_chirality: Option<bool>,
    optimize: Option<bool>,
    forcefield: Option<ForceFieldVariant>,
    max_iterations: Option<usize>,
    protonation: Option<ProtonationParams>,
    site_library: Option<PathBuf>,
    reference: Option<String>,
    fingerprint_kind: Option<FingerprintKind>,
    fingerprint_radius: Option<usize>,
    fingerprint_bits: Option<usize>,
    formats: Option<Vec<OutputFormat>>,
    write_all_conformers: Option<bool>,
}

impl ConversionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_conformers(mut self, n: usize) -> Self {
        self.num_conformers = Some(n);
        self
    }
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }
    pub fn enforce_chirality(mut self, enforce: bool) -> Self {
        self.enforce_chirality = Some(enforce);
        self
    }
    pub fn optimize(mut self, enabled: bool) -> Self {
        self.optimize = Some(enabled);
        self
    }
    pub fn forcefield(mut self, variant: ForceFieldVariant) -> Self {
        self.forcefield = Some(variant);
        self
    }
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    /// Enables protonation-state enumeration.
    pub fn protonation(mut self, params: ProtonationParams) -> Self {
        self.protonation = Some(params);
        self
    }
    pub fn site_library(mut self, path: PathBuf) -> Self {
        self.site_library = Some(path);
        self
    }
    /// Enables similarity scoring against `smiles`.
    pub fn reference(mut self, smiles: impl Into<String>) -> Self {
        self.reference = Some(smiles.into());
        self
    }
    pub fn fingerprint_kind(mut self, kind: FingerprintKind) -> Self {
        self.fingerprint_kind = Some(kind);
        self
    }
    pub fn fingerprint_radius(mut self, radius: usize) -> Self {
        self.fingerprint_radius = Some(radius);
        self
    }
    pub fn fingerprint_bits(mut self, bits: usize) -> Self {
        self.fingerprint_bits = Some(bits);
        self
    }
    pub fn formats(mut self, formats: Vec<OutputFormat>) -> Self {
        self.formats = Some(formats);
        self
    }
    pub fn write_all_conformers(mut self, all: bool) -> Self {
        self.write_all_conformers = Some(all);
        self
    }

    pub fn build(self) -> Result<ConversionConfig, ConfigError> {
        let num_conformers = self
            .num_conformers
            .ok_or(ConfigError::MissingParameter("num_conformers"))?;
        if num_conformers == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "num_conformers",
                reason: "at least one conformer is required".to_string(),
            });
        }
        let embedding = EmbedParams {
            num_conformers,
            random_seed: self
                .random_seed
                .ok_or(ConfigError::MissingParameter("random_seed"))?,
            enforce_chirality: self.enforce_chirality.unwrap_or(true),
            ..EmbedParams::default()
        };

        let optimization = OptimizationConfig {
            enabled: self.optimize.unwrap_or(true),
            variant: self
                .forcefield
                .ok_or(ConfigError::MissingParameter("forcefield"))?,
            max_iterations: self
                .max_iterations
                .ok_or(ConfigError::MissingParameter("max_iterations"))?,
        };

        let protonation = match self.protonation {
            Some(params) => {
                params.validate().map_err(|e| ConfigError::InvalidParameter {
                    parameter: "protonation",
                    reason: e.to_string(),
                })?;
                Some(ProtonationConfig {
                    params,
                    site_library: self.site_library,
                })
            }
            None => None,
        };

        let similarity = match self.reference {
            Some(reference) => {
                let n_bits = self.fingerprint_bits.unwrap_or(DEFAULT_BITS);
                if n_bits == 0 {
                    return Err(ConfigError::InvalidParameter {
                        parameter: "bits",
                        reason: "fingerprint length must be positive".to_string(),
                    });
                }
                Some(SimilarityConfig {
                    reference,
                    kind: self.fingerprint_kind.unwrap_or_default(),
                    radius: self.fingerprint_radius.unwrap_or(DEFAULT_RADIUS),
                    n_bits,
                })
            }
            None => None,
        };

        let formats = self.formats.ok_or(ConfigError::MissingParameter("formats"))?;
        if formats.is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "formats",
                reason: "at least one output format is required".to_string(),
            });
        }
        let output = OutputConfig {
            formats,
            write_all_conformers: self.write_all_conformers.unwrap_or(false),
        };

        Ok(ConversionConfig {
            embedding,
            optimization,
            protonation,
            similarity,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ConversionConfigBuilder {
        ConversionConfigBuilder::new()
            .num_conformers(10)
            .random_seed(42)
            .forcefield(ForceFieldVariant::Mmff94s)
            .max_iterations(1000)
            .formats(OutputFormat::ALL.to_vec())
    }

    #[test]
    fn builds_with_defaults_for_optional_values() {
        let config = complete().build().unwrap();
        assert_eq!(config.embedding.num_conformers, 10);
        assert!(config.embedding.enforce_chirality);
        assert!(config.optimization.enabled);
        assert!(config.protonation.is_none());
        assert!(config.similarity.is_none());
        assert!(!config.output.write_all_conformers);
    }

    #[test]
    fn reports_missing_parameters() {
        let err = ConversionConfigBuilder::new().build().unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("num_conformers"));
        let err = ConversionConfigBuilder::new()
            .num_conformers(1)
            .random_seed(0)
            .forcefield(ForceFieldVariant::Mmff94)
            .max_iterations(10)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("formats"));
    }

    #[test]
    fn reference_enables_similarity_with_default_fingerprint() {
        let config = complete().reference("c1ccccc1").build().unwrap();
        let sim = config.similarity.unwrap();
        assert_eq!(sim.kind, FingerprintKind::Morgan);
        assert_eq!((sim.radius, sim.n_bits), (2, 2048));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            complete().num_conformers(0).build(),
            Err(ConfigError::InvalidParameter { parameter: "num_conformers", .. })
        ));
        let params = ProtonationParams {
            ph_min: 9.0,
            ph_max: 7.0,
            ..ProtonationParams::default()
        };
        assert!(matches!(
            complete().protonation(params).build(),
            Err(ConfigError::InvalidParameter { parameter: "protonation", .. })
        ));
        assert!(complete().formats(vec![]).build().is_err());
    }
}
