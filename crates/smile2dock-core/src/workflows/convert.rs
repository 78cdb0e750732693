use super::protonation;
use super::similarity::Reference;
use crate::core::charges::gasteiger_charges;
use crate::core::descriptors::{self, Properties};
use crate::core::embed::embed_multiple;
use crate::core::forcefield::{MinimizeOptions, optimize_conformers};
use crate::core::io::{OutputFormat, Structure, WriteError};
use crate::core::models::conformer::Conformer;
use crate::core::models::molecule::Molecule;
use crate::core::perception::add_hydrogens;
use crate::core::protonation::SiteLibrary;
use crate::core::smiles;
use crate::engine::config::ConversionConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

/// Outcome of converting one SMILES.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub input: String,
    /// The SMILES the structure was built from: the first protonation variant,
    /// or the input when protonation is off.
    pub smiles: String,
    pub variants: Vec<String>,
    pub properties: Properties,
    pub similarity: Option<f64>,
    /// Files that were written successfully.
    pub files: Vec<PathBuf>,
    pub conformers: usize,
    /// Force-field energy of the exported conformer, when it was optimized.
    pub energy: Option<f64>,
}

/// `<base>.<ext>`, keeping any dots already in the base name.
pub fn output_path(base: &Path, format: OutputFormat) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

/// Index of the lowest-energy conformer, or the first when none has an energy.
fn exported_conformer(conformers: &[Conformer]) -> usize {
    conformers
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.energy.map(|e| (i, e)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(0, |(i, _)| i)
}

/// Converts SMILES with one configuration. Site library and reference
/// fingerprint are prepared once and reused for every molecule.
pub struct Converter<'c> {
    config: &'c ConversionConfig,
    sites: Option<SiteLibrary>,
    reference: Option<Reference>,
}

impl<'c> Converter<'c> {
    pub fn new(config: &'c ConversionConfig) -> Result<Self, EngineError> {
        let sites = match &config.protonation {
            Some(p) => Some(match &p.site_library {
                Some(path) => SiteLibrary::load(path)?,
                None => SiteLibrary::builtin()?,
            }),
            None => None,
        };
        let reference = config.similarity.as_ref().and_then(Reference::new);
        Ok(Self {
            config,
            sites,
            reference,
        })
    }

    pub fn config(&self) -> &ConversionConfig {
        self.config
    }

    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    #[instrument(skip_all, fields(smiles = input))]
    pub fn convert(
        &self,
        input: &str,
        output_base: &Path,
        reporter: &ProgressReporter,
    ) -> Result<Conversion, EngineError> {
        let config = self.config;

        let variants = match (&config.protonation, &self.sites) {
            (Some(p), Some(library)) => reporter.phase("Protonation", || {
                protonation::run_with(input, &p.params, library)
            }),
            _ => vec![input.to_string()],
        };
        let smiles = variants
            .first()
            .cloned()
            .unwrap_or_else(|| input.to_string());
        if variants.len() > 1 {
            info!("Using first protonation variant: {smiles}");
        }

        let parsed = smiles::parse(&smiles).map_err(|source| {
            error!("Invalid SMILES: {smiles}");
            EngineError::InvalidSmiles {
                smiles: smiles.clone(),
                source,
            }
        })?;
        let mol = add_hydrogens(&parsed);

        let conformers = reporter
            .phase("Embedding", || embed_multiple(&mol, &config.embedding))
            .map_err(|source| {
                error!("Conformer generation failed for {smiles}: {source}");
                EngineError::Embedding {
                    smiles: smiles.clone(),
                    source,
                }
            })?;
        info!("Embedded {} conformer(s)", conformers.len());

        let conformers = if config.optimization.enabled {
            let options = MinimizeOptions {
                max_iterations: config.optimization.max_iterations,
                ..MinimizeOptions::default()
            };
            reporter.phase("Optimization", || {
                optimize_conformers(&mol, conformers, config.optimization.variant, &options)
            })
        } else {
            conformers
        };
        let best = exported_conformer(&conformers);
        let energy = conformers[best].energy;
        if let Some(e) = energy {
            info!("Exporting conformer {best} with energy {e:.4} kcal/mol");
        }

        if let Some(dir) = output_base.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| EngineError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let charges = gasteiger_charges(&mol);
        let files = reporter.phase("Writing", || {
            let mut files = Vec::new();
            for &format in &config.output.formats {
                let path = output_path(output_base, format);
                let result = self
                    .structures(&mol, &conformers, best, &charges, &smiles, format)
                    .and_then(|structures| format.write_to_path(&structures, &path));
                match result {
                    Ok(()) => files.push(path),
                    Err(e) => error!("Failed to write {}: {e}", path.display()),
                }
            }
            files
        });

        let properties = descriptors::calculate(&mol).unwrap_or_else(|e| {
            error!("Property calculation failed: {e}");
            Properties::new()
        });
        let similarity = self.reference.as_ref().map(|r| r.score(&mol));

        Ok(Conversion {
            input: input.to_string(),
            smiles,
            variants,
            properties,
            similarity,
            files,
            conformers: conformers.len(),
            energy,
        })
    }

    fn structures<'a>(
        &self,
        mol: &'a Molecule,
        conformers: &'a [Conformer],
        best: usize,
        charges: &'a [f64],
        title: &'a str,
        format: OutputFormat,
    ) -> Result<Vec<Structure<'a>>, WriteError> {
        if format == OutputFormat::Sdf && self.config.output.write_all_conformers {
            conformers
                .iter()
                .map(|c| Structure::new(mol, c, charges, title))
                .collect()
        } else {
            Ok(vec![Structure::new(mol, &conformers[best], charges, title)?])
        }
    }
}

/// Converts one SMILES into structure files at `<output_base>.<ext>`.
pub fn run(
    smiles: &str,
    output_base: &Path,
    config: &ConversionConfig,
    reporter: &ProgressReporter,
) -> Result<Conversion, EngineError> {
    Converter::new(config)?.convert(smiles, output_base, reporter)
}
