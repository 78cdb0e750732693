use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileEmbeddingConfig {
    pub num_conformers: Option<usize>,
    pub random_seed: Option<u64>,
    pub enforce_chirality: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileOptimizationConfig {
    pub enabled: Option<bool>,
    pub forcefield: Option<String>,
    pub max_iterations: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileProtonationConfig {
    pub enabled: Option<bool>,
    pub ph_min: Option<f64>,
    pub ph_max: Option<f64>,
    pub precision: Option<f64>,
    pub max_variants: Option<usize>,
    pub site_library: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSimilarityConfig {
    pub reference: Option<String>,
    pub fingerprint: Option<String>,
    pub radius: Option<usize>,
    pub bits: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileOutputConfig {
    pub formats: Option<Vec<String>>,
    pub all_conformers: Option<bool>,
}

/// A `smile2dock.toml` file. Every key is optional; anything left out falls
/// back to the command line or the built-in defaults.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub embedding: Option<FileEmbeddingConfig>,
    pub optimization: Option<FileOptimizationConfig>,
    pub protonation: Option<FileProtonationConfig>,
    pub similarity: Option<FileSimilarityConfig>,
    pub output: Option<FileOutputConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
