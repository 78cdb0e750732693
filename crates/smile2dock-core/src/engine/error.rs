use thiserror::Error;

use super::config::ConfigError;
use crate::core::embed::EmbedError;
use crate::core::protonation::{ProtonationError, SiteLibraryError};
use crate::core::smiles::SmilesError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid SMILES: {smiles} ({source})")]
    InvalidSmiles {
        smiles: String,
        #[source]
        source: SmilesError,
    },

    #[error("Conformer generation failed for {smiles}: {source}")]
    Embedding {
        smiles: String,
        #[source]
        source: EmbedError,
    },

    #[error("Error protonating {smiles}: {source}")]
    Protonation {
        smiles: String,
        #[source]
        source: ProtonationError,
    },

    #[error("Failed to load protonation sites: {0}")]
    SiteLibrary(#[from] SiteLibraryError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write CSV summary: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
