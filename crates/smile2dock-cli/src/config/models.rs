use smile2dock::engine::config::ConversionConfig;
use std::path::PathBuf;

/// What `-i` points at.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    Smiles(String),
    /// A file with one SMILES per line.
    File(PathBuf),
}

pub struct AppConfig {
    pub input: InputSource,
    /// Base name in single mode, directory in batch mode.
    pub output: PathBuf,
    pub core_config: ConversionConfig,
}
