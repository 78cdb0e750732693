//! Layered run configuration: built-in defaults, an optional TOML file,
//! command-line flags and `--set KEY=VALUE` overrides.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_config;
pub use models::{AppConfig, InputSource};
