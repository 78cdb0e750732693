//! # Engine Module
//!
//! Run plumbing shared by the workflows.
//!
//! - **Configuration** ([`config`]) - the conversion settings, assembled through
//!   [`config::ConversionConfigBuilder`], which rejects missing or invalid values
//! - **Error Handling** ([`error`]) - [`error::EngineError`], wrapping the core
//!   errors at the workflow boundary with the SMILES or path they concern
//! - **Progress Monitoring** ([`progress`]) - phase and task events delivered to
//!   an optional callback, which the command-line UI turns into progress bars

pub mod config;
pub mod error;
pub mod progress;
