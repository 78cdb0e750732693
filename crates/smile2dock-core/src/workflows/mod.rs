//! # Workflows Module
//!
//! High-level pipelines, the entry points the command-line tool drives.
//!
//! - **Conversion** ([`convert`]) - one SMILES to structure files: protonation,
//!   hydrogen completion, embedding, force-field minimization, export,
//!   descriptors and reference similarity
//! - **Batch Conversion** ([`batch`]) - a SMILES file, one molecule per line,
//!   with `protonation_states.txt` and `properties.csv` summaries
//! - **Protonation** ([`protonation`]) - variant enumeration that falls back to
//!   the input on failure
//! - **Similarity** ([`similarity`]) - fingerprint Tanimoto scoring against a
//!   reference molecule
//!
//! Workflows report progress through [`crate::engine::progress::ProgressReporter`]
//! and return [`crate::engine::error::EngineError`] only for failures that stop
//! the molecule; recoverable problems are logged and the run continues.

pub mod batch;
pub mod convert;
pub mod protonation;
pub mod similarity;
