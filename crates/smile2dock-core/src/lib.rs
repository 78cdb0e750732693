//! # smile2dock Core Library
//!
//! Turns SMILES strings into docking-ready 3D structures and annotates them with
//! physicochemical descriptors, protonation variants and fingerprint similarity.
//!
//! ## Architecture
//!
//! The library keeps a three-layer split:
//!
//! - **[`core`]: The Foundation.** Stateless molecular models and algorithms: the
//!   SMILES reader and writer, ring and hydrogen perception, distance-geometry
//!   embedding, an MMFF94-style force field, descriptors, fingerprints,
//!   protonation-site enumeration and structure file writers.
//!
//! - **[`engine`]: Run Plumbing.** Conversion configuration (built through a
//!   checked builder), the engine-level error type and progress reporting.
//!
//! - **[`workflows`]: The Public API.** The complete pipelines: converting one
//!   molecule, converting a file of molecules, enumerating protonation states and
//!   scoring similarity against a reference.

pub mod core;
pub mod engine;
pub mod workflows;
