//! # Core Module
//!
//! Stateless data models and chemistry algorithms. Nothing in here keeps state
//! between calls; every function takes a molecule (and possibly a conformer) and
//! returns a new value or an error.
//!
//! - **Molecular Representation** ([`models`]) - elements, atoms, bonds, molecules, conformers
//! - **Line Notation** ([`smiles`]) - SMILES parsing, writing and canonicalisation
//! - **Perception** ([`perception`]) - rings, kekulé structures, hydrogens
//! - **Partial Charges** ([`charges`]) - Gasteiger-Marsili equalisation
//! - **3D Embedding** ([`embed`]) - distance-geometry conformer generation
//! - **Energy Minimization** ([`forcefield`]) - MMFF94-style terms and a BFGS minimizer
//! - **Descriptors** ([`descriptors`]) - mass, Crippen, TPSA, Lipinski counts, rings
//! - **Similarity** ([`fingerprint`]) - Morgan and path fingerprints, Tanimoto
//! - **Ionisation** ([`protonation`]) - pKa-driven protonation-state enumeration
//! - **File Output** ([`io`]) - SDF, PDB, MOL2 and PDBQT writers

pub mod charges;
pub mod descriptors;
pub mod embed;
pub mod fingerprint;
pub mod forcefield;
pub mod io;
pub mod models;
pub mod perception;
pub mod protonation;
pub mod smiles;
pub mod utils;
