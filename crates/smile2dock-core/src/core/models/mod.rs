//! # Core Models Module
//!
//! The molecular graph and its coordinates.
//!
//! - [`element`] - static periodic-table data, looked up by symbol or atomic number
//! - [`atom`] - a graph vertex: element, charge, isotope, hydrogens, stereo tag
//! - [`bond`] - a graph edge with its order and cis/trans direction marker
//! - [`molecule`] - atoms, bonds and the adjacency list tying them together
//! - [`conformer`] - one set of 3D coordinates for a molecule
//!
//! ```ignore
//! use smile2dock::core::smiles;
//!
//! let mol = smiles::parse("CCO")?;
//! assert_eq!(mol.heavy_atom_count(), 3);
//! assert_eq!(mol.total_hydrogens(0), 3);
//! ```

pub mod atom;
pub mod bond;
pub mod conformer;
pub mod element;
pub mod molecule;
