//! Graph perception: rings, aromaticity and kekulé structures, hybridisation,
//! and conversion between implicit and explicit hydrogens.

pub mod aromaticity;
pub mod hybridization;
pub mod hydrogens;
pub mod rings;

pub use aromaticity::{KekulizeError, kekulize};
pub use hybridization::{Hybridization, hybridization};
pub use hydrogens::{add_hydrogens, remove_hydrogens};
pub use rings::RingInfo;
