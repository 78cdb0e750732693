//! SMILES line notation: reading, writing and canonical forms.
//!
//! [`parse`] builds a [`Molecule`](crate::core::models::molecule::Molecule)
//! with implicit hydrogens, validated valences and perceived aromaticity.
//! [`write`] emits SMILES in atom-index order and [`canonical`] emits the same
//! string for every spelling of a molecule.

mod canon;
mod parser;
mod writer;

use thiserror::Error;

pub use canon::{canonical, canonical_ranks};
pub use parser::parse;
pub use writer::{write, write_with_ranks};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SmilesError {
    #[error("Empty SMILES string")]
    Empty,
    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedCharacter { ch: char, pos: usize },
    #[error("Unexpected end of input at position {pos}")]
    UnexpectedEnd { pos: usize },
    #[error("Unknown element '{symbol}' at position {pos}")]
    UnknownElement { symbol: String, pos: usize },
    #[error("Unbalanced parenthesis at position {pos}")]
    UnbalancedParenthesis { pos: usize },
    #[error("Ring bond {label} opened at position {pos} is never closed")]
    UnclosedRing { label: u16, pos: usize },
    #[error("Invalid ring closure {label} at position {pos}: {reason}")]
    InvalidRingClosure {
        label: u16,
        pos: usize,
        reason: &'static str,
    },
    #[error("Invalid bracket atom at position {pos}: {reason}")]
    InvalidBracketAtom { pos: usize, reason: &'static str },
    #[error("Bond at position {pos} is not followed by an atom")]
    DanglingBond { pos: usize },
    #[error("Explicit valence {valence} of atom {atom} ({symbol}) exceeds what the element allows")]
    Valence {
        atom: usize,
        symbol: &'static str,
        valence: u8,
    },
    #[error("Aromatic system around atoms {atoms:?} cannot be kekulized")]
    Kekulize { atoms: Vec<usize> },
}

/// Reports whether a SMILES string parses into a valid molecule.
pub fn is_valid(smiles: &str) -> bool {
    parse(smiles).is_ok()
}

/// Parses `smiles` and rewrites it in canonical form.
pub fn canonicalize(smiles: &str) -> Result<String, SmilesError> {
    parse(smiles).map(|mol| canonical(&mol))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_valid_accepts_and_rejects() {
        assert!(is_valid("CCO"));
        assert!(is_valid("c1ccccc1O"));
        assert!(!is_valid(""));
        assert!(!is_valid("C1CC"));
        assert!(!is_valid("C(C"));
        assert!(!is_valid("Xx"));
        assert!(!is_valid("c1cccc1"));
        assert!(!is_valid("C(C)(C)(C)(C)C"));
    }

    #[test]
    fn canonicalize_merges_spellings() {
        assert_eq!(canonicalize("OCC").unwrap(), canonicalize("CCO").unwrap());
        assert_eq!(
            canonicalize("C1=CC=CC=C1").unwrap(),
            canonicalize("c1ccccc1").unwrap()
        );
    }
}
