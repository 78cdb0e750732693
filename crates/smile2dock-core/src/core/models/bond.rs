use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Contribution to the valence sum of an atom, with aromatic bonds counted
    /// as one and a half.
    pub fn valence(self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Aromatic => 1.5,
        }
    }

    /// Integer order, with aromatic bonds counted as one. This is the count SMILES
    /// uses when deciding the implicit hydrogens of an aromatic atom.
    pub fn integer(self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }

    pub fn smiles_symbol(self) -> &'static str {
        match self {
            BondOrder::Single => "-",
            BondOrder::Double => "=",
            BondOrder::Triple => "#",
            BondOrder::Aromatic => ":",
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BondOrder::Single => "single",
            BondOrder::Double => "double",
            BondOrder::Triple => "triple",
            BondOrder::Aromatic => "aromatic",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "-" | "single" => Ok(Self::Single),
            "2" | "=" | "double" => Ok(Self::Double),
            "3" | "#" | "triple" => Ok(Self::Triple),
            "ar" | ":" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError),
        }
    }
}

/// Cis/trans marker of a single bond next to a double bond, read from
/// `begin` to `end` (`/` is `Up`, `\` is `Down`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondDirection {
    #[default]
    None,
    Up,
    Down,
}

impl BondDirection {
    pub fn flipped(self) -> Self {
        match self {
            BondDirection::Up => BondDirection::Down,
            BondDirection::Down => BondDirection::Up,
            BondDirection::None => BondDirection::None,
        }
    }
}

/// An edge of the molecular graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
    pub direction: BondDirection,
}

impl Bond {
    pub fn new(begin: usize, end: usize, order: BondOrder) -> Self {
        Self {
            begin,
            end,
            order,
            direction: BondDirection::None,
        }
    }

    /// The atom at the other end of the bond, if `atom` is one of its ends.
    #[inline]
    pub fn other(&self, atom: usize) -> Option<usize> {
        if atom == self.begin {
            Some(self.end)
        } else if atom == self.end {
            Some(self.begin)
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, atom: usize) -> bool {
        self.begin == atom || self.end == atom
    }

    /// The direction as seen when walking the bond away from `from`.
    pub fn direction_from(&self, from: usize) -> BondDirection {
        if from == self.begin {
            self.direction
        } else {
            self.direction.flipped()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_bond_order_spellings() {
        assert_eq!("2".parse::<BondOrder>().unwrap(), BondOrder::Double);
        assert_eq!("ar".parse::<BondOrder>().unwrap(), BondOrder::Aromatic);
        assert_eq!("#".parse::<BondOrder>().unwrap(), BondOrder::Triple);
        assert!("quadruple".parse::<BondOrder>().is_err());
    }

    #[test]
    fn aromatic_valence_is_one_and_a_half() {
        assert_eq!(BondOrder::Aromatic.valence(), 1.5);
        assert_eq!(BondOrder::Aromatic.integer(), 1);
    }

    #[test]
    fn other_returns_opposite_end() {
        let bond = Bond::new(3, 5, BondOrder::Single);
        assert_eq!(bond.other(3), Some(5));
        assert_eq!(bond.other(5), Some(3));
        assert_eq!(bond.other(4), None);
    }

    #[test]
    fn direction_flips_when_walked_backwards() {
        let mut bond = Bond::new(0, 1, BondOrder::Single);
        bond.direction = BondDirection::Up;
        assert_eq!(bond.direction_from(0), BondDirection::Up);
        assert_eq!(bond.direction_from(1), BondDirection::Down);
    }
}
