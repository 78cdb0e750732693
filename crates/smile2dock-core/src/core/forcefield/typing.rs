use super::ForceFieldError;
use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;
use crate::core::perception::hybridization::{
    Hybridization, hybridization, is_carbonyl_carbon, is_conjugated_lone_pair,
};
use std::fmt;

/// Symbolic MMFF94-style atom types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomType {
    /// sp3 carbon.
    CAlkyl,
    /// Non-carbonyl sp2 carbon.
    CVinyl,
    /// Carbon double-bonded to O or S.
    CCarbonyl,
    CAromatic,
    CAlkyne,
    /// Pyramidal sp3 nitrogen.
    NAmine,
    /// Quaternary or protonated sp3 nitrogen.
    NAmmonium,
    /// Trivalent nitrogen whose lone pair is delocalised (amide, aniline).
    NPlanar,
    /// Nitrogen with a double bond (imine, nitro, iminium).
    NImine,
    NAromatic,
    NNitrile,
    /// Alcohol or ether oxygen.
    OSp3,
    OCarbonyl,
    OAromatic,
    /// Singly bonded anionic oxygen (carboxylate, phenoxide).
    OAnion,
    SThioether,
    SThione,
    SAromatic,
    /// Sulfur with more than two bonds (sulfoxide, sulfone, sulfonamide).
    SHypervalent,
    Phosphorus,
    Fluorine,
    Chlorine,
    Bromine,
    Iodine,
    /// Hydrogen on carbon or another non-polar atom.
    H,
    /// Hydrogen on nitrogen, oxygen or sulfur.
    HPolar,
}

impl AtomType {
    /// Short MMFF-style symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            AtomType::CAlkyl => "CR",
            AtomType::CVinyl => "C=C",
            AtomType::CCarbonyl => "C=O",
            AtomType::CAromatic => "CB",
            AtomType::CAlkyne => "CSP",
            AtomType::NAmine => "NR",
            AtomType::NAmmonium => "NR+",
            AtomType::NPlanar => "NC=O",
            AtomType::NImine => "N=C",
            AtomType::NAromatic => "NPYD",
            AtomType::NNitrile => "NSP",
            AtomType::OSp3 => "OR",
            AtomType::OCarbonyl => "O=C",
            AtomType::OAromatic => "OFUR",
            AtomType::OAnion => "OM",
            AtomType::SThioether => "S",
            AtomType::SThione => "S=C",
            AtomType::SAromatic => "STHI",
            AtomType::SHypervalent => "SO2",
            AtomType::Phosphorus => "P",
            AtomType::Fluorine => "F",
            AtomType::Chlorine => "CL",
            AtomType::Bromine => "BR",
            AtomType::Iodine => "I",
            AtomType::H => "HC",
            AtomType::HPolar => "HX",
        }
    }

    /// Trigonal centres that carry out-of-plane terms.
    pub fn is_trigonal(self) -> bool {
        matches!(
            self,
            AtomType::CVinyl
                | AtomType::CCarbonyl
                | AtomType::CAromatic
                | AtomType::NPlanar
                | AtomType::NImine
                | AtomType::NAromatic
        )
    }

    pub fn is_linear(self) -> bool {
        matches!(self, AtomType::CAlkyne | AtomType::NNitrile)
    }

    pub fn is_hydrogen(self) -> bool {
        matches!(self, AtomType::H | AtomType::HPolar)
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

fn has_order(mol: &Molecule, idx: usize, order: BondOrder) -> bool {
    mol.neighbors(idx)
        .iter()
        .any(|&(_, b)| mol.bond(b).order == order)
}

fn assign_one(mol: &Molecule, idx: usize) -> Option<AtomType> {
    let atom = mol.atom(idx);
    let hyb = hybridization(mol, idx);
    let ty = match atom.atomic_number() {
        1 => {
            let polar = mol
                .neighbor_atoms(idx)
                .any(|n| matches!(mol.atom(n).atomic_number(), 7 | 8 | 16));
            if polar { AtomType::HPolar } else { AtomType::H }
        }
        6 => match hyb {
            _ if atom.aromatic => AtomType::CAromatic,
            Hybridization::Sp => AtomType::CAlkyne,
            Hybridization::Sp2 if is_carbonyl_carbon(mol, idx) => AtomType::CCarbonyl,
            Hybridization::Sp2 => AtomType::CVinyl,
            _ => AtomType::CAlkyl,
        },
        7 => {
            if atom.aromatic {
                AtomType::NAromatic
            } else if has_order(mol, idx, BondOrder::Triple) {
                AtomType::NNitrile
            } else if has_order(mol, idx, BondOrder::Double) {
                AtomType::NImine
            } else if atom.formal_charge > 0 {
                AtomType::NAmmonium
            } else if is_conjugated_lone_pair(mol, idx) {
                AtomType::NPlanar
            } else {
                AtomType::NAmine
            }
        }
        8 => {
            if atom.aromatic {
                AtomType::OAromatic
            } else if has_order(mol, idx, BondOrder::Double) {
                AtomType::OCarbonyl
            } else if atom.formal_charge < 0 {
                AtomType::OAnion
            } else {
                AtomType::OSp3
            }
        }
        16 => {
            if atom.aromatic {
                AtomType::SAromatic
            } else if mol.degree(idx) > 2 || mol.bond_order_sum(idx) > 2 {
                if mol.degree(idx) == 1 {
                    AtomType::SThione
                } else {
                    AtomType::SHypervalent
                }
            } else if has_order(mol, idx, BondOrder::Double) {
                AtomType::SThione
            } else {
                AtomType::SThioether
            }
        }
        15 => AtomType::Phosphorus,
        9 => AtomType::Fluorine,
        17 => AtomType::Chlorine,
        35 => AtomType::Bromine,
        53 => AtomType::Iodine,
        _ => return None,
    };
    Some(ty)
}

/// Assigns a type to every atom, or reports the first atom without parameters.
pub fn assign_types(mol: &Molecule) -> Result<Vec<AtomType>, ForceFieldError> {
    (0..mol.atom_count())
        .map(|i| {
            assign_one(mol, i).ok_or(ForceFieldError::MissingParameters {
                atom: i,
                symbol: mol.atom(i).symbol(),
            })
        })
        .collect()
}
