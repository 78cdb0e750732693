use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hybridization {
    S,
    Sp,
    Sp2,
    Sp3,
}

/// Hybridisation from bond orders alone.
///
/// Hydrogen is `S`. A triple bond or two double bonds gives `Sp`, any double or
/// aromatic bond gives `Sp2`, everything else is `Sp3`. Lone-pair conjugation is
/// reported separately by [`is_conjugated_lone_pair`].
pub fn hybridization(mol: &Molecule, idx: usize) -> Hybridization {
    let atom = mol.atom(idx);
    if atom.is_hydrogen() {
        return Hybridization::S;
    }
    let mut doubles = 0;
    let mut unsaturated = atom.aromatic;
    for &(_, b) in mol.neighbors(idx) {
        match mol.bond(b).order {
            BondOrder::Triple => return Hybridization::Sp,
            BondOrder::Double => {
                doubles += 1;
                unsaturated = true;
            }
            BondOrder::Aromatic => unsaturated = true,
            BondOrder::Single => {}
        }
    }
    if doubles >= 2 && mol.degree(idx) + atom.implicit_hydrogens as usize == 2 {
        Hybridization::Sp
    } else if unsaturated {
        Hybridization::Sp2
    } else {
        Hybridization::Sp3
    }
}

/// True for a saturated N, O or S whose lone pair is delocalised into an
/// adjacent double, triple or aromatic bond (amides, anilines, enols, esters).
pub fn is_conjugated_lone_pair(mol: &Molecule, idx: usize) -> bool {
    if !matches!(mol.atom(idx).atomic_number(), 7 | 8 | 16) {
        return false;
    }
    if hybridization(mol, idx) != Hybridization::Sp3 {
        return false;
    }
    mol.neighbor_atoms(idx)
        .any(|n| is_unsaturated(mol, n))
}

/// Atom carries a double, triple or aromatic bond.
pub fn is_unsaturated(mol: &Molecule, idx: usize) -> bool {
    mol.atom(idx).aromatic
        || mol
            .neighbors(idx)
            .iter()
            .any(|&(_, b)| mol.bond(b).order != BondOrder::Single)
}

/// Carbon double-bonded to O or S.
pub fn is_carbonyl_carbon(mol: &Molecule, idx: usize) -> bool {
    let atom = mol.atom(idx);
    atom.element.is_carbon()
        && mol.neighbors(idx).iter().any(|&(n, b)| {
            mol.bond(b).order == BondOrder::Double
                && matches!(mol.atom(n).atomic_number(), 8 | 16)
        })
}
