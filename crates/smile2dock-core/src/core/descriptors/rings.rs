use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;
use crate::core::perception::rings::RingInfo;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RingCounts {
    /// Rings with at least one non-aromatic bond.
    pub aliphatic: usize,
    /// Rings made only of aromatic bonds.
    pub aromatic: usize,
    /// Rings with at least one atom other than carbon.
    pub heterocycles: usize,
}

pub fn ring_counts(mol: &Molecule) -> RingCounts {
    let info = RingInfo::perceive(mol);
    let mut counts = RingCounts::default();
    for (atoms, bonds) in info.rings().iter().zip(info.ring_bonds()) {
        let all_aromatic = bonds
            .iter()
            .all(|&b| mol.bond(b).order == BondOrder::Aromatic);
        if all_aromatic {
            counts.aromatic += 1;
        } else {
            counts.aliphatic += 1;
        }
        if atoms.iter().any(|&a| mol.atom(a).element.is_hetero()) {
            counts.heterocycles += 1;
        }
    }
    counts
}
