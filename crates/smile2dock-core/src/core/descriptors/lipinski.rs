use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;
use crate::core::perception::rings::ring_bond_flags;

/// Integer valence of a non-aromatic atom, hydrogens included.
fn valence(mol: &Molecule, idx: usize) -> usize {
    mol.bond_order_sum(idx) as usize + mol.atom(idx).implicit_hydrogens as usize
}

/// Hydrogen-bond donors: N-H (neutral trivalent or cationic), neutral O-H and
/// S-H with a single hydrogen, and pyrrole-type aromatic N-H.
pub fn h_bond_donors(mol: &Molecule) -> usize {
    (0..mol.atom_count())
        .filter(|&i| is_donor(mol, i))
        .count()
}

fn is_donor(mol: &Molecule, idx: usize) -> bool {
    let atom = mol.atom(idx);
    let h = mol.total_hydrogens(idx);
    if h == 0 {
        return false;
    }
    match atom.atomic_number() {
        7 if atom.aromatic => h == 1 && atom.formal_charge == 0,
        7 => {
            let v = valence(mol, idx);
            (atom.formal_charge == 0 && v == 3) || (atom.formal_charge == 1 && v == 4)
        }
        8 | 16 => !atom.aromatic && h == 1 && atom.formal_charge == 0,
        _ => false,
    }
}

/// Hydrogen-bond acceptors: hydroxyl O/S not on an acyl group, ethers and
/// carbonyl O/S, anionic O/S, trivalent non-amide N, neutral aromatic n, o and
/// s without hydrogen, and fluorine.
pub fn h_bond_acceptors(mol: &Molecule) -> usize {
    let ring = ring_bond_flags(mol);
    (0..mol.atom_count())
        .filter(|&i| is_acceptor(mol, &ring, i))
        .count()
}

fn is_acceptor(mol: &Molecule, ring: &[bool], idx: usize) -> bool {
    let atom = mol.atom(idx);
    let h = mol.total_hydrogens(idx);
    match atom.atomic_number() {
        9 => true,
        7 | 8 | 16 if atom.aromatic => h == 0 && atom.formal_charge == 0,
        8 | 16 => {
            if atom.formal_charge < 0 {
                return true;
            }
            if valence(mol, idx) != 2 {
                return false;
            }
            match h {
                0 => true,
                1 => mol
                    .neighbor_atoms(idx)
                    .filter(|&n| !mol.atom(n).is_hydrogen())
                    .all(|n| !has_exocyclic_double_to_polar(mol, ring, n)),
                _ => false,
            }
        }
        7 => {
            valence(mol, idx) == 3
                && !mol.neighbors(idx).iter().any(|&(n, b)| {
                    mol.bond(b).order == BondOrder::Single
                        && has_exocyclic_double_to_polar(mol, ring, n)
                })
        }
        _ => false,
    }
}

/// Atom carries a non-ring double bond to O, N, P or S.
fn has_exocyclic_double_to_polar(mol: &Molecule, ring: &[bool], idx: usize) -> bool {
    mol.neighbors(idx).iter().any(|&(n, b)| {
        mol.bond(b).order == BondOrder::Double
            && !ring[b]
            && matches!(mol.atom(n).atomic_number(), 7 | 8 | 15 | 16)
    })
}

/// Single, non-ring bonds between two heavy atoms that each have another heavy
/// neighbour. Bonds next to a triple bond and amide C-N bonds are not counted.
pub fn rotatable_bonds(mol: &Molecule) -> usize {
    let ring = ring_bond_flags(mol);
    (0..mol.bond_count())
        .filter(|&b| is_rotatable(mol, &ring, b))
        .count()
}

pub fn is_rotatable(mol: &Molecule, ring: &[bool], bond_idx: usize) -> bool {
    let bond = mol.bond(bond_idx);
    if bond.order != BondOrder::Single || ring[bond_idx] {
        return false;
    }
    let (a, b) = (bond.begin, bond.end);
    if mol.atom(a).is_hydrogen() || mol.atom(b).is_hydrogen() {
        return false;
    }
    if mol.heavy_degree(a) < 2 || mol.heavy_degree(b) < 2 {
        return false;
    }
    let has_triple = |i: usize| {
        mol.neighbors(i)
            .iter()
            .any(|&(_, nb)| mol.bond(nb).order == BondOrder::Triple)
    };
    if has_triple(a) || has_triple(b) {
        return false;
    }
    !is_amide_bond(mol, a, b)
}

fn is_amide_bond(mol: &Molecule, a: usize, b: usize) -> bool {
    let (carbon, nitrogen) = match (mol.atom(a).atomic_number(), mol.atom(b).atomic_number()) {
        (6, 7) => (a, b),
        (7, 6) => (b, a),
        _ => return false,
    };
    mol.neighbors(carbon).iter().any(|&(n, bond)| {
        n != nitrogen
            && mol.bond(bond).order == BondOrder::Double
            && matches!(mol.atom(n).atomic_number(), 8 | 16)
    })
}
