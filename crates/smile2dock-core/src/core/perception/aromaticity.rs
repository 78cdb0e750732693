use super::rings::RingInfo;
use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Cannot kekulize aromatic system around atoms {atoms:?}")]
pub struct KekulizeError {
    pub atoms: Vec<usize>,
}

const MATCHING_STEP_LIMIT: usize = 200_000;

/// Assigns alternating single and double bonds to the aromatic bonds.
///
/// Returns one order per bond; non-aromatic bonds keep their order. Every
/// aromatic atom that still lacks a pi bond after counting its hydrogens and
/// explicit double bonds receives exactly one double bond.
pub fn kekulize(mol: &Molecule) -> Result<Vec<BondOrder>, KekulizeError> {
    let mut orders: Vec<BondOrder> = mol.bonds().iter().map(|b| b.order).collect();
    if !orders.contains(&BondOrder::Aromatic) {
        return Ok(orders);
    }

    let needs: Vec<bool> = (0..mol.atom_count())
        .map(|i| needs_double_bond(mol, i))
        .collect();
    let mut partner: Vec<Option<usize>> = vec![None; mol.atom_count()];
    let mut steps = 0;
    if !match_atoms(mol, &needs, &mut partner, &mut steps) {
        let atoms = (0..mol.atom_count())
            .filter(|&i| needs[i] && partner[i].is_none())
            .collect();
        return Err(KekulizeError { atoms });
    }

    for (idx, bond) in mol.bonds().iter().enumerate() {
        if bond.order != BondOrder::Aromatic {
            continue;
        }
        orders[idx] = if partner[bond.begin] == Some(bond.end) {
            BondOrder::Double
        } else {
            BondOrder::Single
        };
    }
    Ok(orders)
}

fn needs_double_bond(mol: &Molecule, idx: usize) -> bool {
    let atom = mol.atom(idx);
    if !atom.aromatic {
        return false;
    }
    let has_aromatic_bond = mol
        .neighbors(idx)
        .iter()
        .any(|&(_, b)| mol.bond(b).order == BondOrder::Aromatic);
    if !has_aromatic_bond {
        return false;
    }
    let used = mol.bond_order_sum(idx) + atom.implicit_hydrogens;
    atom.element
        .valences_with_charge(atom.formal_charge)
        .contains(&(used + 1))
}

fn candidate_partners(
    mol: &Molecule,
    idx: usize,
    needs: &[bool],
    partner: &[Option<usize>],
) -> Vec<usize> {
    mol.neighbors(idx)
        .iter()
        .filter(|&&(n, b)| {
            mol.bond(b).order == BondOrder::Aromatic && needs[n] && partner[n].is_none()
        })
        .map(|&(n, _)| n)
        .collect()
}

fn match_atoms(
    mol: &Molecule,
    needs: &[bool],
    partner: &mut [Option<usize>],
    steps: &mut usize,
) -> bool {
    *steps += 1;
    if *steps > MATCHING_STEP_LIMIT {
        return false;
    }
    // Most constrained atom first keeps the search nearly linear in practice.
    let next = (0..mol.atom_count())
        .filter(|&i| needs[i] && partner[i].is_none())
        .map(|i| (i, candidate_partners(mol, i, needs, partner)))
        .min_by_key(|(_, options)| options.len());
    let Some((atom, options)) = next else {
        return true;
    };
    for other in options {
        partner[atom] = Some(other);
        partner[other] = Some(atom);
        if match_atoms(mol, needs, partner, steps) {
            return true;
        }
        partner[atom] = None;
        partner[other] = None;
    }
    false
}

/// Marks rings written in kekulé form (`C1=CC=CC=C1`) as aromatic when they
/// satisfy the 4n+2 rule, either alone or fused pairwise.
pub fn perceive_aromaticity(mol: &mut Molecule) -> Result<(), KekulizeError> {
    let info = RingInfo::perceive(mol);
    if info.num_rings() == 0 {
        return Ok(());
    }
    let kekule = kekulize(mol)?;

    let rings = info.rings();
    let mut aromatic_ring = vec![false; rings.len()];
    let mut to_mark: Vec<Vec<usize>> = Vec::new();

    for (r, ring) in rings.iter().enumerate() {
        if ring.iter().all(|&a| mol.atom(a).aromatic) {
            continue;
        }
        if is_huckel(mol, &kekule, &info, ring) {
            aromatic_ring[r] = true;
            to_mark.push(vec![r]);
        }
    }

    let ring_bonds = info.ring_bonds();
    for i in 0..rings.len() {
        for j in (i + 1)..rings.len() {
            if aromatic_ring[i] || aromatic_ring[j] {
                continue;
            }
            let fused = ring_bonds[i].iter().any(|b| ring_bonds[j].contains(b));
            if !fused {
                continue;
            }
            let mut union: Vec<usize> = rings[i].clone();
            for &a in &rings[j] {
                if !union.contains(&a) {
                    union.push(a);
                }
            }
            if union.iter().all(|&a| mol.atom(a).aromatic) {
                continue;
            }
            if is_huckel(mol, &kekule, &info, &union) {
                to_mark.push(vec![i, j]);
            }
        }
    }

    for group in to_mark {
        for r in group {
            trace!(ring = ?rings[r], "Marking ring aromatic");
            for &a in &rings[r] {
                mol.atom_mut(a).aromatic = true;
            }
            for &b in &ring_bonds[r] {
                mol.bond_mut(b).order = BondOrder::Aromatic;
            }
        }
    }
    Ok(())
}

fn is_huckel(mol: &Molecule, kekule: &[BondOrder], info: &RingInfo, atoms: &[usize]) -> bool {
    let mut electrons = 0usize;
    for &a in atoms {
        match pi_electrons(mol, kekule, info, a, atoms) {
            Some(e) => electrons += e,
            None => return false,
        }
    }
    electrons % 4 == 2
}

/// Pi electrons an atom donates to the ring made of `ring_atoms`, or `None` when
/// the atom cannot be part of an aromatic ring.
fn pi_electrons(
    mol: &Molecule,
    kekule: &[BondOrder],
    info: &RingInfo,
    idx: usize,
    ring_atoms: &[usize],
) -> Option<usize> {
    let atom = mol.atom(idx);
    let mut double = None;
    for &(n, b) in mol.neighbors(idx) {
        match kekule[b] {
            BondOrder::Triple => return None,
            BondOrder::Double => double = Some((n, b)),
            _ => {}
        }
    }
    let total_degree = mol.total_degree(idx);
    match double {
        Some((n, b)) if ring_atoms.contains(&n) || info.is_bond_in_ring(b) => Some(1),
        Some((n, _)) if atom.element.is_carbon() && mol.atom(n).element.is_hetero() => Some(0),
        Some(_) => None,
        None => match (atom.atomic_number(), atom.formal_charge) {
            (7 | 15, 0) if total_degree == 3 => Some(2),
            (7, -1) if total_degree == 2 => Some(2),
            (8 | 16 | 34, 0) if total_degree == 2 => Some(2),
            (6, -1) if total_degree == 3 => Some(2),
            (6, 1) if total_degree == 3 => Some(0),
            (5, 0) if total_degree == 3 => Some(0),
            _ => None,
        },
    }
}
