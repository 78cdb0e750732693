use super::bitvec::Fingerprint;
use super::hash::Fnv;
use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;
use crate::core::perception::rings::ring_bond_flags;

fn bond_code(order: BondOrder) -> u64 {
    match order {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
        BondOrder::Aromatic => 4,
    }
}

/// Circular (ECFP-style) fingerprint.
///
/// Every atom starts from a hash of its element, heavy degree, hydrogen count,
/// charge, ring membership and isotope. Each of `radius` rounds folds in the
/// sorted identifiers of the neighbours together with the bond orders, and
/// every identifier from every round sets one bit.
pub fn morgan(mol: &Molecule, radius: usize, n_bits: usize) -> Fingerprint {
    let mut fp = Fingerprint::new(n_bits);
    let n = mol.atom_count();
    if n == 0 {
        return fp;
    }

    let ring = ring_bond_flags(mol);
    let mut ids: Vec<u64> = (0..n)
        .map(|i| {
            let atom = mol.atom(i);
            let in_ring = mol.neighbors(i).iter().any(|&(_, b)| ring[b]);
            Fnv::new()
                .mix(atom.atomic_number() as u64)
                .mix(mol.heavy_degree(i) as u64)
                .mix(mol.total_hydrogens(i) as u64)
                .mix(atom.formal_charge as i64 as u64)
                .mix(in_ring as u64)
                .mix(atom.isotope.unwrap_or(0) as u64)
                .finish()
        })
        .collect();
    for &id in &ids {
        fp.set_hashed(id);
    }

    for round in 1..=radius {
        let next: Vec<u64> = (0..n)
            .map(|i| {
                let mut env: Vec<(u64, u64)> = mol
                    .neighbors(i)
                    .iter()
                    .map(|&(nb, b)| (bond_code(mol.bond(b).order), ids[nb]))
                    .collect();
                env.sort_unstable();
                env.into_iter()
                    .fold(Fnv::seeded(round as u64).mix(ids[i]), |h, (bond, id)| {
                        h.mix(bond).mix(id)
                    })
                    .finish()
            })
            .collect();
        for &id in &next {
            fp.set_hashed(id);
        }
        ids = next;
    }
    fp
}
