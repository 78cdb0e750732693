use crate::core::models::atom::{Atom, StereoNeighbor};
use crate::core::models::bond::{Bond, BondOrder};
use crate::core::models::molecule::Molecule;

/// Turns every implicit hydrogen into an explicit atom.
///
/// Heavy-atom indices are unchanged; new hydrogens are appended in the order of
/// the atoms that carry them. Stereo tags that referred to an implicit hydrogen
/// now point at the new atom.
pub fn add_hydrogens(mol: &Molecule) -> Molecule {
    let mut out = mol.clone();
    for idx in 0..mol.atom_count() {
        let count = mol.atom(idx).implicit_hydrogens;
        if count == 0 {
            continue;
        }
        out.atom_mut(idx).implicit_hydrogens = 0;
        for k in 0..count {
            let h = out.add_atom(Atom::hydrogen());
            // Fresh atom, so the bond cannot collide with an existing one.
            let _ = out.add_bond(idx, h, BondOrder::Single);
            if k == 0 {
                if let Some(stereo) = out.atom_mut(idx).chirality.as_mut() {
                    stereo.resolve_implicit(h);
                }
            }
        }
    }
    out
}

/// Collapses explicit hydrogens back into implicit counts.
///
/// Hydrogens that carry an isotope or a charge, that are bonded to another
/// hydrogen, or that bridge two atoms are kept as atoms. Returns the new
/// molecule and, for each old atom, its new index.
pub fn remove_hydrogens_with_map(mol: &Molecule) -> (Molecule, Vec<Option<usize>>) {
    let removable: Vec<bool> = (0..mol.atom_count())
        .map(|i| {
            let atom = mol.atom(i);
            atom.is_hydrogen()
                && atom.isotope.is_none()
                && atom.formal_charge == 0
                && mol.degree(i) == 1
                && mol
                    .neighbor_atoms(i)
                    .all(|n| !mol.atom(n).is_hydrogen())
        })
        .collect();

    let mut out = Molecule::with_name(mol.name.clone());
    let mut map = vec![None; mol.atom_count()];
    for (i, atom) in mol.atoms().iter().enumerate() {
        if !removable[i] {
            map[i] = Some(out.add_atom(atom.clone()));
        }
    }

    for bond in mol.bonds() {
        match (map[bond.begin], map[bond.end]) {
            (Some(a), Some(b)) => {
                let _ = out.push_bond(Bond {
                    begin: a,
                    end: b,
                    ..*bond
                });
            }
            (Some(heavy), None) => out.atom_mut(heavy).implicit_hydrogens += 1,
            (None, Some(heavy)) => out.atom_mut(heavy).implicit_hydrogens += 1,
            (None, None) => {}
        }
    }

    for new_idx in 0..out.atom_count() {
        let Some(stereo) = out.atom_mut(new_idx).chirality.as_mut() else {
            continue;
        };
        for n in stereo.neighbors.iter_mut() {
            if let StereoNeighbor::Atom(old) = *n {
                *n = match map.get(old).copied().flatten() {
                    Some(mapped) => StereoNeighbor::Atom(mapped),
                    None => StereoNeighbor::Implicit,
                };
            }
        }
    }
    (out, map)
}

pub fn remove_hydrogens(mol: &Molecule) -> Molecule {
    remove_hydrogens_with_map(mol).0
}
