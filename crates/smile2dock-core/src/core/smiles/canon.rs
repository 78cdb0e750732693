use super::writer::{visit_order, write_with_ranks};
use crate::core::models::bond::{BondDirection, BondOrder};
use crate::core::models::molecule::Molecule;
use crate::core::perception::hydrogens::remove_hydrogens;
use crate::core::perception::rings::ring_bond_flags;

/// Canonical SMILES: the same string for every spelling of a molecule.
///
/// Explicit hydrogens that can be folded back into counts are removed first, so
/// a hydrogen-completed molecule canonicalises like its heavy-atom form.
pub fn canonical(mol: &Molecule) -> String {
    let mut work = if mol.has_explicit_hydrogens() {
        remove_hydrogens(mol)
    } else {
        mol.clone()
    };
    let ranks = canonical_ranks(&work);
    normalize_directions(&mut work, &ranks);
    write_with_ranks(&work, &ranks)
}

/// Ranks every atom so that equivalent atoms of different spellings get the same
/// rank and no two atoms share one.
///
/// Atom invariants are refined over neighbourhoods until the partition is
/// stable; remaining ties (symmetry) are broken one class at a time.
pub fn canonical_ranks(mol: &Molecule) -> Vec<usize> {
    let n = mol.atom_count();
    let ring_bonds = ring_bond_flags(mol);
    let invariants: Vec<[i32; 7]> = (0..n)
        .map(|i| {
            let atom = mol.atom(i);
            let in_ring = mol.neighbors(i).iter().any(|&(_, b)| ring_bonds[b]);
            [
                atom.atomic_number() as i32,
                atom.isotope.map_or(0, i32::from),
                mol.degree(i) as i32,
                mol.total_hydrogens(i) as i32,
                atom.formal_charge as i32,
                atom.aromatic as i32,
                in_ring as i32,
            ]
        })
        .collect();

    let mut ranks = dense_ranks(&invariants);
    refine(mol, &mut ranks);

    loop {
        let mut counts = vec![0usize; n];
        for &r in &ranks {
            counts[r] += 1;
        }
        let Some(tied) = (0..n).find(|&r| counts[r] > 1) else {
            break;
        };
        let Some(pick) = ranks.iter().position(|&r| r == tied) else {
            break;
        };
        let keys: Vec<(usize, bool)> = ranks
            .iter()
            .enumerate()
            .map(|(i, &r)| (r, r == tied && i != pick))
            .collect();
        ranks = dense_ranks(&keys);
        refine(mol, &mut ranks);
    }
    ranks
}

fn dense_ranks<K: Ord + Clone>(keys: &[K]) -> Vec<usize> {
    let mut sorted: Vec<K> = keys.to_vec();
    sorted.sort();
    sorted.dedup();
    keys.iter()
        .map(|k| sorted.binary_search(k).unwrap_or(0))
        .collect()
}

fn bond_code(order: BondOrder) -> usize {
    match order {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
        BondOrder::Aromatic => 4,
    }
}

fn class_count(ranks: &[usize]) -> usize {
    ranks.iter().max().map_or(0, |&m| m + 1)
}

fn refine(mol: &Molecule, ranks: &mut Vec<usize>) {
    let mut classes = class_count(ranks);
    loop {
        let keys: Vec<(usize, Vec<(usize, usize)>)> = (0..mol.atom_count())
            .map(|i| {
                let mut env: Vec<(usize, usize)> = mol
                    .neighbors(i)
                    .iter()
                    .map(|&(nb, b)| (ranks[nb], bond_code(mol.bond(b).order)))
                    .collect();
                env.sort_unstable();
                (ranks[i], env)
            })
            .collect();
        let next = dense_ranks(&keys);
        let next_classes = class_count(&next);
        *ranks = next;
        if next_classes == classes {
            break;
        }
        classes = next_classes;
    }
}

/// Flips each conjugated group of `/` `\` markers so that the first one the
/// canonical walk writes is `/`. Flipping a whole group keeps every cis/trans
/// relation intact.
fn normalize_directions(mol: &mut Molecule, ranks: &[usize]) {
    let directional: Vec<usize> = (0..mol.bond_count())
        .filter(|&b| mol.bond(b).direction != BondDirection::None)
        .collect();
    if directional.is_empty() {
        return;
    }

    let mut parent: Vec<usize> = (0..mol.bond_count()).collect();
    for (d, bond) in mol.bonds().iter().enumerate() {
        if bond.order != BondOrder::Double {
            continue;
        }
        for end in [bond.begin, bond.end] {
            for &(_, b) in mol.neighbors(end) {
                if mol.bond(b).direction != BondDirection::None {
                    union(&mut parent, d, b);
                }
            }
        }
    }

    let visit = visit_order(mol, ranks);
    let mut first_in_group: Vec<Option<(usize, usize)>> = vec![None; mol.bond_count()];
    for &b in &directional {
        let bond = mol.bond(b);
        let key = visit[bond.begin].min(visit[bond.end]);
        let root = find(&mut parent, b);
        if first_in_group[root].is_none_or(|(k, _)| key < k) {
            first_in_group[root] = Some((key, b));
        }
    }

    let mut flip = vec![false; mol.bond_count()];
    for (root, entry) in first_in_group.iter().enumerate() {
        let Some((_, b)) = *entry else { continue };
        let bond = mol.bond(b);
        let from = if visit[bond.begin] < visit[bond.end] {
            bond.begin
        } else {
            bond.end
        };
        flip[root] = bond.direction_from(from) == BondDirection::Down;
    }
    for b in directional {
        let root = find(&mut parent, b);
        if flip[root] {
            let bond = mol.bond_mut(b);
            bond.direction = bond.direction.flipped();
        }
    }
}

fn find(parent: &mut [usize], x: usize) -> usize {
    let mut root = x;
    while parent[root] != root {
        root = parent[root];
    }
    let mut cur = x;
    while parent[cur] != root {
        let next = parent[cur];
        parent[cur] = root;
        cur = next;
    }
    root
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::perception::add_hydrogens;
    use crate::core::smiles::parse;

    fn canon(smiles: &str) -> String {
        canonical(&parse(smiles).unwrap())
    }

    #[test]
    fn ranks_are_a_permutation() {
        let mol = parse("c1ccccc1C(=O)O").unwrap();
        let mut ranks = canonical_ranks(&mol);
        ranks.sort_unstable();
        assert_eq!(ranks, (0..mol.atom_count()).collect::<Vec<_>>());
    }

    #[test]
    fn spellings_of_one_molecule_agree() {
        assert_eq!(canon("OCC"), canon("CCO"));
        assert_eq!(canon("C1=CC=CC=C1"), canon("c1ccccc1"));
        assert_eq!(canon("OC(=O)c1ccccc1"), canon("c1ccc(cc1)C(O)=O"));
        assert_eq!(canon("[NH3+]CC([O-])=O"), canon("[O-]C(=O)C[NH3+]"));
        assert_ne!(canon("CCO"), canon("COC"));
    }

    #[test]
    fn tetrahedral_stereo_survives_reordering() {
        let l_ala = canon("N[C@@H](C)C(=O)O");
        assert_eq!(l_ala, canon("C[C@H](N)C(=O)O"));
        assert_eq!(l_ala, canon("OC(=O)[C@H](C)N"));
        assert_ne!(l_ala, canon("N[C@H](C)C(=O)O"));
    }

    #[test]
    fn cis_trans_markers_are_normalised() {
        assert_eq!(canon("F/C=C/F"), canon("F\\C=C\\F"));
        assert_ne!(canon("F/C=C/F"), canon("F/C=C\\F"));
        assert!(canon("F/C=C/F").contains('/'));
    }

    #[test]
    fn explicit_hydrogens_do_not_change_the_result() {
        let mol = parse("CC(=O)Nc1ccccc1").unwrap();
        assert_eq!(canonical(&add_hydrogens(&mol)), canonical(&mol));
    }

    #[test]
    fn canonical_output_parses_back_to_itself() {
        for smiles in ["CC(C)Cc1ccc(cc1)C(C)C(=O)O", "c1ccc2[nH]ccc2c1", "[Na+].[Cl-]"] {
            let once = canon(smiles);
            assert_eq!(canon(&once), once);
        }
    }
}
