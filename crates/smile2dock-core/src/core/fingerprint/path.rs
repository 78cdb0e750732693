use super::bitvec::Fingerprint;
use super::hash::Fnv;
use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;

pub const MIN_PATH_BONDS: usize = 1;
pub const MAX_PATH_BONDS: usize = 7;
const BITS_PER_PATH: u64 = 2;

/// Topological fingerprint over linear paths of 1 to 7 bonds.
///
/// A path is encoded as its alternating atom and bond labels, read in whichever
/// direction gives the smaller sequence, and sets two hashed bits.
pub fn path_fingerprint(mol: &Molecule, n_bits: usize) -> Fingerprint {
    let mut fp = Fingerprint::new(n_bits);
    let labels: Vec<u64> = mol
        .atoms()
        .iter()
        .map(|a| ((a.atomic_number() as u64) << 1) | a.aromatic as u64)
        .collect();

    let mut path = Vec::with_capacity(MAX_PATH_BONDS + 1);
    let mut bonds = Vec::with_capacity(MAX_PATH_BONDS);
    let mut on_path = vec![false; mol.atom_count()];
    for start in 0..mol.atom_count() {
        path.push(start);
        on_path[start] = true;
        extend(mol, &labels, &mut path, &mut bonds, &mut on_path, &mut fp);
        on_path[start] = false;
        path.pop();
    }
    fp
}

fn extend(
    mol: &Molecule,
    labels: &[u64],
    path: &mut Vec<usize>,
    bonds: &mut Vec<BondOrder>,
    on_path: &mut [bool],
    fp: &mut Fingerprint,
) {
    if bonds.len() >= MIN_PATH_BONDS {
        let hash = encode(labels, path, bonds);
        for k in 0..BITS_PER_PATH {
            fp.set_hashed(Fnv::seeded(k).mix(hash).finish());
        }
    }
    if bonds.len() == MAX_PATH_BONDS {
        return;
    }
    let Some(&last) = path.last() else {
        return;
    };
    for &(next, b) in mol.neighbors(last) {
        if on_path[next] {
            continue;
        }
        on_path[next] = true;
        path.push(next);
        bonds.push(mol.bond(b).order);
        extend(mol, labels, path, bonds, on_path, fp);
        bonds.pop();
        path.pop();
        on_path[next] = false;
    }
}

fn encode(labels: &[u64], path: &[usize], bonds: &[BondOrder]) -> u64 {
    let sequence = |reverse: bool| -> Vec<u64> {
        let n = path.len();
        let mut seq = Vec::with_capacity(2 * n);
        for k in 0..n {
            let i = if reverse { n - 1 - k } else { k };
            seq.push(labels[path[i]]);
            if k + 1 < n {
                let bond = if reverse { bonds[n - 2 - k] } else { bonds[k] };
                seq.push(bond as u64 + 100);
            }
        }
        seq
    };
    let forward = sequence(false);
    let backward = sequence(true);
    let canonical = forward.min(backward);
    canonical
        .into_iter()
        .fold(Fnv::new(), |h, v| h.mix(v))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fingerprint::tanimoto;
    use crate::core::smiles;

    fn fp(s: &str) -> Fingerprint {
        path_fingerprint(&smiles::parse(s).unwrap(), 2048)
    }

    #[test]
    fn single_atom_has_no_paths() {
        assert_eq!(fp("C").count_ones(), 0);
        assert!(fp("CC").count_ones() > 0);
    }

    #[test]
    fn path_direction_does_not_matter() {
        assert_eq!(fp("CCO"), fp("OCC"));
        assert_eq!(tanimoto(&fp("c1ccccc1O"), &fp("Oc1ccccc1")), 1.0);
    }

    #[test]
    fn different_molecules_differ() {
        let score = tanimoto(&fp("CCCCO"), &fp("CCCCN"));
        assert!(score > 0.0 && score < 1.0);
    }
}
