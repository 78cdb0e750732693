use crate::core::models::molecule::Molecule;
use std::collections::VecDeque;

/// Ring membership of a molecule, built from its smallest set of smallest rings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingInfo {
    /// Each ring as atoms in path order.
    rings: Vec<Vec<usize>>,
    /// Each ring as bond indices, in the same order as `rings`.
    ring_bonds: Vec<Vec<usize>>,
    atom_membership: Vec<usize>,
    bond_membership: Vec<usize>,
}

impl RingInfo {
    pub fn perceive(mol: &Molecule) -> Self {
        let rings = find_sssr(mol);
        let mut atom_membership = vec![0; mol.atom_count()];
        let mut bond_membership = vec![0; mol.bond_count()];
        let mut ring_bonds = Vec::with_capacity(rings.len());
        for ring in &rings {
            let mut bonds = Vec::with_capacity(ring.len());
            for (i, &a) in ring.iter().enumerate() {
                atom_membership[a] += 1;
                let b = ring[(i + 1) % ring.len()];
                if let Some(bond) = mol.bond_between(a, b) {
                    bond_membership[bond] += 1;
                    bonds.push(bond);
                }
            }
            ring_bonds.push(bonds);
        }
        Self {
            rings,
            ring_bonds,
            atom_membership,
            bond_membership,
        }
    }

    pub fn rings(&self) -> &[Vec<usize>] {
        &self.rings
    }

    pub fn ring_bonds(&self) -> &[Vec<usize>] {
        &self.ring_bonds
    }

    #[inline]
    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    #[inline]
    pub fn is_atom_in_ring(&self, atom: usize) -> bool {
        self.atom_membership.get(atom).is_some_and(|&c| c > 0)
    }

    #[inline]
    pub fn is_bond_in_ring(&self, bond: usize) -> bool {
        self.bond_membership.get(bond).is_some_and(|&c| c > 0)
    }

    pub fn atom_ring_count(&self, atom: usize) -> usize {
        self.atom_membership.get(atom).copied().unwrap_or(0)
    }

    pub fn is_atom_in_ring_of_size(&self, atom: usize, size: usize) -> bool {
        self.rings
            .iter()
            .any(|r| r.len() == size && r.contains(&atom))
    }

    pub fn smallest_ring_containing(&self, atom: usize) -> Option<usize> {
        self.rings
            .iter()
            .filter(|r| r.contains(&atom))
            .map(|r| r.len())
            .min()
    }
}

/// Marks the bonds that lie on at least one cycle (every bond that is not a bridge).
pub fn ring_bond_flags(mol: &Molecule) -> Vec<bool> {
    let n = mol.atom_count();
    let mut in_ring = vec![false; mol.bond_count()];
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut timer = 0;

    for root in 0..n {
        if disc[root] != usize::MAX {
            continue;
        }
        // Iterative DFS: (atom, bond used to enter it, next adjacency slot)
        let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];
        disc[root] = timer;
        low[root] = timer;
        timer += 1;
        while let Some(top) = stack.last_mut() {
            let (atom, parent_bond, slot) = *top;
            top.2 += 1;
            if let Some(&(next, bond)) = mol.neighbors(atom).get(slot) {
                if Some(bond) == parent_bond {
                    continue;
                }
                if disc[next] == usize::MAX {
                    disc[next] = timer;
                    low[next] = timer;
                    timer += 1;
                    stack.push((next, Some(bond), 0));
                } else {
                    // Any non-tree edge closes a cycle.
                    in_ring[bond] = true;
                    low[atom] = low[atom].min(disc[next]);
                }
            } else {
                stack.pop();
                if let (Some(bond), Some(&(parent, _, _))) = (parent_bond, stack.last()) {
                    low[parent] = low[parent].min(low[atom]);
                    if low[atom] <= disc[parent] {
                        in_ring[bond] = true;
                    }
                }
            }
        }
    }
    in_ring
}

/// Smallest set of smallest rings.
///
/// Candidate rings are the shortest cycles through each ring bond. They are
/// taken smallest first and kept when linearly independent (over GF(2) in bond
/// space) of the rings already chosen, until the cyclomatic number is reached.
pub fn find_sssr(mol: &Molecule) -> Vec<Vec<usize>> {
    let n = mol.atom_count();
    if n == 0 || mol.bond_count() == 0 {
        return Vec::new();
    }
    let components = mol.fragments().len();
    let expected = (mol.bond_count() + components).saturating_sub(n);
    if expected == 0 {
        return Vec::new();
    }

    let ring_bonds = ring_bond_flags(mol);
    let mut candidates: Vec<Vec<usize>> = Vec::new();
    for (bond_idx, bond) in mol.bonds().iter().enumerate() {
        if !ring_bonds[bond_idx] {
            continue;
        }
        for path in shortest_paths_avoiding(mol, bond.begin, bond.end, bond_idx, &ring_bonds) {
            let mut ring = path;
            normalize_ring(&mut ring);
            if !candidates.contains(&ring) {
                candidates.push(ring);
            }
        }
    }
    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    let words = mol.bond_count().div_ceil(64);
    let mut basis: Vec<(usize, Vec<u64>)> = Vec::new();
    let mut rings = Vec::new();
    for ring in candidates {
        if rings.len() == expected {
            break;
        }
        let mut vector = vec![0u64; words];
        for (i, &a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            if let Some(bond) = mol.bond_between(a, b) {
                vector[bond / 64] ^= 1 << (bond % 64);
            }
        }
        if reduce_against(&mut vector, &basis) {
            let pivot = leading_bit(&vector);
            if let Some(pivot) = pivot {
                basis.push((pivot, vector));
                rings.push(ring);
            }
        }
    }
    rings
}

/// Gaussian elimination step. Returns true when the vector stays non-zero.
fn reduce_against(vector: &mut [u64], basis: &[(usize, Vec<u64>)]) -> bool {
    loop {
        let Some(pivot) = leading_bit(vector) else {
            return false;
        };
        match basis.iter().find(|(p, _)| *p == pivot) {
            Some((_, row)) => {
                for (v, r) in vector.iter_mut().zip(row) {
                    *v ^= r;
                }
            }
            None => return true,
        }
    }
}

fn leading_bit(vector: &[u64]) -> Option<usize> {
    vector
        .iter()
        .enumerate()
        .rev()
        .find(|(_, w)| **w != 0)
        .map(|(i, w)| i * 64 + 63 - w.leading_zeros() as usize)
}

/// All shortest paths from `start` to `end` that do not use `excluded_bond`,
/// restricted to ring bonds. Paths include both endpoints.
fn shortest_paths_avoiding(
    mol: &Molecule,
    start: usize,
    end: usize,
    excluded_bond: usize,
    ring_bonds: &[bool],
) -> Vec<Vec<usize>> {
    let n = mol.atom_count();
    let mut dist = vec![usize::MAX; n];
    let mut parents: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut queue = VecDeque::from([start]);
    dist[start] = 0;
    while let Some(curr) = queue.pop_front() {
        if curr == end {
            continue;
        }
        for &(next, bond) in mol.neighbors(curr) {
            if bond == excluded_bond || !ring_bonds[bond] {
                continue;
            }
            if dist[next] == usize::MAX {
                dist[next] = dist[curr] + 1;
                parents[next].push(curr);
                queue.push_back(next);
            } else if dist[next] == dist[curr] + 1 {
                parents[next].push(curr);
            }
        }
    }
    if dist[end] == usize::MAX {
        return Vec::new();
    }

    // Enumerate a bounded number of alternatives; fused cages need more than one.
    let mut paths = Vec::new();
    let mut stack = vec![vec![end]];
    while let Some(partial) = stack.pop() {
        if paths.len() >= 8 {
            break;
        }
        let Some(&last) = partial.last() else {
            continue;
        };
        if last == start {
            let mut path = partial;
            path.reverse();
            paths.push(path);
            continue;
        }
        for &p in &parents[last] {
            let mut next = partial.clone();
            next.push(p);
            stack.push(next);
        }
    }
    paths
}

/// Rotates a ring to start at its smallest atom, walking towards the smaller neighbour.
fn normalize_ring(ring: &mut Vec<usize>) {
    let Some(min_pos) = ring
        .iter()
        .enumerate()
        .min_by_key(|&(_, &v)| v)
        .map(|(i, _)| i)
    else {
        return;
    };
    ring.rotate_left(min_pos);
    let len = ring.len();
    if len > 2 && ring[len - 1] < ring[1] {
        ring[1..].reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::smiles;

    fn ring_sizes(smi: &str) -> Vec<usize> {
        let mol = smiles::parse(smi).unwrap();
        let mut sizes: Vec<usize> = RingInfo::perceive(&mol)
            .rings()
            .iter()
            .map(|r| r.len())
            .collect();
        sizes.sort();
        sizes
    }

    #[test]
    fn acyclic_molecule_has_no_rings() {
        assert!(ring_sizes("CCCCO").is_empty());
    }

    #[test]
    fn benzene_has_one_six_ring() {
        assert_eq!(ring_sizes("c1ccccc1"), vec![6]);
    }

    #[test]
    fn naphthalene_has_two_six_rings() {
        assert_eq!(ring_sizes("c1ccc2ccccc2c1"), vec![6, 6]);
    }

    #[test]
    fn spiro_and_bridged_systems() {
        assert_eq!(ring_sizes("C1CCC2(CC1)CCCC2"), vec![5, 6]);
        assert_eq!(ring_sizes("C1CC2CCC1C2"), vec![5, 5]);
    }

    #[test]
    fn cubane_has_five_four_rings() {
        assert_eq!(ring_sizes("C12C3C4C1C5C2C3C45"), vec![4, 4, 4, 4, 4]);
    }

    #[test]
    fn bridges_are_not_ring_bonds() {
        let mol = smiles::parse("c1ccccc1CC1CC1").unwrap();
        let flags = ring_bond_flags(&mol);
        let ring_count = flags.iter().filter(|&&f| f).count();
        assert_eq!(ring_count, 9);
        let info = RingInfo::perceive(&mol);
        assert!(info.is_atom_in_ring(0));
        assert!(!info.is_atom_in_ring(6));
        assert_eq!(info.smallest_ring_containing(8), Some(3));
    }
}
