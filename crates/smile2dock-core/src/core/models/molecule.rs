use super::atom::{Atom, StereoNeighbor};
use super::bond::{Bond, BondOrder};
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("Atom index {0} is out of range")]
    AtomOutOfRange(usize),
    #[error("Atom {0} cannot be bonded to itself")]
    SelfBond(usize),
    #[error("Atoms {0} and {1} are already bonded")]
    DuplicateBond(usize, usize),
}

/// A molecular graph: atoms, bonds and an adjacency list kept in sync with both.
///
/// Atom indices are stable; atoms are only ever appended. Each adjacency entry
/// stores `(neighbour, bond index)` in the order the bonds were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    pub name: String,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        self.atoms.len() - 1
    }

    pub fn add_bond(
        &mut self,
        begin: usize,
        end: usize,
        order: BondOrder,
    ) -> Result<usize, MoleculeError> {
        self.push_bond(Bond::new(begin, end, order))
    }

    pub fn push_bond(&mut self, bond: Bond) -> Result<usize, MoleculeError> {
        let (a, b) = (bond.begin, bond.end);
        for idx in [a, b] {
            if idx >= self.atoms.len() {
                return Err(MoleculeError::AtomOutOfRange(idx));
            }
        }
        if a == b {
            return Err(MoleculeError::SelfBond(a));
        }
        if self.bond_between(a, b).is_some() {
            return Err(MoleculeError::DuplicateBond(a, b));
        }
        let id = self.bonds.len();
        self.bonds.push(bond);
        self.adjacency[a].push((b, id));
        self.adjacency[b].push((a, id));
        Ok(id)
    }

    #[inline]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    #[inline]
    pub fn atom(&self, idx: usize) -> &Atom {
        &self.atoms[idx]
    }

    #[inline]
    pub fn atom_mut(&mut self, idx: usize) -> &mut Atom {
        &mut self.atoms[idx]
    }

    pub fn atoms_mut(&mut self) -> impl Iterator<Item = &mut Atom> {
        self.atoms.iter_mut()
    }

    #[inline]
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    #[inline]
    pub fn bond(&self, idx: usize) -> &Bond {
        &self.bonds[idx]
    }

    #[inline]
    pub fn bond_mut(&mut self, idx: usize) -> &mut Bond {
        &mut self.bonds[idx]
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| !a.is_hydrogen()).count()
    }

    /// `(neighbour, bond index)` pairs of an atom.
    #[inline]
    pub fn neighbors(&self, idx: usize) -> &[(usize, usize)] {
        &self.adjacency[idx]
    }

    pub fn neighbor_atoms(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[idx].iter().map(|&(n, _)| n)
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency
            .get(a)?
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, bond)| bond)
    }

    /// Number of explicit neighbours.
    #[inline]
    pub fn degree(&self, idx: usize) -> usize {
        self.adjacency[idx].len()
    }

    pub fn heavy_degree(&self, idx: usize) -> usize {
        self.neighbor_atoms(idx)
            .filter(|&n| !self.atoms[n].is_hydrogen())
            .count()
    }

    pub fn explicit_hydrogens(&self, idx: usize) -> usize {
        self.neighbor_atoms(idx)
            .filter(|&n| self.atoms[n].is_hydrogen())
            .count()
    }

    /// Implicit plus explicit hydrogens on an atom.
    pub fn total_hydrogens(&self, idx: usize) -> usize {
        self.atoms[idx].implicit_hydrogens as usize + self.explicit_hydrogens(idx)
    }

    /// Number of attached atoms counting implicit hydrogens.
    pub fn total_degree(&self, idx: usize) -> usize {
        self.degree(idx) + self.atoms[idx].implicit_hydrogens as usize
    }

    /// Sum of integer bond orders over explicit bonds, aromatic bonds counting one.
    pub fn bond_order_sum(&self, idx: usize) -> u8 {
        self.adjacency[idx]
            .iter()
            .map(|&(_, b)| self.bonds[b].order.integer())
            .sum()
    }

    /// Bond valence including implicit hydrogens, aromatic bonds counting 1.5.
    pub fn valence(&self, idx: usize) -> f64 {
        self.adjacency[idx]
            .iter()
            .map(|&(_, b)| self.bonds[b].order.valence())
            .sum::<f64>()
            + self.atoms[idx].implicit_hydrogens as f64
    }

    pub fn has_explicit_hydrogens(&self) -> bool {
        self.atoms.iter().any(|a| a.is_hydrogen())
    }

    pub fn net_charge(&self) -> i32 {
        self.atoms.iter().map(|a| a.formal_charge as i32).sum()
    }

    /// Connected components as lists of atom indices, each in BFS order.
    pub fn fragments(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.atoms.len()];
        let mut fragments = Vec::new();
        for start in 0..self.atoms.len() {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            let mut component = Vec::new();
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                component.push(current);
                for &(n, _) in &self.adjacency[current] {
                    if !seen[n] {
                        seen[n] = true;
                        queue.push_back(n);
                    }
                }
            }
            fragments.push(component);
        }
        fragments
    }

    /// Copies the given atoms and the bonds among them into a new molecule.
    ///
    /// Atoms keep the order of `atoms`; stereo neighbours that fall outside the
    /// selection are dropped from the tag's neighbour list.
    pub fn extract(&self, atoms: &[usize]) -> Molecule {
        let mut index = vec![usize::MAX; self.atoms.len()];
        let mut sub = Molecule::with_name(self.name.clone());
        for (new, &old) in atoms.iter().enumerate() {
            index[old] = new;
        }
        for &old in atoms {
            let mut atom = self.atoms[old].clone();
            if let Some(tag) = atom.chirality.as_mut() {
                tag.neighbors = tag
                    .neighbors
                    .iter()
                    .filter_map(|n| match *n {
                        StereoNeighbor::Atom(a) if index[a] == usize::MAX => None,
                        StereoNeighbor::Atom(a) => Some(StereoNeighbor::Atom(index[a])),
                        StereoNeighbor::Implicit => Some(StereoNeighbor::Implicit),
                    })
                    .collect();
            }
            sub.add_atom(atom);
        }
        for bond in &self.bonds {
            let (a, b) = (index[bond.begin], index[bond.end]);
            if a == usize::MAX || b == usize::MAX {
                continue;
            }
            sub.bonds.push(Bond { begin: a, end: b, ..*bond });
            let id = sub.bonds.len() - 1;
            sub.adjacency[a].push((b, id));
            sub.adjacency[b].push((a, id));
        }
        sub
    }

    /// Topological distance matrix (bond counts), `usize::MAX` between fragments.
    pub fn topological_distances(&self) -> Vec<Vec<usize>> {
        let n = self.atoms.len();
        let mut dist = vec![vec![usize::MAX; n]; n];
        for (start, row) in dist.iter_mut().enumerate() {
            row[start] = 0;
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                let d = row[current];
                for &(next, _) in &self.adjacency[current] {
                    if row[next] == usize::MAX {
                        row[next] = d + 1;
                        queue.push_back(next);
                    }
                }
            }
        }
        dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;

    fn ethanol() -> Molecule {
        let mut mol = Molecule::with_name("ethanol");
        let c1 = mol.add_atom(Atom::new(Element::carbon()));
        let c2 = mol.add_atom(Atom::new(Element::carbon()));
        let o = mol.add_atom(Atom::new(Element::by_symbol("O").unwrap()));
        mol.atom_mut(c1).implicit_hydrogens = 3;
        mol.atom_mut(c2).implicit_hydrogens = 2;
        mol.atom_mut(o).implicit_hydrogens = 1;
        mol.add_bond(c1, c2, BondOrder::Single).unwrap();
        mol.add_bond(c2, o, BondOrder::Single).unwrap();
        mol
    }

    #[test]
    fn adjacency_tracks_added_bonds() {
        let mol = ethanol();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        assert_eq!(mol.degree(1), 2);
        assert_eq!(mol.bond_between(0, 1), Some(0));
        assert_eq!(mol.bond_between(2, 1), Some(1));
        assert_eq!(mol.bond_between(0, 2), None);
    }

    #[test]
    fn rejects_invalid_bonds() {
        let mut mol = ethanol();
        assert_eq!(
            mol.add_bond(0, 0, BondOrder::Single),
            Err(MoleculeError::SelfBond(0))
        );
        assert_eq!(
            mol.add_bond(1, 0, BondOrder::Double),
            Err(MoleculeError::DuplicateBond(1, 0))
        );
        assert_eq!(
            mol.add_bond(0, 9, BondOrder::Single),
            Err(MoleculeError::AtomOutOfRange(9))
        );
    }

    #[test]
    fn hydrogen_counts_combine_implicit_and_explicit() {
        let mut mol = ethanol();
        let h = mol.add_atom(Atom::hydrogen());
        mol.atom_mut(2).implicit_hydrogens = 0;
        mol.add_bond(2, h, BondOrder::Single).unwrap();
        assert_eq!(mol.total_hydrogens(2), 1);
        assert_eq!(mol.heavy_degree(2), 1);
        assert_eq!(mol.degree(2), 2);
        assert!(mol.has_explicit_hydrogens());
        assert_eq!(mol.heavy_atom_count(), 3);
    }

    #[test]
    fn fragments_split_disconnected_parts() {
        let mut mol = ethanol();
        mol.add_atom(Atom::new(Element::by_symbol("Na").unwrap()));
        let frags = mol.fragments();
        assert_eq!(frags.len(), 2);
        assert_eq!(frags[0], vec![0, 1, 2]);
        assert_eq!(frags[1], vec![3]);
    }

    #[test]
    fn extract_remaps_bonds_of_one_fragment() {
        let mut mol = Molecule::new();
        let na = mol.add_atom(Atom::new(Element::by_symbol("Na").unwrap()));
        let c = mol.add_atom(Atom::new(Element::carbon()));
        let o = mol.add_atom(Atom::new(Element::by_symbol("O").unwrap()));
        mol.add_bond(c, o, BondOrder::Double).unwrap();

        let sub = mol.extract(&[c, o]);
        assert_eq!(sub.atom_count(), 2);
        assert_eq!(sub.bond_count(), 1);
        assert_eq!(sub.bond_between(0, 1), Some(0));
        assert_eq!(sub.bond(0).order, BondOrder::Double);
        assert_eq!(sub.atom(1).symbol(), "O");
        assert_eq!(mol.extract(&[na]).bond_count(), 0);
    }

    #[test]
    fn topological_distances_count_bonds() {
        let mol = ethanol();
        let d = mol.topological_distances();
        assert_eq!(d[0][2], 2);
        assert_eq!(d[2][0], 2);
        assert_eq!(d[1][1], 0);
    }

    #[test]
    fn valence_counts_aromatic_as_one_and_a_half() {
        let mut mol = Molecule::new();
        let a = mol.add_atom(Atom::new(Element::carbon()));
        let b = mol.add_atom(Atom::new(Element::carbon()));
        let c = mol.add_atom(Atom::new(Element::carbon()));
        mol.add_bond(a, b, BondOrder::Aromatic).unwrap();
        mol.add_bond(b, c, BondOrder::Aromatic).unwrap();
        mol.atom_mut(b).implicit_hydrogens = 1;
        assert_eq!(mol.valence(b), 4.0);
        assert_eq!(mol.bond_order_sum(b), 2);
    }
}
