use super::parser::{default_implicit_hydrogens, is_organic_subset};
use crate::core::models::atom::StereoNeighbor;
use crate::core::models::bond::{BondDirection, BondOrder};
use crate::core::models::molecule::Molecule;
use std::collections::HashMap;
use std::fmt::Write as _;

const MAX_RING_DIGIT: usize = 99;

/// Writes SMILES visiting atoms in index order.
pub fn write(mol: &Molecule) -> String {
    let ranks: Vec<usize> = (0..mol.atom_count()).collect();
    write_with_ranks(mol, &ranks)
}

/// Writes SMILES with a depth-first walk that starts each fragment at its
/// lowest-ranked atom and visits neighbours in increasing rank.
///
/// Tetrahedral tags are re-expressed for the written neighbour order, and
/// cis/trans markers are flipped when a bond is written from its far end.
pub fn write_with_ranks(mol: &Molecule, ranks: &[usize]) -> String {
    let (tree, roots) = SpanningTree::build(mol, ranks);
    let mut emitter = Emitter {
        mol,
        tree: &tree,
        out: String::new(),
        digits: [false; MAX_RING_DIGIT + 1],
        open_digits: HashMap::new(),
    };
    for (i, &root) in roots.iter().enumerate() {
        if i > 0 {
            emitter.out.push('.');
        }
        emitter.emit(root, None);
    }
    emitter.out
}

struct SpanningTree {
    visit_index: Vec<usize>,
    children: Vec<Vec<(usize, usize)>>,
    ring_bonds: Vec<Vec<(usize, usize)>>,
    counter: usize,
}

/// Position of each atom in the walk [`write_with_ranks`] takes for `ranks`.
pub(super) fn visit_order(mol: &Molecule, ranks: &[usize]) -> Vec<usize> {
    SpanningTree::build(mol, ranks).0.visit_index
}

impl SpanningTree {
    fn build(mol: &Molecule, ranks: &[usize]) -> (Self, Vec<usize>) {
        let n = mol.atom_count();
        let mut tree = Self {
            visit_index: vec![usize::MAX; n],
            children: vec![Vec::new(); n],
            ring_bonds: vec![Vec::new(); n],
            counter: 0,
        };
        let mut visited = vec![false; n];
        let mut closed = vec![false; mol.bond_count()];
        let mut roots = Vec::new();
        while let Some(root) = (0..n).filter(|&i| !visited[i]).min_by_key(|&i| ranks[i]) {
            roots.push(root);
            tree.explore(mol, root, None, ranks, &mut visited, &mut closed);
        }
        tree.sort_ring_bonds();
        (tree, roots)
    }

    fn explore(
        &mut self,
        mol: &Molecule,
        atom: usize,
        parent_bond: Option<usize>,
        ranks: &[usize],
        visited: &mut [bool],
        closed: &mut [bool],
    ) {
        visited[atom] = true;
        self.visit_index[atom] = self.counter;
        self.counter += 1;

        let mut neighbors: Vec<(usize, usize)> = mol
            .neighbors(atom)
            .iter()
            .copied()
            .filter(|&(_, b)| Some(b) != parent_bond)
            .collect();
        neighbors.sort_by_key(|&(nb, _)| ranks[nb]);

        for (nb, bond) in neighbors {
            if visited[nb] {
                if !closed[bond] {
                    closed[bond] = true;
                    self.ring_bonds[atom].push((nb, bond));
                    self.ring_bonds[nb].push((atom, bond));
                }
            } else {
                self.children[atom].push((nb, bond));
                self.explore(mol, nb, Some(bond), ranks, visited, closed);
            }
        }
    }

    fn sort_ring_bonds(&mut self) {
        let visit = &self.visit_index;
        for list in &mut self.ring_bonds {
            list.sort_by_key(|&(partner, _)| visit[partner]);
        }
    }
}

struct Emitter<'a> {
    mol: &'a Molecule,
    tree: &'a SpanningTree,
    out: String,
    digits: [bool; MAX_RING_DIGIT + 1],
    open_digits: HashMap<usize, usize>,
}

impl Emitter<'_> {
    fn emit(&mut self, atom: usize, from: Option<usize>) {
        let mol = self.mol;
        let tree = self.tree;

        let mut written: Vec<StereoNeighbor> = Vec::with_capacity(4);
        if let Some(parent) = from {
            written.push(StereoNeighbor::Atom(parent));
        }
        let stereo = mol.atom(atom).chirality.as_ref();
        if stereo.is_some_and(|s| s.neighbors.contains(&StereoNeighbor::Implicit)) {
            written.push(StereoNeighbor::Implicit);
        }
        written.extend(
            tree.ring_bonds[atom]
                .iter()
                .map(|&(p, _)| StereoNeighbor::Atom(p)),
        );
        written.extend(
            tree.children[atom]
                .iter()
                .map(|&(c, _)| StereoNeighbor::Atom(c)),
        );
        let clockwise = stereo
            .and_then(|s| s.permuted(&written))
            .map(|s| s.clockwise);

        self.out.push_str(&atom_text(mol, atom, clockwise));

        let mut released = Vec::new();
        for &(partner, bond) in &tree.ring_bonds[atom] {
            if let Some(digit) = self.open_digits.remove(&bond) {
                write_ring_digit(&mut self.out, digit);
                released.push(digit);
            } else {
                let digit = self.allocate_digit();
                self.open_digits.insert(bond, digit);
                self.out.push_str(bond_symbol(mol, bond, atom, partner));
                write_ring_digit(&mut self.out, digit);
            }
        }
        for digit in released {
            self.digits[digit] = false;
        }

        let children = &tree.children[atom];
        for (i, &(child, bond)) in children.iter().enumerate() {
            let last = i + 1 == children.len();
            if !last {
                self.out.push('(');
            }
            self.out.push_str(bond_symbol(mol, bond, atom, child));
            self.emit(child, Some(atom));
            if !last {
                self.out.push(')');
            }
        }
    }

    fn allocate_digit(&mut self) -> usize {
        let digit = (1..=MAX_RING_DIGIT)
            .find(|&d| !self.digits[d])
            .unwrap_or(MAX_RING_DIGIT);
        self.digits[digit] = true;
        digit
    }
}

fn write_ring_digit(out: &mut String, digit: usize) {
    if digit < 10 {
        let _ = write!(out, "{digit}");
    } else {
        let _ = write!(out, "%{digit}");
    }
}

fn bond_symbol(mol: &Molecule, bond: usize, from: usize, to: usize) -> &'static str {
    let b = mol.bond(bond);
    let both_aromatic = mol.atom(from).aromatic && mol.atom(to).aromatic;
    match b.order {
        BondOrder::Single => match b.direction_from(from) {
            BondDirection::Up => "/",
            BondDirection::Down => "\\",
            BondDirection::None if both_aromatic => "-",
            BondDirection::None => "",
        },
        BondOrder::Double => "=",
        BondOrder::Triple => "#",
        BondOrder::Aromatic if both_aromatic => "",
        BondOrder::Aromatic => ":",
    }
}

fn atom_text(mol: &Molecule, idx: usize, clockwise: Option<bool>) -> String {
    let atom = mol.atom(idx);
    let symbol = if atom.aromatic {
        atom.element.symbol.to_ascii_lowercase()
    } else {
        atom.element.symbol.to_string()
    };
    let h = atom.implicit_hydrogens;
    let plain = is_organic_subset(atom.element, atom.aromatic)
        && atom.formal_charge == 0
        && atom.isotope.is_none()
        && clockwise.is_none()
        && h == default_implicit_hydrogens(mol, idx);
    if plain {
        return symbol;
    }

    let mut text = String::from("[");
    if let Some(iso) = atom.isotope {
        let _ = write!(text, "{iso}");
    }
    text.push_str(&symbol);
    match clockwise {
        Some(true) => text.push_str("@@"),
        Some(false) => text.push('@'),
        None => {}
    }
    match h {
        0 => {}
        1 => text.push('H'),
        _ => {
            let _ = write!(text, "H{h}");
        }
    }
    match atom.formal_charge {
        0 => {}
        1 => text.push('+'),
        -1 => text.push('-'),
        c if c > 0 => {
            let _ = write!(text, "+{c}");
        }
        c => {
            let _ = write!(text, "-{}", -c);
        }
    }
    text.push(']');
    text
}
