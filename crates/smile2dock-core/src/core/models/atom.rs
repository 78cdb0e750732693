use super::element::Element;

/// One entry of the neighbour order a tetrahedral tag refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoNeighbor {
    /// A bonded atom, by index.
    Atom(usize),
    /// An implicit hydrogen or, for three-coordinate centres, the lone pair.
    Implicit,
}

/// A tetrahedral stereo tag together with the neighbour order it is read in.
///
/// Looking from the first neighbour towards the centre, the remaining three
/// appear counterclockwise (`@`) when `clockwise` is false and clockwise (`@@`)
/// when it is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TetrahedralStereo {
    pub clockwise: bool,
    pub neighbors: Vec<StereoNeighbor>,
}

impl TetrahedralStereo {
    /// Returns the tag re-expressed for a different neighbour order.
    ///
    /// `order` must be a permutation of the stored neighbours; odd permutations
    /// flip the handedness.
    pub fn permuted(&self, order: &[StereoNeighbor]) -> Option<TetrahedralStereo> {
        if order.len() != self.neighbors.len() {
            return None;
        }
        let mut positions = Vec::with_capacity(order.len());
        let mut used = vec![false; self.neighbors.len()];
        for n in order {
            let pos = self
                .neighbors
                .iter()
                .enumerate()
                .position(|(i, m)| m == n && !used[i])?;
            used[pos] = true;
            positions.push(pos);
        }
        let odd = permutation_is_odd(&positions);
        Some(TetrahedralStereo {
            clockwise: self.clockwise ^ odd,
            neighbors: order.to_vec(),
        })
    }

    /// Replaces the first implicit entry with a concrete atom.
    pub fn resolve_implicit(&mut self, atom: usize) -> bool {
        match self
            .neighbors
            .iter_mut()
            .find(|n| **n == StereoNeighbor::Implicit)
        {
            Some(slot) => {
                *slot = StereoNeighbor::Atom(atom);
                true
            }
            None => false,
        }
    }
}

pub(crate) fn permutation_is_odd(perm: &[usize]) -> bool {
    let mut visited = vec![false; perm.len()];
    let mut transpositions = 0;
    for start in 0..perm.len() {
        if visited[start] {
            continue;
        }
        let mut len = 0;
        let mut j = start;
        while !visited[j] {
            visited[j] = true;
            j = perm[j];
            len += 1;
        }
        transpositions += len - 1;
    }
    transpositions % 2 == 1
}

/// A vertex of the molecular graph.
///
/// Hydrogens are either explicit atoms of their own or counted in
/// `implicit_hydrogens` on the heavy atom that carries them.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: &'static Element,
    pub formal_charge: i8,
    /// Mass number when the atom is isotopically labelled.
    pub isotope: Option<u16>,
    pub aromatic: bool,
    pub implicit_hydrogens: u8,
    /// The hydrogen count was written explicitly (`[NH4+]`), so it must not be
    /// recomputed from default valences.
    pub bracket: bool,
    pub chirality: Option<TetrahedralStereo>,
}

impl Atom {
    pub fn new(element: &'static Element) -> Self {
        Self {
            element,
            formal_charge: 0,
            isotope: None,
            aromatic: false,
            implicit_hydrogens: 0,
            bracket: false,
            chirality: None,
        }
    }

    pub fn hydrogen() -> Self {
        Self::new(Element::hydrogen())
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.element.is_hydrogen()
    }

    #[inline]
    pub fn atomic_number(&self) -> u8 {
        self.element.atomic_number
    }

    #[inline]
    pub fn symbol(&self) -> &'static str {
        self.element.symbol
    }

    /// Exact mass of this atom alone, without its implicit hydrogens.
    pub fn exact_mass(&self) -> f64 {
        match self.isotope {
            Some(iso) => self.element.isotope_mass(iso),
            None => self.element.monoisotopic_mass,
        }
    }
}
