use crate::core::models::atom::StereoNeighbor;
use crate::core::models::bond::{BondDirection, BondOrder};
use crate::core::models::molecule::Molecule;
use crate::core::utils::geometry::{dihedral, signed_volume};
use nalgebra::Point3;

/// Signed volumes smaller than this (in cubic angstroms) count as undecided.
const MIN_DECIDED_VOLUME: f64 = 0.05;

/// A tetrahedral centre reduced to three atoms and the sign their signed
/// volume must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChiralConstraint {
    pub centre: usize,
    pub neighbors: [usize; 3],
    /// `true` when `signed_volume(centre, n0, n1, n2)` must be positive.
    pub positive: bool,
}

/// A double bond `a-b=c-d` whose substituents `a` and `d` must be trans (or cis).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleBondConstraint {
    pub atoms: [usize; 4],
    pub trans: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    /// Every centre has the requested sign.
    Matches,
    /// Every centre has the opposite sign; a mirror image fixes all of them.
    Mirrored,
    /// Some centres are wrong, or too flat to tell.
    Mixed,
}

impl ChiralConstraint {
    pub fn volume(&self, positions: &[Point3<f64>]) -> f64 {
        let [a, b, c] = self.neighbors;
        signed_volume(&positions[self.centre], &positions[a], &positions[b], &positions[c])
    }

    /// Target sign as +1 or -1.
    pub fn sign(&self) -> f64 {
        if self.positive { 1.0 } else { -1.0 }
    }
}

/// Collects the tetrahedral tags of `mol`.
///
/// A tag whose neighbour list still holds an implicit entry (a lone pair) is
/// re-expressed with that entry last, so the first three entries are atoms.
pub fn chiral_constraints(mol: &Molecule) -> Vec<ChiralConstraint> {
    let mut constraints = Vec::new();
    for centre in 0..mol.atom_count() {
        let Some(stereo) = mol.atom(centre).chirality.as_ref() else {
            continue;
        };
        let mut order: Vec<StereoNeighbor> = stereo
            .neighbors
            .iter()
            .copied()
            .filter(|n| *n != StereoNeighbor::Implicit)
            .collect();
        order.extend(
            stereo
                .neighbors
                .iter()
                .filter(|n| **n == StereoNeighbor::Implicit),
        );
        let Some(tag) = stereo.permuted(&order) else {
            continue;
        };
        let atoms: Vec<usize> = tag
            .neighbors
            .iter()
            .filter_map(|n| match n {
                StereoNeighbor::Atom(a) => Some(*a),
                StereoNeighbor::Implicit => None,
            })
            .collect();
        if atoms.len() < 3 {
            continue;
        }
        constraints.push(ChiralConstraint {
            centre,
            neighbors: [atoms[0], atoms[1], atoms[2]],
            positive: !tag.clockwise,
        });
    }
    constraints
}

/// Collects double bonds with a direction marker on both sides.
pub fn double_bond_constraints(mol: &Molecule) -> Vec<DoubleBondConstraint> {
    let mut constraints = Vec::new();
    for bond in mol.bonds() {
        if bond.order != BondOrder::Double {
            continue;
        }
        let (b, c) = (bond.begin, bond.end);
        let marked = |centre: usize, other: usize| {
            mol.neighbors(centre).iter().find_map(|&(n, nb)| {
                let dir = mol.bond(nb).direction;
                (n != other && dir != BondDirection::None).then_some((n, nb))
            })
        };
        let (Some((a, ab)), Some((d, cd))) = (marked(b, c), marked(c, b)) else {
            continue;
        };
        let left = mol.bond(ab).direction_from(a);
        let right = mol.bond(cd).direction_from(c);
        constraints.push(DoubleBondConstraint {
            atoms: [a, b, c, d],
            trans: left == right,
        });
    }
    constraints
}

pub fn handedness(constraints: &[ChiralConstraint], positions: &[Point3<f64>]) -> Handedness {
    let mut matching = 0;
    let mut inverted = 0;
    for c in constraints {
        let signed = c.sign() * c.volume(positions);
        if signed > MIN_DECIDED_VOLUME {
            matching += 1;
        } else if signed < -MIN_DECIDED_VOLUME {
            inverted += 1;
        }
    }
    if matching == constraints.len() {
        Handedness::Matches
    } else if inverted == constraints.len() {
        Handedness::Mirrored
    } else {
        Handedness::Mixed
    }
}

pub fn double_bonds_match(constraints: &[DoubleBondConstraint], positions: &[Point3<f64>]) -> bool {
    constraints.iter().all(|c| {
        let [a, b, cc, d] = c.atoms;
        let phi = dihedral(&positions[a], &positions[b], &positions[cc], &positions[d]).abs();
        (phi > std::f64::consts::FRAC_PI_2) == c.trans
    })
}

/// Reflects the coordinates through the yz plane.
pub fn mirror(positions: &mut [Point3<f64>]) {
    for p in positions {
        p.x = -p.x;
    }
}
