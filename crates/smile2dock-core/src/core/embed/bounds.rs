use super::stereo::DoubleBondConstraint;
use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;
use crate::core::perception::hybridization::{Hybridization, hybridization, is_conjugated_lone_pair};
use crate::core::perception::rings::RingInfo;
use tracing::debug;

const BOND_TOLERANCE: f64 = 0.01;
const ANGLE_TOLERANCE: f64 = 0.04;
const TORSION_TOLERANCE: f64 = 0.06;
/// Lower bound for pairs four or more bonds apart, as a fraction of the
/// van der Waals radius sum.
const VDW_SCALE: f64 = 0.7;
const UNBOUNDED: f64 = 1000.0;

/// Ideal bond length from covalent radii, shortened for multiple bonds.
pub fn bond_length(mol: &Molecule, bond_idx: usize) -> f64 {
    let bond = mol.bond(bond_idx);
    let sum = mol.atom(bond.begin).element.covalent_radius
        + mol.atom(bond.end).element.covalent_radius;
    let factor = match bond.order {
        BondOrder::Single => 1.0,
        BondOrder::Aromatic => 0.915,
        BondOrder::Double => 0.88,
        BondOrder::Triple => 0.79,
    };
    sum * factor
}

/// Ideal angle in radians at `centre` between the bonds to `a` and `b`.
pub fn ideal_angle(mol: &Molecule, rings: &RingInfo, a: usize, centre: usize, b: usize) -> f64 {
    let shared_ring = rings
        .rings()
        .iter()
        .filter(|r| r.contains(&a) && r.contains(&centre) && r.contains(&b))
        .map(Vec::len)
        .min();
    let hyb = hybridization(mol, centre);
    let degrees = match shared_ring {
        Some(3) => 60.0,
        Some(4) => 90.0,
        Some(5) => 108.0,
        Some(6) if hyb != Hybridization::Sp3 => 120.0,
        _ => match hyb {
            Hybridization::Sp => 180.0,
            Hybridization::Sp2 => 120.0,
            Hybridization::Sp3 if is_conjugated_lone_pair(mol, centre) => 120.0,
            _ => 109.47,
        },
    };
    f64::to_radians(degrees)
}

/// Distance between the ends of `i-j-k-l` for a given dihedral.
///
/// `a`, `b`, `c` are the three bond lengths and `t1`, `t2` the angles at `j`
/// and `k`; `phi == 0` is the cis arrangement.
pub fn torsion_distance(a: f64, b: f64, c: f64, t1: f64, t2: f64, phi: f64) -> f64 {
    let x = b - c * t2.cos() - a * t1.cos();
    let y = c * t2.sin() * phi.cos() - a * t1.sin();
    let z = c * t2.sin() * phi.sin();
    (x * x + y * y + z * z).sqrt()
}

/// Symmetric lower/upper distance bounds for every atom pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsMatrix {
    n: usize,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl BoundsMatrix {
    fn empty(n: usize) -> Self {
        Self {
            n,
            lower: vec![0.0; n * n],
            upper: vec![UNBOUNDED; n * n],
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn lower(&self, i: usize, j: usize) -> f64 {
        self.lower[i * self.n + j]
    }

    #[inline]
    pub fn upper(&self, i: usize, j: usize) -> f64 {
        self.upper[i * self.n + j]
    }

    fn set(&mut self, i: usize, j: usize, lower: f64, upper: f64) {
        let n = self.n;
        self.lower[i * n + j] = lower;
        self.lower[j * n + i] = lower;
        self.upper[i * n + j] = upper;
        self.upper[j * n + i] = upper;
    }

    /// Narrows an existing range; an empty intersection collapses to the
    /// midpoint of the two candidate ranges.
    fn intersect(&mut self, i: usize, j: usize, lower: f64, upper: f64) {
        let lo = self.lower(i, j).max(lower);
        let hi = self.upper(i, j).min(upper);
        if lo <= hi {
            self.set(i, j, lo, hi);
        } else {
            let mid = 0.5 * (lo + hi);
            self.set(i, j, mid, mid);
        }
    }

    /// Builds the bounds of `mol` from its topology.
    ///
    /// Bonded pairs get their ideal length, 1-3 pairs the distance implied by
    /// the ideal angle, and 1-4 pairs the range between the cis and trans
    /// distances. Ring and marked double bonds fix 1-4 pairs to one of the two.
    /// All other pairs only get a van der Waals lower bound.
    pub fn build(mol: &Molecule, double_bonds: &[DoubleBondConstraint]) -> Self {
        let n = mol.atom_count();
        let mut bounds = Self::empty(n);
        let topo = mol.topological_distances();
        let rings = RingInfo::perceive(mol);

        let mut lengths = vec![0.0; mol.bond_count()];
        for (b, length) in lengths.iter_mut().enumerate() {
            *length = bond_length(mol, b);
            let bond = mol.bond(b);
            bounds.set(
                bond.begin,
                bond.end,
                *length - BOND_TOLERANCE,
                *length + BOND_TOLERANCE,
            );
        }

        let mut angle_set = vec![false; n * n];
        for centre in 0..n {
            let nbrs = mol.neighbors(centre);
            for (x, &(a, ba)) in nbrs.iter().enumerate() {
                for &(b, bb) in &nbrs[x + 1..] {
                    if topo[a][b] != 2 {
                        continue;
                    }
                    let theta = ideal_angle(mol, &rings, a, centre, b);
                    let (la, lb) = (lengths[ba], lengths[bb]);
                    let d = (la * la + lb * lb - 2.0 * la * lb * theta.cos()).sqrt();
                    let (lo, hi) = (d - ANGLE_TOLERANCE, d + ANGLE_TOLERANCE);
                    if angle_set[a * n + b] {
                        bounds.intersect(a, b, lo, hi);
                    } else {
                        bounds.set(a, b, lo, hi);
                        angle_set[a * n + b] = true;
                        angle_set[b * n + a] = true;
                    }
                }
            }
        }

        let mut torsion_set = vec![false; n * n];
        for (jk, bond) in mol.bonds().iter().enumerate() {
            let (j, k) = (bond.begin, bond.end);
            let planar = match bond.order {
                BondOrder::Aromatic => true,
                BondOrder::Double => rings.is_bond_in_ring(jk),
                _ => false,
            };
            for &(i, ij) in mol.neighbors(j) {
                if i == k {
                    continue;
                }
                for &(l, kl) in mol.neighbors(k) {
                    if l == j || l == i || topo[i][l] != 3 {
                        continue;
                    }
                    let t1 = ideal_angle(mol, &rings, i, j, k);
                    let t2 = ideal_angle(mol, &rings, j, k, l);
                    let (a, b, c) = (lengths[ij], lengths[jk], lengths[kl]);
                    let cis = torsion_distance(a, b, c, t1, t2, 0.0);
                    let trans = torsion_distance(a, b, c, t1, t2, std::f64::consts::PI);

                    let fixed = if planar {
                        Some(Self::ring_torsion_is_cis(&rings, i, j, k, l, ij, kl))
                    } else {
                        Self::marked_is_cis(double_bonds, i, j, k, l)
                    };
                    let (lo, hi) = match fixed {
                        Some(true) => (cis - TORSION_TOLERANCE, cis + TORSION_TOLERANCE),
                        Some(false) => (trans - TORSION_TOLERANCE, trans + TORSION_TOLERANCE),
                        None => (cis - TORSION_TOLERANCE, trans + TORSION_TOLERANCE),
                    };
                    if torsion_set[i * n + l] {
                        bounds.intersect(i, l, lo, hi);
                    } else {
                        bounds.set(i, l, lo, hi);
                        torsion_set[i * n + l] = true;
                        torsion_set[l * n + i] = true;
                    }
                }
            }
        }

        for i in 0..n {
            for j in (i + 1)..n {
                if topo[i][j] >= 4 {
                    let vdw = mol.atom(i).element.vdw_radius + mol.atom(j).element.vdw_radius;
                    bounds.set(i, j, VDW_SCALE * vdw, UNBOUNDED);
                }
            }
        }

        bounds.smooth();
        bounds
    }

    /// Whether the planar torsion `i-j-k-l` around a ring or aromatic bond is
    /// cis: both ends in one ring with the bond, or both ends outside rings.
    fn ring_torsion_is_cis(
        rings: &RingInfo,
        i: usize,
        j: usize,
        k: usize,
        l: usize,
        ij: usize,
        kl: usize,
    ) -> bool {
        let same_ring = rings
            .rings()
            .iter()
            .any(|r| [i, j, k, l].iter().all(|a| r.contains(a)));
        same_ring || (!rings.is_bond_in_ring(ij) && !rings.is_bond_in_ring(kl))
    }

    fn marked_is_cis(
        double_bonds: &[DoubleBondConstraint],
        i: usize,
        j: usize,
        k: usize,
        l: usize,
    ) -> Option<bool> {
        double_bonds.iter().find_map(|c| {
            let [a, b, cc, d] = c.atoms;
            let forward = (b, cc) == (j, k);
            let backward = (b, cc) == (k, j);
            if !forward && !backward {
                return None;
            }
            let (near, far) = if forward { (i, l) } else { (l, i) };
            // Swapping one substituent for the other one on the same atom
            // swaps cis and trans.
            let flips = usize::from(near != a) + usize::from(far != d);
            Some((flips % 2 == 1) == c.trans)
        })
    }

    /// Floyd-style triangle smoothing of both bounds.
    pub fn smooth(&mut self) {
        let n = self.n;
        let mut clashes = 0usize;
        for k in 0..n {
            for i in 0..n {
                if i == k {
                    continue;
                }
                let u_ik = self.upper(i, k);
                let l_ik = self.lower(i, k);
                for j in (i + 1)..n {
                    if j == k {
                        continue;
                    }
                    let u_kj = self.upper(k, j);
                    let l_kj = self.lower(k, j);
                    let mut lo = self.lower(i, j);
                    let mut hi = self.upper(i, j);
                    if hi > u_ik + u_kj {
                        hi = u_ik + u_kj;
                    }
                    if lo < l_ik - u_kj {
                        lo = l_ik - u_kj;
                    } else if lo < l_kj - u_ik {
                        lo = l_kj - u_ik;
                    }
                    if lo > hi {
                        clashes += 1;
                        let mid = 0.5 * (lo + hi);
                        lo = mid;
                        hi = mid;
                    }
                    self.set(i, j, lo, hi);
                }
            }
        }
        if clashes > 0 {
            debug!(clashes, "Triangle smoothing collapsed inconsistent bounds");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::embed::stereo::double_bond_constraints;
    use crate::core::perception::add_hydrogens;
    use crate::core::smiles;

    fn bounds_of(s: &str) -> (Molecule, BoundsMatrix) {
        let mol = add_hydrogens(&smiles::parse(s).unwrap());
        let double_bonds = double_bond_constraints(&mol);
        let bounds = BoundsMatrix::build(&mol, &double_bonds);
        (mol, bounds)
    }

    #[test]
    fn bonded_pairs_follow_covalent_radii() {
        let (_, bounds) = bounds_of("CC");
        let mid = 0.5 * (bounds.lower(0, 1) + bounds.upper(0, 1));
        assert!((mid - 1.52).abs() < 1e-9);
        let (_, ethyne) = bounds_of("C#C");
        assert!(ethyne.upper(0, 1) < 1.25);
    }

    #[test]
    fn bounds_are_symmetric_and_ordered() {
        let (mol, bounds) = bounds_of("CC(=O)Oc1ccccc1C(=O)O");
        for i in 0..mol.atom_count() {
            for j in 0..mol.atom_count() {
                assert_eq!(bounds.lower(i, j), bounds.lower(j, i));
                assert_eq!(bounds.upper(i, j), bounds.upper(j, i));
                assert!(bounds.lower(i, j) <= bounds.upper(i, j) + 1e-12);
            }
        }
    }

    #[test]
    fn angle_distance_uses_hybridisation() {
        let (_, bounds) = bounds_of("CCC");
        let d13 = 0.5 * (bounds.lower(0, 2) + bounds.upper(0, 2));
        assert!((d13 - 2.482).abs() < 0.01);
    }

    #[test]
    fn aromatic_para_distance_is_fixed() {
        let (_, bounds) = bounds_of("c1ccccc1");
        let width = bounds.upper(0, 3) - bounds.lower(0, 3);
        assert!(width < 0.2);
        let mid = 0.5 * (bounds.lower(0, 3) + bounds.upper(0, 3));
        assert!((mid - 2.78).abs() < 0.05);
    }

    #[test]
    fn marked_double_bond_fixes_substituent_distance() {
        let (_, trans) = bounds_of("F/C=C/F");
        let (_, cis) = bounds_of("F/C=C\\F");
        assert!(trans.lower(0, 3) > cis.upper(0, 3));
    }

    #[test]
    fn torsion_distance_spans_cis_to_trans() {
        let t = 109.47_f64.to_radians();
        let cis = torsion_distance(1.52, 1.52, 1.52, t, t, 0.0);
        let trans = torsion_distance(1.52, 1.52, 1.52, t, t, std::f64::consts::PI);
        assert!((cis - 2.53).abs() < 0.02);
        assert!((trans - 3.86).abs() < 0.02);
    }
}
