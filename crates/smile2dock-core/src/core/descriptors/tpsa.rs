use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;
use crate::core::perception::rings::RingInfo;

/// Bonding environment of a polar atom, counted over heavy neighbours only.
#[derive(Debug, Default, Clone, Copy)]
struct Environment {
    single: u8,
    double: u8,
    triple: u8,
    aromatic: u8,
    hydrogens: usize,
    charge: i8,
    in_three_ring: bool,
}

impl Environment {
    fn of(mol: &Molecule, rings: &RingInfo, idx: usize) -> Self {
        let mut env = Environment {
            hydrogens: mol.total_hydrogens(idx),
            charge: mol.atom(idx).formal_charge,
            in_three_ring: rings.is_atom_in_ring_of_size(idx, 3),
            ..Default::default()
        };
        for &(n, b) in mol.neighbors(idx) {
            if mol.atom(n).is_hydrogen() {
                continue;
            }
            match mol.bond(b).order {
                BondOrder::Single => env.single += 1,
                BondOrder::Double => env.double += 1,
                BondOrder::Triple => env.triple += 1,
                BondOrder::Aromatic => env.aromatic += 1,
            }
        }
        env
    }

    fn heavy_neighbors(&self) -> u8 {
        self.single + self.double + self.triple + self.aromatic
    }
}

/// Topological polar surface area (Ertl, Rohde and Selzer) from nitrogen and
/// oxygen fragment contributions.
pub fn tpsa(mol: &Molecule) -> f64 {
    let rings = RingInfo::perceive(mol);
    (0..mol.atom_count())
        .filter_map(|i| match mol.atom(i).atomic_number() {
            7 => Some(nitrogen(&Environment::of(mol, &rings, i))),
            8 => Some(oxygen(&Environment::of(mol, &rings, i))),
            _ => None,
        })
        .fold(0.0, |total, c| total + c)
}

fn nitrogen(e: &Environment) -> f64 {
    let h = e.hydrogens;
    match (e.charge, e.single, e.double, e.triple, e.aromatic, h) {
        (0, 3, 0, 0, 0, 0) if e.in_three_ring => 3.01,
        (0, 3, 0, 0, 0, 0) => 3.24,
        (0, 1, 1, 0, 0, 0) => 12.36,
        (0, 0, 0, 1, 0, 0) => 23.79,
        (0, 1, 2, 0, 0, 0) => 11.68,
        (0, 0, 1, 1, 0, 0) => 13.60,
        (0, 2, 0, 0, 0, 1) if e.in_three_ring => 21.94,
        (0, 2, 0, 0, 0, 1) => 12.03,
        (0, 0, 1, 0, 0, 1) => 23.85,
        (0, 1, 0, 0, 0, 2) => 26.02,
        (0, 0, 0, 0, 2, 0) => 12.89,
        (0, 0, 0, 0, 3, 0) => 4.41,
        (0, 1, 0, 0, 2, 0) => 4.93,
        (0, 0, 1, 0, 2, 0) => 8.39,
        (0, 0, 0, 0, 2, 1) => 15.79,
        (1, 4, 0, 0, 0, 0) => 0.0,
        (1, 2, 1, 0, 0, 0) => 3.01,
        (1, 1, 0, 1, 0, 0) => 4.36,
        (1, 3, 0, 0, 0, 1) => 4.44,
        (1, 1, 1, 0, 0, 1) => 13.97,
        (1, 2, 0, 0, 0, 2) => 16.61,
        (1, 0, 1, 0, 0, 2) => 25.59,
        (1, 1, 0, 0, 0, 3) => 27.64,
        (1, 0, 0, 0, 3, 0) => 4.10,
        (1, 1, 0, 0, 2, 0) => 3.88,
        (1, 0, 0, 0, 2, 1) => 14.14,
        _ => fallback(30.5, 8.2, e),
    }
}

fn oxygen(e: &Environment) -> f64 {
    match (e.charge, e.single, e.double, e.aromatic, e.hydrogens) {
        (0, 2, 0, 0, 0) if e.in_three_ring => 12.53,
        (0, 2, 0, 0, 0) => 9.23,
        (0, 0, 1, 0, 0) => 17.07,
        (0, 1, 0, 0, 1) => 20.23,
        (-1, 1, 0, 0, 0) => 23.06,
        (0, 0, 0, 2, 0) => 13.14,
        _ => fallback(28.5, 8.6, e),
    }
}

/// Estimate for environments the fragment table does not cover.
fn fallback(base: f64, per_neighbor: f64, e: &Environment) -> f64 {
    let area = base - per_neighbor * e.heavy_neighbors() as f64 + 1.5 * e.hydrogens as f64;
    area.max(0.0)
}
