//! Wildman-Crippen atom-contribution logP and molar refractivity.
//!
//! Each heavy atom is assigned one of the published atom classes from its
//! element, aromaticity, bond orders and neighbours; every hydrogen (explicit or
//! implicit) is classified by the atom that carries it.

use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;
use crate::core::perception::hybridization::is_carbonyl_carbon;

/// `(logP, MR)` contribution of one atom class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub log_p: f64,
    pub mr: f64,
}

const fn c(log_p: f64, mr: f64) -> Contribution {
    Contribution { log_p, mr }
}

// Carbon classes.
const C1: Contribution = c(0.1441, 2.503);
const C2: Contribution = c(0.0, 2.433);
const C3: Contribution = c(-0.2035, 2.753);
const C4: Contribution = c(-0.2051, 2.731);
const C5: Contribution = c(-0.2783, 5.007);
const C6: Contribution = c(0.1551, 3.513);
const C7: Contribution = c(0.0017, 3.888);
const C9: Contribution = c(-0.1444, 2.412);
const C18: Contribution = c(0.1581, 3.350);
const C19: Contribution = c(0.2955, 4.346);
const C20: Contribution = c(0.2713, 3.904);
const C21: Contribution = c(0.1360, 3.509);
const C22: Contribution = c(0.4619, 4.067);
const C23: Contribution = c(0.5437, 3.853);
const C24: Contribution = c(0.1893, 2.673);
const C25: Contribution = c(-0.8186, 3.135);
const C_HALIDE: Contribution = c(0.2640, 4.305);

// Hydrogen classes.
const H1: Contribution = c(0.1230, 1.057);
const H2: Contribution = c(-0.2677, 1.395);
const H3: Contribution = c(0.2142, 0.9627);
const H4: Contribution = c(0.2980, 1.805);

// Nitrogen classes.
const N1: Contribution = c(-1.0190, 2.262);
const N2: Contribution = c(-0.7096, 2.173);
const N3: Contribution = c(-0.3187, 2.827);
const N4: Contribution = c(-0.4458, 3.000);
const N_IMINE: Contribution = c(-0.5262, 3.359);
const N_NITRILE: Contribution = c(-0.1540, 3.012);
const N_AROMATIC: Contribution = c(-0.3239, 2.202);
const N_CHARGED: Contribution = c(-1.9500, 0.2604);
const N_NITRO: Contribution = c(-0.3396, 0.2604);

// Oxygen classes.
const O_AROMATIC: Contribution = c(0.1552, 1.080);
const O_ALCOHOL: Contribution = c(-0.2893, 0.8238);
const O_ETHER: Contribution = c(-0.0684, 1.280);
const O_AROMATIC_ETHER: Contribution = c(-0.4195, 1.119);
const O_CARBONYL: Contribution = c(-0.1526, 0.0);
const O_CARBONYL_AROMATIC: Contribution = c(0.1129, 0.2215);
const O_ON_AROMATIC: Contribution = c(0.1788, 3.135);
const O_CARBONYL_HETERO: Contribution = c(0.4833, 0.3890);
const O_ACID: Contribution = c(-1.3260, 0.0);
const O_ANION: Contribution = c(-1.1890, 0.0);

const F: Contribution = c(0.4202, 1.108);
const CL: Contribution = c(0.6895, 5.853);
const BR: Contribution = c(0.8456, 8.927);
const I: Contribution = c(0.8857, 14.02);
const P: Contribution = c(0.8612, 6.920);
const S_ALIPHATIC: Contribution = c(0.6482, 7.591);
const S_IONIC: Contribution = c(-0.0024, 7.365);
const S_AROMATIC: Contribution = c(0.6237, 6.691);
const OTHER: Contribution = c(-0.0025, 3.243);

/// Wildman-Crippen logP of the whole molecule.
pub fn log_p(mol: &Molecule) -> f64 {
    contributions(mol).iter().map(|c| c.log_p).sum()
}

/// Wildman-Crippen molar refractivity of the whole molecule.
pub fn molar_refractivity(mol: &Molecule) -> f64 {
    contributions(mol).iter().map(|c| c.mr).sum()
}

/// Per-atom contributions, each heavy atom including its implicit hydrogens.
/// Explicit hydrogens get their own entry.
pub fn contributions(mol: &Molecule) -> Vec<Contribution> {
    (0..mol.atom_count())
        .map(|i| {
            let atom = mol.atom(i);
            if atom.is_hydrogen() {
                let carrier = mol.neighbor_atoms(i).next();
                return carrier.map_or(H1, |n| hydrogen_class(mol, n));
            }
            let own = heavy_class(mol, i);
            let h = hydrogen_class(mol, i);
            let implicit = atom.implicit_hydrogens as f64;
            c(own.log_p + implicit * h.log_p, own.mr + implicit * h.mr)
        })
        .collect()
}

fn heavy_neighbors(mol: &Molecule, idx: usize) -> impl Iterator<Item = (usize, BondOrder)> + '_ {
    mol.neighbors(idx)
        .iter()
        .filter(|&&(n, _)| !mol.atom(n).is_hydrogen())
        .map(|&(n, b)| (n, mol.bond(b).order))
}

fn hydrogen_class(mol: &Molecule, carrier: usize) -> Contribution {
    match mol.atom(carrier).atomic_number() {
        6 => H1,
        7 => H3,
        8 => {
            let acid = heavy_neighbors(mol, carrier).any(|(n, _)| is_carbonyl_carbon(mol, n));
            if acid { H4 } else { H2 }
        }
        _ => H1,
    }
}

fn heavy_class(mol: &Molecule, idx: usize) -> Contribution {
    let atom = mol.atom(idx);
    match atom.atomic_number() {
        6 => carbon_class(mol, idx),
        7 => nitrogen_class(mol, idx),
        8 => oxygen_class(mol, idx),
        9 => F,
        15 => P,
        16 if atom.aromatic => S_AROMATIC,
        16 if atom.formal_charge != 0 => S_IONIC,
        16 => S_ALIPHATIC,
        17 => CL,
        35 => BR,
        53 => I,
        _ => OTHER,
    }
}

fn carbon_class(mol: &Molecule, idx: usize) -> Contribution {
    let atom = mol.atom(idx);
    let neighbors: Vec<(usize, BondOrder)> = heavy_neighbors(mol, idx).collect();

    if atom.aromatic {
        let aromatic_bonds = neighbors
            .iter()
            .filter(|(_, o)| *o == BondOrder::Aromatic)
            .count();
        let substituent = neighbors.iter().find(|(_, o)| *o != BondOrder::Aromatic);
        return match substituent {
            None if aromatic_bonds >= 3 => C19,
            None => C18,
            Some(&(_, BondOrder::Double)) => C25,
            Some(&(n, _)) => {
                let sub = mol.atom(n);
                match sub.atomic_number() {
                    _ if sub.aromatic => C20,
                    6 => C21,
                    7 => C22,
                    8 => C23,
                    16 => C24,
                    9 | 17 | 35 | 53 => C_HALIDE,
                    _ => C21,
                }
            }
        };
    }

    if neighbors.iter().any(|(_, o)| *o == BondOrder::Triple) {
        return C7;
    }
    let double_partner = neighbors.iter().find(|(_, o)| *o == BondOrder::Double);
    if let Some(&(n, _)) = double_partner {
        return if mol.atom(n).element.is_hetero() { C5 } else { C6 };
    }

    if let [(n, _)] = neighbors.as_slice() {
        let sub = mol.atom(*n);
        if sub.aromatic && sub.element.is_hetero() && mol.total_hydrogens(idx) == 3 {
            return C9;
        }
    }

    let hetero = neighbors
        .iter()
        .any(|&(n, _)| mol.atom(n).element.is_hetero());
    match (neighbors.len() <= 2, hetero) {
        (true, false) => C1,
        (false, false) => C2,
        (true, true) => C3,
        (false, true) => C4,
    }
}

fn nitrogen_class(mol: &Molecule, idx: usize) -> Contribution {
    let atom = mol.atom(idx);
    if atom.aromatic {
        return N_AROMATIC;
    }
    let neighbors: Vec<(usize, BondOrder)> = heavy_neighbors(mol, idx).collect();
    let bonded_oxygens = neighbors
        .iter()
        .filter(|&&(n, _)| mol.atom(n).atomic_number() == 8)
        .count();
    if atom.formal_charge > 0 && bonded_oxygens >= 2 {
        return N_NITRO;
    }
    if atom.formal_charge != 0 {
        return N_CHARGED;
    }
    if neighbors.iter().any(|(_, o)| *o == BondOrder::Triple) {
        return N_NITRILE;
    }
    if neighbors.iter().any(|(_, o)| *o == BondOrder::Double) {
        return N_IMINE;
    }
    if neighbors.iter().any(|&(n, _)| mol.atom(n).aromatic) {
        return N4;
    }
    match mol.total_hydrogens(idx) {
        2.. => N1,
        1 => N2,
        0 => N3,
    }
}

fn oxygen_class(mol: &Molecule, idx: usize) -> Contribution {
    let atom = mol.atom(idx);
    if atom.aromatic {
        return O_AROMATIC;
    }
    let neighbors: Vec<(usize, BondOrder)> = heavy_neighbors(mol, idx).collect();
    if atom.formal_charge < 0 {
        let carboxylate = neighbors.iter().any(|&(n, _)| is_carbonyl_carbon(mol, n));
        return if carboxylate { O_ACID } else { O_ANION };
    }
    if let Some(&(n, _)) = neighbors.iter().find(|(_, o)| *o == BondOrder::Double) {
        let partner = mol.atom(n);
        if partner.aromatic {
            return O_ON_AROMATIC;
        }
        let on_hetero = partner.element.is_hetero();
        let next_to_aromatic = heavy_neighbors(mol, n).any(|(m, _)| mol.atom(m).aromatic);
        return match (on_hetero, next_to_aromatic) {
            (true, _) => O_CARBONYL_HETERO,
            (false, true) => O_CARBONYL_AROMATIC,
            (false, false) => O_CARBONYL,
        };
    }
    if mol.total_hydrogens(idx) > 0 {
        return O_ALCOHOL;
    }
    if neighbors.iter().any(|&(n, _)| mol.atom(n).aromatic) {
        O_AROMATIC_ETHER
    } else {
        O_ETHER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::perception::add_hydrogens;
    use crate::core::smiles;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn ethanol_matches_reference_values() {
        let mol = smiles::parse("CCO").unwrap();
        assert!(close(log_p(&mol), -0.0014));
        assert!(close(molar_refractivity(&mol), 12.7598));
    }

    #[test]
    fn benzene_matches_reference_values() {
        let mol = smiles::parse("c1ccccc1").unwrap();
        assert!(close(log_p(&mol), 1.6866));
        assert!(close(molar_refractivity(&mol), 26.442));
    }

    #[test]
    fn aromatic_nitrogen_matches_reference_values() {
        let pyridine = smiles::parse("c1ccncc1").unwrap();
        assert!(close(log_p(&pyridine), 1.0816));
        let caffeine = smiles::parse("Cn1cnc2c1c(=O)n(C)c(=O)n2C").unwrap();
        assert!(close(log_p(&caffeine), -1.0293));
    }

    #[test]
    fn explicit_hydrogens_do_not_change_totals() {
        let mol = smiles::parse("CC(=O)Nc1ccc(O)cc1").unwrap();
        let with_h = add_hydrogens(&mol);
        assert!(close(log_p(&mol), log_p(&with_h)));
        assert!(close(molar_refractivity(&mol), molar_refractivity(&with_h)));
    }

    #[test]
    fn polar_groups_lower_log_p() {
        let hexane = log_p(&smiles::parse("CCCCCC").unwrap());
        let hexanol = log_p(&smiles::parse("CCCCCCO").unwrap());
        let glycine = log_p(&smiles::parse("[NH3+]CC(=O)[O-]").unwrap());
        assert!(hexane > hexanol);
        assert!(hexanol > glycine);
    }
}
