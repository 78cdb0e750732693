use crate::core::models::molecule::Molecule;
use crate::core::perception::hybridization::{Hybridization, hybridization};

/// Electronegativity polynomial `chi(q) = a + b q + c q^2`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ElectroParams {
    a: f64,
    b: f64,
    c: f64,
}

impl ElectroParams {
    const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    #[inline]
    fn chi(&self, q: f64) -> f64 {
        self.a + self.b * q + self.c * q * q
    }

    /// Electronegativity of the cation, used to normalise the transfer.
    #[inline]
    fn cation(&self, is_hydrogen: bool) -> f64 {
        if is_hydrogen {
            HYDROGEN_CATION_CHI
        } else {
            self.a + self.b + self.c
        }
    }
}

const HYDROGEN: ElectroParams = ElectroParams::new(7.17, 6.24, -0.56);
const HYDROGEN_CATION_CHI: f64 = 20.02;

pub const GASTEIGER_ITERATIONS: usize = 12;

fn electro_params(atomic_number: u8, hyb: Hybridization) -> ElectroParams {
    use Hybridization::*;
    match (atomic_number, hyb) {
        (1, _) => HYDROGEN,
        (5, _) => ElectroParams::new(5.98, 6.82, 1.605),
        (6, Sp) => ElectroParams::new(10.39, 9.45, 0.73),
        (6, Sp2) => ElectroParams::new(8.79, 9.32, 1.51),
        (6, _) => ElectroParams::new(7.98, 9.18, 1.88),
        (7, Sp) => ElectroParams::new(15.68, 11.70, -0.27),
        (7, Sp2) => ElectroParams::new(12.87, 11.15, 0.85),
        (7, _) => ElectroParams::new(11.54, 10.82, 1.36),
        (8, Sp2) => ElectroParams::new(17.07, 13.79, 0.47),
        (8, _) => ElectroParams::new(14.18, 12.92, 1.39),
        (9, _) => ElectroParams::new(14.66, 13.85, 2.31),
        (14, _) => ElectroParams::new(7.30, 6.567, 0.657),
        (15, _) => ElectroParams::new(8.90, 8.24, 0.96),
        (16, Sp2) => ElectroParams::new(10.88, 9.485, 1.325),
        (16, _) => ElectroParams::new(10.14, 9.13, 1.38),
        (17, _) => ElectroParams::new(11.00, 9.69, 1.35),
        (34, _) => ElectroParams::new(10.00, 8.80, 1.20),
        (35, _) => ElectroParams::new(10.08, 8.47, 1.16),
        (53, _) => ElectroParams::new(9.90, 7.96, 0.96),
        _ => ElectroParams::new(7.98, 9.18, 1.88),
    }
}

/// Gasteiger-Marsili partial charges.
///
/// Formal charges seed the iteration. Implicit hydrogens take part as virtual
/// atoms and their charge is folded back into the heavy atom carrying them, so
/// the result always sums to the net formal charge.
pub fn gasteiger_charges(mol: &Molecule) -> Vec<f64> {
    let n = mol.atom_count();
    if n == 0 {
        return Vec::new();
    }

    let mut params: Vec<ElectroParams> = (0..n)
        .map(|i| electro_params(mol.atom(i).atomic_number(), hybridization(mol, i)))
        .collect();
    let mut is_h: Vec<bool> = mol.atoms().iter().map(|a| a.is_hydrogen()).collect();
    let mut charges: Vec<f64> = mol.atoms().iter().map(|a| a.formal_charge as f64).collect();
    let mut edges: Vec<(usize, usize)> = mol.bonds().iter().map(|b| (b.begin, b.end)).collect();
    let mut owner: Vec<usize> = (0..n).collect();

    for i in 0..n {
        for _ in 0..mol.atom(i).implicit_hydrogens {
            let v = params.len();
            params.push(HYDROGEN);
            is_h.push(true);
            charges.push(0.0);
            edges.push((i, v));
            owner.push(i);
        }
    }

    let mut damping = 1.0;
    for _ in 0..GASTEIGER_ITERATIONS {
        damping *= 0.5;
        let chi: Vec<f64> = params
            .iter()
            .zip(&charges)
            .map(|(p, &q)| p.chi(q))
            .collect();
        let mut delta = vec![0.0; params.len()];
        for &(a, b) in &edges {
            let (donor, acceptor) = if chi[a] < chi[b] { (a, b) } else { (b, a) };
            let scale = params[donor].cation(is_h[donor]);
            if scale.abs() < 1e-12 {
                continue;
            }
            let transfer = damping * (chi[acceptor] - chi[donor]) / scale;
            delta[donor] += transfer;
            delta[acceptor] -= transfer;
        }
        for (q, d) in charges.iter_mut().zip(&delta) {
            *q += d;
        }
    }

    let mut result = vec![0.0; n];
    for (v, &q) in charges.iter().enumerate() {
        result[owner[v]] += q;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::perception::add_hydrogens;
    use crate::core::smiles;

    #[test]
    fn neutral_molecule_sums_to_zero() {
        let mol = add_hydrogens(&smiles::parse("CCO").unwrap());
        let charges = gasteiger_charges(&mol);
        assert_eq!(charges.len(), mol.atom_count());
        assert!(charges.iter().sum::<f64>().abs() < 1e-9);
    }

    #[test]
    fn hydroxyl_oxygen_is_negative_and_its_hydrogen_positive() {
        let mol = add_hydrogens(&smiles::parse("CO").unwrap());
        let charges = gasteiger_charges(&mol);
        assert!(charges[1] < -0.3);
        let hydroxyl_h = mol
            .neighbor_atoms(1)
            .find(|&n| mol.atom(n).is_hydrogen())
            .unwrap();
        assert!(charges[hydroxyl_h] > 0.15);
    }

    #[test]
    fn ion_keeps_its_net_charge() {
        let mol = smiles::parse("CC(=O)[O-]").unwrap();
        let charges = gasteiger_charges(&mol);
        assert!((charges.iter().sum::<f64>() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn implicit_and_explicit_hydrogens_agree_on_heavy_atoms() {
        let implicit = smiles::parse("CCN").unwrap();
        let explicit = add_hydrogens(&implicit);
        let qi = gasteiger_charges(&implicit);
        let qe = gasteiger_charges(&explicit);
        for i in 0..3 {
            let folded: f64 = qe[i]
                + explicit
                    .neighbor_atoms(i)
                    .filter(|&n| explicit.atom(n).is_hydrogen())
                    .map(|n| qe[n])
                    .sum::<f64>();
            assert!((qi[i] - folded).abs() < 1e-9);
        }
    }
}
