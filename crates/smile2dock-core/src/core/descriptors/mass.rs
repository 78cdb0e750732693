use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;

/// Monoisotopic mass: every atom at its most abundant isotope unless labelled,
/// implicit hydrogens included.
pub fn exact_mass(mol: &Molecule) -> f64 {
    let hydrogen = Element::hydrogen().monoisotopic_mass;
    mol.atoms()
        .iter()
        .map(|a| a.exact_mass() + a.implicit_hydrogens as f64 * hydrogen)
        .sum()
}

/// Average molecular weight from standard atomic weights.
pub fn average_mass(mol: &Molecule) -> f64 {
    let hydrogen = Element::hydrogen().average_mass;
    mol.atoms()
        .iter()
        .map(|a| a.element.average_mass + a.implicit_hydrogens as f64 * hydrogen)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::perception::add_hydrogens;
    use crate::core::smiles;

    #[test]
    fn ethanol_exact_mass() {
        let mol = smiles::parse("CCO").unwrap();
        assert!((exact_mass(&mol) - 46.0419).abs() < 1e-3);
    }

    #[test]
    fn explicit_hydrogens_give_the_same_mass() {
        let mol = smiles::parse("c1ccccc1O").unwrap();
        let with_h = add_hydrogens(&mol);
        assert!((exact_mass(&mol) - exact_mass(&with_h)).abs() < 1e-9);
        assert!((average_mass(&mol) - 94.11).abs() < 0.01);
    }

    #[test]
    fn isotopes_shift_the_exact_mass() {
        let light = exact_mass(&smiles::parse("CO").unwrap());
        let heavy = exact_mass(&smiles::parse("[13CH3]O").unwrap());
        assert!((heavy - light - 1.00335).abs() < 1e-3);
    }
}
