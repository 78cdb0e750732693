use phf::{Map, phf_map};
use std::fmt;

/// Static data for one chemical element.
///
/// Masses are in daltons and radii in Angstroms. `valences` lists the normal
/// valences of the neutral element in increasing order; an empty list means the
/// element never receives implicit hydrogens.
#[derive(Debug, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    pub atomic_number: u8,
    pub period: u8,
    /// Number of valence-shell electrons of the neutral atom.
    pub outer_electrons: u8,
    pub average_mass: f64,
    /// Mass of the most abundant isotope.
    pub monoisotopic_mass: f64,
    pub most_abundant_isotope: u16,
    pub valences: &'static [u8],
    pub covalent_radius: f64,
    pub vdw_radius: f64,
}

macro_rules! element {
    ($sym:literal, $z:literal, $period:literal, $outer:literal, $avg:literal, $mono:literal, $iso:literal, [$($v:literal),*], $cov:literal, $vdw:literal) => {
        Element {
            symbol: $sym,
            atomic_number: $z,
            period: $period,
            outer_electrons: $outer,
            average_mass: $avg,
            monoisotopic_mass: $mono,
            most_abundant_isotope: $iso,
            valences: &[$($v),*],
            covalent_radius: $cov,
            vdw_radius: $vdw,
        }
    };
}

static ELEMENTS: [Element; 31] = [
    element!("H", 1, 1, 1, 1.008, 1.00782503207, 1, [1], 0.31, 1.10),
    element!("He", 2, 1, 2, 4.003, 4.00260325, 4, [0], 0.28, 1.40),
    element!("Li", 3, 2, 1, 6.941, 7.01600455, 7, [1], 1.28, 1.82),
    element!("Be", 4, 2, 2, 9.012, 9.0121822, 9, [2], 0.96, 1.53),
    element!("B", 5, 2, 3, 10.811, 11.0093054, 11, [3], 0.84, 1.92),
    element!("C", 6, 2, 4, 12.011, 12.0, 12, [4], 0.76, 1.70),
    element!("N", 7, 2, 5, 14.007, 14.0030740048, 14, [3, 5], 0.71, 1.55),
    element!("O", 8, 2, 6, 15.999, 15.99491461956, 16, [2], 0.66, 1.52),
    element!("F", 9, 2, 7, 18.998, 18.99840322, 19, [1], 0.57, 1.47),
    element!("Ne", 10, 2, 8, 20.180, 19.9924401754, 20, [0], 0.58, 1.54),
    element!("Na", 11, 3, 1, 22.990, 22.9897692809, 23, [1], 1.66, 2.27),
    element!("Mg", 12, 3, 2, 24.305, 23.985041700, 24, [2], 1.41, 1.73),
    element!("Al", 13, 3, 3, 26.982, 26.98153863, 27, [3], 1.21, 1.84),
    element!("Si", 14, 3, 4, 28.086, 27.9769265325, 28, [4], 1.11, 2.10),
    element!("P", 15, 3, 5, 30.974, 30.97376163, 31, [3, 5], 1.07, 1.80),
    element!("S", 16, 3, 6, 32.065, 31.97207100, 32, [2, 4, 6], 1.05, 1.80),
    element!("Cl", 17, 3, 7, 35.453, 34.96885268, 35, [1], 1.02, 1.75),
    element!("Ar", 18, 3, 8, 39.948, 39.9623831225, 40, [0], 1.06, 1.88),
    element!("K", 19, 4, 1, 39.098, 38.96370668, 39, [1], 2.03, 2.75),
    element!("Ca", 20, 4, 2, 40.078, 39.96259098, 40, [2], 1.76, 2.31),
    element!("Mn", 25, 4, 2, 54.938, 54.9380451, 55, [], 1.39, 2.00),
    element!("Fe", 26, 4, 2, 55.845, 55.9349375, 56, [], 1.32, 2.00),
    element!("Co", 27, 4, 2, 58.933, 58.9331950, 59, [], 1.26, 2.00),
    element!("Ni", 28, 4, 2, 58.693, 57.9353429, 58, [], 1.24, 1.63),
    element!("Cu", 29, 4, 1, 63.546, 62.9295975, 63, [], 1.32, 1.40),
    element!("Zn", 30, 4, 2, 65.38, 63.9291422, 64, [], 1.22, 1.39),
    element!("As", 33, 4, 5, 74.922, 74.9215965, 75, [3, 5], 1.19, 1.85),
    element!("Se", 34, 4, 6, 78.96, 79.9165213, 80, [2, 4, 6], 1.20, 1.90),
    element!("Br", 35, 4, 7, 79.904, 78.9183371, 79, [1], 1.20, 1.85),
    element!("Sn", 50, 5, 4, 118.71, 119.9021947, 120, [2, 4], 1.39, 2.17),
    element!("I", 53, 5, 7, 126.904, 126.904473, 127, [1, 3, 5], 1.39, 1.98),
];

static BY_SYMBOL: Map<&'static str, usize> = phf_map! {
    "H" => 0, "He" => 1, "Li" => 2, "Be" => 3, "B" => 4, "C" => 5, "N" => 6, "O" => 7,
    "F" => 8, "Ne" => 9, "Na" => 10, "Mg" => 11, "Al" => 12, "Si" => 13, "P" => 14,
    "S" => 15, "Cl" => 16, "Ar" => 17, "K" => 18, "Ca" => 19, "Mn" => 20, "Fe" => 21,
    "Co" => 22, "Ni" => 23, "Cu" => 24, "Zn" => 25, "As" => 26, "Se" => 27, "Br" => 28,
    "Sn" => 29, "I" => 30,
};

/// Exact masses for isotopes that show up in labelled SMILES.
static ISOTOPE_MASSES: Map<&'static str, f64> = phf_map! {
    "2H" => 2.01410177812,
    "3H" => 3.0160492779,
    "11C" => 11.0114336,
    "13C" => 13.00335483507,
    "14C" => 14.0032419884,
    "15N" => 15.0001088982,
    "17O" => 16.9991317565,
    "18O" => 17.9991596129,
    "18F" => 18.0009380,
    "32P" => 31.97390727,
    "33S" => 32.97145876,
    "34S" => 33.96786690,
    "37Cl" => 36.96590259,
    "81Br" => 80.9162906,
    "123I" => 122.905589,
    "125I" => 124.9046302,
    "131I" => 130.9061246,
};

impl Element {
    pub fn by_symbol(symbol: &str) -> Option<&'static Element> {
        BY_SYMBOL.get(symbol).map(|&idx| &ELEMENTS[idx])
    }

    pub fn by_number(atomic_number: u8) -> Option<&'static Element> {
        ELEMENTS.iter().find(|e| e.atomic_number == atomic_number)
    }

    pub fn hydrogen() -> &'static Element {
        &ELEMENTS[0]
    }

    pub fn carbon() -> &'static Element {
        &ELEMENTS[5]
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.atomic_number == 1
    }

    #[inline]
    pub fn is_carbon(&self) -> bool {
        self.atomic_number == 6
    }

    /// Anything other than carbon and hydrogen.
    #[inline]
    pub fn is_hetero(&self) -> bool {
        !matches!(self.atomic_number, 1 | 6)
    }

    #[inline]
    pub fn is_halogen(&self) -> bool {
        matches!(self.atomic_number, 9 | 17 | 35 | 53)
    }

    /// Exact mass of a given isotope, falling back to the mass number itself
    /// when the isotope is not tabulated.
    pub fn isotope_mass(&self, isotope: u16) -> f64 {
        if isotope == self.most_abundant_isotope {
            return self.monoisotopic_mass;
        }
        let key = format!("{}{}", isotope, self.symbol);
        ISOTOPE_MASSES
            .get(key.as_str())
            .copied()
            .unwrap_or(isotope as f64)
    }

    /// Allowed valences once a formal charge is applied.
    ///
    /// A charged atom takes the valences of the neutral element with the same
    /// number of valence electrons: N+ behaves like C, O- like F, C- like N.
    pub fn valences_with_charge(&self, charge: i8) -> Vec<u8> {
        if charge == 0 {
            return self.valences.to_vec();
        }
        if self.valences.is_empty() {
            return Vec::new();
        }
        let electrons = self.outer_electrons as i16 - charge as i16;
        let expanded = self.period > 2;
        match electrons {
            1 | 7 => vec![1],
            2 | 6 if expanded => vec![2, 4, 6],
            2 | 6 => vec![2],
            3 | 5 if expanded => vec![3, 5],
            3 | 5 => vec![3],
            4 => vec![4],
            _ => vec![0],
        }
    }

    /// Number of hydrogens needed to reach the lowest allowed valence that is
    /// not below `bond_order_sum`. Zero when every valence is already exceeded.
    pub fn implicit_hydrogens(&self, charge: i8, bond_order_sum: u8) -> u8 {
        self.valences_with_charge(charge)
            .into_iter()
            .find(|&v| v >= bond_order_sum)
            .map(|v| v - bond_order_sum)
            .unwrap_or(0)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_symbol_and_number_agree() {
        for sym in ["H", "C", "N", "O", "S", "Cl", "Br", "I", "Zn"] {
            let by_sym = Element::by_symbol(sym).unwrap();
            let by_num = Element::by_number(by_sym.atomic_number).unwrap();
            assert_eq!(by_sym.symbol, by_num.symbol);
        }
        assert!(Element::by_symbol("Xx").is_none());
        assert!(Element::by_number(0).is_none());
    }

    #[test]
    fn symbol_table_indices_match_element_entries() {
        for (sym, &idx) in BY_SYMBOL.entries() {
            assert_eq!(ELEMENTS[idx].symbol, *sym);
        }
    }

    #[test]
    fn implicit_hydrogens_pick_lowest_fitting_valence() {
        let n = Element::by_symbol("N").unwrap();
        assert_eq!(n.implicit_hydrogens(0, 1), 2);
        assert_eq!(n.implicit_hydrogens(0, 3), 0);
        let s = Element::by_symbol("S").unwrap();
        assert_eq!(s.implicit_hydrogens(0, 1), 1);
        assert_eq!(s.implicit_hydrogens(0, 3), 1);
        assert_eq!(s.implicit_hydrogens(0, 7), 0);
    }

    #[test]
    fn charged_atoms_use_isoelectronic_valences() {
        let n = Element::by_symbol("N").unwrap();
        assert_eq!(n.implicit_hydrogens(1, 1), 3);
        let o = Element::by_symbol("O").unwrap();
        assert_eq!(o.implicit_hydrogens(-1, 1), 0);
        assert_eq!(o.implicit_hydrogens(-1, 0), 1);
        let c = Element::by_symbol("C").unwrap();
        assert_eq!(c.implicit_hydrogens(-1, 1), 2);
    }

    #[test]
    fn isotope_mass_uses_table_then_mass_number() {
        let h = Element::hydrogen();
        assert!((h.isotope_mass(2) - 2.014101778).abs() < 1e-6);
        assert_eq!(h.isotope_mass(1), h.monoisotopic_mass);
        let c = Element::carbon();
        assert_eq!(c.isotope_mass(99), 99.0);
    }
}
