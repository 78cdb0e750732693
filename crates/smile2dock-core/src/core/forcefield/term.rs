use serde::Serialize;
use std::ops::{Add, AddAssign};

/// Energy split by term, in kcal/mol.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EnergyTerms {
    pub stretch: f64,
    pub bend: f64,
    pub torsion: f64,
    pub out_of_plane: f64,
    pub vdw: f64,
    pub electrostatic: f64,
}

impl EnergyTerms {
    #[inline]
    pub fn bonded(&self) -> f64 {
        self.stretch + self.bend + self.torsion + self.out_of_plane
    }

    #[inline]
    pub fn non_bonded(&self) -> f64 {
        self.vdw + self.electrostatic
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.bonded() + self.non_bonded()
    }
}

impl Add for EnergyTerms {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            stretch: self.stretch + rhs.stretch,
            bend: self.bend + rhs.bend,
            torsion: self.torsion + rhs.torsion,
            out_of_plane: self.out_of_plane + rhs.out_of_plane,
            vdw: self.vdw + rhs.vdw,
            electrostatic: self.electrostatic + rhs.electrostatic,
        }
    }
}

impl AddAssign for EnergyTerms {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(values: [f64; 6]) -> EnergyTerms {
        let [stretch, bend, torsion, out_of_plane, vdw, electrostatic] = values;
        EnergyTerms {
            stretch,
            bend,
            torsion,
            out_of_plane,
            vdw,
            electrostatic,
        }
    }

    #[test]
    fn total_is_bonded_plus_non_bonded() {
        let t = terms([1.0, 2.0, 3.0, 4.0, -5.0, 0.5]);
        assert_eq!(t.bonded(), 10.0);
        assert_eq!(t.non_bonded(), -4.5);
        assert_eq!(t.total(), 5.5);
    }

    #[test]
    fn add_assign_accumulates_each_field() {
        let mut a = terms([1.0; 6]);
        a += terms([0.5, 0.0, -1.0, 2.0, 0.0, 1.0]);
        assert_eq!(a, terms([1.5, 1.0, 0.0, 3.0, 1.0, 2.0]));
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(EnergyTerms::default().total(), 0.0);
    }
}
