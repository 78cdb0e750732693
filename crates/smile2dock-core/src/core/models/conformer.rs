use crate::core::utils::geometry;
use nalgebra::Point3;

/// One 3D coordinate set for a molecule, indexed like its atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Conformer {
    pub positions: Vec<Point3<f64>>,
    /// Force-field energy in kcal/mol once the conformer has been minimized.
    pub energy: Option<f64>,
}

impl Conformer {
    pub fn new(positions: Vec<Point3<f64>>) -> Self {
        Self {
            positions,
            energy: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn position(&self, idx: usize) -> &Point3<f64> {
        &self.positions[idx]
    }

    pub fn distance(&self, a: usize, b: usize) -> f64 {
        (self.positions[a] - self.positions[b]).norm()
    }

    /// Angle a-b-c in degrees.
    pub fn angle(&self, a: usize, b: usize, c: usize) -> f64 {
        geometry::angle(&self.positions[a], &self.positions[b], &self.positions[c]).to_degrees()
    }

    /// Dihedral a-b-c-d in degrees.
    pub fn dihedral(&self, a: usize, b: usize, c: usize, d: usize) -> f64 {
        geometry::dihedral(
            &self.positions[a],
            &self.positions[b],
            &self.positions[c],
            &self.positions[d],
        )
        .to_degrees()
    }

    pub fn centroid(&self) -> Option<Point3<f64>> {
        geometry::centroid(&self.positions)
    }

    /// RMSD to another conformer after optimal superposition.
    pub fn rmsd(&self, other: &Conformer) -> Option<f64> {
        geometry::aligned_rmsd(&self.positions, &other.positions)
    }

    /// Translates the coordinates so the centroid sits at the origin.
    pub fn center(&mut self) {
        if let Some(c) = self.centroid() {
            for p in &mut self.positions {
                *p -= c.coords;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Conformer {
        Conformer::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.9572, 0.0, 0.0),
            Point3::new(-0.239987, 0.926627, 0.0),
        ])
    }

    #[test]
    fn measures_water_geometry() {
        let conf = water();
        assert!((conf.distance(0, 1) - 0.9572).abs() < 1e-6);
        assert!((conf.distance(0, 2) - 0.9572).abs() < 1e-4);
        assert!((conf.angle(1, 0, 2) - 104.52).abs() < 0.01);
    }

    #[test]
    fn center_moves_centroid_to_origin() {
        let mut conf = water();
        conf.center();
        let c = conf.centroid().unwrap();
        assert!(c.coords.norm() < 1e-12);
    }

    #[test]
    fn rmsd_to_self_is_zero() {
        let conf = water();
        assert!(conf.rmsd(&conf).unwrap() < 1e-9);
        assert_eq!(conf.energy, None);
    }
}
