use nalgebra::{Matrix3, Point3, Rotation3, Unit, Vector3};

pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_degrees.to_radians())
}

/// Angle a-b-c in radians.
pub fn angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ba = a - b;
    let bc = c - b;
    let denom = ba.norm() * bc.norm();
    if denom < 1e-12 {
        return 0.0;
    }
    (ba.dot(&bc) / denom).clamp(-1.0, 1.0).acos()
}

/// Signed dihedral a-b-c-d in radians, in (-pi, pi].
pub fn dihedral(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    let b1 = b - a;
    let b2 = c - b;
    let b3 = d - c;
    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let y = b2.norm() * b1.dot(&n2);
    let x = n1.dot(&n2);
    y.atan2(x)
}

/// Triple product `(a - centre) . ((b - centre) x (c - centre))`.
///
/// Positive when a, b and c wind counterclockwise seen from a, which is the
/// SMILES `@` arrangement for the neighbour order (a, b, c, *).
pub fn signed_volume(
    centre: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> f64 {
    let va = a - centre;
    let vb = b - centre;
    let vc = c - centre;
    va.dot(&vb.cross(&vc))
}

pub fn centroid(coords: &[Point3<f64>]) -> Option<Point3<f64>> {
    if coords.is_empty() {
        return None;
    }
    let sum = coords
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / coords.len() as f64))
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

/// RMSD after optimal superposition (Kabsch). Reflections are not allowed, so
/// enantiomeric conformers keep a non-zero distance.
pub fn aligned_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let c1 = centroid(coords1)?;
    let c2 = centroid(coords2)?;
    let mut h = Matrix3::zeros();
    for (p, q) in coords1.iter().zip(coords2) {
        h += (p - c1) * (q - c2).transpose();
    }
    let svd = h.svd(true, true);
    let (u, v_t) = (svd.u?, svd.v_t?);
    let mut d = Matrix3::identity();
    if (v_t.transpose() * u.transpose()).determinant() < 0.0 {
        d[(2, 2)] = -1.0;
    }
    let rotation = v_t.transpose() * d * u.transpose();
    let sum: f64 = coords1
        .iter()
        .zip(coords2)
        .map(|(p, q)| ((rotation * (p - c1)) - (q - c2)).norm_squared())
        .sum();
    Some((sum / coords1.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
    }

    #[test]
    fn angle_of_right_angle_is_half_pi() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::origin();
        let c = Point3::new(0.0, 1.0, 0.0);
        assert_close(angle(&a, &b, &c), PI / 2.0);
    }

    #[test]
    fn dihedral_sign_follows_rotation_direction() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(0.0, 0.0, 1.0);
        let d_pos = Point3::new(0.0, 1.0, 1.0);
        let d_neg = Point3::new(0.0, -1.0, 1.0);
        assert_close(dihedral(&a, &b, &c, &d_pos), PI / 2.0);
        assert_close(dihedral(&a, &b, &c, &d_neg), -PI / 2.0);
        let d_trans = Point3::new(-1.0, 0.0, 1.0);
        assert_close(dihedral(&a, &b, &c, &d_trans).abs(), PI);
    }

    #[test]
    fn signed_volume_is_positive_for_counterclockwise_view() {
        let h = -1.0 / 3.0;
        let centre = Point3::origin();
        let a = Point3::new(0.0, 0.0, 1.0);
        let b = Point3::new(1.0, 0.0, h);
        let c = Point3::new(-0.5, 0.866, h);
        assert!(signed_volume(&centre, &a, &b, &c) > 0.0);
        assert!(signed_volume(&centre, &a, &c, &b) < 0.0);
    }

    #[test]
    fn centroid_of_empty_set_is_none() {
        assert!(centroid(&[]).is_none());
        let c = centroid(&[Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0)]).unwrap();
        assert_eq!(c, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn rmsd_requires_matching_lengths() {
        let a = [Point3::origin()];
        let b = [Point3::origin(), Point3::origin()];
        assert!(calculate_rmsd(&a, &b).is_none());
        assert!(aligned_rmsd(&a, &b).is_none());
    }

    #[test]
    fn aligned_rmsd_ignores_rigid_motion() {
        let coords = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, 0.0, 0.0),
            Point3::new(1.5, 1.2, 0.3),
            Point3::new(-0.4, 0.8, 1.1),
        ];
        let rot = rotation_from_axis_angle(&Vector3::new(1.0, 2.0, 0.5), 73.0);
        let moved: Vec<_> = coords
            .iter()
            .map(|p| rot * p + Vector3::new(3.0, -2.0, 5.0))
            .collect();
        assert!(calculate_rmsd(&coords, &moved).unwrap() > 1.0);
        assert!(aligned_rmsd(&coords, &moved).unwrap() < 1e-6);
    }
}
