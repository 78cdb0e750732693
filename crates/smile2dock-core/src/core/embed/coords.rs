use super::bounds::BoundsMatrix;
use super::stereo::ChiralConstraint;
use crate::core::utils::optimize::Objective;
use nalgebra::{DMatrix, Point3, SymmetricEigen};
use rand::Rng;

/// Random displacement added to every coordinate after the eigenvector
/// projection, so flat starting points do not pin the refinement.
const JITTER: f64 = 0.05;

/// Draws one distance per pair uniformly inside its bounds.
pub fn sample_distances(bounds: &BoundsMatrix, rng: &mut impl Rng) -> DMatrix<f64> {
    let n = bounds.len();
    let mut dist = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let lo = bounds.lower(i, j);
            let hi = bounds.upper(i, j);
            let d = if hi > lo { rng.gen_range(lo..hi) } else { lo };
            dist[(i, j)] = d;
            dist[(j, i)] = d;
        }
    }
    dist
}

/// Coordinates whose inter-atomic distances approximate `dist`.
///
/// Builds the metric matrix relative to the centroid and projects onto the
/// eigenvectors of its three largest eigenvalues. Returns `None` when the
/// matrix has no positive eigenvalue.
pub fn coordinates_from_distances(
    dist: &DMatrix<f64>,
    rng: &mut impl Rng,
) -> Option<Vec<Point3<f64>>> {
    let n = dist.nrows();
    if n == 0 {
        return Some(Vec::new());
    }
    let nf = n as f64;
    let sq = dist.map(|d| d * d);
    let total: f64 = sq.iter().sum::<f64>() / (2.0 * nf * nf);
    let to_centre: Vec<f64> = (0..n)
        .map(|i| sq.row(i).sum() / nf - total)
        .collect();

    let metric = DMatrix::from_fn(n, n, |i, j| 0.5 * (to_centre[i] + to_centre[j] - sq[(i, j)]));
    let eigen = SymmetricEigen::new(metric);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));
    if eigen.eigenvalues[order[0]] <= 0.0 {
        return None;
    }

    let mut coords = vec![Point3::origin(); n];
    for (axis, &k) in order.iter().take(3).enumerate() {
        let scale = eigen.eigenvalues[k].max(0.0).sqrt();
        for (i, p) in coords.iter_mut().enumerate() {
            p[axis] = scale * eigen.eigenvectors[(i, k)];
        }
    }
    for p in &mut coords {
        for axis in 0..3 {
            p[axis] += rng.gen_range(-JITTER..JITTER);
        }
    }
    Some(coords)
}

pub fn flatten(positions: &[Point3<f64>]) -> Vec<f64> {
    positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
}

pub fn unflatten(x: &[f64]) -> Vec<Point3<f64>> {
    x.chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect()
}

/// Signed volume each chiral centre should at least reach.
const TARGET_VOLUME: f64 = 0.5;
const CHIRAL_WEIGHT: f64 = 1.0;

/// Distance-geometry error: violated upper and lower bounds plus a
/// flat-bottomed penalty on chiral volumes of the wrong sign.
pub struct BoundsError<'a> {
    pub bounds: &'a BoundsMatrix,
    pub chiral: &'a [ChiralConstraint],
}

impl BoundsError<'_> {
    fn pair_terms(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let n = self.bounds.len();
        let mut value = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let d = [
                    x[3 * i] - x[3 * j],
                    x[3 * i + 1] - x[3 * j + 1],
                    x[3 * i + 2] - x[3 * j + 2],
                ];
                let s = d[0] * d[0] + d[1] * d[1] + d[2] * d[2];
                let u2 = self.bounds.upper(i, j).powi(2);
                let l2 = self.bounds.lower(i, j).powi(2);
                let de_ds = if s > u2 {
                    let t = s / u2 - 1.0;
                    value += t * t;
                    2.0 * t / u2
                } else if s < l2 {
                    let t = 2.0 * l2 / (l2 + s) - 1.0;
                    value += t * t;
                    2.0 * t * (-2.0 * l2 / (l2 + s).powi(2))
                } else {
                    continue;
                };
                for axis in 0..3 {
                    let g = de_ds * 2.0 * d[axis];
                    grad[3 * i + axis] += g;
                    grad[3 * j + axis] -= g;
                }
            }
        }
        value
    }

    fn chiral_terms(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let mut value = 0.0;
        for c in self.chiral {
            let at = |i: usize| Point3::new(x[3 * i], x[3 * i + 1], x[3 * i + 2]);
            let centre = at(c.centre);
            let [ia, ib, ic] = c.neighbors;
            let a = at(ia) - centre;
            let b = at(ib) - centre;
            let d = at(ic) - centre;
            let signed = c.sign() * a.dot(&b.cross(&d));
            if signed >= TARGET_VOLUME {
                continue;
            }
            let diff = signed - TARGET_VOLUME;
            value += CHIRAL_WEIGHT * diff * diff;
            let scale = 2.0 * CHIRAL_WEIGHT * diff * c.sign();
            let ga = b.cross(&d) * scale;
            let gb = d.cross(&a) * scale;
            let gd = a.cross(&b) * scale;
            for axis in 0..3 {
                grad[3 * ia + axis] += ga[axis];
                grad[3 * ib + axis] += gb[axis];
                grad[3 * ic + axis] += gd[axis];
                grad[3 * c.centre + axis] -= ga[axis] + gb[axis] + gd[axis];
            }
        }
        value
    }
}

impl Objective for BoundsError<'_> {
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        self.pair_terms(x, grad) + self.chiral_terms(x, grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::embed::stereo::{chiral_constraints, double_bond_constraints};
    use crate::core::perception::add_hydrogens;
    use crate::core::smiles;
    use crate::core::utils::optimize::numeric_gradient;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn recovers_a_tetrahedron_from_exact_distances() {
        let s = 1.0;
        let points = [
            Point3::new(s, s, s),
            Point3::new(s, -s, -s),
            Point3::new(-s, s, -s),
            Point3::new(-s, -s, s),
        ];
        let dist = DMatrix::from_fn(4, 4, |i, j| (points[i] - points[j]).norm());
        let mut rng = StdRng::seed_from_u64(7);
        let coords = coordinates_from_distances(&dist, &mut rng).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                let d = (coords[i] - coords[j]).norm();
                assert!((d - dist[(i, j)]).abs() < 4.0 * JITTER);
            }
        }
    }

    #[test]
    fn sampled_distances_respect_bounds() {
        let mol = add_hydrogens(&smiles::parse("CCO").unwrap());
        let bounds = BoundsMatrix::build(&mol, &double_bond_constraints(&mol));
        let mut rng = StdRng::seed_from_u64(42);
        let dist = sample_distances(&bounds, &mut rng);
        for i in 0..mol.atom_count() {
            for j in (i + 1)..mol.atom_count() {
                assert!(dist[(i, j)] >= bounds.lower(i, j));
                assert!(dist[(i, j)] <= bounds.upper(i, j));
                assert_eq!(dist[(i, j)], dist[(j, i)]);
            }
        }
    }

    #[test]
    fn analytic_gradient_matches_numeric() {
        let mol = add_hydrogens(&smiles::parse("N[C@@H](C)C(=O)O").unwrap());
        let bounds = BoundsMatrix::build(&mol, &double_bond_constraints(&mol));
        let chiral = chiral_constraints(&mol);
        let objective = BoundsError { bounds: &bounds, chiral: &chiral };
        let mut rng = StdRng::seed_from_u64(3);
        let x: Vec<f64> = (0..3 * mol.atom_count())
            .map(|_| rng.gen_range(-2.0..2.0))
            .collect();
        let mut analytic = vec![0.0; x.len()];
        objective.evaluate(&x, &mut analytic);
        let numeric = numeric_gradient(&objective, &x, 1e-6);
        for (a, b) in analytic.iter().zip(&numeric) {
            assert!((a - b).abs() < 1e-4 * (1.0 + a.abs()), "{a} vs {b}");
        }
    }

    #[test]
    fn flatten_round_trips() {
        let points = vec![Point3::new(1.0, 2.0, 3.0), Point3::new(-1.0, 0.5, 0.0)];
        assert_eq!(unflatten(&flatten(&points)), points);
    }
}
