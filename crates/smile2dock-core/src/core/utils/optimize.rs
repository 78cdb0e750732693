use nalgebra::{DMatrix, DVector};
use tracing::trace;

/// A differentiable scalar function of a flat coordinate vector.
pub trait Objective {
    /// Returns the value at `x` and writes the gradient into `grad`.
    ///
    /// `grad` has the same length as `x` and arrives zeroed.
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BfgsOptions {
    pub max_iterations: usize,
    /// Convergence threshold on the root-mean-square gradient component.
    pub gradient_tolerance: f64,
    /// Convergence threshold on the value change between accepted steps.
    pub value_tolerance: f64,
    /// Largest displacement of a single coordinate in one step.
    pub max_step: f64,
}

impl Default for BfgsOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            gradient_tolerance: 1e-4,
            value_tolerance: 1e-8,
            max_step: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

const ARMIJO: f64 = 1e-4;
const MIN_ALPHA: f64 = 1e-10;

fn rms(v: &DVector<f64>) -> f64 {
    if v.is_empty() {
        0.0
    } else {
        (v.norm_squared() / v.len() as f64).sqrt()
    }
}

fn eval(objective: &impl Objective, x: &DVector<f64>) -> (f64, DVector<f64>) {
    let mut grad = vec![0.0; x.len()];
    let value = objective.evaluate(x.as_slice(), &mut grad);
    (value, DVector::from_vec(grad))
}

/// Minimizes `objective` from `x0` with BFGS and a backtracking line search.
///
/// The inverse Hessian starts as the identity and is reset whenever the
/// search direction stops pointing downhill. A non-finite value ends the run
/// with `converged == false` at the last finite point.
pub fn minimize_bfgs(objective: &impl Objective, x0: Vec<f64>, options: &BfgsOptions) -> Minimum {
    let n = x0.len();
    let mut x = DVector::from_vec(x0);
    let (mut value, mut grad) = eval(objective, &x);
    if n == 0 || !value.is_finite() {
        return Minimum {
            x: x.as_slice().to_vec(),
            value,
            iterations: 0,
            converged: n == 0,
        };
    }

    let mut inv_hessian = DMatrix::<f64>::identity(n, n);
    let mut converged = rms(&grad) < options.gradient_tolerance;
    let mut iterations = 0;

    while !converged && iterations < options.max_iterations {
        iterations += 1;

        let mut direction = -(&inv_hessian * &grad);
        let mut slope = grad.dot(&direction);
        if slope >= 0.0 {
            inv_hessian.fill_with_identity();
            direction = -grad.clone();
            slope = -grad.norm_squared();
        }

        let largest = direction.amax();
        let mut alpha = if largest > options.max_step {
            options.max_step / largest
        } else {
            1.0
        };

        let mut accepted = None;
        while alpha > MIN_ALPHA {
            let trial = &x + &direction * alpha;
            let (trial_value, trial_grad) = eval(objective, &trial);
            if trial_value.is_finite() && trial_value <= value + ARMIJO * alpha * slope {
                accepted = Some((trial, trial_value, trial_grad));
                break;
            }
            alpha *= 0.5;
        }

        let Some((next_x, next_value, next_grad)) = accepted else {
            trace!(iterations, value, "Line search stalled");
            converged = rms(&grad) < options.gradient_tolerance;
            break;
        };

        let s = &next_x - &x;
        let y = &next_grad - &grad;
        let delta = value - next_value;
        x = next_x;
        value = next_value;
        grad = next_grad;

        if rms(&grad) < options.gradient_tolerance || delta.abs() < options.value_tolerance {
            converged = true;
            break;
        }

        let sy = s.dot(&y);
        if sy > 1e-10 {
            let hy = &inv_hessian * &y;
            let yhy = y.dot(&hy);
            let rho = 1.0 / sy;
            // H' = H + rho^2 (sy + yHy) ss^T - rho (Hy s^T + s (Hy)^T)
            inv_hessian += (&s * s.transpose()) * ((sy + yhy) * rho * rho);
            inv_hessian -= (&hy * s.transpose() + &s * hy.transpose()) * rho;
        }
    }

    trace!(iterations, value, converged, "BFGS finished");
    Minimum {
        x: x.as_slice().to_vec(),
        value,
        iterations,
        converged,
    }
}

/// Central-difference gradient, for checking analytic gradients in tests.
#[cfg(test)]
pub(crate) fn numeric_gradient(objective: &impl Objective, x: &[f64], step: f64) -> Vec<f64> {
    let mut scratch = vec![0.0; x.len()];
    let mut shifted = x.to_vec();
    (0..x.len())
        .map(|i| {
            shifted[i] = x[i] + step;
            scratch.iter_mut().for_each(|g| *g = 0.0);
            let plus = objective.evaluate(&shifted, &mut scratch);
            shifted[i] = x[i] - step;
            scratch.iter_mut().for_each(|g| *g = 0.0);
            let minus = objective.evaluate(&shifted, &mut scratch);
            shifted[i] = x[i];
            (plus - minus) / (2.0 * step)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rosenbrock;

    impl Objective for Rosenbrock {
        fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
            let (a, b) = (x[0], x[1]);
            grad[0] = -2.0 * (1.0 - a) - 400.0 * a * (b - a * a);
            grad[1] = 200.0 * (b - a * a);
            (1.0 - a).powi(2) + 100.0 * (b - a * a).powi(2)
        }
    }

    struct Bowl;

    impl Objective for Bowl {
        fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
            let mut value = 0.0;
            for (i, (xi, gi)) in x.iter().zip(grad.iter_mut()).enumerate() {
                let w = (i + 1) as f64;
                value += w * (xi - 1.0).powi(2);
                *gi = 2.0 * w * (xi - 1.0);
            }
            value
        }
    }

    #[test]
    fn finds_rosenbrock_minimum() {
        let options = BfgsOptions {
            max_iterations: 500,
            gradient_tolerance: 1e-8,
            value_tolerance: 0.0,
            max_step: 0.5,
        };
        let result = minimize_bfgs(&Rosenbrock, vec![-1.2, 1.0], &options);
        assert!(result.converged);
        assert!((result.x[0] - 1.0).abs() < 1e-4);
        assert!((result.x[1] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn quadratic_bowl_converges_quickly() {
        let result = minimize_bfgs(&Bowl, vec![5.0, -3.0, 0.0, 2.0], &BfgsOptions::default());
        assert!(result.converged);
        assert!(result.value < 1e-6);
        assert!(result.iterations < 100);
    }

    #[test]
    fn empty_problem_is_trivially_converged() {
        let result = minimize_bfgs(&Bowl, Vec::new(), &BfgsOptions::default());
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn numeric_gradient_matches_analytic() {
        let x = [0.3, -0.7];
        let mut analytic = [0.0; 2];
        Rosenbrock.evaluate(&x, &mut analytic);
        let numeric = numeric_gradient(&Rosenbrock, &x, 1e-6);
        for (a, n) in analytic.iter().zip(&numeric) {
            assert!((a - n).abs() < 1e-4);
        }
    }
}
