use super::ForceFieldError;
use super::energy::ForceField;
use super::term::EnergyTerms;
use crate::core::models::conformer::Conformer;
use crate::core::utils::optimize::{BfgsOptions, minimize_bfgs};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MinimizeOptions {
    pub max_iterations: usize,
    /// RMS gradient in kcal/(mol·Å) below which the run has converged.
    pub gradient_tolerance: f64,
    pub energy_tolerance: f64,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            gradient_tolerance: 1e-3,
            energy_tolerance: 1e-7,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Minimized {
    /// The minimized coordinates, with `energy` set.
    pub conformer: Conformer,
    pub terms: EnergyTerms,
    pub converged: bool,
    pub iterations: usize,
}

impl Minimized {
    pub fn energy(&self) -> f64 {
        self.terms.total()
    }
}

/// Minimizes one conformer with BFGS.
pub fn minimize(
    ff: &ForceField,
    conformer: &Conformer,
    options: &MinimizeOptions,
) -> Result<Minimized, ForceFieldError> {
    // Fails early on a mismatched or already non-finite conformer.
    ff.energy(&conformer.positions)?;

    let x0 = conformer
        .positions
        .iter()
        .flat_map(|p| [p.x, p.y, p.z])
        .collect();
    let bfgs = BfgsOptions {
        max_iterations: options.max_iterations,
        gradient_tolerance: options.gradient_tolerance,
        value_tolerance: options.energy_tolerance,
        ..BfgsOptions::default()
    };
    let result = minimize_bfgs(ff, x0, &bfgs);

    let positions: Vec<Point3<f64>> = result
        .x
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect();
    let terms = ff.energy(&positions)?;
    Ok(Minimized {
        conformer: Conformer {
            positions,
            energy: Some(terms.total()),
        },
        terms,
        converged: result.converged,
        iterations: result.iterations,
    })
}
