//! Scalar functional forms of the force field. Each returns the energy in
//! kcal/mol together with its derivative with respect to the internal
//! coordinate it takes.

const COULOMB_CONSTANT: f64 = 332.0716; // In kcal·Å/(mol·e²)
/// md/Å to kcal/(mol·Å²).
const MDYNE: f64 = 143.9325;
const CUBIC_STRETCH: f64 = -2.0;
/// Cubic bend constant per radian (-0.006981 per degree).
const CUBIC_BEND: f64 = -0.4;
const ELECTROSTATIC_BUFFER: f64 = 0.05;

/// Quartic bond stretch around `r0`, `kb` in md/Å.
#[inline]
pub fn bond_stretch(r: f64, r0: f64, kb: f64) -> (f64, f64) {
    let dr = r - r0;
    let cs = CUBIC_STRETCH;
    let k = 0.5 * MDYNE * kb;
    let poly = 1.0 + cs * dr + 7.0 / 12.0 * cs * cs * dr * dr;
    let dpoly = cs + 7.0 / 6.0 * cs * cs * dr;
    (k * dr * dr * poly, k * (2.0 * dr * poly + dr * dr * dpoly))
}

/// Cubic angle bend around `theta0` (radians), `ka` in md·Å/rad².
#[inline]
pub fn angle_bend(theta: f64, theta0: f64, ka: f64) -> (f64, f64) {
    let dt = theta - theta0;
    let k = 0.5 * MDYNE * ka;
    (
        k * dt * dt * (1.0 + CUBIC_BEND * dt),
        k * (2.0 * dt + 3.0 * CUBIC_BEND * dt * dt),
    )
}

/// Bend around a linear centre as a function of `cos(theta)`; the derivative is
/// taken with respect to the cosine.
#[inline]
pub fn linear_bend(cos_theta: f64, ka: f64) -> (f64, f64) {
    (MDYNE * ka * (1.0 + cos_theta), MDYNE * ka)
}

/// Three-term Fourier torsion.
#[inline]
pub fn torsion(phi: f64, v: [f64; 3]) -> (f64, f64) {
    let [v1, v2, v3] = v;
    let energy = 0.5
        * (v1 * (1.0 + phi.cos())
            + v2 * (1.0 - (2.0 * phi).cos())
            + v3 * (1.0 + (3.0 * phi).cos()));
    let derivative =
        0.5 * (-v1 * phi.sin() + 2.0 * v2 * (2.0 * phi).sin() - 3.0 * v3 * (3.0 * phi).sin());
    (energy, derivative)
}

/// Harmonic Wilson out-of-plane term, `koop` in md·Å/rad².
#[inline]
pub fn out_of_plane(chi: f64, koop: f64) -> (f64, f64) {
    let k = 0.5 * MDYNE * koop;
    (k * chi * chi, 2.0 * k * chi)
}

/// Buffered 14-7 van der Waals energy.
#[inline]
pub fn buffered_14_7(r: f64, r_star: f64, eps: f64) -> (f64, f64) {
    let rho = r / r_star;
    let rho6 = rho.powi(6);
    let rho7 = rho6 * rho;
    let f = (1.07 / (rho + 0.07)).powi(7);
    let g = 1.12 / (rho7 + 0.12) - 2.0;
    let df = -7.0 * f / (rho + 0.07);
    let dg = -1.12 * 7.0 * rho6 / (rho7 + 0.12).powi(2);
    (eps * f * g, eps * (df * g + f * dg) / r_star)
}

/// Buffered Coulomb energy with a constant dielectric.
#[inline]
pub fn buffered_coulomb(r: f64, qq: f64, dielectric: f64) -> (f64, f64) {
    let denom = dielectric * (r + ELECTROSTATIC_BUFFER);
    let energy = COULOMB_CONSTANT * qq / denom;
    (energy, -energy / (r + ELECTROSTATIC_BUFFER))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn check_derivative(f: impl Fn(f64) -> (f64, f64), x: f64) {
        let h = 1e-6;
        let numeric = (f(x + h).0 - f(x - h).0) / (2.0 * h);
        let analytic = f(x).1;
        assert!(
            (numeric - analytic).abs() < 1e-5 * (1.0 + analytic.abs()),
            "numeric {numeric} vs analytic {analytic} at {x}"
        );
    }

    #[test]
    fn bond_stretch_is_zero_at_equilibrium() {
        let (e, de) = bond_stretch(1.5, 1.5, 4.5);
        assert!(f64_approx_equal(e, 0.0));
        assert!(f64_approx_equal(de, 0.0));
    }

    #[test]
    fn bond_stretch_derivative_is_consistent() {
        check_derivative(|r| bond_stretch(r, 1.5, 4.5), 1.62);
        check_derivative(|r| bond_stretch(r, 1.5, 4.5), 1.41);
    }

    #[test]
    fn angle_bend_derivative_is_consistent() {
        let t0 = 109.47_f64.to_radians();
        check_derivative(|t| angle_bend(t, t0, 0.75), t0 + 0.2);
        check_derivative(|t| angle_bend(t, t0, 0.75), t0 - 0.3);
    }

    #[test]
    fn linear_bend_vanishes_at_straight_angle() {
        let (e, _) = linear_bend(-1.0, 0.35);
        assert!(f64_approx_equal(e, 0.0));
        check_derivative(|c| linear_bend(c, 0.35), -0.9);
    }

    #[test]
    fn torsion_double_bond_term_prefers_planarity() {
        let v = [0.0, 12.0, 0.0];
        assert!(f64_approx_equal(torsion(0.0, v).0, 0.0));
        assert!(f64_approx_equal(torsion(std::f64::consts::PI, v).0, 0.0));
        assert!(f64_approx_equal(torsion(std::f64::consts::FRAC_PI_2, v).0, 12.0));
        check_derivative(|p| torsion(p, [0.2, 0.25, 0.3]), 0.7);
    }

    #[test]
    fn out_of_plane_derivative_is_consistent() {
        check_derivative(|c| out_of_plane(c, 0.05), 0.15);
    }

    #[test]
    fn buffered_14_7_is_minus_well_depth_at_r_star() {
        let (e, _) = buffered_14_7(3.5, 3.5, 0.1);
        assert!(f64_approx_equal(e, -0.1));
        assert!(buffered_14_7(2.0, 3.5, 0.1).0 > 0.0);
        check_derivative(|r| buffered_14_7(r, 3.5, 0.1), 2.9);
        check_derivative(|r| buffered_14_7(r, 3.5, 0.1), 4.4);
    }

    #[test]
    fn coulomb_sign_follows_charges() {
        assert!(buffered_coulomb(3.0, 0.25, 1.0).0 > 0.0);
        assert!(buffered_coulomb(3.0, -0.25, 1.0).0 < 0.0);
        check_derivative(|r| buffered_coulomb(r, 0.3, 1.0), 2.5);
    }
}
