use super::ForceFieldVariant;
use super::typing::AtomType;
use crate::core::models::bond::BondOrder;

/// Per-type van der Waals parameters of the buffered 14-7 potential.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VdwParams {
    /// Atomic polarisability in cubic angstroms.
    pub alpha: f64,
    /// Slater-Kirkwood effective number of valence electrons.
    pub n_eff: f64,
    /// Scale factor turning polarisability into a minimum-energy radius.
    pub a: f64,
    pub g: f64,
}

const fn vdw(alpha: f64, n_eff: f64, a: f64, g: f64) -> VdwParams {
    VdwParams { alpha, n_eff, a, g }
}

pub fn vdw_params(ty: AtomType) -> VdwParams {
    match ty {
        AtomType::CAlkyl => vdw(1.050, 2.490, 3.890, 1.282),
        AtomType::CVinyl | AtomType::CAromatic => vdw(1.350, 2.490, 3.890, 1.282),
        AtomType::CCarbonyl => vdw(1.100, 2.490, 3.890, 1.282),
        AtomType::CAlkyne => vdw(1.300, 2.490, 3.890, 1.282),
        AtomType::NAmine => vdw(1.150, 2.820, 3.890, 1.282),
        AtomType::NImine => vdw(0.900, 2.820, 3.890, 1.282),
        AtomType::NAmmonium
        | AtomType::NPlanar
        | AtomType::NAromatic
        | AtomType::NNitrile => vdw(1.000, 2.820, 3.890, 1.282),
        AtomType::OSp3 => vdw(0.700, 3.150, 3.890, 1.282),
        AtomType::OCarbonyl | AtomType::OAromatic => vdw(0.650, 3.150, 3.890, 1.282),
        AtomType::OAnion => vdw(0.750, 3.150, 3.890, 1.282),
        AtomType::SThioether | AtomType::SAromatic => vdw(3.000, 4.800, 3.320, 1.345),
        AtomType::SThione => vdw(3.950, 4.800, 3.320, 1.345),
        AtomType::SHypervalent => vdw(2.700, 4.800, 3.320, 1.345),
        AtomType::Phosphorus => vdw(3.600, 4.500, 3.320, 1.345),
        AtomType::Fluorine => vdw(0.350, 3.480, 3.890, 1.282),
        AtomType::Chlorine => vdw(2.300, 5.100, 3.320, 1.345),
        AtomType::Bromine => vdw(3.400, 6.000, 3.190, 1.359),
        AtomType::Iodine => vdw(5.500, 6.950, 3.080, 1.404),
        AtomType::H => vdw(0.250, 0.800, 4.200, 1.209),
        AtomType::HPolar => vdw(0.150, 0.800, 4.200, 1.209),
    }
}

impl VdwParams {
    /// Minimum-energy radius of a like pair.
    pub fn r_star(&self) -> f64 {
        self.a * self.alpha.powf(0.25)
    }
}

/// Combined minimum-energy distance and well depth of a pair.
pub fn vdw_pair(a: &VdwParams, b: &VdwParams) -> (f64, f64) {
    let (ri, rj) = (a.r_star(), b.r_star());
    let gamma = (ri - rj) / (ri + rj);
    let r_star = 0.5 * (ri + rj) * (1.0 + 0.2 * (1.0 - (-12.0 * gamma * gamma).exp()));
    let eps = 181.16 * a.g * b.g * a.alpha * b.alpha
        / ((a.alpha / a.n_eff).sqrt() + (b.alpha / b.n_eff).sqrt())
        / r_star.powi(6);
    (r_star, eps)
}

/// Bond-stretch force constant in md/angstrom.
pub fn bond_force_constant(a: AtomType, b: AtomType, order: BondOrder) -> f64 {
    if a.is_hydrogen() || b.is_hydrogen() {
        return 4.8;
    }
    match order {
        BondOrder::Single => 4.5,
        BondOrder::Aromatic => 6.0,
        BondOrder::Double => 9.5,
        BondOrder::Triple => 15.0,
    }
}

/// Angle-bend force constant in md angstrom/rad^2.
pub fn angle_force_constant(a: AtomType, centre: AtomType, b: AtomType) -> f64 {
    if centre.is_linear() {
        0.35
    } else if a.is_hydrogen() || b.is_hydrogen() {
        0.55
    } else {
        0.75
    }
}

/// Out-of-plane force constant in md angstrom/rad^2 for a trigonal centre.
pub fn oop_force_constant(centre: AtomType, variant: ForceFieldVariant) -> f64 {
    match centre {
        AtomType::NPlanar => match variant {
            ForceFieldVariant::Mmff94 => 0.015,
            ForceFieldVariant::Mmff94s => 0.100,
        },
        AtomType::CCarbonyl => 0.100,
        _ => 0.050,
    }
}

/// Hybridisation class of a torsion's central atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Centre {
    Linear,
    Trigonal,
    Tetrahedral,
}

fn centre_class(ty: AtomType) -> Centre {
    if ty.is_linear() {
        Centre::Linear
    } else if ty.is_trigonal() || matches!(ty, AtomType::OAromatic | AtomType::SAromatic) {
        Centre::Trigonal
    } else {
        Centre::Tetrahedral
    }
}

/// Fourier coefficients `[V1, V2, V3]` in kcal/mol of the torsion `i-j-k-l`.
pub fn torsion_coefficients(
    types: [AtomType; 4],
    central_order: BondOrder,
    variant: ForceFieldVariant,
) -> [f64; 3] {
    let [ti, tj, tk, tl] = types;
    let (cj, ck) = (centre_class(tj), centre_class(tk));
    if cj == Centre::Linear || ck == Centre::Linear {
        return [0.0; 3];
    }
    match central_order {
        BondOrder::Triple => [0.0; 3],
        BondOrder::Double => [0.0, 12.0, 0.0],
        BondOrder::Aromatic => [0.0, 6.0, 0.0],
        BondOrder::Single => {
            let amide = (tj == AtomType::CCarbonyl && tk == AtomType::NPlanar)
                || (tk == AtomType::CCarbonyl && tj == AtomType::NPlanar);
            let delocalised_n = tj == AtomType::NPlanar || tk == AtomType::NPlanar;
            let with_h = ti.is_hydrogen() || tl.is_hydrogen();
            match (cj, ck) {
                _ if amide => [0.0, 5.0, 0.0],
                _ if delocalised_n => match variant {
                    ForceFieldVariant::Mmff94 => [0.0, 1.0, 0.0],
                    ForceFieldVariant::Mmff94s => [0.0, 2.5, 0.0],
                },
                (Centre::Trigonal, Centre::Trigonal) => [0.0, 1.5, 0.0],
                (Centre::Tetrahedral, Centre::Tetrahedral) if with_h => [0.0, 0.0, 0.28],
                (Centre::Tetrahedral, Centre::Tetrahedral) => [0.2, 0.25, 0.3],
                _ => [0.0, 0.0, 0.1],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn like_pair_radius_is_type_radius() {
        let c = vdw_params(AtomType::CAlkyl);
        let (r_star, eps) = vdw_pair(&c, &c);
        assert!((r_star - c.r_star()).abs() < TOLERANCE);
        assert!(eps > 0.0);
    }

    #[test]
    fn unlike_pairs_are_widened() {
        let c = vdw_params(AtomType::CAlkyl);
        let h = vdw_params(AtomType::H);
        let (r_star, _) = vdw_pair(&c, &h);
        assert!(r_star > 0.5 * (c.r_star() + h.r_star()));
    }

    #[test]
    fn double_bonds_are_stiffer() {
        let c = AtomType::CVinyl;
        assert!(
            bond_force_constant(c, c, BondOrder::Double)
                > bond_force_constant(c, c, BondOrder::Single)
        );
    }

    #[test]
    fn planar_nitrogen_depends_on_variant() {
        assert!(
            oop_force_constant(AtomType::NPlanar, ForceFieldVariant::Mmff94s)
                > oop_force_constant(AtomType::NPlanar, ForceFieldVariant::Mmff94)
        );
        let aniline = [
            AtomType::CAromatic,
            AtomType::CAromatic,
            AtomType::NPlanar,
            AtomType::HPolar,
        ];
        let soft = torsion_coefficients(aniline, BondOrder::Single, ForceFieldVariant::Mmff94);
        let stiff = torsion_coefficients(aniline, BondOrder::Single, ForceFieldVariant::Mmff94s);
        assert!(stiff[1] > soft[1]);
    }

    #[test]
    fn linear_centres_have_no_torsion() {
        let t = [
            AtomType::H,
            AtomType::CAlkyne,
            AtomType::CAlkyne,
            AtomType::H,
        ];
        assert_eq!(
            torsion_coefficients(t, BondOrder::Triple, ForceFieldVariant::default()),
            [0.0; 3]
        );
    }
}
