use super::params::{
    angle_force_constant, bond_force_constant, oop_force_constant, torsion_coefficients,
    vdw_pair, vdw_params,
};
use super::potentials;
use super::term::EnergyTerms;
use super::typing::{AtomType, assign_types};
use super::{ForceFieldError, ForceFieldVariant};
use crate::core::charges::gasteiger_charges;
use crate::core::embed::bounds::{bond_length, ideal_angle};
use crate::core::models::molecule::Molecule;
use crate::core::perception::rings::RingInfo;
use crate::core::utils::geometry::dihedral;
use crate::core::utils::optimize::Objective;
use nalgebra::{Point3, Vector3};
use tracing::debug;

const ONE_FOUR_ELECTROSTATIC_SCALE: f64 = 0.75;
const DIELECTRIC: f64 = 1.0;
/// Reference angles at or above this many degrees use the linear bend form.
const LINEAR_THRESHOLD_DEG: f64 = 175.0;
const DEGENERATE: f64 = 1e-8;

#[derive(Debug, Clone, Copy)]
struct StretchTerm {
    i: usize,
    j: usize,
    r0: f64,
    kb: f64,
}

#[derive(Debug, Clone, Copy)]
struct BendTerm {
    i: usize,
    centre: usize,
    k: usize,
    theta0: f64,
    ka: f64,
    linear: bool,
}

#[derive(Debug, Clone, Copy)]
struct TorsionTerm {
    atoms: [usize; 4],
    v: [f64; 3],
}

/// Out-of-plane bend of `l` against the plane `i-centre-k`.
#[derive(Debug, Clone, Copy)]
struct OopTerm {
    centre: usize,
    i: usize,
    k: usize,
    l: usize,
    koop: f64,
}

#[derive(Debug, Clone, Copy)]
struct PairTerm {
    i: usize,
    j: usize,
    r_star: f64,
    eps: f64,
    /// Charge product, already scaled for 1-4 pairs.
    qq: f64,
}

/// A molecule's force-field terms, ready to be evaluated on any conformer.
#[derive(Debug, Clone)]
pub struct ForceField {
    variant: ForceFieldVariant,
    types: Vec<AtomType>,
    charges: Vec<f64>,
    stretches: Vec<StretchTerm>,
    bends: Vec<BendTerm>,
    torsions: Vec<TorsionTerm>,
    oops: Vec<OopTerm>,
    pairs: Vec<PairTerm>,
}

#[inline]
fn pos(x: &[f64], i: usize) -> Vector3<f64> {
    Vector3::new(x[3 * i], x[3 * i + 1], x[3 * i + 2])
}

#[inline]
fn push(grad: &mut [f64], i: usize, g: &Vector3<f64>) {
    grad[3 * i] += g.x;
    grad[3 * i + 1] += g.y;
    grad[3 * i + 2] += g.z;
}

impl ForceField {
    /// Types the atoms, computes Gasteiger charges and enumerates every term.
    ///
    /// `mol` must carry explicit hydrogens.
    pub fn setup(mol: &Molecule, variant: ForceFieldVariant) -> Result<Self, ForceFieldError> {
        let types = assign_types(mol)?;
        let charges = gasteiger_charges(mol);
        let rings = RingInfo::perceive(mol);
        let n = mol.atom_count();

        let stretches = mol
            .bonds()
            .iter()
            .enumerate()
            .map(|(b, bond)| StretchTerm {
                i: bond.begin,
                j: bond.end,
                r0: bond_length(mol, b),
                kb: bond_force_constant(types[bond.begin], types[bond.end], bond.order),
            })
            .collect();

        let mut bends = Vec::new();
        let mut oops = Vec::new();
        for centre in 0..n {
            let nbrs: Vec<usize> = mol.neighbor_atoms(centre).collect();
            for (x, &i) in nbrs.iter().enumerate() {
                for &k in &nbrs[x + 1..] {
                    let theta0 = ideal_angle(mol, &rings, i, centre, k);
                    bends.push(BendTerm {
                        i,
                        centre,
                        k,
                        theta0,
                        ka: angle_force_constant(types[i], types[centre], types[k]),
                        linear: theta0.to_degrees() >= LINEAR_THRESHOLD_DEG,
                    });
                }
            }
            if nbrs.len() == 3 && types[centre].is_trigonal() {
                let koop = oop_force_constant(types[centre], variant);
                for l in 0..3 {
                    oops.push(OopTerm {
                        centre,
                        i: nbrs[(l + 1) % 3],
                        k: nbrs[(l + 2) % 3],
                        l: nbrs[l],
                        koop,
                    });
                }
            }
        }

        let mut torsions = Vec::new();
        for bond in mol.bonds() {
            let (j, k) = (bond.begin, bond.end);
            for i in mol.neighbor_atoms(j).filter(|&i| i != k) {
                for l in mol.neighbor_atoms(k).filter(|&l| l != j && l != i) {
                    let v = torsion_coefficients(
                        [types[i], types[j], types[k], types[l]],
                        bond.order,
                        variant,
                    );
                    if v != [0.0; 3] {
                        torsions.push(TorsionTerm { atoms: [i, j, k, l], v });
                    }
                }
            }
        }

        let topo = mol.topological_distances();
        let vdw: Vec<_> = types.iter().map(|&t| vdw_params(t)).collect();
        let mut pairs = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if topo[i][j] < 3 {
                    continue;
                }
                let (r_star, eps) = vdw_pair(&vdw[i], &vdw[j]);
                let scale = if topo[i][j] == 3 {
                    ONE_FOUR_ELECTROSTATIC_SCALE
                } else {
                    1.0
                };
                pairs.push(PairTerm {
                    i,
                    j,
                    r_star,
                    eps,
                    qq: scale * charges[i] * charges[j],
                });
            }
        }

        debug!(
            ?variant,
            stretches = mol.bond_count(),
            bends = bends.len(),
            torsions = torsions.len(),
            out_of_plane = oops.len(),
            pairs = pairs.len(),
            "Force field set up"
        );

        Ok(Self {
            variant,
            types,
            charges,
            stretches,
            bends,
            torsions,
            oops,
            pairs,
        })
    }

    pub fn variant(&self) -> ForceFieldVariant {
        self.variant
    }

    pub fn atom_count(&self) -> usize {
        self.types.len()
    }

    pub fn types(&self) -> &[AtomType] {
        &self.types
    }

    pub fn charges(&self) -> &[f64] {
        &self.charges
    }

    /// Energy of a coordinate set, split by term.
    pub fn energy(&self, positions: &[Point3<f64>]) -> Result<EnergyTerms, ForceFieldError> {
        if positions.len() != self.atom_count() {
            return Err(ForceFieldError::ConformerMismatch {
                expected: self.atom_count(),
                found: positions.len(),
            });
        }
        let x: Vec<f64> = positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        let mut scratch = vec![0.0; x.len()];
        let terms = self.terms(&x, &mut scratch);
        if terms.total().is_finite() {
            Ok(terms)
        } else {
            Err(ForceFieldError::NonFiniteEnergy)
        }
    }

    /// Evaluates every term at `x`, accumulating the gradient into `grad`.
    fn terms(&self, x: &[f64], grad: &mut [f64]) -> EnergyTerms {
        EnergyTerms {
            stretch: self.stretch_energy(x, grad),
            bend: self.bend_energy(x, grad),
            torsion: self.torsion_energy(x, grad),
            out_of_plane: self.oop_energy(x, grad),
            vdw: self.pair_energy(x, grad, false),
            electrostatic: self.pair_energy(x, grad, true),
        }
    }

    fn stretch_energy(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let mut total = 0.0;
        for t in &self.stretches {
            let d = pos(x, t.i) - pos(x, t.j);
            let r = d.norm();
            let (e, de) = potentials::bond_stretch(r, t.r0, t.kb);
            total += e;
            if r > DEGENERATE {
                let g = d * (de / r);
                push(grad, t.i, &g);
                push(grad, t.j, &-g);
            }
        }
        total
    }

    fn bend_energy(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let mut total = 0.0;
        for t in &self.bends {
            let c = pos(x, t.centre);
            let u = pos(x, t.i) - c;
            let v = pos(x, t.k) - c;
            let (lu, lv) = (u.norm(), v.norm());
            if lu < DEGENERATE || lv < DEGENERATE {
                continue;
            }
            let cos = (u.dot(&v) / (lu * lv)).clamp(-1.0, 1.0);
            let dcos_du = v / (lu * lv) - u * (cos / (lu * lu));
            let dcos_dv = u / (lu * lv) - v * (cos / (lv * lv));
            let (e, de_dcos) = if t.linear {
                potentials::linear_bend(cos, t.ka)
            } else {
                let theta = cos.acos();
                let sin = (1.0 - cos * cos).sqrt().max(DEGENERATE);
                let (e, de_dtheta) = potentials::angle_bend(theta, t.theta0, t.ka);
                (e, -de_dtheta / sin)
            };
            total += e;
            let gu = dcos_du * de_dcos;
            let gv = dcos_dv * de_dcos;
            push(grad, t.i, &gu);
            push(grad, t.k, &gv);
            push(grad, t.centre, &-(gu + gv));
        }
        total
    }

    fn torsion_energy(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let mut total = 0.0;
        for t in &self.torsions {
            let [i, j, k, l] = t.atoms;
            let (pi, pj, pk, pl) = (pos(x, i), pos(x, j), pos(x, k), pos(x, l));
            let r_ij = pi - pj;
            let r_kj = pk - pj;
            let r_kl = pk - pl;
            let m = r_ij.cross(&r_kj);
            let n = r_kj.cross(&r_kl);
            let (m2, n2, kj2) = (m.norm_squared(), n.norm_squared(), r_kj.norm_squared());
            if m2 < DEGENERATE || n2 < DEGENERATE || kj2 < DEGENERATE {
                continue;
            }
            let phi = dihedral(&pi.into(), &pj.into(), &pk.into(), &pl.into());
            let (e, de) = potentials::torsion(phi, t.v);
            total += e;

            let kj = kj2.sqrt();
            let fi = m * (kj / m2);
            let fl = -n * (kj / n2);
            let p = r_ij.dot(&r_kj) / kj2;
            let q = r_kl.dot(&r_kj) / kj2;
            let fj = fi * (p - 1.0) - fl * q;
            let fk = fl * (q - 1.0) - fi * p;
            push(grad, i, &(fi * de));
            push(grad, j, &(fj * de));
            push(grad, k, &(fk * de));
            push(grad, l, &(fl * de));
        }
        total
    }

    fn oop_energy(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let mut total = 0.0;
        for t in &self.oops {
            let c = pos(x, t.centre);
            let (vi, vk, vl) = (pos(x, t.i) - c, pos(x, t.k) - c, pos(x, t.l) - c);
            let (di, dk, dl) = (vi.norm(), vk.norm(), vl.norm());
            if di < DEGENERATE || dk < DEGENERATE || dl < DEGENERATE {
                continue;
            }
            let (a, b, cc) = (vi / di, vk / dk, vl / dl);
            let cos_theta = a.dot(&b).clamp(-1.0, 1.0);
            let normal = a.cross(&b);
            let sin_theta = normal.norm();
            if sin_theta < DEGENERATE {
                continue;
            }
            let s = (cc.dot(&normal) / sin_theta).clamp(-1.0, 1.0);
            let chi = s.asin();
            let cos_chi = (1.0 - s * s).sqrt().max(DEGENERATE);
            let (e, de_dchi) = potentials::out_of_plane(chi, t.koop);
            total += e;

            let factor = de_dchi / cos_chi;
            let s2 = sin_theta * sin_theta;
            let gi = (b.cross(&cc) / sin_theta + (b * cos_theta - a) * (s / s2)) / di;
            let gk = (cc.cross(&a) / sin_theta + (a * cos_theta - b) * (s / s2)) / dk;
            let gl = (normal / sin_theta - cc * s) / dl;
            let (gi, gk, gl) = (gi * factor, gk * factor, gl * factor);
            push(grad, t.i, &gi);
            push(grad, t.k, &gk);
            push(grad, t.l, &gl);
            push(grad, t.centre, &-(gi + gk + gl));
        }
        total
    }

    fn pair_energy(&self, x: &[f64], grad: &mut [f64], electrostatic: bool) -> f64 {
        let mut total = 0.0;
        for t in &self.pairs {
            let d = pos(x, t.i) - pos(x, t.j);
            let r = d.norm();
            let (e, de) = if electrostatic {
                if t.qq == 0.0 {
                    continue;
                }
                potentials::buffered_coulomb(r, t.qq, DIELECTRIC)
            } else {
                potentials::buffered_14_7(r, t.r_star, t.eps)
            };
            total += e;
            if r > DEGENERATE {
                let g = d * (de / r);
                push(grad, t.i, &g);
                push(grad, t.j, &-g);
            }
        }
        total
    }
}

impl Objective for ForceField {
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        self.terms(x, grad).total()
    }
}
