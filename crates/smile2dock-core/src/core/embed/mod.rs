//! # 3D Embedding
//!
//! Distance-geometry conformer generation. For each conformer:
//!
//! 1. [`bounds::BoundsMatrix`] turns the molecular graph into lower and upper
//!    distance bounds and smooths them with the triangle inequality.
//! 2. A random distance matrix is drawn inside the bounds and projected to 3D
//!    through the metric matrix ([`coords::coordinates_from_distances`]).
//! 3. The coordinates are refined against the bounds error function, with a
//!    chiral-volume penalty when stereo is enforced.
//! 4. Tetrahedral centres and marked double bonds are checked against the
//!    input tags ([`stereo`]); an attempt that fails is retried with a new seed.
//!
//! Disconnected fragments (salts, hydrates) are embedded one at a time and then
//! laid out side by side along the x axis, [`FRAGMENT_GAP`] apart.
//!
//! Conformers are independent of each other and are generated in parallel.
//! Each conformer derives its seeds from the base seed and its own index, so the
//! result does not depend on thread scheduling.

pub mod bounds;
pub mod coords;
pub mod stereo;

use crate::core::models::conformer::Conformer;
use crate::core::models::molecule::Molecule;
use crate::core::utils::optimize::{BfgsOptions, minimize_bfgs};
use bounds::BoundsMatrix;
use coords::{BoundsError, coordinates_from_distances, flatten, sample_distances, unflatten};
use nalgebra::Point3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use stereo::{ChiralConstraint, DoubleBondConstraint, Handedness};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Largest bounds error per atom a finished embedding may keep.
const MAX_BOUNDS_ERROR_PER_ATOM: f64 = 0.01;
/// Clearance in angstroms between the outermost atoms of neighbouring fragments.
pub const FRAGMENT_GAP: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EmbedParams {
    pub num_conformers: usize,
    pub random_seed: u64,
    pub enforce_chirality: bool,
    /// Attempts per conformer before it is given up.
    pub max_attempts: usize,
    /// Iteration cap of the bounds refinement.
    pub refine_iterations: usize,
}

impl Default for EmbedParams {
    fn default() -> Self {
        Self {
            num_conformers: 10,
            random_seed: 42,
            enforce_chirality: true,
            max_attempts: 20,
            refine_iterations: 400,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmbedError {
    #[error("Cannot embed a molecule without atoms")]
    EmptyMolecule,
    #[error("At least one conformer must be requested")]
    NoConformersRequested,
    #[error("No conformer could be embedded after {attempts} attempts")]
    NoConformers { attempts: usize },
}

/// Mixes the base seed with the conformer index and attempt number.
fn derive_seed(base: u64, conformer: usize, attempt: usize) -> u64 {
    let mut z = base
        ^ (conformer as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (attempt as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

struct Embedder<'a> {
    bounds: BoundsMatrix,
    chiral: Vec<ChiralConstraint>,
    double_bonds: Vec<DoubleBondConstraint>,
    params: &'a EmbedParams,
}

impl Embedder<'_> {
    fn attempt(&self, seed: u64) -> Option<Vec<Point3<f64>>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = sample_distances(&self.bounds, &mut rng);
        let mut positions = coordinates_from_distances(&dist, &mut rng)?;

        if self.params.enforce_chirality
            && !self.chiral.is_empty()
            && stereo::handedness(&self.chiral, &positions) == Handedness::Mirrored
        {
            stereo::mirror(&mut positions);
        }

        let objective = BoundsError {
            bounds: &self.bounds,
            chiral: if self.params.enforce_chirality {
                self.chiral.as_slice()
            } else {
                &[]
            },
        };
        let options = BfgsOptions {
            max_iterations: self.params.refine_iterations,
            gradient_tolerance: 1e-5,
            value_tolerance: 1e-10,
            max_step: 0.5,
        };
        let minimum = minimize_bfgs(&objective, flatten(&positions), &options);
        let tolerance = MAX_BOUNDS_ERROR_PER_ATOM * positions.len() as f64;
        if !minimum.value.is_finite() || minimum.value > tolerance {
            return None;
        }
        let positions = unflatten(&minimum.x);

        if self.params.enforce_chirality {
            if stereo::handedness(&self.chiral, &positions) != Handedness::Matches {
                return None;
            }
            if !stereo::double_bonds_match(&self.double_bonds, &positions) {
                return None;
            }
        }
        Some(positions)
    }

    fn conformer(&self, index: usize) -> Option<Conformer> {
        (0..self.params.max_attempts).find_map(|attempt| {
            let seed = derive_seed(self.params.random_seed, index, attempt);
            let positions = self.attempt(seed);
            if positions.is_none() {
                debug!(conformer = index, attempt, "Embedding attempt rejected");
            }
            positions.map(Conformer::new)
        })
    }
}

/// Generates up to `params.num_conformers` conformers of `mol`.
///
/// `mol` should carry explicit hydrogens so they get coordinates of their own.
/// Conformers that exhaust their attempts are dropped with a warning; only when
/// every conformer fails is the result an error. A single atom is placed at the
/// origin.
#[instrument(
    skip_all,
    fields(atoms = mol.atom_count(), n = params.num_conformers, seed = params.random_seed)
)]
pub fn embed_multiple(mol: &Molecule, params: &EmbedParams) -> Result<Vec<Conformer>, EmbedError> {
    if mol.is_empty() {
        return Err(EmbedError::EmptyMolecule);
    }
    if params.num_conformers == 0 {
        return Err(EmbedError::NoConformersRequested);
    }
    if mol.atom_count() == 1 {
        return Ok(vec![Conformer::new(vec![Point3::origin()]); params.num_conformers]);
    }
    let fragments = mol.fragments();
    if fragments.len() > 1 {
        return embed_fragments(mol, &fragments, params);
    }

    let double_bonds = stereo::double_bond_constraints(mol);
    let embedder = Embedder {
        bounds: BoundsMatrix::build(mol, &double_bonds),
        chiral: stereo::chiral_constraints(mol),
        double_bonds,
        params,
    };
    debug!(
        chiral_centres = embedder.chiral.len(),
        stereo_double_bonds = embedder.double_bonds.len(),
        "Bounds matrix ready"
    );

    let conformers: Vec<Conformer> = (0..params.num_conformers)
        .into_par_iter()
        .filter_map(|i| embedder.conformer(i))
        .collect();

    if conformers.is_empty() {
        return Err(EmbedError::NoConformers {
            attempts: params.num_conformers * params.max_attempts,
        });
    }
    if conformers.len() < params.num_conformers {
        warn!(
            requested = params.num_conformers,
            embedded = conformers.len(),
            "Some conformers could not be embedded"
        );
    }
    Ok(conformers)
}

/// Embeds each connected fragment on its own and places the results in a row.
///
/// Conformer `i` of the whole molecule combines conformer `i` of every
/// fragment, so the count is that of the fragment with the fewest conformers.
fn embed_fragments(
    mol: &Molecule,
    fragments: &[Vec<usize>],
    params: &EmbedParams,
) -> Result<Vec<Conformer>, EmbedError> {
    debug!(fragments = fragments.len(), "Embedding disconnected fragments separately");
    let embedded = fragments
        .iter()
        .map(|atoms| {
            let mut sorted = atoms.clone();
            sorted.sort_unstable();
            embed_multiple(&mol.extract(&sorted), params).map(|confs| (sorted, confs))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let count = embedded
        .iter()
        .map(|(_, confs)| confs.len())
        .min()
        .unwrap_or(0);
    let conformers = (0..count)
        .map(|i| {
            let mut positions = vec![Point3::origin(); mol.atom_count()];
            let mut cursor = 0.0;
            for (k, (atoms, confs)) in embedded.iter().enumerate() {
                let mut part = confs[i].clone();
                part.center();
                let radius = part
                    .positions
                    .iter()
                    .map(|p| p.coords.norm())
                    .fold(0.0, f64::max);
                if k > 0 {
                    cursor += radius;
                }
                for (&atom, p) in atoms.iter().zip(&part.positions) {
                    positions[atom] = Point3::new(p.x + cursor, p.y, p.z);
                }
                cursor += radius + FRAGMENT_GAP;
            }
            Conformer::new(positions)
        })
        .collect();
    Ok(conformers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::perception::add_hydrogens;
    use crate::core::smiles;

    fn embed(s: &str, n: usize) -> (Molecule, Vec<Conformer>) {
        let mol = add_hydrogens(&smiles::parse(s).unwrap());
        let params = EmbedParams {
            num_conformers: n,
            ..EmbedParams::default()
        };
        let confs = embed_multiple(&mol, &params).unwrap();
        (mol, confs)
    }

    #[test]
    fn ethanol_has_sensible_bond_lengths() {
        let (mol, confs) = embed("CCO", 3);
        assert_eq!(confs.len(), 3);
        for conf in &confs {
            assert_eq!(conf.len(), mol.atom_count());
            for bond in mol.bonds() {
                let d = conf.distance(bond.begin, bond.end);
                assert!((0.9..1.7).contains(&d), "bond length {d}");
            }
        }
    }

    #[test]
    fn same_seed_gives_same_coordinates() {
        let (_, a) = embed("CC(=O)Oc1ccccc1C(=O)O", 2);
        let (_, b) = embed("CC(=O)Oc1ccccc1C(=O)O", 2);
        assert_eq!(a, b);
    }

    #[test]
    fn conformers_differ_from_each_other() {
        let (_, confs) = embed("CCCCCC", 2);
        assert_ne!(confs[0].positions, confs[1].positions);
    }

    #[test]
    fn chirality_follows_the_tag() {
        for s in ["N[C@@H](C)C(=O)O", "N[C@H](C)C(=O)O"] {
            let (mol, confs) = embed(s, 2);
            let constraints = stereo::chiral_constraints(&mol);
            for conf in &confs {
                assert_eq!(
                    stereo::handedness(&constraints, &conf.positions),
                    Handedness::Matches
                );
            }
        }
    }

    #[test]
    fn double_bond_geometry_follows_markers() {
        let (mol, confs) = embed("C/C=C/C", 2);
        let constraints = stereo::double_bond_constraints(&mol);
        for conf in &confs {
            assert!(stereo::double_bonds_match(&constraints, &conf.positions));
            assert!(conf.dihedral(0, 1, 2, 3).abs() > 120.0);
        }
    }

    #[test]
    fn benzene_is_flat() {
        let (_, confs) = embed("c1ccccc1", 1);
        let conf = &confs[0];
        for i in 0..6 {
            let phi = conf.dihedral(i, (i + 1) % 6, (i + 2) % 6, (i + 3) % 6);
            assert!(phi.abs() < 15.0, "ring torsion {phi}");
        }
    }

    #[test]
    fn hydrate_embeds_both_fragments() {
        let (mol, confs) = embed("CCO.O", 3);
        assert_eq!(confs.len(), 3);
        for conf in &confs {
            assert_eq!(conf.len(), mol.atom_count());
            for bond in mol.bonds() {
                let d = conf.distance(bond.begin, bond.end);
                assert!((0.9..1.7).contains(&d), "bond length {d}");
            }
        }
    }

    #[test]
    fn salt_fragments_do_not_overlap() {
        let (mol, confs) = embed("CC(=O)[O-].[Na+]", 2);
        let fragments = mol.fragments();
        assert_eq!(fragments.len(), 2);
        for conf in &confs {
            for &a in &fragments[0] {
                for &b in &fragments[1] {
                    assert!(conf.distance(a, b) >= FRAGMENT_GAP - 1e-9);
                }
            }
        }
    }

    #[test]
    fn fragment_chirality_survives_extraction() {
        let (mol, confs) = embed("N[C@@H](C)C(=O)O.Cl", 2);
        let constraints = stereo::chiral_constraints(&mol);
        assert!(!constraints.is_empty());
        for conf in &confs {
            assert_eq!(
                stereo::handedness(&constraints, &conf.positions),
                Handedness::Matches
            );
        }
    }

    #[test]
    fn single_atom_sits_at_origin() {
        let mol = smiles::parse("[Na+]").unwrap();
        let confs = embed_multiple(&mol, &EmbedParams::default()).unwrap();
        assert_eq!(confs.len(), 10);
        assert_eq!(confs[0].positions, vec![Point3::origin()]);
    }

    #[test]
    fn rejects_degenerate_requests() {
        assert_eq!(
            embed_multiple(&Molecule::new(), &EmbedParams::default()),
            Err(EmbedError::EmptyMolecule)
        );
        let mol = smiles::parse("CC").unwrap();
        let params = EmbedParams { num_conformers: 0, ..EmbedParams::default() };
        assert_eq!(
            embed_multiple(&mol, &params),
            Err(EmbedError::NoConformersRequested)
        );
    }

    #[test]
    fn seeds_are_distinct_per_conformer_and_attempt() {
        let a = derive_seed(42, 0, 0);
        assert_ne!(a, derive_seed(42, 1, 0));
        assert_ne!(a, derive_seed(42, 0, 1));
        assert_ne!(a, derive_seed(43, 0, 0));
    }
}
