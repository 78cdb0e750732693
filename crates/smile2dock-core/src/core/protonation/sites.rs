use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;
use crate::core::perception::rings::RingInfo;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

const BUILTIN_SITES: &str = include_str!("../../../data/protonation_sites.toml");

/// The substructure a site definition matches. Acidic groups lose a proton when
/// deprotonated; basic groups gain one when protonated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteKind {
    SulfonicAcid,
    PhosphonicAcid,
    CarboxylicAcid,
    Tetrazole,
    HydroxamicAcid,
    Phenol,
    Thiol,
    Sulfonamide,
    PrimaryAmine,
    SecondaryAmine,
    TertiaryAmine,
    Aniline,
    Imidazole,
    AromaticNitrogen,
    Amidine,
}

impl SiteKind {
    /// True when the neutral form of the group carries the proton.
    pub fn is_acid(self) -> bool {
        matches!(
            self,
            Self::SulfonicAcid
                | Self::PhosphonicAcid
                | Self::CarboxylicAcid
                | Self::Tetrazole
                | Self::HydroxamicAcid
                | Self::Phenol
                | Self::Thiol
                | Self::Sulfonamide
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteDefinition {
    pub name: String,
    pub kind: SiteKind,
    pub pka: f64,
    pub stdev: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SiteFile {
    site: Vec<SiteDefinition>,
}

/// An ordered list of site definitions. Earlier definitions claim an atom first.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteLibrary {
    sites: Vec<SiteDefinition>,
}

/// A site definition matched on one atom of a molecule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteMatch<'a> {
    pub atom: usize,
    pub definition: &'a SiteDefinition,
}

#[derive(Debug, Error)]
pub enum SiteLibraryError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Site '{name}' has a negative pKa spread")]
    InvalidSpread { name: String },
}

impl SiteLibrary {
    /// The library compiled into the binary.
    pub fn builtin() -> Result<Self, SiteLibraryError> {
        Self::from_toml_str(BUILTIN_SITES, "<builtin>")
    }

    pub fn load(path: &Path) -> Result<Self, SiteLibraryError> {
        let content = std::fs::read_to_string(path).map_err(|e| SiteLibraryError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.to_string_lossy())
    }

    fn from_toml_str(content: &str, origin: &str) -> Result<Self, SiteLibraryError> {
        let file: SiteFile = toml::from_str(content).map_err(|e| SiteLibraryError::Toml {
            path: origin.to_string(),
            source: e,
        })?;
        if let Some(bad) = file.site.iter().find(|s| s.stdev < 0.0) {
            return Err(SiteLibraryError::InvalidSpread {
                name: bad.name.clone(),
            });
        }
        Ok(Self { sites: file.site })
    }

    pub fn sites(&self) -> &[SiteDefinition] {
        &self.sites
    }

    /// Every ionisable atom of `mol`, in library order and then atom order.
    /// Each atom is claimed by at most one definition.
    pub fn find_sites<'a>(&'a self, mol: &Molecule) -> Vec<SiteMatch<'a>> {
        let rings = RingInfo::perceive(mol);
        let mut claimed = vec![false; mol.atom_count()];
        let mut found = Vec::new();
        for definition in &self.sites {
            for atom in match_kind(mol, &rings, definition.kind) {
                if !claimed[atom] {
                    claimed[atom] = true;
                    found.push(SiteMatch { atom, definition });
                }
            }
        }
        found
    }
}

fn match_kind(mol: &Molecule, rings: &RingInfo, kind: SiteKind) -> Vec<usize> {
    let matcher: Box<dyn Fn(usize) -> bool + '_> = match kind {
        SiteKind::SulfonicAcid => Box::new(|i| {
            hydroxyl_on(mol, i, |n| is(mol, n, 16) && oxo_count(mol, n) >= 2)
        }),
        SiteKind::PhosphonicAcid => Box::new(|i| {
            hydroxyl_on(mol, i, |n| is(mol, n, 15) && oxo_count(mol, n) >= 1)
                && first_hydroxyl_on_neighbor(mol, i)
        }),
        SiteKind::CarboxylicAcid => Box::new(|i| {
            hydroxyl_on(mol, i, |n| {
                is(mol, n, 6) && !mol.atom(n).aromatic && oxo_count(mol, n) >= 1
            })
        }),
        SiteKind::Tetrazole => Box::new(|i| {
            let atom = mol.atom(i);
            atom.aromatic
                && is(mol, i, 7)
                && atom.formal_charge == 0
                && mol.total_hydrogens(i) == 1
                && rings.rings().iter().any(|r| {
                    r.len() == 5
                        && r.contains(&i)
                        && r.iter().filter(|&&a| is(mol, a, 7)).count() == 4
                })
        }),
        SiteKind::HydroxamicAcid => Box::new(|i| {
            hydroxyl_on(mol, i, |n| {
                is(mol, n, 7)
                    && mol
                        .neighbor_atoms(n)
                        .any(|c| is(mol, c, 6) && oxo_count(mol, c) >= 1)
            })
        }),
        SiteKind::Phenol => Box::new(|i| {
            hydroxyl_on(mol, i, |n| is(mol, n, 6) && mol.atom(n).aromatic)
        }),
        SiteKind::Thiol => Box::new(|i| {
            neutral(mol, i)
                && is(mol, i, 16)
                && !mol.atom(i).aromatic
                && mol.total_hydrogens(i) == 1
                && mol.heavy_degree(i) == 1
                && mol.neighbor_atoms(i).any(|n| is(mol, n, 6))
        }),
        SiteKind::Sulfonamide => Box::new(|i| {
            neutral(mol, i)
                && is(mol, i, 7)
                && !mol.atom(i).aromatic
                && mol.total_hydrogens(i) >= 1
                && mol
                    .neighbor_atoms(i)
                    .any(|n| is(mol, n, 16) && oxo_count(mol, n) >= 2)
        }),
        SiteKind::PrimaryAmine => Box::new(|i| aliphatic_amine(mol, i, 2)),
        SiteKind::SecondaryAmine => Box::new(|i| aliphatic_amine(mol, i, 1)),
        SiteKind::TertiaryAmine => Box::new(|i| aliphatic_amine(mol, i, 0)),
        SiteKind::Aniline => Box::new(|i| {
            amine_nitrogen(mol, i)
                && mol
                    .neighbor_atoms(i)
                    .any(|n| is(mol, n, 6) && mol.atom(n).aromatic)
                && heavy_neighbors(mol, i)
                    .all(|n| is(mol, n, 6) && (mol.atom(n).aromatic || is_saturated(mol, n)))
        }),
        SiteKind::Imidazole => Box::new(|i| {
            pyridine_like(mol, i)
                && rings.is_atom_in_ring_of_size(i, 5)
                && mol.neighbor_atoms(i).any(|c| {
                    is(mol, c, 6)
                        && mol.atom(c).aromatic
                        && mol.neighbor_atoms(c).any(|m| {
                            m != i
                                && is(mol, m, 7)
                                && mol.atom(m).aromatic
                                && mol.total_degree(m) == 3
                                && rings.rings().iter().any(|r| {
                                    r.len() == 5 && r.contains(&i) && r.contains(&m)
                                })
                        })
                })
        }),
        SiteKind::AromaticNitrogen => Box::new(|i| {
            pyridine_like(mol, i)
                && !mol
                    .neighbor_atoms(i)
                    .any(|n| is(mol, n, 7) && mol.atom(n).aromatic)
        }),
        SiteKind::Amidine => Box::new(|i| {
            neutral(mol, i)
                && is(mol, i, 7)
                && !mol.atom(i).aromatic
                && !mol.neighbor_atoms(i).any(|n| is(mol, n, 8))
                && mol.neighbors(i).iter().any(|&(c, b)| {
                    mol.bond(b).order == BondOrder::Double
                        && is(mol, c, 6)
                        && !mol.atom(c).aromatic
                        && mol.neighbors(c).iter().any(|&(m, cb)| {
                            m != i && is(mol, m, 7) && mol.bond(cb).order == BondOrder::Single
                        })
                })
        }),
    };
    (0..mol.atom_count()).filter(|&i| matcher(i)).collect()
}

#[inline]
fn is(mol: &Molecule, idx: usize, atomic_number: u8) -> bool {
    mol.atom(idx).atomic_number() == atomic_number
}

#[inline]
fn neutral(mol: &Molecule, idx: usize) -> bool {
    mol.atom(idx).formal_charge == 0
}

fn heavy_neighbors(mol: &Molecule, idx: usize) -> impl Iterator<Item = usize> + '_ {
    mol.neighbor_atoms(idx).filter(|&n| !mol.atom(n).is_hydrogen())
}

/// Number of oxygens or sulfurs double-bonded to `idx`.
fn oxo_count(mol: &Molecule, idx: usize) -> usize {
    mol.neighbors(idx)
        .iter()
        .filter(|&&(n, b)| {
            mol.bond(b).order == BondOrder::Double
                && matches!(mol.atom(n).atomic_number(), 8 | 16)
        })
        .count()
}

fn is_saturated(mol: &Molecule, idx: usize) -> bool {
    !mol.atom(idx).aromatic
        && mol
            .neighbors(idx)
            .iter()
            .all(|&(_, b)| mol.bond(b).order == BondOrder::Single)
}

/// A neutral O-H whose only heavy neighbour satisfies `carrier`.
fn hydroxyl_on(mol: &Molecule, idx: usize, carrier: impl Fn(usize) -> bool) -> bool {
    neutral(mol, idx)
        && is(mol, idx, 8)
        && mol.total_hydrogens(idx) == 1
        && mol.heavy_degree(idx) == 1
        && heavy_neighbors(mol, idx).all(carrier)
}

fn first_hydroxyl_on_neighbor(mol: &Molecule, idx: usize) -> bool {
    heavy_neighbors(mol, idx).all(|p| {
        heavy_neighbors(mol, p)
            .find(|&o| is(mol, o, 8) && mol.total_hydrogens(o) == 1 && mol.heavy_degree(o) == 1)
            == Some(idx)
    })
}

/// Neutral, non-aromatic nitrogen with only single bonds.
fn amine_nitrogen(mol: &Molecule, idx: usize) -> bool {
    neutral(mol, idx) && is(mol, idx, 7) && is_saturated(mol, idx)
}

fn aliphatic_amine(mol: &Molecule, idx: usize, hydrogens: usize) -> bool {
    amine_nitrogen(mol, idx)
        && mol.total_hydrogens(idx) == hydrogens
        && mol.heavy_degree(idx) == 3 - hydrogens
        && heavy_neighbors(mol, idx).all(|n| is(mol, n, 6) && is_saturated(mol, n))
}

fn pyridine_like(mol: &Molecule, idx: usize) -> bool {
    let atom = mol.atom(idx);
    atom.aromatic
        && is(mol, idx, 7)
        && atom.formal_charge == 0
        && mol.total_hydrogens(idx) == 0
        && mol.heavy_degree(idx) == 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::smiles;

    fn kinds(smiles: &str) -> Vec<(usize, SiteKind)> {
        let library = SiteLibrary::builtin().unwrap();
        let mol = smiles::parse(smiles).unwrap();
        library
            .find_sites(&mol)
            .into_iter()
            .map(|m| (m.atom, m.definition.kind))
            .collect()
    }

    #[test]
    fn builtin_library_loads() {
        let library = SiteLibrary::builtin().unwrap();
        assert_eq!(library.sites().len(), 15);
        assert!(library.sites().iter().any(|s| s.kind == SiteKind::Imidazole));
    }

    #[test]
    fn finds_acids() {
        assert_eq!(kinds("CC(=O)O"), vec![(3, SiteKind::CarboxylicAcid)]);
        assert_eq!(kinds("Oc1ccccc1"), vec![(0, SiteKind::Phenol)]);
        assert_eq!(kinds("CS(=O)(=O)O"), vec![(4, SiteKind::SulfonicAcid)]);
        assert_eq!(kinds("CCS"), vec![(2, SiteKind::Thiol)]);
        assert_eq!(kinds("CP(=O)(O)O"), vec![(3, SiteKind::PhosphonicAcid)]);
        assert_eq!(kinds("Cc1nn[nH]n1"), vec![(4, SiteKind::Tetrazole)]);
    }

    #[test]
    fn finds_bases() {
        assert_eq!(kinds("CCN"), vec![(2, SiteKind::PrimaryAmine)]);
        assert_eq!(kinds("CNC"), vec![(1, SiteKind::SecondaryAmine)]);
        assert_eq!(kinds("CN(C)C"), vec![(1, SiteKind::TertiaryAmine)]);
        assert_eq!(kinds("Nc1ccccc1"), vec![(0, SiteKind::Aniline)]);
        assert_eq!(kinds("c1ccncc1"), vec![(3, SiteKind::AromaticNitrogen)]);
        assert_eq!(kinds("c1c[nH]cn1"), vec![(4, SiteKind::Imidazole)]);
        assert_eq!(kinds("NC(=N)N"), vec![(2, SiteKind::Amidine)]);
    }

    #[test]
    fn amides_and_ethers_are_not_sites() {
        assert!(kinds("CC(=O)NC").is_empty());
        assert!(kinds("COC").is_empty());
        assert!(kinds("CC(=O)OC").is_empty());
    }

    #[test]
    fn rejects_negative_spread() {
        let toml = "[[site]]\nname = \"x\"\nkind = \"phenol\"\npka = 1.0\nstdev = -1.0\n";
        assert!(matches!(
            SiteLibrary::from_toml_str(toml, "test"),
            Err(SiteLibraryError::InvalidSpread { .. })
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.toml");
        std::fs::write(
            &path,
            "[[site]]\nname = \"Thiol\"\nkind = \"thiol\"\npka = 9.0\nstdev = 1.0\n",
        )
        .unwrap();
        let library = SiteLibrary::load(&path).unwrap();
        assert_eq!(library.sites().len(), 1);
        assert!(SiteLibrary::load(&dir.path().join("missing.toml")).is_err());
    }
}
