use super::traits::MolecularFile;
use super::{Structure, WriteError, atom_names};
use crate::core::models::bond::BondOrder;
use crate::core::models::molecule::Molecule;
use crate::core::perception::hybridization::{Hybridization, hybridization, is_conjugated_lone_pair};
use std::io::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct Mol2Metadata {
    pub substructure_name: String,
    pub charge_type: String,
}

impl Default for Mol2Metadata {
    fn default() -> Self {
        Self {
            substructure_name: "UNL1".to_string(),
            charge_type: "GASTEIGER".to_string(),
        }
    }
}

/// Tripos MOL2.
pub struct Mol2File;

fn count_neighbors(mol: &Molecule, idx: usize, atomic_number: u8) -> usize {
    mol.neighbor_atoms(idx)
        .filter(|&n| mol.atom(n).atomic_number() == atomic_number)
        .count()
}

fn double_bonded_oxygens(mol: &Molecule, idx: usize) -> usize {
    mol.neighbors(idx)
        .iter()
        .filter(|&&(n, b)| {
            mol.atom(n).atomic_number() == 8 && mol.bond(b).order == BondOrder::Double
        })
        .count()
}

/// Carboxylate or carboxylic-acid carbon: a carbon with two terminal oxygens.
fn is_carboxyl_carbon(mol: &Molecule, idx: usize) -> bool {
    mol.atom(idx).atomic_number() == 6
        && mol
            .neighbor_atoms(idx)
            .filter(|&n| mol.atom(n).atomic_number() == 8 && mol.heavy_degree(n) == 1)
            .count()
            == 2
}

fn is_amide_nitrogen(mol: &Molecule, idx: usize) -> bool {
    mol.neighbor_atoms(idx).any(|c| {
        mol.atom(c).atomic_number() == 6
            && mol.neighbors(c).iter().any(|&(o, b)| {
                matches!(mol.atom(o).atomic_number(), 8 | 16)
                    && mol.bond(b).order == BondOrder::Double
            })
    })
}

/// SYBYL atom type.
pub fn sybyl_type(mol: &Molecule, idx: usize) -> String {
    let atom = mol.atom(idx);
    let ty = match atom.atomic_number() {
        1 => "H",
        6 => {
            if atom.aromatic {
                "C.ar"
            } else if count_neighbors(mol, idx, 7) == 3
                && mol.neighbor_atoms(idx).any(|n| mol.atom(n).formal_charge > 0)
            {
                "C.cat"
            } else {
                match hybridization(mol, idx) {
                    Hybridization::Sp => "C.1",
                    Hybridization::Sp2 => "C.2",
                    _ => "C.3",
                }
            }
        }
        7 => {
            if atom.aromatic {
                "N.ar"
            } else if mol.total_degree(idx) == 4 && atom.formal_charge > 0 {
                "N.4"
            } else if hybridization(mol, idx) == Hybridization::Sp {
                "N.1"
            } else if count_neighbors(mol, idx, 8) >= 2 && double_bonded_oxygens(mol, idx) > 0 {
                "N.pl3"
            } else if mol
                .neighbors(idx)
                .iter()
                .any(|&(_, b)| mol.bond(b).order == BondOrder::Double)
            {
                "N.2"
            } else if is_amide_nitrogen(mol, idx) {
                "N.am"
            } else if is_conjugated_lone_pair(mol, idx) {
                "N.pl3"
            } else {
                "N.3"
            }
        }
        8 => {
            let carboxyl = mol
                .neighbor_atoms(idx)
                .any(|c| is_carboxyl_carbon(mol, c));
            if carboxyl && mol.heavy_degree(idx) == 1 {
                "O.co2"
            } else if mol
                .neighbors(idx)
                .iter()
                .any(|&(_, b)| mol.bond(b).order == BondOrder::Double)
                || atom.aromatic
            {
                "O.2"
            } else {
                "O.3"
            }
        }
        15 => "P.3",
        16 => match double_bonded_oxygens(mol, idx) {
            0 if mol
                .neighbors(idx)
                .iter()
                .any(|&(_, b)| mol.bond(b).order == BondOrder::Double) =>
            {
                "S.2"
            }
            0 => "S.3",
            1 => "S.O",
            _ => "S.O2",
        },
        _ => atom.symbol(),
    };
    ty.to_string()
}

/// MOL2 bond type: `ar` for aromatic bonds, `am` for amide C-N, else the order.
fn bond_type(mol: &Molecule, bond_idx: usize) -> &'static str {
    let bond = mol.bond(bond_idx);
    match bond.order {
        BondOrder::Aromatic => "ar",
        BondOrder::Double => "2",
        BondOrder::Triple => "3",
        BondOrder::Single => {
            let amide = |c: usize, n: usize| {
                mol.atom(c).atomic_number() == 6
                    && mol.atom(n).atomic_number() == 7
                    && !mol.atom(n).aromatic
                    && mol.neighbors(c).iter().any(|&(o, b)| {
                        mol.atom(o).atomic_number() == 8 && mol.bond(b).order == BondOrder::Double
                    })
            };
            if amide(bond.begin, bond.end) || amide(bond.end, bond.begin) {
                "am"
            } else {
                "1"
            }
        }
    }
}

impl MolecularFile for Mol2File {
    type Metadata = Mol2Metadata;
    type Error = WriteError;

    fn write_to(
        structure: &Structure<'_>,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let mol = structure.molecule;
        let names = atom_names(mol);

        writeln!(writer, "@<TRIPOS>MOLECULE")?;
        writeln!(writer, "{}", structure.title)?;
        writeln!(writer, " {} {} 1 0 0", mol.atom_count(), mol.bond_count())?;
        writeln!(writer, "SMALL")?;
        writeln!(writer, "{}", metadata.charge_type)?;
        writeln!(writer)?;

        writeln!(writer, "@<TRIPOS>ATOM")?;
        for i in 0..mol.atom_count() {
            let p = structure.position(i);
            writeln!(
                writer,
                "{:>7} {:<8}{:>10.4}{:>10.4}{:>10.4} {:<6}{:>4}  {:<8}{:>10.4}",
                i + 1,
                names[i],
                p.x,
                p.y,
                p.z,
                sybyl_type(mol, i),
                1,
                metadata.substructure_name,
                structure.charges[i]
            )?;
        }

        writeln!(writer, "@<TRIPOS>BOND")?;
        for (b, bond) in mol.bonds().iter().enumerate() {
            writeln!(
                writer,
                "{:>6}{:>6}{:>6} {}",
                b + 1,
                bond.begin + 1,
                bond.end + 1,
                bond_type(mol, b)
            )?;
        }

        writeln!(writer, "@<TRIPOS>SUBSTRUCTURE")?;
        writeln!(
            writer,
            "{:>6} {:<8}{:>6} GROUP             0 ****  ****    0",
            1, metadata.substructure_name, 1
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::test_support::{prepared, render};
    use crate::core::perception::add_hydrogens;
    use crate::core::smiles;

    fn types(s: &str) -> Vec<String> {
        let mol = add_hydrogens(&smiles::parse(s).unwrap());
        (0..mol.atom_count()).map(|i| sybyl_type(&mol, i)).collect()
    }

    #[test]
    fn assigns_sybyl_types() {
        let t = types("CC(=O)Nc1ccccc1");
        assert_eq!(&t[..5], &["C.3", "C.2", "O.2", "N.am", "C.ar"]);
        let t = types("CC(=O)[O-]");
        assert_eq!(&t[..4], &["C.3", "C.2", "O.co2", "O.co2"]);
        assert_eq!(types("C[NH3+]")[1], "N.4");
        assert_eq!(types("CC#N")[2], "N.1");
        assert_eq!(types("CS(=O)(=O)C")[1], "S.O2");
        assert_eq!(types("C[N+](=O)[O-]")[1], "N.pl3");
        assert_eq!(types("c1ccccc1N")[6], "N.pl3");
        assert_eq!(types("CCl")[1], "Cl");
    }

    #[test]
    fn writes_sections_with_charges() {
        let (mol, conf, charges) = prepared("CC(=O)NC");
        let s = Structure::new(&mol, &conf, &charges, "nma").unwrap();
        let text = render::<Mol2File>(&s);
        assert!(text.starts_with("@<TRIPOS>MOLECULE\nnma\n"));
        assert!(text.contains("SMALL\nGASTEIGER\n"));
        let atom_lines: Vec<&str> = text
            .lines()
            .skip_while(|l| *l != "@<TRIPOS>ATOM")
            .skip(1)
            .take(mol.atom_count())
            .collect();
        assert_eq!(atom_lines.len(), mol.atom_count());
        let q: f64 = atom_lines[2].split_whitespace().last().unwrap().parse().unwrap();
        assert!((q - charges[2]).abs() < 1e-4);
        assert!(text.contains(" am\n"));
    }

    #[test]
    fn aromatic_bonds_are_marked() {
        let (mol, conf, charges) = prepared("c1ccncc1");
        let s = Structure::new(&mol, &conf, &charges, "").unwrap();
        let text = render::<Mol2File>(&s);
        assert_eq!(text.matches(" ar\n").count(), 6);
    }
}
