use super::traits::MolecularFile;
use super::{Structure, WriteError};
use crate::core::models::bond::BondOrder;
use crate::core::perception::kekulize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const PROGRAM: &str = "smile2dk";
const MAX_V2000_ENTRIES: usize = 999;
const ENTRIES_PER_PROPERTY_LINE: usize = 8;

/// SD data items appended after the molfile block of every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SdfMetadata {
    pub data: Vec<(String, String)>,
}

/// MDL V2000 structure-data file.
pub struct SdfFile;

/// Charge code of the V2000 atom block.
fn charge_code(charge: i8) -> u8 {
    match charge {
        3 => 1,
        2 => 2,
        1 => 3,
        -1 => 5,
        -2 => 6,
        -3 => 7,
        _ => 0,
    }
}

fn bond_code(order: BondOrder) -> u8 {
    match order {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
        BondOrder::Aromatic => 4,
    }
}

fn write_property_lines(
    writer: &mut impl Write,
    tag: &str,
    entries: &[(usize, i32)],
) -> Result<(), WriteError> {
    for chunk in entries.chunks(ENTRIES_PER_PROPERTY_LINE) {
        write!(writer, "M  {tag}{:>3}", chunk.len())?;
        for (atom, value) in chunk {
            write!(writer, " {:>3} {:>3}", atom + 1, value)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

impl SdfFile {
    /// Writes one record per structure.
    pub fn write_records(
        structures: &[Structure<'_>],
        metadata: &SdfMetadata,
        writer: &mut impl Write,
    ) -> Result<(), WriteError> {
        for structure in structures {
            Self::write_to(structure, metadata, writer)?;
        }
        Ok(())
    }

    pub fn write_records_to_path<P: AsRef<Path>>(
        structures: &[Structure<'_>],
        metadata: &SdfMetadata,
        path: P,
    ) -> Result<(), WriteError> {
        let mut writer = BufWriter::new(File::create(path)?);
        Self::write_records(structures, metadata, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl MolecularFile for SdfFile {
    type Metadata = SdfMetadata;
    type Error = WriteError;

    fn write_to(
        structure: &Structure<'_>,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let mol = structure.molecule;
        for count in [mol.atom_count(), mol.bond_count()] {
            if count > MAX_V2000_ENTRIES {
                return Err(WriteError::TooManyAtoms {
                    format: "SDF V2000",
                    count,
                });
            }
        }
        let orders = kekulize(mol)?;

        writeln!(writer, "{}", structure.title)?;
        writeln!(writer, "  {PROGRAM:<8}{:10}3D", "")?;
        match structure.conformer.energy {
            Some(e) => writeln!(writer, "Energy {e:.4} kcal/mol")?,
            None => writeln!(writer)?,
        }
        let chiral = mol.atoms().iter().any(|a| a.chirality.is_some()) as u8;
        writeln!(
            writer,
            "{:>3}{:>3}  0  0{:>3}  0  0  0  0  0999 V2000",
            mol.atom_count(),
            mol.bond_count(),
            chiral
        )?;

        for (i, atom) in mol.atoms().iter().enumerate() {
            let p = structure.position(i);
            writeln!(
                writer,
                "{:>10.4}{:>10.4}{:>10.4} {:<3} 0{:>3}  0  0  0  0  0  0  0  0  0  0",
                p.x,
                p.y,
                p.z,
                atom.symbol(),
                charge_code(atom.formal_charge)
            )?;
        }
        for (bond, order) in mol.bonds().iter().zip(&orders) {
            writeln!(
                writer,
                "{:>3}{:>3}{:>3}  0",
                bond.begin + 1,
                bond.end + 1,
                bond_code(*order)
            )?;
        }

        let charges: Vec<(usize, i32)> = mol
            .atoms()
            .iter()
            .enumerate()
            .filter(|(_, a)| a.formal_charge != 0)
            .map(|(i, a)| (i, a.formal_charge as i32))
            .collect();
        write_property_lines(writer, "CHG", &charges)?;
        let isotopes: Vec<(usize, i32)> = mol
            .atoms()
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.isotope.map(|iso| (i, iso as i32)))
            .collect();
        write_property_lines(writer, "ISO", &isotopes)?;
        writeln!(writer, "M  END")?;

        for (name, value) in &metadata.data {
            writeln!(writer, ">  <{name}>")?;
            writeln!(writer, "{value}")?;
            writeln!(writer)?;
        }
        writeln!(writer, "$$$$")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::test_support::{prepared, render};

    #[test]
    fn writes_counts_line_and_terminator() {
        let (mol, conf, charges) = prepared("CCO");
        let s = Structure::new(&mol, &conf, &charges, "ethanol").unwrap();
        let text = render::<SdfFile>(&s);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ethanol");
        assert!(lines[3].starts_with("  9  8  0  0  0"));
        assert!(lines[3].ends_with("V2000"));
        assert_eq!(lines[4].len(), 69);
        assert_eq!(&lines[4][31..34], "C  ");
        assert!(text.contains("M  END\n$$$$\n"));
    }

    #[test]
    fn aromatic_bonds_are_kekulized() {
        let (mol, conf, charges) = prepared("c1ccccc1");
        let s = Structure::new(&mol, &conf, &charges, "benzene").unwrap();
        let text = render::<SdfFile>(&s);
        let bond_lines: Vec<&str> = text.lines().skip(4 + mol.atom_count()).take(6).collect();
        let doubles = bond_lines.iter().filter(|l| &l[6..9] == "  2").count();
        assert_eq!(doubles, 3);
        assert!(!text.lines().any(|l| l.len() == 12 && &l[6..9] == "  4"));
    }

    #[test]
    fn charges_go_to_atom_block_and_chg_lines() {
        let (mol, conf, charges) = prepared("C[NH3+]");
        let s = Structure::new(&mol, &conf, &charges, "").unwrap();
        let text = render::<SdfFile>(&s);
        let n_line = text.lines().nth(5).unwrap();
        assert_eq!(&n_line[36..39], "  3");
        assert!(text.contains("M  CHG  1   2   1\n"));
    }

    #[test]
    fn data_items_and_multiple_records() {
        let (mol, conf, charges) = prepared("C");
        let s = Structure::new(&mol, &conf, &charges, "methane").unwrap();
        let metadata = SdfMetadata {
            data: vec![("SMILES".into(), "C".into())],
        };
        let mut out = Vec::new();
        SdfFile::write_records(&[s, s], &metadata, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("$$$$").count(), 2);
        assert!(text.contains(">  <SMILES>\nC\n\n$$$$"));
    }
}
