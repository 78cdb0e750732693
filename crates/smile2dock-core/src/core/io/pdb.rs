use super::traits::MolecularFile;
use super::{Structure, WriteError, atom_names, pdb_atom_name};
use crate::core::models::bond::BondOrder;
use crate::core::perception::kekulize;
use std::io::Write;

const MAX_SERIAL: usize = 99_999;
const CONECT_PER_LINE: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct PdbMetadata {
    pub residue_name: String,
    pub author: String,
}

impl Default for PdbMetadata {
    fn default() -> Self {
        Self {
            residue_name: "UNL".to_string(),
            author: "GENERATED BY SMILE2DOCK".to_string(),
        }
    }
}

/// Protein Data Bank format with the ligand as `HETATM` records.
pub struct PdbFile;

fn charge_field(charge: i8) -> String {
    match charge {
        0 => "  ".to_string(),
        c if c > 0 => format!("{c}+"),
        c => format!("{}-", -c),
    }
}

/// Neighbour list per atom, each neighbour repeated once per bond order unit.
fn conect_lists(structure: &Structure<'_>) -> Result<Vec<Vec<usize>>, WriteError> {
    let mol = structure.molecule;
    let orders = kekulize(mol)?;
    let mut lists = vec![Vec::new(); mol.atom_count()];
    for (bond, order) in mol.bonds().iter().zip(&orders) {
        let repeat = match order {
            BondOrder::Aromatic => 1,
            o => o.integer() as usize,
        };
        for _ in 0..repeat {
            lists[bond.begin].push(bond.end);
            lists[bond.end].push(bond.begin);
        }
    }
    for list in &mut lists {
        list.sort_unstable();
    }
    Ok(lists)
}

impl MolecularFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = WriteError;

    fn write_to(
        structure: &Structure<'_>,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let mol = structure.molecule;
        if mol.atom_count() > MAX_SERIAL {
            return Err(WriteError::TooManyAtoms {
                format: "PDB",
                count: mol.atom_count(),
            });
        }
        let names = atom_names(mol);
        let conect = conect_lists(structure)?;

        writeln!(writer, "COMPND    {}", structure.title)?;
        writeln!(writer, "AUTHOR    {}", metadata.author)?;
        for (i, atom) in mol.atoms().iter().enumerate() {
            let p = structure.position(i);
            writeln!(
                writer,
                "HETATM{:>5} {} {:>3}  {:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}{}",
                i + 1,
                pdb_atom_name(&names[i], atom.symbol()),
                metadata.residue_name,
                1,
                p.x,
                p.y,
                p.z,
                1.0,
                0.0,
                atom.symbol().to_ascii_uppercase(),
                charge_field(atom.formal_charge)
            )?;
        }

        let mut conect_lines = 0;
        for (i, list) in conect.iter().enumerate() {
            for chunk in list.chunks(CONECT_PER_LINE) {
                write!(writer, "CONECT{:>5}", i + 1)?;
                for n in chunk {
                    write!(writer, "{:>5}", n + 1)?;
                }
                writeln!(writer)?;
                conect_lines += 1;
            }
        }

        let counts = [0, 0, 0, 0, 0, 0, 0, 0, mol.atom_count(), 0, conect_lines, 0];
        write!(writer, "MASTER    ")?;
        for c in counts {
            write!(writer, "{c:>5}")?;
        }
        writeln!(writer)?;
        writeln!(writer, "END")?;
        Ok(())
    }
}
