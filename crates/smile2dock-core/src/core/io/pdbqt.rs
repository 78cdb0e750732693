use super::traits::MolecularFile;
use super::{Structure, WriteError, atom_names, pdb_atom_name};
use crate::core::descriptors::lipinski::is_rotatable;
use crate::core::models::molecule::Molecule;
use crate::core::perception::hybridization::is_conjugated_lone_pair;
use crate::core::perception::rings::ring_bond_flags;
use std::collections::VecDeque;
use std::io::Write;

const MAX_SERIAL: usize = 99_999;

#[derive(Debug, Clone, PartialEq)]
pub struct PdbqtMetadata {
    pub residue_name: String,
}

impl Default for PdbqtMetadata {
    fn default() -> Self {
        Self {
            residue_name: "UNL".to_string(),
        }
    }
}

/// AutoDock ligand PDBQT with a torsion tree.
pub struct PdbqtFile;

fn is_polar_hydrogen(mol: &Molecule, idx: usize) -> bool {
    mol.atom(idx).is_hydrogen()
        && mol
            .neighbor_atoms(idx)
            .any(|n| matches!(mol.atom(n).atomic_number(), 7 | 8 | 16))
}

/// AutoDock 4 atom type.
pub fn autodock_type(mol: &Molecule, idx: usize) -> &'static str {
    let atom = mol.atom(idx);
    match atom.atomic_number() {
        1 if is_polar_hydrogen(mol, idx) => "HD",
        1 => "H",
        6 if atom.aromatic => "A",
        6 => "C",
        7 => {
            let donor_only = atom.formal_charge > 0
                || mol.total_degree(idx) >= 4
                || (atom.aromatic && mol.total_hydrogens(idx) > 0)
                || is_conjugated_lone_pair(mol, idx);
            if donor_only { "N" } else { "NA" }
        }
        8 => "OA",
        16 if !atom.aromatic && mol.degree(idx) <= 2 && mol.bond_order_sum(idx) <= 2 => "SA",
        16 => "S",
        9 => "F",
        17 => "Cl",
        35 => "Br",
        53 => "I",
        15 => "P",
        _ => atom.symbol(),
    }
}

/// Rigid fragments joined by rotatable bonds, rooted at the most central one.
#[derive(Debug)]
struct TorsionTree {
    fragments: Vec<Vec<usize>>,
    /// Fragments written inside `ROOT`: the main root and the root of every
    /// other disconnected component.
    roots: Vec<usize>,
    /// Per fragment: `(child fragment, atom in parent, atom in child)`.
    children: Vec<Vec<(usize, usize, usize)>>,
    torsions: usize,
}

impl TorsionTree {
    fn build(mol: &Molecule, kept: &[bool]) -> Self {
        let n = mol.atom_count();
        let ring = ring_bond_flags(mol);
        let rotatable: Vec<bool> = (0..mol.bond_count())
            .map(|b| is_rotatable(mol, &ring, b))
            .collect();

        let mut fragment_of = vec![usize::MAX; n];
        let mut fragments: Vec<Vec<usize>> = Vec::new();
        for start in (0..n).filter(|&i| kept[i]) {
            if fragment_of[start] != usize::MAX {
                continue;
            }
            let id = fragments.len();
            let mut members = vec![start];
            fragment_of[start] = id;
            let mut queue = VecDeque::from([start]);
            while let Some(a) = queue.pop_front() {
                for &(nb, b) in mol.neighbors(a) {
                    if kept[nb] && !rotatable[b] && fragment_of[nb] == usize::MAX {
                        fragment_of[nb] = id;
                        members.push(nb);
                        queue.push_back(nb);
                    }
                }
            }
            members.sort_unstable();
            fragments.push(members);
        }

        let mut links: Vec<Vec<(usize, usize, usize)>> = vec![Vec::new(); fragments.len()];
        let mut torsions = 0;
        for (b, bond) in mol.bonds().iter().enumerate() {
            if rotatable[b] {
                let (fa, fb) = (fragment_of[bond.begin], fragment_of[bond.end]);
                links[fa].push((fb, bond.begin, bond.end));
                links[fb].push((fa, bond.end, bond.begin));
                torsions += 1;
            }
        }

        let topo = mol.topological_distances();
        let mut visited = vec![false; fragments.len()];
        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); fragments.len()];
        for component in mol.fragments() {
            let heavy: Vec<usize> = component.iter().copied().filter(|&i| kept[i]).collect();
            let centre = heavy
                .iter()
                .copied()
                .min_by_key(|&i| heavy.iter().map(|&j| topo[i][j]).max().unwrap_or(0));
            let Some(centre) = centre else { continue };
            let root = fragment_of[centre];
            if visited[root] {
                continue;
            }
            visited[root] = true;
            roots.push(root);
            let mut queue = VecDeque::from([root]);
            while let Some(f) = queue.pop_front() {
                for &(child, parent_atom, child_atom) in &links[f] {
                    if !visited[child] {
                        visited[child] = true;
                        children[f].push((child, parent_atom, child_atom));
                        queue.push_back(child);
                    }
                }
            }
        }

        Self {
            fragments,
            roots,
            children,
            torsions,
        }
    }

    /// Atoms in writing order: the root block, then each branch depth-first
    /// with its attachment atom first.
    fn write_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = self
            .roots
            .iter()
            .flat_map(|&r| self.fragments[r].iter().copied())
            .collect();
        for &r in &self.roots {
            self.branch_order(r, &mut order);
        }
        order
    }

    fn branch_order(&self, fragment: usize, order: &mut Vec<usize>) {
        for &(child, _, child_atom) in &self.children[fragment] {
            order.push(child_atom);
            order.extend(
                self.fragments[child]
                    .iter()
                    .copied()
                    .filter(|&a| a != child_atom),
            );
            self.branch_order(child, order);
        }
    }
}

struct AtomWriter<'a, 'b> {
    structure: &'a Structure<'b>,
    names: Vec<String>,
    charges: Vec<f64>,
    serial: Vec<usize>,
    residue_name: &'a str,
}

impl AtomWriter<'_, '_> {
    fn atom(&self, writer: &mut impl Write, idx: usize) -> Result<(), WriteError> {
        let mol = self.structure.molecule;
        let p = self.structure.position(idx);
        writeln!(
            writer,
            "ATOM  {:>5} {} {:>3}  {:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}    {:>6.3} {:<2}",
            self.serial[idx],
            pdb_atom_name(&self.names[idx], mol.atom(idx).symbol()),
            self.residue_name,
            1,
            p.x,
            p.y,
            p.z,
            0.0,
            0.0,
            self.charges[idx],
            autodock_type(mol, idx)
        )?;
        Ok(())
    }

    fn branch(
        &self,
        tree: &TorsionTree,
        fragment: usize,
        writer: &mut impl Write,
    ) -> Result<(), WriteError> {
        for &(child, parent_atom, child_atom) in &tree.children[fragment] {
            let (a, b) = (self.serial[parent_atom], self.serial[child_atom]);
            writeln!(writer, "BRANCH {a:>3} {b:>3}")?;
            self.atom(writer, child_atom)?;
            for &atom in tree.fragments[child].iter().filter(|&&x| x != child_atom) {
                self.atom(writer, atom)?;
            }
            self.branch(tree, child, writer)?;
            writeln!(writer, "ENDBRANCH {a:>3} {b:>3}")?;
        }
        Ok(())
    }
}

impl MolecularFile for PdbqtFile {
    type Metadata = PdbqtMetadata;
    type Error = WriteError;

    fn write_to(
        structure: &Structure<'_>,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let mol = structure.molecule;
        if mol.atom_count() > MAX_SERIAL {
            return Err(WriteError::TooManyAtoms {
                format: "PDBQT",
                count: mol.atom_count(),
            });
        }

        // Non-polar hydrogens are folded into the atom carrying them.
        let kept: Vec<bool> = (0..mol.atom_count())
            .map(|i| !mol.atom(i).is_hydrogen() || is_polar_hydrogen(mol, i))
            .collect();
        let mut charges = structure.charges.to_vec();
        for i in (0..mol.atom_count()).filter(|&i| !kept[i]) {
            if let Some(heavy) = mol.neighbor_atoms(i).next() {
                charges[heavy] += charges[i];
            }
        }

        let tree = TorsionTree::build(mol, &kept);
        let mut serial = vec![0; mol.atom_count()];
        for (pos, atom) in tree.write_order().into_iter().enumerate() {
            serial[atom] = pos + 1;
        }
        let names = atom_names(mol);
        let atoms = AtomWriter {
            structure,
            names,
            charges,
            serial,
            residue_name: &metadata.residue_name,
        };

        writeln!(writer, "REMARK  Name = {}", structure.title)?;
        writeln!(writer, "REMARK  {} active torsions:", tree.torsions)?;
        writeln!(writer, "REMARK  status: ('A' for Active; 'I' for Inactive)")?;
        let mut index = 0;
        for &f in &tree.roots {
            index = remark_torsions(&tree, &atoms, f, index, writer)?;
        }

        writeln!(writer, "ROOT")?;
        for &r in &tree.roots {
            for &atom in &tree.fragments[r] {
                atoms.atom(writer, atom)?;
            }
        }
        writeln!(writer, "ENDROOT")?;
        for &r in &tree.roots {
            atoms.branch(&tree, r, writer)?;
        }
        writeln!(writer, "TORSDOF {}", tree.torsions)?;
        Ok(())
    }
}

fn remark_torsions(
    tree: &TorsionTree,
    atoms: &AtomWriter<'_, '_>,
    fragment: usize,
    mut index: usize,
    writer: &mut impl Write,
) -> Result<usize, WriteError> {
    for &(child, parent_atom, child_atom) in &tree.children[fragment] {
        index += 1;
        writeln!(
            writer,
            "REMARK {index:>4}  A    between atoms: {}_{}  and  {}_{}",
            atoms.names[parent_atom],
            atoms.serial[parent_atom],
            atoms.names[child_atom],
            atoms.serial[child_atom]
        )?;
        index = remark_torsions(tree, atoms, child, index, writer)?;
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::test_support::{prepared, render};
    use crate::core::perception::add_hydrogens;
    use crate::core::smiles;

    fn atom_lines(text: &str) -> Vec<&str> {
        text.lines().filter(|l| l.starts_with("ATOM")).collect()
    }

    #[test]
    fn assigns_autodock_types() {
        let mol = add_hydrogens(&smiles::parse("c1ccncc1O").unwrap());
        let types: Vec<_> = (0..mol.atom_count()).map(|i| autodock_type(&mol, i)).collect();
        assert_eq!(&types[..7], &["A", "A", "A", "NA", "A", "A", "OA"]);
        assert!(types.contains(&"HD"));
        let mol = add_hydrogens(&smiles::parse("CC(=O)NC").unwrap());
        assert_eq!(autodock_type(&mol, 3), "N");
        let mol = add_hydrogens(&smiles::parse("c1cc[nH]c1").unwrap());
        assert_eq!(autodock_type(&mol, 3), "N");
        let mol = smiles::parse("CSC").unwrap();
        assert_eq!(autodock_type(&mol, 1), "SA");
    }

    #[test]
    fn merges_nonpolar_hydrogens_and_sums_charges() {
        let (mol, conf, charges) = prepared("CO");
        let s = Structure::new(&mol, &conf, &charges, "methanol").unwrap();
        let text = render::<PdbqtFile>(&s);
        let lines = atom_lines(&text);
        // C, O and the hydroxyl hydrogen.
        assert_eq!(lines.len(), 3);
        let total: f64 = lines
            .iter()
            .map(|l| l[70..76].trim().parse::<f64>().unwrap())
            .sum();
        assert!(total.abs() < 5e-3);
        assert!(lines.iter().any(|l| l.ends_with("HD")));
    }

    #[test]
    fn rigid_molecule_has_only_a_root() {
        let (mol, conf, charges) = prepared("c1ccccc1");
        let s = Structure::new(&mol, &conf, &charges, "").unwrap();
        let text = render::<PdbqtFile>(&s);
        assert!(text.contains("ROOT\n"));
        assert!(!text.contains("BRANCH"));
        assert!(text.ends_with("TORSDOF 0\n"));
        assert_eq!(atom_lines(&text).len(), 6);
    }

    #[test]
    fn rotatable_bonds_open_branches() {
        let (mol, conf, charges) = prepared("CCCCC");
        let s = Structure::new(&mol, &conf, &charges, "pentane").unwrap();
        let text = render::<PdbqtFile>(&s);
        assert!(text.contains("REMARK  2 active torsions:"));
        assert_eq!(text.matches("\nBRANCH").count(), 2);
        assert_eq!(text.matches("\nENDBRANCH").count(), 2);
        assert!(text.ends_with("TORSDOF 2\n"));

        let serials: Vec<usize> = atom_lines(&text)
            .iter()
            .map(|l| l[6..11].trim().parse().unwrap())
            .collect();
        assert_eq!(serials, (1..=5).collect::<Vec<_>>());

        // Root is the central carbon; each branch names an atom already written.
        let first_branch = text.lines().find(|l| l.starts_with("BRANCH")).unwrap();
        let parts: Vec<usize> = first_branch
            .split_whitespace()
            .skip(1)
            .map(|x| x.parse().unwrap())
            .collect();
        assert_eq!(parts[0], 1);
        assert!(parts[1] > parts[0]);
    }
}
