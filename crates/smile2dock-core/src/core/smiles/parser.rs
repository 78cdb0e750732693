use super::SmilesError;
use crate::core::models::atom::{Atom, StereoNeighbor, TetrahedralStereo};
use crate::core::models::bond::{Bond, BondDirection, BondOrder};
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use crate::core::perception::aromaticity::{kekulize, perceive_aromaticity};
use crate::core::perception::rings::ring_bond_flags;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Parses a SMILES string.
///
/// Leading and trailing whitespace is ignored; anything after the first inner
/// whitespace is taken as the molecule name. Error positions are byte offsets
/// into the string as given.
#[instrument(level = "debug", skip_all, fields(smiles = %smiles))]
pub fn parse(smiles: &str) -> Result<Molecule, SmilesError> {
    let offset = smiles.len() - smiles.trim_start().len();
    let trimmed = smiles.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::Empty);
    }
    let (body, name) = match trimmed.split_once(char::is_whitespace) {
        Some((body, name)) => (body, name.trim()),
        None => (trimmed, ""),
    };

    let mut parser = Parser::new(body, offset);
    parser.run()?;
    let mut mol = parser.finish()?;
    mol.name = name.to_string();
    debug!(
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        "Parsed SMILES"
    );
    Ok(mol)
}

/// Hydrogen count a SMILES reader assumes for an atom written without brackets.
pub(super) fn default_implicit_hydrogens(mol: &Molecule, idx: usize) -> u8 {
    let atom = mol.atom(idx);
    let sum = mol.bond_order_sum(idx);
    if atom.aromatic {
        let Some(&lowest) = atom.element.valences.first() else {
            return 0;
        };
        // One valence goes to the pi system unless the atom donates a lone pair.
        if sum < lowest {
            lowest - sum - 1
        } else {
            0
        }
    } else {
        atom.element.implicit_hydrogens(0, sum)
    }
}

/// Elements that may be written without brackets, with their aromatic forms.
pub(super) fn is_organic_subset(element: &Element, aromatic: bool) -> bool {
    if aromatic {
        matches!(element.symbol, "B" | "C" | "N" | "O" | "P" | "S")
    } else {
        matches!(
            element.symbol,
            "B" | "C" | "N" | "O" | "P" | "S" | "F" | "Cl" | "Br" | "I"
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct BondSpec {
    order: Option<BondOrder>,
    direction: BondDirection,
    pos: usize,
}

#[derive(Debug, Clone, Copy)]
struct RingOpening {
    atom: usize,
    bond: Option<BondSpec>,
    /// Index into the opening atom's neighbour order reserved for the partner.
    slot: usize,
    pos: usize,
}

struct Branch {
    atom: usize,
    pos: usize,
    atoms_before: usize,
}

struct Parser<'a> {
    input: &'a [u8],
    offset: usize,
    pos: usize,
    mol: Molecule,
    prev: Option<usize>,
    branches: Vec<Branch>,
    pending: Option<BondSpec>,
    rings: BTreeMap<u16, RingOpening>,
    neighbor_order: Vec<Vec<Option<StereoNeighbor>>>,
    chiral: Vec<Option<bool>>,
    has_from: Vec<bool>,
    bracket_h: Vec<Option<u8>>,
    implicit_aromatic: Vec<usize>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, offset: usize) -> Self {
        Self {
            input: input.as_bytes(),
            offset,
            pos: 0,
            mol: Molecule::new(),
            prev: None,
            branches: Vec::new(),
            pending: None,
            rings: BTreeMap::new(),
            neighbor_order: Vec::new(),
            chiral: Vec::new(),
            has_from: Vec::new(),
            bracket_h: Vec::new(),
            implicit_aromatic: Vec::new(),
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.input.get(self.pos + ahead).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    /// Position in the caller's string.
    #[inline]
    fn at(&self, local: usize) -> usize {
        self.offset + local
    }

    fn unexpected(&self, local: usize) -> SmilesError {
        match self.input.get(local) {
            Some(&ch) => SmilesError::UnexpectedCharacter {
                ch: ch as char,
                pos: self.at(local),
            },
            None => SmilesError::UnexpectedEnd {
                pos: self.at(local),
            },
        }
    }

    fn run(&mut self) -> Result<(), SmilesError> {
        while let Some(ch) = self.peek() {
            match ch {
                b'(' => self.open_branch()?,
                b')' => self.close_branch()?,
                b'-' | b'=' | b'#' | b':' | b'/' | b'\\' => self.bond_symbol(ch)?,
                b'.' => {
                    if self.prev.is_none() || self.pending.is_some() {
                        return Err(self.unexpected(self.pos));
                    }
                    self.advance();
                    self.prev = None;
                }
                b'%' | b'0'..=b'9' => self.ring_bond()?,
                b'[' => self.bracket_atom()?,
                b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I' | b'b' | b'c' | b'n'
                | b'o' | b'p' | b's' => self.organic_atom()?,
                _ => return Err(self.unexpected(self.pos)),
            }
        }
        Ok(())
    }

    fn open_branch(&mut self) -> Result<(), SmilesError> {
        let Some(atom) = self.prev else {
            return Err(self.unexpected(self.pos));
        };
        if let Some(spec) = self.pending {
            return Err(SmilesError::DanglingBond {
                pos: self.at(spec.pos),
            });
        }
        self.branches.push(Branch {
            atom,
            pos: self.pos,
            atoms_before: self.mol.atom_count(),
        });
        self.advance();
        Ok(())
    }

    fn close_branch(&mut self) -> Result<(), SmilesError> {
        let Some(branch) = self.branches.pop() else {
            return Err(SmilesError::UnbalancedParenthesis {
                pos: self.at(self.pos),
            });
        };
        if let Some(spec) = self.pending {
            return Err(SmilesError::DanglingBond {
                pos: self.at(spec.pos),
            });
        }
        if self.mol.atom_count() == branch.atoms_before {
            return Err(self.unexpected(self.pos));
        }
        self.advance();
        self.prev = Some(branch.atom);
        Ok(())
    }

    fn bond_symbol(&mut self, ch: u8) -> Result<(), SmilesError> {
        if self.prev.is_none() || self.pending.is_some() {
            return Err(self.unexpected(self.pos));
        }
        let (order, direction) = match ch {
            b'-' => (BondOrder::Single, BondDirection::None),
            b'=' => (BondOrder::Double, BondDirection::None),
            b'#' => (BondOrder::Triple, BondDirection::None),
            b':' => (BondOrder::Aromatic, BondDirection::None),
            b'/' => (BondOrder::Single, BondDirection::Up),
            _ => (BondOrder::Single, BondDirection::Down),
        };
        self.pending = Some(BondSpec {
            order: Some(order),
            direction,
            pos: self.pos,
        });
        self.advance();
        Ok(())
    }

    fn ring_bond(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        let Some(current) = self.prev else {
            return Err(self.unexpected(start));
        };
        let label = if self.advance() == Some(b'%') {
            match (self.advance(), self.advance()) {
                (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                    (a - b'0') as u16 * 10 + (b - b'0') as u16
                }
                _ => return Err(self.unexpected(start + 1)),
            }
        } else {
            (self.input[start] - b'0') as u16
        };
        let spec = self.pending.take();

        let Some(open) = self.rings.remove(&label) else {
            let slot = self.neighbor_order[current].len();
            self.neighbor_order[current].push(None);
            self.rings.insert(
                label,
                RingOpening {
                    atom: current,
                    bond: spec,
                    slot,
                    pos: start,
                },
            );
            return Ok(());
        };

        let invalid = |reason| SmilesError::InvalidRingClosure {
            label,
            pos: self.at(start),
            reason,
        };
        if open.atom == current {
            return Err(invalid("an atom cannot close a ring to itself"));
        }
        if self.mol.bond_between(open.atom, current).is_some() {
            return Err(invalid("the two atoms are already bonded"));
        }
        let open_order = open.bond.and_then(|s| s.order);
        let close_order = spec.and_then(|s| s.order);
        let order = match (open_order, close_order) {
            (Some(a), Some(b)) if a != b => {
                return Err(invalid("conflicting bond orders on the two ends"));
            }
            (a, b) => a.or(b),
        };
        // Directions are read away from the atom the symbol is written on.
        let direction = match open.bond.map(|s| s.direction) {
            Some(d) if d != BondDirection::None => d,
            _ => spec
                .map(|s| s.direction.flipped())
                .unwrap_or(BondDirection::None),
        };
        self.bond_atoms(open.atom, current, order, direction)?;
        self.neighbor_order[open.atom][open.slot] = Some(StereoNeighbor::Atom(current));
        self.neighbor_order[current].push(Some(StereoNeighbor::Atom(open.atom)));
        Ok(())
    }

    fn bond_atoms(
        &mut self,
        begin: usize,
        end: usize,
        order: Option<BondOrder>,
        direction: BondDirection,
    ) -> Result<(), SmilesError> {
        let both_aromatic = self.mol.atom(begin).aromatic && self.mol.atom(end).aromatic;
        let resolved = match order {
            Some(o) => o,
            None if both_aromatic => BondOrder::Aromatic,
            None => BondOrder::Single,
        };
        let id = self
            .mol
            .push_bond(Bond {
                begin,
                end,
                order: resolved,
                direction,
            })
            .map_err(|_| SmilesError::UnexpectedCharacter {
                ch: self.input.get(self.pos.saturating_sub(1)).map_or('?', |&c| c as char),
                pos: self.at(self.pos.saturating_sub(1)),
            })?;
        if order.is_none() && both_aromatic {
            self.implicit_aromatic.push(id);
        }
        Ok(())
    }

    fn attach(
        &mut self,
        atom: Atom,
        bracket_h: Option<u8>,
        clockwise: Option<bool>,
    ) -> Result<(), SmilesError> {
        let idx = self.mol.add_atom(atom);
        self.neighbor_order.push(Vec::new());
        self.chiral.push(clockwise);
        self.has_from.push(self.prev.is_some());
        self.bracket_h.push(bracket_h);

        if let Some(prev) = self.prev {
            let spec = self.pending.take();
            self.bond_atoms(
                prev,
                idx,
                spec.and_then(|s| s.order),
                spec.map(|s| s.direction).unwrap_or_default(),
            )?;
            self.neighbor_order[idx].push(Some(StereoNeighbor::Atom(prev)));
            self.neighbor_order[prev].push(Some(StereoNeighbor::Atom(idx)));
        }
        if bracket_h.is_some_and(|h| h > 0) {
            self.neighbor_order[idx].push(Some(StereoNeighbor::Implicit));
        }
        self.prev = Some(idx);
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        let Some(ch) = self.advance() else {
            return Err(self.unexpected(start));
        };
        let aromatic = ch.is_ascii_lowercase();
        let symbol = match (ch, self.peek()) {
            (b'B', Some(b'r')) => {
                self.advance();
                "Br"
            }
            (b'C', Some(b'l')) => {
                self.advance();
                "Cl"
            }
            (b'B' | b'b', _) => "B",
            (b'C' | b'c', _) => "C",
            (b'N' | b'n', _) => "N",
            (b'O' | b'o', _) => "O",
            (b'P' | b'p', _) => "P",
            (b'S' | b's', _) => "S",
            (b'F', _) => "F",
            (b'I', _) => "I",
            _ => return Err(self.unexpected(start)),
        };
        let element = Element::by_symbol(symbol).ok_or_else(|| SmilesError::UnknownElement {
            symbol: symbol.to_string(),
            pos: self.at(start),
        })?;
        let mut atom = Atom::new(element);
        atom.aromatic = aromatic;
        self.attach(atom, None, None)
    }

    fn read_number(&mut self, max_digits: usize) -> Option<u32> {
        let mut value = None;
        for _ in 0..max_digits {
            match self.peek() {
                Some(d) if d.is_ascii_digit() => {
                    self.advance();
                    value = Some(value.unwrap_or(0) * 10 + (d - b'0') as u32);
                }
                _ => break,
            }
        }
        value
    }

    fn bracket_atom(&mut self) -> Result<(), SmilesError> {
        let open = self.pos;
        self.advance();
        let bad = |pos: usize, reason| SmilesError::InvalidBracketAtom { pos, reason };

        let isotope = self.read_number(3).map(|n| n as u16);

        let sym_pos = self.pos;
        let Some(first) = self.advance() else {
            return Err(self.unexpected(sym_pos));
        };
        let (symbol, aromatic) = match first {
            b'A'..=b'Z' => {
                let one = (first as char).to_string();
                match self.peek() {
                    Some(second) if second.is_ascii_lowercase() => {
                        let two = format!("{}{}", first as char, second as char);
                        if Element::by_symbol(&two).is_some() {
                            self.advance();
                            (two, false)
                        } else {
                            (one, false)
                        }
                    }
                    _ => (one, false),
                }
            }
            b'a'..=b'z' => match (first, self.peek()) {
                (b's', Some(b'e')) => {
                    self.advance();
                    ("Se".to_string(), true)
                }
                (b'a', Some(b's')) => {
                    self.advance();
                    ("As".to_string(), true)
                }
                (b'b' | b'c' | b'n' | b'o' | b'p' | b's', _) => {
                    ((first.to_ascii_uppercase() as char).to_string(), true)
                }
                _ => {
                    return Err(SmilesError::UnknownElement {
                        symbol: (first as char).to_string(),
                        pos: self.at(sym_pos),
                    });
                }
            },
            b'*' => {
                return Err(SmilesError::UnknownElement {
                    symbol: "*".to_string(),
                    pos: self.at(sym_pos),
                });
            }
            _ => return Err(self.unexpected(sym_pos)),
        };
        let element = Element::by_symbol(&symbol).ok_or_else(|| SmilesError::UnknownElement {
            symbol: symbol.clone(),
            pos: self.at(sym_pos),
        })?;

        let mut clockwise = None;
        if self.peek() == Some(b'@') {
            let stereo_pos = self.pos;
            self.advance();
            if self.peek() == Some(b'@') {
                self.advance();
                clockwise = Some(true);
            } else if self.peek() == Some(b'T') && self.peek_at(1) == Some(b'H') {
                self.pos += 2;
                clockwise = match self.advance() {
                    Some(b'1') => Some(false),
                    Some(b'2') => Some(true),
                    _ => return Err(bad(self.at(stereo_pos), "invalid @TH class")),
                };
            } else if self.peek().is_some_and(|c| c.is_ascii_uppercase() && c != b'H') {
                return Err(bad(self.at(stereo_pos), "unsupported stereo class"));
            } else {
                clockwise = Some(false);
            }
        }

        let mut hydrogens = 0u8;
        if self.peek() == Some(b'H') {
            self.advance();
            hydrogens = self.read_number(1).map_or(1, |n| n as u8);
        }

        let mut charge: i8 = 0;
        if let Some(sign @ (b'+' | b'-')) = self.peek() {
            self.advance();
            let unit: i8 = if sign == b'+' { 1 } else { -1 };
            if let Some(n) = self.read_number(2) {
                charge = unit * n as i8;
            } else {
                charge = unit;
                while self.peek() == Some(sign) {
                    self.advance();
                    charge += unit;
                }
            }
        }

        if self.peek() == Some(b':') {
            self.advance();
            if self.read_number(5).is_none() {
                return Err(bad(self.at(self.pos), "atom class needs a number"));
            }
        }

        if self.advance() != Some(b']') {
            return Err(bad(self.at(open), "expected ']'"));
        }

        let mut atom = Atom::new(element);
        atom.aromatic = aromatic;
        atom.isotope = isotope;
        atom.formal_charge = charge;
        atom.bracket = true;
        self.attach(atom, Some(hydrogens), clockwise)
    }

    fn finish(mut self) -> Result<Molecule, SmilesError> {
        if let Some(spec) = self.pending {
            return Err(SmilesError::DanglingBond {
                pos: self.at(spec.pos),
            });
        }
        if let Some(branch) = self.branches.last() {
            return Err(SmilesError::UnbalancedParenthesis {
                pos: self.at(branch.pos),
            });
        }
        if let Some((&label, open)) = self.rings.iter().next() {
            return Err(SmilesError::UnclosedRing {
                label,
                pos: self.at(open.pos),
            });
        }
        if self.mol.is_empty() {
            return Err(SmilesError::Empty);
        }

        // An unmarked bond between aromatic atoms is only aromatic inside a ring.
        let in_ring = ring_bond_flags(&self.mol);
        for &b in &self.implicit_aromatic {
            if !in_ring[b] {
                self.mol.bond_mut(b).order = BondOrder::Single;
            }
        }

        for i in 0..self.mol.atom_count() {
            let h = match self.bracket_h[i] {
                Some(h) => h,
                None => default_implicit_hydrogens(&self.mol, i),
            };
            self.mol.atom_mut(i).implicit_hydrogens = h;
        }

        for i in 0..self.mol.atom_count() {
            let atom = self.mol.atom(i);
            let allowed = atom.element.valences_with_charge(atom.formal_charge);
            let Some(&max) = allowed.iter().max() else {
                continue;
            };
            let used = self.mol.bond_order_sum(i) + atom.implicit_hydrogens;
            if used > max {
                return Err(SmilesError::Valence {
                    atom: i,
                    symbol: atom.element.symbol,
                    valence: used,
                });
            }
        }

        kekulize(&self.mol).map_err(|e| SmilesError::Kekulize { atoms: e.atoms })?;
        perceive_aromaticity(&mut self.mol)
            .map_err(|e| SmilesError::Kekulize { atoms: e.atoms })?;

        for i in 0..self.mol.atom_count() {
            let Some(clockwise) = self.chiral[i] else {
                continue;
            };
            let mut order: Vec<StereoNeighbor> =
                self.neighbor_order[i].iter().flatten().copied().collect();
            if order.len() == 3 && !order.contains(&StereoNeighbor::Implicit) {
                // Lone pair sits where an implicit hydrogen would be written.
                let at = usize::from(self.has_from[i]);
                order.insert(at, StereoNeighbor::Implicit);
            }
            if order.len() == 4 {
                self.mol.atom_mut(i).chirality = Some(TetrahedralStereo {
                    clockwise,
                    neighbors: order,
                });
            } else {
                debug!(atom = i, "Ignoring stereo tag on atom without four neighbours");
            }
        }
        Ok(self.mol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hydrogens(mol: &Molecule) -> Vec<u8> {
        mol.atoms().iter().map(|a| a.implicit_hydrogens).collect()
    }

    #[test]
    fn parses_ethanol_with_implicit_hydrogens() {
        let mol = parse("CCO").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        assert_eq!(hydrogens(&mol), vec![3, 2, 1]);
    }

    #[test]
    fn parses_branches_and_double_bonds() {
        let mol = parse("CC(=O)O").unwrap();
        assert_eq!(mol.bond(1).order, BondOrder::Double);
        assert_eq!(hydrogens(&mol), vec![3, 0, 0, 1]);
        let tbu = parse("CC(C)(C)O").unwrap();
        assert_eq!(tbu.degree(1), 4);
        assert_eq!(tbu.atom(1).implicit_hydrogens, 0);
    }

    #[test]
    fn parses_bracket_atoms() {
        let mol = parse("[NH4+]").unwrap();
        assert_eq!(mol.atom(0).formal_charge, 1);
        assert_eq!(mol.atom(0).implicit_hydrogens, 4);
        let iso = parse("[13CH4]").unwrap();
        assert_eq!(iso.atom(0).isotope, Some(13));
        let anion = parse("CC(=O)[O-]").unwrap();
        assert_eq!(anion.atom(3).formal_charge, -1);
        assert_eq!(anion.atom(3).implicit_hydrogens, 0);
        let dication = parse("[Fe++]").unwrap();
        assert_eq!(dication.atom(0).formal_charge, 2);
        let class = parse("[CH3:1]C").unwrap();
        assert_eq!(class.atom(0).implicit_hydrogens, 3);
    }

    #[test]
    fn parses_aromatic_rings() {
        let mol = parse("c1ccccc1").unwrap();
        assert!(mol.bonds().iter().all(|b| b.order == BondOrder::Aromatic));
        assert_eq!(hydrogens(&mol), vec![1; 6]);
        let pyrrole = parse("c1cc[nH]c1").unwrap();
        assert_eq!(pyrrole.atom(3).implicit_hydrogens, 1);
        let thiophene = parse("c1ccsc1").unwrap();
        assert_eq!(thiophene.atom(3).implicit_hydrogens, 0);
    }

    #[test]
    fn bond_between_aromatic_rings_is_single() {
        let mol = parse("c1ccccc1c1ccccc1").unwrap();
        let link = mol.bond_between(5, 6).unwrap();
        assert_eq!(mol.bond(link).order, BondOrder::Single);
        assert_eq!(mol.atom(5).implicit_hydrogens, 0);
    }

    #[test]
    fn ring_closures_accept_two_digit_labels_and_bond_orders() {
        let mol = parse("C%10CCCCC%10").unwrap();
        assert_eq!(mol.bond_count(), 6);
        let ene = parse("C=1CCCCC1").unwrap();
        let closure = ene.bond_between(0, 5).unwrap();
        assert_eq!(ene.bond(closure).order, BondOrder::Double);
        assert!(matches!(
            parse("C=1CCCCC#1"),
            Err(SmilesError::InvalidRingClosure { label: 1, .. })
        ));
    }

    #[test]
    fn ring_labels_can_be_reused() {
        let mol = parse("C1CC1C1CC1").unwrap();
        assert_eq!(mol.bond_count(), 7);
    }

    #[test]
    fn dot_separates_fragments() {
        let mol = parse("[Na+].[Cl-]").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(mol.fragments().len(), 2);
    }

    #[test]
    fn reports_error_positions() {
        assert_eq!(
            parse("CC(C"),
            Err(SmilesError::UnbalancedParenthesis { pos: 2 })
        );
        assert_eq!(
            parse("CC)C"),
            Err(SmilesError::UnbalancedParenthesis { pos: 2 })
        );
        assert_eq!(
            parse("C1CC"),
            Err(SmilesError::UnclosedRing { label: 1, pos: 1 })
        );
        assert_eq!(
            parse("CX"),
            Err(SmilesError::UnexpectedCharacter { ch: 'X', pos: 1 })
        );
        assert_eq!(parse("C="), Err(SmilesError::DanglingBond { pos: 1 }));
        assert_eq!(parse("   "), Err(SmilesError::Empty));
        assert!(matches!(
            parse("[Xx]"),
            Err(SmilesError::UnknownElement { pos: 1, .. })
        ));
        assert!(matches!(
            parse("[CH4"),
            Err(SmilesError::InvalidBracketAtom { pos: 0, .. })
        ));
        assert!(matches!(parse("C()C"), Err(SmilesError::UnexpectedCharacter { pos: 2, .. })));
    }

    #[test]
    fn error_positions_account_for_leading_whitespace() {
        assert_eq!(
            parse("  C1CC"),
            Err(SmilesError::UnclosedRing { label: 1, pos: 3 })
        );
    }

    #[test]
    fn rejects_hypervalent_carbon_and_bad_aromatics() {
        assert!(matches!(
            parse("C(C)(C)(C)(C)C"),
            Err(SmilesError::Valence { atom: 0, .. })
        ));
        assert!(matches!(parse("c1cccc1"), Err(SmilesError::Kekulize { .. })));
    }

    #[test]
    fn accepts_hypervalent_sulfur_and_phosphorus() {
        assert!(parse("CS(=O)(=O)O").is_ok());
        assert!(parse("OP(=O)(O)O").is_ok());
    }

    #[test]
    fn records_tetrahedral_neighbour_order() {
        let mol = parse("N[C@@H](C)C(=O)O").unwrap();
        let stereo = mol.atom(1).chirality.clone().unwrap();
        assert!(stereo.clockwise);
        assert_eq!(
            stereo.neighbors,
            vec![
                StereoNeighbor::Atom(0),
                StereoNeighbor::Implicit,
                StereoNeighbor::Atom(2),
                StereoNeighbor::Atom(3),
            ]
        );
    }

    #[test]
    fn ring_closure_takes_its_digit_position_in_stereo_order() {
        let mol = parse("C[C@H]1CCCCN1").unwrap();
        let stereo = mol.atom(1).chirality.clone().unwrap();
        assert!(!stereo.clockwise);
        assert_eq!(
            stereo.neighbors,
            vec![
                StereoNeighbor::Atom(0),
                StereoNeighbor::Implicit,
                StereoNeighbor::Atom(6),
                StereoNeighbor::Atom(2),
            ]
        );
    }

    #[test]
    fn records_cis_trans_directions() {
        let mol = parse("F/C=C/F").unwrap();
        assert_eq!(mol.bond(0).direction, BondDirection::Up);
        assert_eq!(mol.bond(1).direction, BondDirection::None);
        assert_eq!(mol.bond(2).direction, BondDirection::Up);
    }

    #[test]
    fn trailing_text_becomes_the_name() {
        let mol = parse("CCO ethanol").unwrap();
        assert_eq!(mol.name, "ethanol");
        assert_eq!(mol.atom_count(), 3);
    }
}
