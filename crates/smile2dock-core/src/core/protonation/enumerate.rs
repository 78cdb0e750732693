use super::ProtonationParams;
use super::sites::SiteMatch;
use crate::core::models::molecule::Molecule;
use crate::core::smiles::canonical;
use std::collections::HashSet;
use tracing::trace;

/// Which forms of a site are populated inside the pH window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteState {
    Protonated,
    Deprotonated,
    Both,
}

pub fn classify(pka: f64, stdev: f64, params: &ProtonationParams) -> SiteState {
    let spread = params.precision * stdev;
    if pka + spread < params.ph_min {
        SiteState::Deprotonated
    } else if pka - spread > params.ph_max {
        SiteState::Protonated
    } else {
        SiteState::Both
    }
}

/// Removes charges that only encode a protonation state: anionic O, S and N
/// gain a hydrogen, cationic N with a hydrogen loses it. Charges balanced by a
/// directly bonded counter-charge (nitro groups, N-oxides) are left alone.
pub fn neutralize(mol: &mut Molecule) {
    for idx in 0..mol.atom_count() {
        let charge = mol.atom(idx).formal_charge;
        if charge == 0 {
            continue;
        }
        let balanced = mol
            .neighbor_atoms(idx)
            .any(|n| mol.atom(n).formal_charge.signum() == -charge.signum());
        if balanced {
            continue;
        }
        let atom = mol.atom_mut(idx);
        match (atom.atomic_number(), charge) {
            (7 | 8 | 16, -1) => {
                atom.formal_charge = 0;
                atom.implicit_hydrogens += 1;
            }
            (7, 1) if atom.implicit_hydrogens > 0 => {
                atom.formal_charge = 0;
                atom.implicit_hydrogens -= 1;
            }
            _ => {}
        }
    }
}

/// Puts one site into the protonated or deprotonated form, starting from the
/// neutral molecule. Returns false when the site cannot take that form.
fn apply(mol: &mut Molecule, site: &SiteMatch<'_>, protonated: bool) -> bool {
    let acid = site.definition.kind.is_acid();
    let atom = mol.atom_mut(site.atom);
    match (acid, protonated) {
        (true, true) | (false, false) => true,
        (true, false) => {
            if atom.implicit_hydrogens == 0 {
                return false;
            }
            atom.implicit_hydrogens -= 1;
            atom.formal_charge -= 1;
            true
        }
        (false, true) => {
            atom.implicit_hydrogens += 1;
            atom.formal_charge += 1;
            true
        }
    }
}

/// Forms of one site in the order they are enumerated: the form that dominates
/// at the centre of the pH window comes first.
fn options(site: &SiteMatch<'_>, params: &ProtonationParams) -> Vec<bool> {
    let def = site.definition;
    match classify(def.pka, def.stdev, params) {
        SiteState::Protonated => vec![true],
        SiteState::Deprotonated => vec![false],
        SiteState::Both => {
            let centre = 0.5 * (params.ph_min + params.ph_max);
            if def.pka >= centre {
                vec![true, false]
            } else {
                vec![false, true]
            }
        }
    }
}

/// Enumerates the product of per-site forms, deduplicated by canonical SMILES and
/// capped at `max_variants` distinct results.
pub fn enumerate_variants(
    neutral: &Molecule,
    sites: &[SiteMatch<'_>],
    params: &ProtonationParams,
) -> Vec<String> {
    let choices: Vec<Vec<bool>> = sites.iter().map(|s| options(s, params)).collect();
    let mut counters = vec![0usize; sites.len()];
    let mut seen = HashSet::new();
    let mut variants = Vec::new();

    loop {
        let mut mol = neutral.clone();
        let feasible = sites
            .iter()
            .zip(&counters)
            .zip(&choices)
            .all(|((site, &k), opts)| apply(&mut mol, site, opts[k]));
        if feasible {
            let smiles = canonical(&mol);
            if seen.insert(smiles.clone()) {
                trace!(variant = %smiles, "New protonation variant");
                variants.push(smiles);
                if variants.len() >= params.max_variants {
                    break;
                }
            }
        }

        // Odometer over the per-site choices, last site fastest.
        let mut pos = sites.len();
        loop {
            if pos == 0 {
                return variants;
            }
            pos -= 1;
            counters[pos] += 1;
            if counters[pos] < choices[pos].len() {
                break;
            }
            counters[pos] = 0;
        }
    }
    variants
}
