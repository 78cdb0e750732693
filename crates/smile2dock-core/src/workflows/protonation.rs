use crate::core::protonation::{ProtonationParams, SiteLibrary, protonate_with};
use tracing::{error, info, instrument};

/// Protonation variants of `smiles` with the built-in site library.
///
/// Never fails: any error is logged and the input comes back as the only
/// variant.
pub fn run(smiles: &str, params: &ProtonationParams) -> Vec<String> {
    match SiteLibrary::builtin() {
        Ok(library) => run_with(smiles, params, &library),
        Err(e) => {
            error!("Error protonating {smiles}: {e}");
            vec![smiles.to_string()]
        }
    }
}

#[instrument(skip(params, library))]
pub fn run_with(smiles: &str, params: &ProtonationParams, library: &SiteLibrary) -> Vec<String> {
    match protonate_with(smiles, params, library) {
        Ok(variants) if !variants.is_empty() => {
            info!(
                "Generated {} protonation states for pH {}-{}",
                variants.len(),
                params.ph_min,
                params.ph_max
            );
            for (i, variant) in variants.iter().enumerate() {
                info!("  Variant {}: {variant}", i + 1);
            }
            variants
        }
        Ok(_) => vec![smiles.to_string()],
        Err(e) => {
            error!("Error protonating {smiles}: {e}");
            vec![smiles.to_string()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::smiles;

    #[test]
    fn invalid_input_falls_back_to_itself() {
        assert_eq!(run("C1CC(", &ProtonationParams::default()), vec!["C1CC("]);
    }

    #[test]
    fn bad_parameters_fall_back_too() {
        let params = ProtonationParams {
            ph_min: 8.0,
            ph_max: 7.0,
            ..ProtonationParams::default()
        };
        assert_eq!(run("CC(=O)O", &params), vec!["CC(=O)O"]);
    }

    #[test]
    fn acid_at_neutral_ph_is_deprotonated() {
        let variants = run("CC(=O)O", &ProtonationParams::default());
        assert_eq!(variants, vec![smiles::canonicalize("CC(=O)[O-]").unwrap()]);
    }
}
