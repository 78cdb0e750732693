use super::report;
use crate::cli::ProtonateArgs;
use crate::error::Result;
use smile2dock::core::protonation::{ProtonationParams, SiteLibrary, protonate_with};
use smile2dock::engine::error::EngineError;
use tracing::info;

pub fn run(args: ProtonateArgs) -> Result<()> {
    print!("{}", variants(&args)?);
    Ok(())
}

fn variants(args: &ProtonateArgs) -> Result<String> {
    let params = ProtonationParams {
        ph_min: args.ph_min,
        ph_max: args.ph_max,
        precision: args.precision,
        max_variants: args.max_variants,
    };
    let library = match &args.sites {
        Some(path) => {
            info!("Loading protonation sites from {:?}", path);
            SiteLibrary::load(path).map_err(EngineError::from)?
        }
        None => SiteLibrary::builtin().map_err(EngineError::from)?,
    };

    let variants = protonate_with(&args.smiles, &params, &library).map_err(|source| {
        EngineError::Protonation {
            smiles: args.smiles.clone(),
            source,
        }
    })?;
    info!("Generated {} protonation state(s)", variants.len());
    Ok(report::protonation(&params, &variants))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    fn args(smiles: &str) -> ProtonateArgs {
        ProtonateArgs {
            smiles: smiles.to_string(),
            ph_min: 6.4,
            ph_max: 8.4,
            precision: 1.0,
            max_variants: 128,
            sites: None,
        }
    }

    #[test]
    fn lists_the_variants_of_an_acid() {
        let output = variants(&args("CC(=O)O")).unwrap();
        assert!(output.starts_with("Protonation states at pH 6.4-8.4:\n  1. "));
        assert!(output.contains("[O-]"));
    }

    #[test]
    fn invalid_smiles_is_an_engine_error() {
        let err = variants(&args("C1CC(")).unwrap_err();
        assert!(matches!(
            err,
            CliError::Engine(EngineError::Protonation { .. })
        ));
    }

    #[test]
    fn missing_site_file_is_reported() {
        let mut a = args("CCN");
        a.sites = Some("/nonexistent/sites.toml".into());
        assert!(matches!(
            variants(&a),
            Err(CliError::Engine(EngineError::SiteLibrary(_)))
        ));
    }
}
