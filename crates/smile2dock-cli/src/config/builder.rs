use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AppConfig, InputSource};
use crate::cli::ConvertArgs;
use crate::error::{CliError, Result};
use smile2dock::core::fingerprint::FingerprintKind;
use smile2dock::core::forcefield::ForceFieldVariant;
use smile2dock::core::io::OutputFormat;
use smile2dock::core::protonation::ProtonationParams;
use smile2dock::engine::config::ConversionConfigBuilder;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Merges defaults, the optional config file, command-line flags and `--set`
/// overrides, in increasing order of precedence.
pub fn build_config(args: &ConvertArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let merged = apply_set_values(apply_cli_args(file_config, args), &args.set_values)?;
    debug!("Merged configuration layers: {:?}", merged);

    let embedding = merged.embedding.unwrap_or_default();
    let optimization = merged.optimization.unwrap_or_default();
    let protonation = merged.protonation.unwrap_or_default();
    let similarity = merged.similarity.unwrap_or_default();
    let output = merged.output.unwrap_or_default();

    let forcefield = match optimization.forcefield.as_deref() {
        Some(name) => parse_value::<ForceFieldVariant>("optimization.forcefield", name)?,
        None => defaults.forcefield,
    };
    let formats = match &output.formats {
        Some(names) => parse_formats(names)?,
        None => defaults.formats.clone(),
    };

    let mut builder = ConversionConfigBuilder::new()
        .num_conformers(embedding.num_conformers.unwrap_or(defaults.num_conformers))
        .random_seed(embedding.random_seed.unwrap_or(defaults.random_seed))
        .enforce_chirality(
            embedding
                .enforce_chirality
                .unwrap_or(defaults.enforce_chirality),
        )
        .optimize(optimization.enabled.unwrap_or(defaults.optimize))
        .forcefield(forcefield)
        .max_iterations(
            optimization
                .max_iterations
                .unwrap_or(defaults.max_iterations),
        )
        .formats(formats)
        .write_all_conformers(output.all_conformers.unwrap_or(defaults.all_conformers));

    if protonation.enabled.unwrap_or(false) {
        builder = builder.protonation(ProtonationParams {
            ph_min: protonation.ph_min.unwrap_or(defaults.ph_min),
            ph_max: protonation.ph_max.unwrap_or(defaults.ph_max),
            precision: protonation.precision.unwrap_or(defaults.precision),
            max_variants: protonation.max_variants.unwrap_or(defaults.max_variants),
        });
        if let Some(path) = protonation.site_library {
            builder = builder.site_library(path);
        }
    }

    if let Some(reference) = similarity.reference {
        let kind = match similarity.fingerprint.as_deref() {
            Some(name) => parse_value::<FingerprintKind>("similarity.fingerprint", name)?,
            None => defaults.fingerprint,
        };
        builder = builder
            .reference(reference)
            .fingerprint_kind(kind)
            .fingerprint_radius(similarity.radius.unwrap_or(defaults.radius))
            .fingerprint_bits(similarity.bits.unwrap_or(defaults.bits));
    }

    let core_config = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let input = if Path::new(&args.input).is_file() {
        InputSource::File(args.input.clone().into())
    } else {
        InputSource::Smiles(args.input.clone())
    };

    Ok(AppConfig {
        input,
        output: args.output.clone(),
        core_config,
    })
}

/// Writes every flag the user actually passed into the file layer.
fn apply_cli_args(mut config: FileConfig, args: &ConvertArgs) -> FileConfig {
    let embedding = config.embedding.get_or_insert_with(Default::default);
    if let Some(n) = args.num_confs {
        embedding.num_conformers = Some(n);
    }
    if let Some(seed) = args.seed {
        embedding.random_seed = Some(seed);
    }

    let optimization = config.optimization.get_or_insert_with(Default::default);
    if args.no_optimize {
        optimization.enabled = Some(false);
    }
    if let Some(name) = &args.forcefield {
        optimization.forcefield = Some(name.clone());
    }
    if let Some(iters) = args.max_iters {
        optimization.max_iterations = Some(iters);
    }

    let protonation = config.protonation.get_or_insert_with(Default::default);
    if args.protonate {
        protonation.enabled = Some(true);
    }
    if let Some(v) = args.ph_min {
        protonation.ph_min = Some(v);
    }
    if let Some(v) = args.ph_max {
        protonation.ph_max = Some(v);
    }
    if let Some(v) = args.precision {
        protonation.precision = Some(v);
    }
    if let Some(v) = args.max_variants {
        protonation.max_variants = Some(v);
    }
    if let Some(path) = &args.sites {
        protonation.site_library = Some(path.clone());
    }

    let similarity = config.similarity.get_or_insert_with(Default::default);
    if let Some(reference) = &args.reference {
        similarity.reference = Some(reference.clone());
    }
    if let Some(kind) = &args.fp_type {
        similarity.fingerprint = Some(kind.clone());
    }
    if let Some(radius) = args.radius {
        similarity.radius = Some(radius);
    }
    if let Some(bits) = args.bits {
        similarity.bits = Some(bits);
    }

    let output = config.output.get_or_insert_with(Default::default);
    if !args.formats.is_empty() {
        output.formats = Some(args.formats.clone());
    }
    if args.all_conformers {
        output.all_conformers = Some(true);
    }

    config
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CliError::Config(format!("Invalid value for {}: '{}' ({})", key, value, e)))
}

fn parse_formats(names: &[String]) -> Result<Vec<OutputFormat>> {
    let mut formats = Vec::new();
    for name in names {
        let format = parse_value::<OutputFormat>("output.formats", name)?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        return Err(CliError::Config(
            "At least one output format is required.".to_string(),
        ));
    }
    Ok(formats)
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "embedding.num-conformers" => {
                config
                    .embedding
                    .get_or_insert_with(Default::default)
                    .num_conformers = Some(parse_value(key, value)?);
            }
            "embedding.random-seed" => {
                config
                    .embedding
                    .get_or_insert_with(Default::default)
                    .random_seed = Some(parse_value(key, value)?);
            }
            "embedding.enforce-chirality" => {
                config
                    .embedding
                    .get_or_insert_with(Default::default)
                    .enforce_chirality = Some(parse_value(key, value)?);
            }
            "optimization.enabled" => {
                config
                    .optimization
                    .get_or_insert_with(Default::default)
                    .enabled = Some(parse_value(key, value)?);
            }
            "optimization.forcefield" => {
                config
                    .optimization
                    .get_or_insert_with(Default::default)
                    .forcefield = Some(value.trim().to_string());
            }
            "optimization.max-iterations" => {
                config
                    .optimization
                    .get_or_insert_with(Default::default)
                    .max_iterations = Some(parse_value(key, value)?);
            }
            "protonation.enabled" => {
                config
                    .protonation
                    .get_or_insert_with(Default::default)
                    .enabled = Some(parse_value(key, value)?);
            }
            "protonation.ph-min" => {
                config
                    .protonation
                    .get_or_insert_with(Default::default)
                    .ph_min = Some(parse_value(key, value)?);
            }
            "protonation.ph-max" => {
                config
                    .protonation
                    .get_or_insert_with(Default::default)
                    .ph_max = Some(parse_value(key, value)?);
            }
            "protonation.precision" => {
                config
                    .protonation
                    .get_or_insert_with(Default::default)
                    .precision = Some(parse_value(key, value)?);
            }
            "protonation.max-variants" => {
                config
                    .protonation
                    .get_or_insert_with(Default::default)
                    .max_variants = Some(parse_value(key, value)?);
            }
            "protonation.site-library" => {
                config
                    .protonation
                    .get_or_insert_with(Default::default)
                    .site_library = Some(value.trim().into());
            }
            "similarity.reference" => {
                config
                    .similarity
                    .get_or_insert_with(Default::default)
                    .reference = Some(value.trim().to_string());
            }
            "similarity.fingerprint" => {
                config
                    .similarity
                    .get_or_insert_with(Default::default)
                    .fingerprint = Some(value.trim().to_string());
            }
            "similarity.radius" => {
                config
                    .similarity
                    .get_or_insert_with(Default::default)
                    .radius = Some(parse_value(key, value)?);
            }
            "similarity.bits" => {
                config
                    .similarity
                    .get_or_insert_with(Default::default)
                    .bits = Some(parse_value(key, value)?);
            }
            "output.formats" => {
                config.output.get_or_insert_with(Default::default).formats = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect(),
                );
            }
            "output.all-conformers" => {
                config
                    .output
                    .get_or_insert_with(Default::default)
                    .all_conformers = Some(parse_value(key, value)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn base_convert_args() -> ConvertArgs {
        ConvertArgs {
            input: "CCO".to_string(),
            output: PathBuf::from("output"),
            config: None,
            num_confs: None,
            seed: None,
            no_optimize: false,
            forcefield: None,
            max_iters: None,
            protonate: false,
            ph_min: None,
            ph_max: None,
            precision: None,
            max_variants: None,
            sites: None,
            reference: None,
            fp_type: None,
            radius: None,
            bits: None,
            formats: vec![],
            all_conformers: false,
            set_values: vec![],
        }
    }

    #[test]
    fn defaults_fill_everything() {
        let app = build_config(&base_convert_args()).expect("build ok");
        let cfg = app.core_config;
        let defaults = DefaultsConfig::default();

        assert_eq!(app.input, InputSource::Smiles("CCO".to_string()));
        assert_eq!(cfg.embedding.num_conformers, defaults.num_conformers);
        assert_eq!(cfg.embedding.random_seed, defaults.random_seed);
        assert!(cfg.embedding.enforce_chirality);
        assert!(cfg.optimization.enabled);
        assert_eq!(cfg.optimization.variant, ForceFieldVariant::Mmff94s);
        assert_eq!(cfg.optimization.max_iterations, defaults.max_iterations);
        assert!(cfg.protonation.is_none());
        assert!(cfg.similarity.is_none());
        assert_eq!(cfg.output.formats, OutputFormat::ALL.to_vec());
        assert!(!cfg.output.write_all_conformers);
    }

    #[test]
    fn existing_file_selects_batch_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ligands.smi");
        fs::write(&path, "CCO\n").unwrap();
        let mut args = base_convert_args();
        args.input = path.to_string_lossy().into_owned();

        let app = build_config(&args).expect("build ok");
        assert_eq!(app.input, InputSource::File(path));
    }

    #[test]
    fn cli_flags_enable_protonation_and_similarity() {
        let mut args = base_convert_args();
        args.protonate = true;
        args.ph_min = Some(5.0);
        args.max_variants = Some(8);
        args.reference = Some("c1ccccc1".to_string());
        args.fp_type = Some("rdkit".to_string());
        args.bits = Some(1024);

        let cfg = build_config(&args).expect("build ok").core_config;
        let protonation = cfg.protonation.unwrap();
        assert_eq!(protonation.params.ph_min, 5.0);
        assert_eq!(protonation.params.ph_max, 8.4);
        assert_eq!(protonation.params.max_variants, 8);
        assert!(protonation.site_library.is_none());

        let similarity = cfg.similarity.unwrap();
        assert_eq!(similarity.reference, "c1ccccc1");
        assert_eq!(similarity.kind, FingerprintKind::Rdkit);
        assert_eq!(similarity.radius, 2);
        assert_eq!(similarity.n_bits, 1024);
    }

    #[test]
    fn ph_options_alone_do_not_enable_protonation() {
        let mut args = base_convert_args();
        args.ph_min = Some(4.0);
        let cfg = build_config(&args).expect("build ok").core_config;
        assert!(cfg.protonation.is_none());
    }

    #[test]
    fn file_values_are_read_and_cli_overrides_them() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("smile2dock.toml");
        fs::write(
            &cfg_path,
            r#"
            [embedding]
            num-conformers = 4
            random-seed = 11

            [optimization]
            forcefield = "mmff94"
            max-iterations = 300

            [protonation]
            enabled = true
            ph-max = 9.0

            [output]
            formats = ["sdf", "pdbqt"]
            "#,
        )
        .unwrap();

        let mut args = base_convert_args();
        args.config = Some(cfg_path);
        args.num_confs = Some(2);

        let cfg = build_config(&args).expect("build ok").core_config;
        assert_eq!(cfg.embedding.num_conformers, 2);
        assert_eq!(cfg.embedding.random_seed, 11);
        assert_eq!(cfg.optimization.variant, ForceFieldVariant::Mmff94);
        assert_eq!(cfg.optimization.max_iterations, 300);
        assert_eq!(cfg.protonation.unwrap().params.ph_max, 9.0);
        assert_eq!(
            cfg.output.formats,
            vec![OutputFormat::Sdf, OutputFormat::Pdbqt]
        );
    }

    #[test]
    fn set_values_override_flags() {
        let mut args = base_convert_args();
        args.num_confs = Some(3);
        args.set_values = vec![
            "embedding.num-conformers=20".to_string(),
            "optimization.enabled=false".to_string(),
            "protonation.enabled=true".to_string(),
            "protonation.precision=0.5".to_string(),
            "similarity.reference=CCN".to_string(),
            "output.formats=pdb, sdf".to_string(),
            "output.all-conformers=true".to_string(),
        ];

        let cfg = build_config(&args).expect("build ok").core_config;
        assert_eq!(cfg.embedding.num_conformers, 20);
        assert!(!cfg.optimization.enabled);
        assert!((cfg.protonation.unwrap().params.precision - 0.5).abs() < 1e-12);
        assert_eq!(cfg.similarity.unwrap().reference, "CCN");
        assert_eq!(cfg.output.formats, vec![OutputFormat::Pdb, OutputFormat::Sdf]);
        assert!(cfg.output.write_all_conformers);
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in [
            "embedding.num-conformers",
            "embedding.num-conformers=many",
            "docking.exhaustiveness=8",
        ] {
            let mut args = base_convert_args();
            args.set_values = vec![bad.to_string()];
            assert!(
                matches!(build_config(&args), Err(CliError::Config(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_names_are_config_errors() {
        let mut args = base_convert_args();
        args.forcefield = Some("uff".to_string());
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        let mut args = base_convert_args();
        args.formats = vec!["xyz".to_string()];
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        let mut args = base_convert_args();
        args.reference = Some("CCO".to_string());
        args.fp_type = Some("maccs".to_string());
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn builder_validation_surfaces_as_config_error() {
        let mut args = base_convert_args();
        args.num_confs = Some(0);
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        let mut args = base_convert_args();
        args.protonate = true;
        args.ph_min = Some(9.0);
        args.ph_max = Some(7.0);
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn duplicate_formats_are_collapsed() {
        let formats = parse_formats(&["sdf".to_string(), "SDF".to_string()]);
        assert!(matches!(formats, Ok(f) if f == vec![OutputFormat::Sdf]));
    }
}
