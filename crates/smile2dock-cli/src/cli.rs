use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "smile2dock - SMILES to 3D converter with protonation, property calculation and similarity analysis.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for conformer generation and optimization.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a SMILES string, or a file with one SMILES per line, into 3D structure files.
    Convert(ConvertArgs),
    /// Enumerate the protonation states of a SMILES string in a pH range.
    Protonate(ProtonateArgs),
    /// Check whether SMILES strings parse, printing their canonical form.
    Validate(ValidateArgs),
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    // --- Core Arguments ---
    /// SMILES string or path to a file with one SMILES per line.
    /// An existing file selects batch mode.
    #[arg(short, long, required = true, value_name = "SMILES_OR_PATH")]
    pub input: String,

    /// Output base name (single mode) or output directory (batch mode).
    #[arg(short, long, default_value = "output", value_name = "PATH")]
    pub output: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Embedding Overrides ---
    /// Number of conformers to generate.
    #[arg(short = 'n', long = "num-confs", visible_alias = "num_confs", value_name = "INT")]
    pub num_confs: Option<usize>,

    /// Seed for conformer generation.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    // --- Optimization Overrides ---
    /// Skip force-field minimization of the conformers.
    #[arg(long)]
    pub no_optimize: bool,

    /// Force-field variant used for minimization (mmff94 or mmff94s).
    #[arg(long, value_name = "NAME")]
    pub forcefield: Option<String>,

    /// Maximum minimizer iterations per conformer.
    #[arg(long = "max-iters", value_name = "INT")]
    pub max_iters: Option<usize>,

    // --- Protonation ---
    /// Enumerate protonation states and build the structure from the first one.
    #[arg(long)]
    pub protonate: bool,

    /// Minimum pH for protonation.
    #[arg(long = "ph-min", visible_alias = "ph_min", value_name = "FLOAT")]
    pub ph_min: Option<f64>,

    /// Maximum pH for protonation.
    #[arg(long = "ph-max", visible_alias = "ph_max", value_name = "FLOAT")]
    pub ph_max: Option<f64>,

    /// pKa precision factor.
    #[arg(long, value_name = "FLOAT")]
    pub precision: Option<f64>,

    /// Maximum number of protonation variants.
    #[arg(long = "max-variants", visible_alias = "max_variants", value_name = "INT")]
    pub max_variants: Option<usize>,

    /// TOML file with ionizable site definitions replacing the built-in ones.
    #[arg(long, value_name = "PATH")]
    pub sites: Option<PathBuf>,

    // --- Similarity ---
    /// Reference SMILES for Tanimoto similarity.
    #[arg(long, value_name = "SMILES")]
    pub reference: Option<String>,

    /// Fingerprint type (morgan or rdkit).
    #[arg(long = "fp-type", visible_alias = "fp_type", value_name = "TYPE")]
    pub fp_type: Option<String>,

    /// Morgan fingerprint radius.
    #[arg(long, value_name = "INT")]
    pub radius: Option<usize>,

    /// Fingerprint bit size.
    #[arg(long, value_name = "INT")]
    pub bits: Option<usize>,

    // --- Output ---
    /// Comma-separated output formats (pdb, mol2, sdf, pdbqt).
    #[arg(short, long, value_delimiter = ',', value_name = "FORMATS")]
    pub formats: Vec<String>,

    /// Write every conformer into the SDF file instead of only the lowest-energy one.
    #[arg(long)]
    pub all_conformers: bool,

    /// Set a specific configuration value, overriding the config file and flags.
    /// Can be used multiple times. Example: -S embedding.num-conformers=20
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `protonate` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ProtonateArgs {
    /// The SMILES string to protonate.
    #[arg(required = true, value_name = "SMILES")]
    pub smiles: String,

    #[arg(long = "ph-min", visible_alias = "ph_min", default_value_t = 6.4, value_name = "FLOAT")]
    pub ph_min: f64,

    #[arg(long = "ph-max", visible_alias = "ph_max", default_value_t = 8.4, value_name = "FLOAT")]
    pub ph_max: f64,

    /// pKa precision factor.
    #[arg(long, default_value_t = 1.0, value_name = "FLOAT")]
    pub precision: f64,

    #[arg(
        long = "max-variants",
        visible_alias = "max_variants",
        default_value_t = 128,
        value_name = "INT"
    )]
    pub max_variants: usize,

    /// TOML file with ionizable site definitions replacing the built-in ones.
    #[arg(long, value_name = "PATH")]
    pub sites: Option<PathBuf>,
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// One or more SMILES strings.
    #[arg(required = true, num_args = 1.., value_name = "SMILES")]
    pub smiles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("smile2dock").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn convert_defaults() {
        let cli = parse(&["convert", "-i", "CCO"]);
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.input, "CCO");
        assert_eq!(args.output, PathBuf::from("output"));
        assert!(args.num_confs.is_none());
        assert!(!args.protonate);
        assert!(args.formats.is_empty());
    }

    #[test]
    fn underscore_spellings_are_accepted() {
        let cli = parse(&[
            "convert",
            "-i",
            "CCO",
            "--num_confs",
            "5",
            "--ph_min",
            "5.0",
            "--ph_max",
            "9.0",
            "--max_variants",
            "4",
            "--fp_type",
            "rdkit",
        ]);
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.num_confs, Some(5));
        assert_eq!(args.ph_min, Some(5.0));
        assert_eq!(args.ph_max, Some(9.0));
        assert_eq!(args.max_variants, Some(4));
        assert_eq!(args.fp_type.as_deref(), Some("rdkit"));
    }

    #[test]
    fn formats_split_on_commas() {
        let cli = parse(&["convert", "-i", "CCO", "-f", "sdf,pdbqt"]);
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.formats, vec!["sdf", "pdbqt"]);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = parse(&["validate", "CCO", "c1ccccc1", "-vv", "-j", "2"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(2));
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.smiles.len(), 2);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["smile2dock", "-q", "-v", "validate", "C"]);
        assert!(result.is_err());
    }

    #[test]
    fn protonate_has_original_defaults() {
        let cli = parse(&["protonate", "CC(=O)O"]);
        let Commands::Protonate(args) = cli.command else {
            panic!("expected protonate");
        };
        assert_eq!(args.ph_min, 6.4);
        assert_eq!(args.ph_max, 8.4);
        assert_eq!(args.precision, 1.0);
        assert_eq!(args.max_variants, 128);
    }
}
