use smile2dock::core::fingerprint::{DEFAULT_BITS, DEFAULT_RADIUS, FingerprintKind};
use smile2dock::core::forcefield::ForceFieldVariant;
use smile2dock::core::io::OutputFormat;

pub struct DefaultsConfig {
    pub num_conformers: usize,
    pub random_seed: u64,
    pub enforce_chirality: bool,
    pub optimize: bool,
    pub forcefield: ForceFieldVariant,
    pub max_iterations: usize,
    pub ph_min: f64,
    pub ph_max: f64,
    pub precision: f64,
    pub max_variants: usize,
    pub fingerprint: FingerprintKind,
    pub radius: usize,
    pub bits: usize,
    pub formats: Vec<OutputFormat>,
    pub all_conformers: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            num_conformers: 10,
            random_seed: 42,
            enforce_chirality: true,
            optimize: true,
            forcefield: ForceFieldVariant::Mmff94s,
            max_iterations: 1000,
            ph_min: 6.4,
            ph_max: 8.4,
            precision: 1.0,
            max_variants: 128,
            fingerprint: FingerprintKind::Morgan,
            radius: DEFAULT_RADIUS,
            bits: DEFAULT_BITS,
            formats: OutputFormat::ALL.to_vec(),
            all_conformers: false,
        }
    }
}
