use super::convert::{Conversion, Converter};
use crate::core::descriptors::LABELS;
use crate::engine::config::ConversionConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

pub const PROTONATION_FILE: &str = "protonation_states.txt";
pub const PROPERTIES_FILE: &str = "properties.csv";

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Converted(Box<Conversion>),
    Failed(String),
}

/// One non-blank input line and what became of it.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// One-based line number in the input file.
    pub line: usize,
    pub smiles: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub entries: Vec<BatchEntry>,
    pub protonation_file: Option<PathBuf>,
    pub properties_file: Option<PathBuf>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Converted(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    pub fn conversions(&self) -> impl Iterator<Item = (&BatchEntry, &Conversion)> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            Outcome::Converted(c) => Some((e, c.as_ref())),
            Outcome::Failed(_) => None,
        })
    }
}

/// Non-blank lines of a SMILES file with their one-based line numbers.
pub fn read_smiles_lines(content: &str) -> Vec<(usize, String)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, s)| !s.is_empty())
        .map(|(i, s)| (i, s.to_string()))
        .collect()
}

/// Renders a pH bound the way the states file expects (`7.0`, `6.4`).
pub fn format_ph(ph: f64) -> String {
    if ph.fract() == 0.0 {
        format!("{ph:.1}")
    } else {
        ph.to_string()
    }
}

fn write_protonation_states(
    path: &Path,
    summary: &BatchSummary,
    ph_range: &str,
) -> Result<(), EngineError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?;
    writer.write_record(["Original_SMILES", "Protonated_SMILES", "pH_Range"])?;
    for (entry, conversion) in summary.conversions() {
        for variant in &conversion.variants {
            writer.write_record([entry.smiles.as_str(), variant.as_str(), ph_range])?;
        }
    }
    writer.flush().map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_properties(
    path: &Path,
    summary: &BatchSummary,
    with_similarity: bool,
) -> Result<(), EngineError> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["Line", "Input_SMILES", "SMILES"];
    header.extend(LABELS);
    if with_similarity {
        header.push("Tanimoto");
    }
    writer.write_record(&header)?;

    for (entry, conversion) in summary.conversions() {
        let mut row = vec![
            entry.line.to_string(),
            entry.smiles.clone(),
            conversion.smiles.clone(),
        ];
        row.extend(LABELS.iter().map(|label| {
            conversion
                .properties
                .get(label)
                .map_or_else(String::new, |v| format!("{v:.4}"))
        }));
        if with_similarity {
            row.push(
                conversion
                    .similarity
                    .map_or_else(String::new, |s| format!("{s:.4}")),
            );
        }
        writer.write_record(&row)?;
    }
    writer.flush().map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Converts every SMILES in `input_file`, writing `mol_<line>.<ext>` files into
/// `output_dir`. A failing molecule is recorded and the batch moves on.
#[instrument(skip_all, name = "batch_workflow", fields(input = %input_file.display()))]
pub fn run(
    input_file: &Path,
    output_dir: &Path,
    config: &ConversionConfig,
    reporter: &ProgressReporter,
) -> Result<BatchSummary, EngineError> {
    let content = fs::read_to_string(input_file).map_err(|source| EngineError::Io {
        path: input_file.to_path_buf(),
        source,
    })?;
    fs::create_dir_all(output_dir).map_err(|source| EngineError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let converter = Converter::new(config)?;
    let lines = read_smiles_lines(&content);
    info!("Processing {} SMILES from {}", lines.len(), input_file.display());

    let silent = ProgressReporter::new();
    reporter.report(Progress::PhaseStart { name: "Batch" });
    reporter.report(Progress::TaskStart {
        total_steps: lines.len() as u64,
    });

    let mut summary = BatchSummary::default();
    for (line, smiles) in lines {
        let base = output_dir.join(format!("mol_{line}"));
        let outcome = match converter.convert(&smiles, &base, &silent) {
            Ok(conversion) => {
                info!("Processed {smiles}");
                Outcome::Converted(Box::new(conversion))
            }
            Err(e) => {
                warn!("Error processing {smiles}: {e}");
                Outcome::Failed(e.to_string())
            }
        };
        reporter.report(Progress::MoleculeDone {
            line,
            success: matches!(outcome, Outcome::Converted(_)),
        });
        reporter.report(Progress::TaskIncrement);
        summary.entries.push(BatchEntry {
            line,
            smiles,
            outcome,
        });
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    if let Some(p) = &config.protonation {
        let path = output_dir.join(PROTONATION_FILE);
        let range = format!("{}-{}", format_ph(p.params.ph_min), format_ph(p.params.ph_max));
        write_protonation_states(&path, &summary, &range)?;
        summary.protonation_file = Some(path);
    }

    let path = output_dir.join(PROPERTIES_FILE);
    write_properties(&path, &summary, converter.has_reference())?;
    summary.properties_file = Some(path);

    info!(
        "Batch complete: {} converted, {} failed",
        summary.succeeded(),
        summary.failed()
    );
    Ok(summary)
}
