use smile2dock::core::protonation::ProtonationParams;
use smile2dock::workflows::batch::{BatchSummary, Outcome, format_ph};
use smile2dock::workflows::convert::Conversion;

/// Appends `line` and a newline.
fn push_line(out: &mut String, line: impl AsRef<str>) {
    out.push_str(line.as_ref());
    out.push('\n');
}

pub fn ph_range(params: &ProtonationParams) -> String {
    format!("{}-{}", format_ph(params.ph_min), format_ph(params.ph_max))
}

fn variant_list(out: &mut String, variants: &[String]) {
    for (i, variant) in variants.iter().enumerate() {
        push_line(out, format!("  {}. {}", i + 1, variant));
    }
}

/// Report for a single conversion: files, descriptors, protonation states and
/// similarity. `reference` is the requested reference SMILES, if any.
pub fn single(
    conversion: &Conversion,
    protonation: Option<&ProtonationParams>,
    reference: Option<&str>,
) -> String {
    let mut out = String::new();
    push_line(&mut out, "Generated files:");
    for file in &conversion.files {
        push_line(&mut out, format!("  {}", file.display()));
    }

    push_line(&mut out, "\nMolecular Properties:");
    for (label, value) in conversion.properties.iter() {
        push_line(&mut out, format!("{label}: {value:.2}"));
    }

    if let Some(params) = protonation {
        push_line(&mut out, format!("\nProtonation states at pH {}:", ph_range(params)));
        variant_list(&mut out, &conversion.variants);
    }

    match (conversion.similarity, reference) {
        (Some(similarity), _) => push_line(
            &mut out,
            format!("Tanimoto similarity to reference: {similarity:.4}"),
        ),
        (None, Some(reference)) => {
            push_line(&mut out, format!("Invalid reference SMILES: {reference}"))
        }
        (None, None) => {}
    }
    out
}

pub fn protonation(params: &ProtonationParams, variants: &[String]) -> String {
    let mut out = format!("Protonation states at pH {}:\n", ph_range(params));
    variant_list(&mut out, variants);
    out
}

/// One line per SMILES: `✓ input -> canonical` or `✗ input: reason`.
pub fn validation<E: std::fmt::Display>(results: &[(String, Result<String, E>)]) -> String {
    let mut out = String::new();
    for (smiles, result) in results {
        let line = match result {
            Ok(canonical) => format!("✓ {smiles} -> {canonical}"),
            Err(e) => format!("✗ {smiles}: {e}"),
        };
        push_line(&mut out, line);
    }
    out
}

/// Report for a batch: one block per molecule, then the summary files.
pub fn batch(summary: &BatchSummary) -> String {
    let mut out = String::new();
    for entry in &summary.entries {
        match &entry.outcome {
            Outcome::Converted(conversion) => {
                push_line(&mut out, format!("Processed {}", entry.smiles));
                let properties = conversion
                    .properties
                    .iter()
                    .map(|(label, value)| format!("{label}: {value:.2}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                push_line(&mut out, format!("Properties: {properties}"));
                if let Some(similarity) = conversion.similarity {
                    push_line(
                        &mut out,
                        format!("Tanimoto similarity to reference: {similarity:.4}"),
                    );
                }
            }
            Outcome::Failed(reason) => push_line(
                &mut out,
                format!("Failed line {} ({}): {}", entry.line, entry.smiles, reason),
            ),
        }
    }

    push_line(
        &mut out,
        format!(
            "\n{} of {} molecule(s) converted.",
            summary.succeeded(),
            summary.entries.len()
        ),
    );
    if let Some(path) = &summary.properties_file {
        push_line(&mut out, format!("Properties saved to: {}", path.display()));
    }
    if let Some(path) = &summary.protonation_file {
        push_line(&mut out, format!("Protonation states saved to: {}", path.display()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use smile2dock::core::descriptors::Properties;
    use smile2dock::workflows::batch::BatchEntry;
    use std::path::PathBuf;

    fn conversion() -> Conversion {
        let mut properties = Properties::new();
        properties.insert("Molecular Weight", 46.069);
        properties.insert("LogP", -0.0014);
        Conversion {
            input: "CCO".to_string(),
            smiles: "CCO".to_string(),
            variants: vec!["CCO".to_string()],
            properties,
            similarity: Some(0.123456),
            files: vec![PathBuf::from("out/ethanol.pdb"), PathBuf::from("out/ethanol.sdf")],
            conformers: 10,
            energy: Some(-1.5),
        }
    }

    #[test]
    fn ph_range_keeps_one_decimal() {
        let params = ProtonationParams {
            ph_min: 7.0,
            ph_max: 10.25,
            ..ProtonationParams::default()
        };
        assert_eq!(ph_range(&params), "7.0-10.25");
    }

    #[test]
    fn single_report_lists_files_properties_and_similarity() {
        let report = single(&conversion(), None, Some("CCN"));
        assert!(report.starts_with("Generated files:\n  out/ethanol.pdb\n  out/ethanol.sdf\n"));
        assert!(report.contains("\nMolecular Properties:\nMolecular Weight: 46.07\nLogP: -0.00\n"));
        assert!(report.contains("Tanimoto similarity to reference: 0.1235"));
        assert!(!report.contains("Protonation states"));
    }

    #[test]
    fn single_report_numbers_protonation_states() {
        let mut c = conversion();
        c.variants = vec!["CC(=O)[O-]".to_string(), "CC(=O)O".to_string()];
        let report = single(&c, Some(&ProtonationParams::default()), None);
        assert!(report.contains(
            "\nProtonation states at pH 6.4-8.4:\n  1. CC(=O)[O-]\n  2. CC(=O)O\n"
        ));
    }

    #[test]
    fn invalid_reference_is_reported() {
        let mut c = conversion();
        c.similarity = None;
        let report = single(&c, None, Some("C1CC"));
        assert!(report.ends_with("Invalid reference SMILES: C1CC\n"));
        assert!(!single(&c, None, None).contains("reference"));
    }

    #[test]
    fn protonation_report_is_numbered() {
        let report = protonation(
            &ProtonationParams::default(),
            &["C[NH3+]".to_string(), "CN".to_string()],
        );
        assert_eq!(report, "Protonation states at pH 6.4-8.4:\n  1. C[NH3+]\n  2. CN\n");
    }

    #[test]
    fn validation_marks_each_input() {
        let results: Vec<(String, Result<String, String>)> = vec![
            ("OCC".to_string(), Ok("CCO".to_string())),
            ("C1CC".to_string(), Err("unclosed ring 1".to_string())),
        ];
        assert_eq!(
            validation(&results),
            "✓ OCC -> CCO\n✗ C1CC: unclosed ring 1\n"
        );
    }

    #[test]
    fn batch_report_covers_success_and_failure() {
        let summary = BatchSummary {
            entries: vec![
                BatchEntry {
                    line: 1,
                    smiles: "CCO".to_string(),
                    outcome: Outcome::Converted(Box::new(conversion())),
                },
                BatchEntry {
                    line: 3,
                    smiles: "C1CC".to_string(),
                    outcome: Outcome::Failed("Invalid SMILES: C1CC".to_string()),
                },
            ],
            protonation_file: Some(PathBuf::from("out/protonation_states.txt")),
            properties_file: Some(PathBuf::from("out/properties.csv")),
        };
        let report = batch(&summary);
        assert!(report.starts_with(
            "Processed CCO\nProperties: Molecular Weight: 46.07, LogP: -0.00\n"
        ));
        assert!(report.contains("Failed line 3 (C1CC): Invalid SMILES: C1CC\n"));
        assert!(report.contains("1 of 2 molecule(s) converted."));
        assert!(report.ends_with("Protonation states saved to: out/protonation_states.txt\n"));
    }
}
