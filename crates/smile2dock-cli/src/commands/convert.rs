use super::report;
use crate::cli::ConvertArgs;
use crate::config::{AppConfig, InputSource, build_config};
use crate::error::Result;
use crate::ui::{CliProgressHandler, UiEvent};
use smile2dock::engine::progress::ProgressReporter;
use smile2dock::workflows::{batch, convert};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn run(args: ConvertArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    info!("Merging configuration from defaults, file and CLI arguments...");
    let app = build_config(&args)?;
    let output = execute(&app, ui_sender)?;
    print!("{output}");
    Ok(())
}

/// Runs the conversion the config selects and returns the rendered report.
fn execute(app: &AppConfig, ui_sender: mpsc::Sender<UiEvent>) -> Result<String> {
    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let config = &app.core_config;

    match &app.input {
        InputSource::Smiles(smiles) => {
            info!("Converting {} into {:?}", smiles, app.output);
            let conversion = tokio::task::block_in_place(|| {
                convert::run(smiles, &app.output, config, &reporter)
            })?;
            if conversion.files.is_empty() {
                warn!("No output file could be written for {}", smiles);
            }
            Ok(report::single(
                &conversion,
                config.protonation.as_ref().map(|p| &p.params),
                config.similarity.as_ref().map(|s| s.reference.as_str()),
            ))
        }
        InputSource::File(path) => {
            info!("Batch converting {:?} into {:?}", path, app.output);
            let summary = tokio::task::block_in_place(|| {
                batch::run(path, &app.output, config, &reporter)
            })?;
            if summary.succeeded() == 0 && !summary.entries.is_empty() {
                warn!("No molecule of {:?} could be converted.", path);
            }
            Ok(report::batch(&summary))
        }
    }
}
