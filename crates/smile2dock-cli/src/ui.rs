use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use smile2dock::engine::progress::{Progress, ProgressCallback};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::warn;

const EVENT_BUFFER: usize = 1024;
const SPINNER_TICK: Duration = Duration::from_millis(80);

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// The spinner or bar of the phase currently running.
#[derive(Default)]
struct PhaseBar {
    bar: Option<ProgressBar>,
    label: String,
    failures: usize,
}

impl PhaseBar {
    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn summary(&self) -> String {
        match self.failures {
            0 => format!("✓ {}", self.label),
            n => format!("✓ {} ({} failed)", self.label, n),
        }
    }
}

/// Owns the terminal while a command runs: draws progress bars and prints log
/// lines above them.
pub struct UiManager {
    bars: MultiProgress,
    phase: PhaseBar,
    events: mpsc::Receiver<UiEvent>,
    shutdown: watch::Receiver<bool>,
    anchor: ProgressBar,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_tx, events) = mpsc::channel(EVENT_BUFFER);
        let (shutdown_tx, shutdown) = watch::channel(false);
        let bars = MultiProgress::with_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        let anchor = bars.add(ProgressBar::hidden());
        let manager = Self {
            bars,
            phase: PhaseBar::default(),
            events,
            shutdown,
            anchor,
        };
        (manager, event_tx, shutdown_tx)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event),
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        // Drain what the command sent right before finishing.
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
        self.phase.clear();
        self.anchor.finish_and_clear();
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => self.print(line),
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn print(&self, line: String) {
        let _ = self.bars.println(line);
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => {
                self.phase.clear();
                let spinner = self.bars.add(ProgressBar::new_spinner());
                spinner.set_style(Self::spinner_style());
                spinner.set_message(name);
                spinner.enable_steady_tick(SPINNER_TICK);
                self.phase = PhaseBar {
                    bar: Some(spinner),
                    label: name.to_string(),
                    failures: 0,
                };
            }
            Progress::PhaseFinish => {
                self.phase.clear();
                self.print(self.phase.summary());
                self.phase.label.clear();
            }
            Progress::TaskStart { total_steps } => {
                if let Some(bar) = &self.phase.bar {
                    bar.disable_steady_tick();
                    bar.set_style(Self::bar_style());
                    bar.set_length(total_steps);
                    bar.set_position(0);
                }
            }
            Progress::TaskIncrement => {
                if let Some(bar) = &self.phase.bar {
                    bar.inc(1);
                }
            }
            Progress::TaskFinish => {
                if let Some(bar) = &self.phase.bar {
                    bar.finish();
                }
            }
            Progress::MoleculeDone { line, success } => {
                if !success {
                    self.phase.failures += 1;
                }
                if let Some(bar) = &self.phase.bar {
                    bar.set_message(format!("{} (line {})", self.phase.label, line));
                }
            }
            Progress::Message(text) => self.print(format!("  {text}")),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓",
            ])
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<30} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
            })
            .progress_chars("━╸ ")
    }
}

/// Turns workflow progress events into UI events.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                warn!("Dropped a progress update: {}", e);
            }
        })
    }
}
