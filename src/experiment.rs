//! Terminal experiment runner
//!
//! Translates terminal input into [`SessionEvent`]s and renders the session:
//! - each input line is a selection of the node with that label
//! - a timer channel delivers ticks for the live status line
//! - end of input abandons the session without writing a record
//!
//! Input lines and ticks arrive on separate channels but are consumed by one
//! `select!` loop, so the session state is only ever touched from here.

use crate::dataset::{self, DatasetError, LoadedDataset};
use crate::report::render_tree;
use crate::result_store::{ResultStore, SessionRecord, StoreError};
use crate::session::{SessionError, SessionEvent, SessionState};
use crossbeam::channel::{self, Receiver};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Errors that end an experiment run
#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to save result: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type for experiment runs
pub type Result<T> = std::result::Result<T, ExperimentError>;

/// Everything needed to run one session
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub participant: String,
    /// Explicit dataset; when `None` one of `candidates` is drawn
    pub dataset: Option<PathBuf>,
    pub candidates: Vec<PathBuf>,
    pub results: PathBuf,
    pub tick_interval: Duration,
    /// Fixed seed for reproducible dataset and target draws
    pub seed: Option<u64>,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Target found and record saved
    Found(SessionRecord),
    /// Input ended before the target was found
    Abandoned,
}

/// Run one session, reading selections from `input`
///
/// The tree and prompts go to `out`; the live timer goes to `status`.
pub fn run<I, O, S>(options: &RunOptions, input: I, out: &mut O, status: &mut S) -> Result<RunOutcome>
where
    I: BufRead + Send + 'static,
    O: Write,
    S: Write,
{
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let LoadedDataset { id, value } = match &options.dataset {
        Some(path) => dataset::load_dataset(path)?,
        None => dataset::load_dataset(dataset::choose_dataset(&options.candidates, &mut rng)?)?,
    };

    let mut state = SessionState::new();
    state.handle(
        SessionEvent::Start {
            participant: options.participant.clone(),
            dataset: value,
            dataset_id: id,
        },
        &mut rng,
    )?;

    if let Some(running) = state.running() {
        writeln!(out, "Experiment running for {}.", running.participant)?;
        write!(out, "{}", render_tree(&running.tree))?;
    }
    writeln!(out, "{}", state.status_line())?;
    out.flush()?;

    let lines = spawn_line_reader(input);
    let ticks = channel::tick(options.tick_interval);

    loop {
        let event = crossbeam::select! {
            recv(lines) -> line => match line {
                Ok(line) => SessionEvent::Select(line.trim().to_string()),
                Err(_) => {
                    tracing::info!("input closed before target was found");
                    writeln!(out, "Session abandoned.")?;
                    return Ok(RunOutcome::Abandoned);
                }
            },
            recv(ticks) -> _ => SessionEvent::Tick,
        };

        let is_tick = matches!(event, SessionEvent::Tick);
        if let Some(record) = state.handle(event, &mut rng)? {
            let store = ResultStore::new(&options.results);
            store.append(&record)?;
            writeln!(out, "{}", state.status_line())?;
            writeln!(out, "Result saved to {}", store.path().display())?;
            out.flush()?;
            return Ok(RunOutcome::Found(record));
        }
        if is_tick {
            writeln!(status, "{}", state.status_line())?;
            status.flush()?;
        }
    }
}

/// Forward input lines over a channel; the channel closes at end of input
fn spawn_line_reader<I: BufRead + Send + 'static>(input: I) -> Receiver<String> {
    let (tx, rx) = channel::unbounded();
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
