//! Timed search session
//!
//! `Idle -> Running -> Found`. A session is started with a dataset, a random
//! target label is drawn, and the clock runs until the participant selects a
//! node whose label equals the target. Selections that do not match are
//! ignored without feedback.
//!
//! Ticks only feed the live "time so far" display. The recorded time is the
//! wall-clock difference between start and the matching selection.

use crate::nested::NestedValue;
use crate::result_store::SessionRecord;
use crate::tree::{build_tree, flatten_labels, ItemNode};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Instant;
use thiserror::Error;

/// Reasons a session cannot be started
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Dataset '{0}' contains no labels")]
    EmptyDataset(String),

    #[error("Participant name must not be empty")]
    MissingParticipant,
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Input events driving the session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Begin a new search, discarding any previous state
    Start {
        participant: String,
        dataset: NestedValue,
        dataset_id: String,
    },
    /// Fixed-interval timer signal
    Tick,
    /// The participant picked a node with this label
    Select(String),
}

/// State of a session that is currently being timed
#[derive(Debug, Clone)]
pub struct RunningSession {
    pub participant: String,
    pub dataset: NestedValue,
    pub dataset_id: String,
    pub target: String,
    pub tree: ItemNode,
    pub started_at: Instant,
    pub elapsed_ticks: u64,
}

/// Session state machine
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running(Box<RunningSession>),
    Found(SessionRecord),
}

impl SessionState {
    /// Create an idle session
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a search now
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        participant: &str,
        dataset: NestedValue,
        dataset_id: &str,
        rng: &mut R,
    ) -> Result<&RunningSession> {
        self.start_at(participant, dataset, dataset_id, rng, Instant::now())
    }

    /// Start a search with an explicit start instant
    ///
    /// On error the previous state is left untouched.
    pub fn start_at<R: Rng + ?Sized>(
        &mut self,
        participant: &str,
        dataset: NestedValue,
        dataset_id: &str,
        rng: &mut R,
        now: Instant,
    ) -> Result<&RunningSession> {
        let participant = participant.trim();
        if participant.is_empty() {
            return Err(SessionError::MissingParticipant);
        }

        let labels = flatten_labels(&dataset);
        let target = labels
            .choose(rng)
            .cloned()
            .ok_or_else(|| SessionError::EmptyDataset(dataset_id.to_string()))?;
        let tree = build_tree(&dataset);

        tracing::info!(
            participant,
            dataset_id,
            labels = labels.len(),
            "session started"
        );
        tracing::debug!(label = %target, "target drawn");

        *self = SessionState::Running(Box::new(RunningSession {
            participant: participant.to_string(),
            dataset,
            dataset_id: dataset_id.to_string(),
            target,
            tree,
            started_at: now,
            elapsed_ticks: 0,
        }));

        match self {
            SessionState::Running(running) => Ok(&**running),
            _ => unreachable!("state was just set to Running"),
        }
    }

    /// Advance the live timer by one unit; ignored unless running
    pub fn tick(&mut self) {
        if let SessionState::Running(running) = self {
            running.elapsed_ticks += 1;
        }
    }

    /// Report a selection made now
    pub fn select(&mut self, label: &str) -> Option<SessionRecord> {
        self.select_at(label, Instant::now())
    }

    /// Report a selection made at `now`
    ///
    /// Returns the session record when `label` is the target. The record is
    /// produced only here, once per session.
    pub fn select_at(&mut self, label: &str, now: Instant) -> Option<SessionRecord> {
        let SessionState::Running(running) = self else {
            return None;
        };
        if running.target != label {
            tracing::trace!(label, "selection did not match target");
            return None;
        }

        let elapsed = now.saturating_duration_since(running.started_at);
        let record = SessionRecord {
            participant: running.participant.clone(),
            elapsed_seconds: elapsed.as_secs_f64(),
            dataset_id: running.dataset_id.clone(),
            target_label: running.target.clone(),
        };
        tracing::info!(
            participant = %record.participant,
            elapsed_seconds = record.elapsed_seconds,
            "target found"
        );

        *self = SessionState::Found(record.clone());
        Some(record)
    }

    /// Single transition function over [`SessionEvent`]
    ///
    /// Returns the finished record when the event completes the session.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        event: SessionEvent,
        rng: &mut R,
    ) -> Result<Option<SessionRecord>> {
        match event {
            SessionEvent::Start {
                participant,
                dataset,
                dataset_id,
            } => {
                self.start(&participant, dataset, &dataset_id, rng)?;
                Ok(None)
            }
            SessionEvent::Tick => {
                self.tick();
                Ok(None)
            }
            SessionEvent::Select(label) => Ok(self.select(&label)),
        }
    }

    /// Running session details, if a search is in progress
    pub fn running(&self) -> Option<&RunningSession> {
        match self {
            SessionState::Running(running) => Some(running.as_ref()),
            _ => None,
        }
    }

    /// Finished record, if the target has been found
    pub fn record(&self) -> Option<&SessionRecord> {
        match self {
            SessionState::Found(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, SessionState::Running(_))
    }

    /// Status text for the live display
    pub fn status_line(&self) -> String {
        match self {
            SessionState::Idle => "Enter your name to start.".to_string(),
            SessionState::Running(running) => format!(
                "Find: {} (time: {} s)",
                running.target, running.elapsed_ticks
            ),
            SessionState::Found(record) => {
                format!("Found! Time: {:.2} s", record.elapsed_seconds)
            }
        }
    }
}
