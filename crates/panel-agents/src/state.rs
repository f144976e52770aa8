//! Run state machine — explicit phases and legal transition guards.
//!
//! The pipeline is a straight line (review → discussion → synthesis) with a
//! single escape hatch to `Failed` from any non-terminal phase. Modeling it
//! explicitly keeps every phase change auditable: each transition is
//! validated, logged, and recorded so a finished run can explain how it got
//! to its terminal state.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// The phases of a panel run.
///
/// Every run starts at `Idle` and terminates at either `Complete` or
/// `Failed`. Follow-up questions are not part of the run and never touch
/// this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Validating inputs, no completion call issued yet.
    Idle,
    /// Concurrent per-persona review calls in flight.
    Reviewing,
    /// Single discussion call in flight.
    Discussing,
    /// Single synthesis call in flight.
    Synthesizing,
    /// All three artifacts produced — terminal state.
    Complete,
    /// Transport fault or validation error — terminal state.
    Failed,
}

impl RunState {
    /// Whether this is a terminal state (no further transitions allowed).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Reviewing => write!(f, "Reviewing"),
            Self::Discussing => write!(f, "Discussing"),
            Self::Synthesizing => write!(f, "Synthesizing"),
            Self::Complete => write!(f, "Complete"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Legal transitions:
/// ```text
/// Idle → Reviewing | Failed
/// Reviewing → Discussing | Failed
/// Discussing → Synthesizing | Failed
/// Synthesizing → Complete | Failed
/// ```
/// No phase is skippable and no phase repeats within a run.
fn is_legal_transition(from: RunState, to: RunState) -> bool {
    use RunState::*;

    if to == Failed && !from.is_terminal() {
        return true;
    }

    matches!(
        (from, to),
        (Idle, Reviewing)
            | (Reviewing, Discussing)
            | (Discussing, Synthesizing)
            | (Synthesizing, Complete)
    )
}

/// A single recorded phase change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: RunState,
    pub to: RunState,
    /// Milliseconds since the run started.
    pub elapsed_ms: u64,
    /// Optional context about why this transition happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Error returned when an illegal transition is attempted.
#[derive(Debug, Clone)]
pub struct IllegalTransition {
    pub from: RunState,
    pub to: RunState,
}

impl fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Illegal run state transition: {} -> {}", self.from, self.to)
    }
}

impl std::error::Error for IllegalTransition {}

/// Tracks the current phase, enforces legal transitions, and keeps the
/// full transition log for diagnostics.
pub struct RunStateMachine {
    current: RunState,
    started_at: Instant,
    transitions: Vec<TransitionRecord>,
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self {
            current: RunState::Idle,
            started_at: Instant::now(),
            transitions: Vec::new(),
        }
    }

    pub fn current(&self) -> RunState {
        self.current
    }

    /// Attempt to advance to the next phase.
    pub fn advance(&mut self, to: RunState, reason: Option<&str>) -> Result<(), IllegalTransition> {
        if !is_legal_transition(self.current, to) {
            return Err(IllegalTransition {
                from: self.current,
                to,
            });
        }

        let record = TransitionRecord {
            from: self.current,
            to,
            elapsed_ms: self.started_at.elapsed().as_millis() as u64,
            reason: reason.map(String::from),
        };

        tracing::debug!(from = %self.current, to = %to, "Run state transition");

        self.transitions.push(record);
        self.current = to;
        Ok(())
    }

    /// Transition to `Failed` — always legal from non-terminal states.
    pub fn fail(&mut self, reason: &str) -> Result<(), IllegalTransition> {
        self.advance(RunState::Failed, Some(reason))
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// One-line history of the run for log output.
    pub fn summary(&self) -> String {
        let states: Vec<String> = self.transitions.iter().map(|t| t.to.to_string()).collect();
        format!(
            "{} -> {} ({}ms, {} transitions)",
            RunState::Idle,
            self.current,
            self.started_at.elapsed().as_millis(),
            self.transitions.len(),
        ) + if states.is_empty() {
            String::new()
        } else {
            format!(" [{}]", states.join(" -> "))
        }
        .as_str()
    }
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
