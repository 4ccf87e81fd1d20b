//! Keystroke disambiguation for one hinting session.
//!
//! `HintSession` owns a session's `AssignmentTable` and `InputState` and
//! advances as a pure state machine: `push_key`, `timeout` and `cancel` are
//! the only transitions. The session performs no I/O and never sleeps -
//! waiting for keystrokes (and measuring the timeout) is the host's job, so
//! the machine is testable without any real concurrency.
//!
//! The shared-prefix rule is the crux: a 1-char label whose character also
//! starts longer labels must not fire the instant it matches. It fires on a
//! timeout, or on a following keystroke that cannot extend any remaining
//! candidate; a candidate set narrowed to a single exact match with no
//! longer sibling fires immediately.

use crate::allocate::AssignmentTable;
use crate::detect::Target;
use crate::utils;

/// Session phase. `Resolved` and `Cancelled` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Waiting for (more) keystrokes
    AwaitingInput,
    /// A target was uniquely selected
    Resolved(Target),
    /// No match, explicit cancel, or interrupt
    Cancelled,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Phase::AwaitingInput)
    }
}

/// Typed prefix and the labels still matching it.
///
/// Reset when a session starts, resolves or is cancelled; the rendering
/// collaborator uses `candidate_labels` to restrict highlighting to
/// plausible labels.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    prefix: String,
    candidate_labels: Vec<String>,
}

impl InputState {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn candidate_labels(&self) -> &[String] {
        &self.candidate_labels
    }
}

/// Disambiguation state machine for one hinting session.
///
/// Owns the session's assignment table exclusively; both the table and the
/// input state are dropped with the session, so stale labels cannot survive
/// into the next trigger.
#[derive(Debug, Clone)]
pub struct HintSession {
    table: AssignmentTable,
    input: InputState,
    phase: Phase,
}

impl HintSession {
    /// Start a session over a freshly allocated table. Every label starts
    /// out as a live candidate.
    pub fn new(table: AssignmentTable) -> Self {
        let candidate_labels = table.labels().map(str::to_string).collect();
        Self {
            table,
            input: InputState {
                prefix: String::new(),
                candidate_labels,
            },
            phase: Phase::AwaitingInput,
        }
    }

    pub fn table(&self) -> &AssignmentTable {
        &self.table
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Advance the machine by one keystroke.
    ///
    /// Non-printable input is ignored entirely (no transition). Otherwise
    /// the new prefix either cancels the session (no match and nothing
    /// pending), resolves a target (exact unambiguous match, or a pending
    /// exact match the keystroke could not extend), or narrows the live
    /// candidate set.
    pub fn push_key(&mut self, key: char) -> &Phase {
        if self.phase.is_terminal() || !utils::is_printable_key(key) {
            return &self.phase;
        }

        let mut next = self.input.prefix.clone();
        next.push(key);

        let candidates = self.table.labels_with_prefix(&next);
        if candidates.is_empty() {
            // A keystroke that cannot extend any candidate fires a pending
            // exact match instead of cancelling
            if let Some(target) = self.table.get(&self.input.prefix).cloned() {
                self.resolve(target);
            } else {
                tracing::debug!(prefix = %next, "no label matches prefix");
                self.phase = Phase::Cancelled;
            }
            return &self.phase;
        }

        if candidates.len() == 1 && candidates[0] == next {
            if let Some(target) = self.table.get(&next).cloned() {
                self.resolve(target);
            }
            return &self.phase;
        }

        // Still ambiguous, or a lone candidate longer than the prefix: a
        // shorter label sharing a prefix with a longer one must not fire
        // early
        self.input.prefix = next;
        self.input.candidate_labels = candidates;
        &self.phase
    }

    /// Force a still-pending exact prefix match.
    ///
    /// This is the only place real time influences the machine, and the
    /// clock lives in the host: it calls `timeout` when no follow-up
    /// keystroke arrived. Without a pending exact match this is a no-op.
    pub fn timeout(&mut self) -> &Phase {
        if self.phase.is_terminal() || self.input.prefix.is_empty() {
            return &self.phase;
        }
        if let Some(target) = self.table.get(&self.input.prefix).cloned() {
            self.resolve(target);
        }
        &self.phase
    }

    /// Explicit cancel (interrupt key). Forces `Cancelled` from any state.
    pub fn cancel(&mut self) {
        self.phase = Phase::Cancelled;
        self.input.prefix.clear();
        self.input.candidate_labels.clear();
    }

    fn resolve(&mut self, target: Target) {
        tracing::debug!(line = target.line, col = target.start_col, "hint resolved");
        self.input.prefix.clear();
        self.input.candidate_labels.clear();
        self.phase = Phase::Resolved(target);
    }
}
