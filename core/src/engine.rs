//! Hinting engine with session management and key event processing.
//!
//! `HintEngine` wires the detector, the allocator and the per-session state
//! machine together behind the three calls a host editor makes: start a
//! session over the visible lines, feed keystrokes (or a timeout, or a
//! cancel), and read `HintContext` back after each call to update the UI.
//!
//! The engine is single-threaded and cooperative. Detection and allocation
//! run to completion synchronously; consuming keystrokes is the only
//! suspension point, and suspension itself (blocking read, event-loop
//! await) is entirely the host's concern. Exactly one session is live at a
//! time; its table and input state are dropped, never reused, when the
//! session ends.

use crate::allocate::allocate;
use crate::context::{HintContext, JumpPosition, PaintedLabel};
use crate::detect::{Cursor, Line, Target, WordDetector};
use crate::dictionary::WordDictionary;
use crate::segmenter::{RemoteSegmenter, Segmenter};
use crate::session::{HintSession, Phase};
use crate::HintConfig;

/// Key event types the engine can process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Printable character input
    Char(char),
    /// Escape key (cancel)
    Escape,
    /// Ctrl + character; Ctrl-C cancels, everything else is ignored
    Ctrl(char),
}

/// Hinting engine owning the collaborators and at most one live session.
pub struct HintEngine {
    config: HintConfig,
    dictionary: WordDictionary,
    segmenter: Option<Box<dyn Segmenter>>,
    session: Option<HintSession>,
    context: HintContext,
}

impl HintEngine {
    /// Create an engine. A remote segmenter client is wired up when the
    /// configuration names an endpoint.
    pub fn new(config: HintConfig) -> Self {
        let segmenter: Option<Box<dyn Segmenter>> = config.segmenter_url.as_ref().map(|url| {
            Box::new(RemoteSegmenter::custom(url, config.segmenter_timeout_ms))
                as Box<dyn Segmenter>
        });
        Self {
            config,
            dictionary: WordDictionary::with_defaults(),
            segmenter,
            session: None,
            context: HintContext::new(),
        }
    }

    /// Replace the short-word dictionary.
    pub fn with_dictionary(mut self, dictionary: WordDictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    /// Inject a segmenter implementation (tests, in-process analyzers).
    pub fn set_segmenter(&mut self, segmenter: Box<dyn Segmenter>) {
        self.segmenter = Some(segmenter);
    }

    pub fn config(&self) -> &HintConfig {
        &self.config
    }

    /// Mutable access to the short-word dictionary.
    pub fn dictionary_mut(&mut self) -> &mut WordDictionary {
        &mut self.dictionary
    }

    /// Get a reference to the live session, if any.
    pub fn session(&self) -> Option<&HintSession> {
        self.session.as_ref()
    }

    /// Get a reference to the context for reading engine state.
    pub fn context(&self) -> &HintContext {
        &self.context
    }

    /// Get a mutable reference to the context.
    pub fn context_mut(&mut self) -> &mut HintContext {
        &mut self.context
    }

    /// Whether a session is live (started and not yet terminal).
    pub fn is_active(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| !s.is_terminal())
            .unwrap_or(false)
    }

    /// Start a hinting session over the visible lines.
    ///
    /// Any previous session is discarded first. With a cursor, targets are
    /// sorted by proximity so the nearest jumps get the shortest labels;
    /// without one they stay in detector emission order. Returns the number
    /// of labelled targets (zero means nothing to hint this session).
    pub fn start(&mut self, lines: &[Line], cursor: Option<Cursor>) -> usize {
        self.start_with_trigger(lines, cursor, None)
    }

    /// Start a session, recording the motion key that triggered it so
    /// per-key minimum-length overrides apply.
    pub fn start_with_trigger(
        &mut self,
        lines: &[Line],
        cursor: Option<Cursor>,
        trigger_key: Option<char>,
    ) -> usize {
        // Fresh session: drop the previous table and input state outright
        self.session = None;
        self.context.clear();
        self.context.jump = None;

        let mut detector = WordDetector::new(&self.dictionary);
        if let Some(segmenter) = self.segmenter.as_deref() {
            detector = detector.with_segmenter(segmenter);
        }
        let key_buf = trigger_key.map(|k| k.to_string());
        if let Some(key) = key_buf.as_deref() {
            detector = detector.with_trigger_key(key);
        }

        let mut targets = detector.detect(lines, &self.config);
        if let Some(cursor) = cursor {
            sort_by_proximity(&mut targets, cursor);
        }

        let table = allocate(&targets, &self.config);
        tracing::debug!(
            targets = targets.len(),
            labels = table.len(),
            dropped = table.dropped(),
            "hint session started"
        );

        // Nothing to hint this session; stay inactive rather than holding
        // an empty table
        if table.is_empty() {
            return 0;
        }

        self.context.labels = table
            .assignments()
            .iter()
            .map(|a| PaintedLabel {
                label: a.label.clone(),
                line: a.target.line,
                col: a.target.start_col,
            })
            .collect();
        self.context.auxiliary_text = format!("{} hints | Esc cancels", table.len());

        let session = HintSession::new(table);
        self.context.live_labels = session
            .input()
            .candidate_labels()
            .to_vec();
        let count = session.table().len();
        self.session = Some(session);
        count
    }

    /// Process a key event and update the context.
    ///
    /// Returns the session phase after the event; `Cancelled` when no
    /// session is live.
    pub fn on_key(&mut self, key: KeyEvent) -> Phase {
        match key {
            KeyEvent::Escape => {
                self.cancel();
                Phase::Cancelled
            }
            KeyEvent::Ctrl(ch) => {
                if ch.eq_ignore_ascii_case(&'c') {
                    self.cancel();
                    Phase::Cancelled
                } else {
                    // Modifier chords never advance the prefix
                    self.current_phase()
                }
            }
            KeyEvent::Char(ch) => {
                let Some(session) = self.session.as_mut() else {
                    return Phase::Cancelled;
                };
                let phase = session.push_key(ch).clone();
                self.apply_phase(&phase);
                phase
            }
        }
    }

    /// The host's timer fired without a follow-up keystroke: force a
    /// still-pending exact match, if any.
    pub fn on_timeout(&mut self) -> Phase {
        let Some(session) = self.session.as_mut() else {
            return Phase::Cancelled;
        };
        let phase = session.timeout().clone();
        self.apply_phase(&phase);
        phase
    }

    /// Cancel the live session and release its state.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.cancel();
        }
        self.session = None;
        self.context.clear();
    }

    /// Sync the context with the phase and drop terminal sessions, so a
    /// finished session can never leak labels into the next one.
    fn apply_phase(&mut self, phase: &Phase) {
        match phase {
            Phase::AwaitingInput => {
                if let Some(session) = self.session.as_ref() {
                    self.context.live_labels = session.input().candidate_labels().to_vec();
                }
            }
            Phase::Resolved(target) => {
                self.context.jump = Some(JumpPosition {
                    line: target.line,
                    col: target.start_col,
                });
                self.context.clear();
                self.session = None;
            }
            Phase::Cancelled => {
                self.context.clear();
                self.session = None;
            }
        }
    }

    fn current_phase(&self) -> Phase {
        self.session
            .as_ref()
            .map(|s| s.phase().clone())
            .unwrap_or(Phase::Cancelled)
    }
}

/// Stable sort by distance from the cursor (line distance first, then
/// column distance), so ties keep emission order.
fn sort_by_proximity(targets: &mut [Target], cursor: Cursor) {
    targets.sort_by_key(|t| {
        let line_dist = t.line.abs_diff(cursor.line);
        let col_dist = t.start_col.abs_diff(cursor.col);
        (line_dist, col_dist)
    });
}
