//! Hint context for host communication.
//!
//! `HintContext` is a simple data container with public fields that the
//! host editor reads after every engine call to update its UI: which labels
//! to paint and where, which labels are still live while the user types,
//! and the jump position once a target resolves.
//!
//! Design philosophy: zero abstraction - just data transfer. No callbacks,
//! no traits, no generics. Host code reads/writes fields directly.

use serde::{Deserialize, Serialize};

/// One label to paint at a screen position.
///
/// `col` is a 1-based character column; translating character columns into
/// display cells (wide CJK glyphs, grapheme clusters) is the renderer's
/// concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintedLabel {
    pub label: String,
    pub line: u32,
    pub col: u32,
}

/// Where to move the cursor after a resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpPosition {
    pub line: u32,
    pub col: u32,
}

/// Hint context for host communication.
///
/// # Fields
///
/// - `labels`: every assignment of the session, for the initial paint
/// - `live_labels`: labels still matching the typed prefix (narrow the
///   highlight to these after each keystroke)
/// - `jump`: set exactly once when a target resolves (consume with
///   `take_jump`)
/// - `auxiliary_text`: optional status line text (hint count, cancel hint)
#[derive(Debug, Clone, Default)]
pub struct HintContext {
    pub labels: Vec<PaintedLabel>,
    pub live_labels: Vec<String>,
    pub jump: Option<JumpPosition>,
    pub auxiliary_text: String,
}

impl HintContext {
    /// Create a new empty hint context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear painted and live labels and the auxiliary text.
    /// Does NOT clear `jump` (the host should consume it first).
    pub fn clear(&mut self) {
        self.labels.clear();
        self.live_labels.clear();
        self.auxiliary_text.clear();
    }

    /// Take the jump position, leaving `None`.
    /// Convenience for hosts that execute the cursor move.
    pub fn take_jump(&mut self) -> Option<JumpPosition> {
        self.jump.take()
    }

    /// Whether there is anything to paint.
    pub fn has_visible_state(&self) -> bool {
        !self.labels.is_empty() || !self.live_labels.is_empty()
    }

    /// Whether a resolve is waiting to be executed.
    pub fn has_jump(&self) -> bool {
        self.jump.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_keeps_jump() {
        let mut ctx = HintContext::new();
        ctx.labels.push(PaintedLabel {
            label: "A".into(),
            line: 1,
            col: 4,
        });
        ctx.jump = Some(JumpPosition { line: 1, col: 4 });

        ctx.clear();
        assert!(!ctx.has_visible_state());
        assert!(ctx.has_jump());
    }

    #[test]
    fn test_take_jump_consumes() {
        let mut ctx = HintContext::new();
        ctx.jump = Some(JumpPosition { line: 2, col: 7 });

        assert_eq!(ctx.take_jump(), Some(JumpPosition { line: 2, col: 7 }));
        assert_eq!(ctx.take_jump(), None);
        assert!(!ctx.has_jump());
    }
}
