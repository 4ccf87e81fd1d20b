// core/tests/engine_flow.rs
//
// End-to-end engine tests: start a session over a viewport, read the
// context a renderer would paint, feed keystrokes/timeouts/cancels, and
// consume the jump. Also covers session isolation across repeated triggers.

use libhint_core::{
    Cursor, HintConfig, HintEngine, JumpPosition, KeyEvent, Line, Phase,
};

fn viewport() -> Vec<Line> {
    vec![
        Line::new(1, "open the file browser"),
        Line::new(2, "close all windows"),
        Line::new(3, "save current buffer"),
    ]
}

#[test]
fn full_session_resolves_to_a_jump() {
    let mut engine = HintEngine::new(HintConfig::default());
    let count = engine.start(&viewport(), None);
    assert_eq!(count, 10);

    // Renderer paints every label up front
    assert_eq!(engine.context().labels.len(), 10);
    assert_eq!(engine.context().live_labels.len(), 10);
    assert_eq!(engine.context().auxiliary_text, "10 hints | Esc cancels");

    // Labels run A S D F G H J then BB BC BE over the ten targets;
    // "D" is the third target: "file" at line 1, col 10
    let phase = engine.on_key(KeyEvent::Char('D'));
    assert!(matches!(phase, Phase::Resolved(ref t) if t.text == "file"));

    let jump = engine.context_mut().take_jump();
    assert_eq!(jump, Some(JumpPosition { line: 1, col: 10 }));
    assert!(!engine.is_active());
}

#[test]
fn two_char_labels_narrow_then_resolve() {
    let mut engine = HintEngine::new(HintConfig::default());
    engine.start(&viewport(), None);

    // First char of a 2-char label: still ambiguous, highlight narrows
    let phase = engine.on_key(KeyEvent::Char('B'));
    assert_eq!(phase, Phase::AwaitingInput);
    assert_eq!(engine.context().live_labels, vec!["BB", "BC", "BE"]);

    let phase = engine.on_key(KeyEvent::Char('C'));
    assert!(matches!(phase, Phase::Resolved(ref t) if t.text == "current"));
}

#[test]
fn timeout_via_engine_resolves_pending_single() {
    // With digits in the single pool and numeric fallback on, the single
    // label "0" shares its prefix with the digit pair "01"
    let mut config = HintConfig::default();
    config.single_char_keys = "01".to_string();
    config.multi_char_keys = "XY".to_string();
    config.max_single_char_hints = None;
    config.use_numeric_fallback = true;

    let mut engine = HintEngine::new(config);
    let n = engine.start(&[Line::new(1, "one two three four five six seven")], None);
    assert_eq!(n, 7);
    // Labels: 0 1 XX XY YX YY 01

    let phase = engine.on_key(KeyEvent::Char('0'));
    assert_eq!(phase, Phase::AwaitingInput);
    assert_eq!(engine.context().live_labels, vec!["0", "01"]);

    let phase = engine.on_timeout();
    assert!(matches!(phase, Phase::Resolved(ref t) if t.text == "one"));
    assert_eq!(
        engine.context_mut().take_jump(),
        Some(JumpPosition { line: 1, col: 1 })
    );
}

#[test]
fn cursor_proximity_reorders_labels() {
    let mut engine = HintEngine::new(HintConfig::default());
    engine.start(&viewport(), Some(Cursor { line: 3, col: 6 }));

    // The first single-char label lands on the cursor line
    assert_eq!(engine.context().labels[0].line, 3);
}

#[test]
fn repeated_triggers_never_leak_labels() {
    let mut engine = HintEngine::new(HintConfig::default());

    engine.start(&viewport(), None);
    engine.on_key(KeyEvent::Char('B'));
    // Mid-disambiguation retrigger over a different viewport
    let count = engine.start(&[Line::new(42, "fresh start here")], None);
    assert_eq!(count, 3);
    assert!(engine.context().labels.iter().all(|l| l.line == 42));
    assert_eq!(engine.context().live_labels.len(), 3);

    // The old prefix is gone: "B" no longer narrows to BB/BC/BE
    let phase = engine.on_key(KeyEvent::Char('A'));
    assert!(matches!(phase, Phase::Resolved(ref t) if t.text == "fresh"));
}

#[test]
fn cancel_releases_everything() {
    let mut engine = HintEngine::new(HintConfig::default());
    engine.start(&viewport(), None);
    engine.on_key(KeyEvent::Char('B'));

    engine.cancel();
    assert!(!engine.is_active());
    assert!(!engine.context().has_visible_state());
    assert_eq!(engine.context_mut().take_jump(), None);

    // Keys after cancel stay cancelled
    assert_eq!(engine.on_key(KeyEvent::Char('A')), Phase::Cancelled);
}

#[test]
fn timeout_with_no_pending_match_keeps_waiting() {
    let mut engine = HintEngine::new(HintConfig::default());
    engine.start(&viewport(), None);

    engine.on_key(KeyEvent::Char('B'));
    assert_eq!(engine.on_timeout(), Phase::AwaitingInput);
    assert!(engine.is_active());
    assert_eq!(engine.context().live_labels, vec!["BB", "BC", "BE"]);
}
