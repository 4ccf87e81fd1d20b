//! Word boundary detection over visible lines.
//!
//! The detector scans a bounded window of lines (the visible viewport; it
//! never reads the full document) and emits one `Target` per word-like
//! segment, left to right, top to bottom. Detection is a pure function of
//! the input lines and configuration: classification by code-point range,
//! boundary offsets at class changes and camelCase transitions, a
//! minimum-length filter with a dictionary escape hatch, optional
//! morphological sub-segmentation of long Japanese runs, and a single
//! left-to-right merge pass for particles, verb inflections and katakana
//! compounds.
//!
//! Column positions are 1-based character columns computed from code-point
//! offsets, never bytes, so CJK and emoji text cannot desynchronize label
//! placement.

use crate::classify::{classify_char, CharClass};
use crate::dictionary::WordDictionary;
use crate::segmenter::Segmenter;
use crate::HintConfig;
use serde::{Deserialize, Serialize};

/// One visible line, as supplied by the host editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// 1-based line number in the host buffer
    pub number: u32,
    pub text: String,
}

impl Line {
    pub fn new<T: Into<String>>(number: u32, text: T) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Cursor position in the host buffer (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub line: u32,
    pub col: u32,
}

/// A candidate word span eligible to receive a hint label.
///
/// `start_col`/`end_col` are 1-based character columns, inclusive on both
/// ends: the target text equals the line's chars `[start_col-1 .. end_col]`.
/// Targets are immutable once created and dropped when the session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub text: String,
    pub line: u32,
    pub start_col: u32,
    pub end_col: u32,
}

/// Closed set of trailing particles/connectives that merge into the word
/// they follow. Bounded at the use site by `merge_threshold`.
static PARTICLES: phf::Set<&'static str> = phf::phf_set! {
    "を", "が", "は", "に", "の", "と", "で", "へ", "も", "や", "か", "ね", "よ",
    "から", "まで", "より", "など", "だけ", "しか", "ほど", "って", "とか",
    "でも", "けど", "ので", "のに",
};

/// Fixed set of hiragana verb-inflection suffixes that merge onto a
/// preceding kanji stem (勉強 + する, 走 + った).
static VERB_SUFFIXES: phf::Set<&'static str> = phf::phf_set! {
    "する", "した", "して", "します", "しない", "される", "させる", "しよう",
    "です", "ます", "ました", "ません", "ない", "たい", "れる", "られる",
    "せる", "った", "って", "いる", "える", "う", "く", "た",
};

/// A raw segment between two boundary offsets (0-based char offsets).
#[derive(Debug, Clone)]
struct Segment {
    start: usize,
    text: String,
    class: CharClass,
}

impl Segment {
    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Script-aware word boundary detector.
///
/// Borrows its collaborators: the short-word dictionary and (optionally) an
/// external segmenter. `detect` itself is read-only and reusable across
/// sessions.
pub struct WordDetector<'a> {
    dictionary: &'a WordDictionary,
    segmenter: Option<&'a dyn Segmenter>,
    trigger_key: Option<String>,
}

impl<'a> WordDetector<'a> {
    pub fn new(dictionary: &'a WordDictionary) -> Self {
        Self {
            dictionary,
            segmenter: None,
            trigger_key: None,
        }
    }

    /// Attach an external morphological segmenter for long Japanese runs.
    pub fn with_segmenter(mut self, segmenter: &'a dyn Segmenter) -> Self {
        self.segmenter = Some(segmenter);
        self
    }

    /// Record the motion key that triggered this session, for per-key
    /// minimum-length overrides.
    pub fn with_trigger_key(mut self, key: &str) -> Self {
        self.trigger_key = Some(key.to_string());
        self
    }

    /// The motion key this detector was configured with, if any.
    pub fn trigger_key(&self) -> Option<&str> {
        self.trigger_key.as_deref()
    }

    /// Detect word targets across the supplied lines, in emission order
    /// (left to right within a line, lines in the given order).
    pub fn detect(&self, lines: &[Line], config: &HintConfig) -> Vec<Target> {
        let targets: Vec<Target> = lines
            .iter()
            .flat_map(|line| self.detect_line(line, config))
            .collect();
        tracing::debug!(
            lines = lines.len(),
            targets = targets.len(),
            "word detection complete"
        );
        targets
    }

    /// Detect word targets on a single line. Empty or malformed input
    /// yields an empty list, never an error.
    pub fn detect_line(&self, line: &Line, config: &HintConfig) -> Vec<Target> {
        let chars: Vec<char> = line.text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let classes = effective_classes(&chars, config.use_script_aware_segmentation);
        let raw = scan_segments(&chars, &classes);

        let min_len = config.resolve_min_length(self.trigger_key.as_deref());
        let filtered: Vec<Segment> = raw
            .into_iter()
            .filter(|seg| self.eligible(seg, min_len))
            .collect();

        let segmented = self.apply_script_segmentation(filtered, config, min_len);
        let merged = merge_segments(segmented, config);

        merged
            .into_iter()
            .map(|seg| {
                let len = seg.char_len();
                Target {
                    text: seg.text,
                    line: line.number,
                    start_col: (seg.start + 1) as u32,
                    end_col: (seg.start + len) as u32,
                }
            })
            .collect()
    }

    /// The dictionary escape hatch is checked before the length filter, so
    /// short but meaningful tokens are never lost to the threshold.
    fn eligible(&self, seg: &Segment, min_len: usize) -> bool {
        self.dictionary.contains(&seg.text) || seg.char_len() >= min_len
    }

    /// Delegate long Japanese runs to the external segmenter. Any failure,
    /// empty reply, or reply that does not cover the run keeps the run
    /// whole; sub-segments pass through the minimum-length filter again.
    fn apply_script_segmentation(
        &self,
        segs: Vec<Segment>,
        config: &HintConfig,
        min_len: usize,
    ) -> Vec<Segment> {
        if !config.use_script_aware_segmentation {
            return segs;
        }
        let Some(segmenter) = self.segmenter else {
            return segs;
        };

        let mut out = Vec::with_capacity(segs.len());
        for seg in segs {
            if seg.class.is_japanese() && seg.char_len() >= config.segmenter_threshold {
                let pieces = segmenter.segment(&seg.text);
                if covers_run(&seg.text, &pieces) {
                    let mut offset = seg.start;
                    for piece in pieces {
                        let len = piece.chars().count();
                        let sub = Segment {
                            start: offset,
                            text: piece,
                            class: seg.class,
                        };
                        offset += len;
                        if self.eligible(&sub, min_len) {
                            out.push(sub);
                        }
                    }
                    continue;
                } else if !pieces.is_empty() {
                    tracing::warn!(
                        run = %seg.text,
                        "segmenter reply does not cover run, keeping whole"
                    );
                }
            }
            out.push(seg);
        }
        out
    }
}

/// Classify every char, then resolve the context-dependent `Other` class:
/// a run of `Other` adjacent to an AlphaNumeric char joins the word, any
/// other run acts as punctuation. With script-aware segmentation off, the
/// three Japanese classes collapse into one so mixed-script Japanese text
/// stays a single run.
fn effective_classes(chars: &[char], script_aware: bool) -> Vec<CharClass> {
    let raw: Vec<CharClass> = chars.iter().map(|&c| classify_char(c)).collect();
    let mut classes = raw.clone();

    let mut i = 0;
    while i < classes.len() {
        if raw[i] == CharClass::Other {
            let start = i;
            while i < classes.len() && raw[i] == CharClass::Other {
                i += 1;
            }
            let before = start.checked_sub(1).map(|j| raw[j]);
            let after = raw.get(i).copied();
            let resolved = if before == Some(CharClass::AlphaNumeric)
                || after == Some(CharClass::AlphaNumeric)
            {
                CharClass::AlphaNumeric
            } else {
                CharClass::Symbol
            };
            for class in classes.iter_mut().take(i).skip(start) {
                *class = resolved;
            }
        } else {
            i += 1;
        }
    }

    if !script_aware {
        for class in classes.iter_mut() {
            if class.is_japanese() {
                *class = CharClass::Kanji;
            }
        }
    }

    classes
}

/// Find boundary offsets and collect the word-class runs between them.
/// Boundaries sit at every class change and at lowercase→uppercase
/// transitions inside an alphanumeric run (camelCase).
fn scan_segments(chars: &[char], classes: &[CharClass]) -> Vec<Segment> {
    let mut segs = Vec::new();
    let mut start = 0;

    for i in 1..=chars.len() {
        let boundary = i == chars.len()
            || classes[i] != classes[i - 1]
            || (classes[i] == CharClass::AlphaNumeric
                && chars[i - 1].is_lowercase()
                && chars[i].is_uppercase());
        if boundary {
            if classes[start].is_word() {
                segs.push(Segment {
                    start,
                    text: chars[start..i].iter().collect(),
                    class: classes[start],
                });
            }
            start = i;
        }
    }

    segs
}

/// One left-to-right merge pass. A merged pair becomes one segment and is
/// not re-evaluated against further rules in the same pass (no chaining).
fn merge_segments(segs: Vec<Segment>, config: &HintConfig) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segs.len());
    let mut i = 0;
    while i < segs.len() {
        if i + 1 < segs.len() {
            let (left, right) = (&segs[i], &segs[i + 1]);
            if adjacent(left, right) && should_merge(left, right, config) {
                out.push(Segment {
                    start: left.start,
                    text: format!("{}{}", left.text, right.text),
                    class: left.class,
                });
                i += 2;
                continue;
            }
        }
        out.push(segs[i].clone());
        i += 1;
    }
    out
}

fn adjacent(left: &Segment, right: &Segment) -> bool {
    left.start + left.char_len() == right.start
}

/// Reply sanity check: non-empty pieces whose concatenation reproduces the
/// original run exactly.
fn covers_run(text: &str, pieces: &[String]) -> bool {
    if pieces.is_empty() || pieces.iter().any(|p| p.is_empty()) {
        return false;
    }
    let mut rest = text;
    for piece in pieces {
        match rest.strip_prefix(piece.as_str()) {
            Some(r) => rest = r,
            None => return false,
        }
    }
    rest.is_empty()
}

fn should_merge(left: &Segment, right: &Segment, config: &HintConfig) -> bool {
    // Trailing particle/connective joins the word it follows
    if PARTICLES.contains(right.text.as_str()) && right.char_len() <= config.merge_threshold {
        return true;
    }
    // Kanji stem + hiragana inflection suffix (勉強 + する)
    if left.class == CharClass::Kanji
        && right.class == CharClass::Hiragana
        && VERB_SUFFIXES.contains(right.text.as_str())
    {
        return true;
    }
    // Adjacent katakana segments are compound-word candidates
    if left.class == CharClass::Katakana && right.class == CharClass::Katakana {
        return true;
    }
    false
}
