//! libhint-core
//!
//! Word-target detection, hint-label allocation and keystroke disambiguation
//! for hit-a-hint navigation. Host editors feed the visible lines in, paint
//! the returned labels, and forward keystrokes until a target resolves.
//!
//! Public API:
//! - `HintConfig` - Configuration value object (no global state)
//! - `WordDetector` - Script-aware word boundary detection over visible lines
//! - `allocate` / `AssignmentTable` - Deterministic hint label allocation
//! - `HintSession` - Keystroke disambiguation state machine for one session
//! - `HintEngine` - Session orchestrator driven by `on_key`/`on_timeout`/`cancel`
//! - `HintContext` - Plain data the rendering/jump collaborator reads back
//! - `RemoteSegmenter` - Optional external morphological segmenter client
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Core modules
pub mod classify;
pub use classify::{classify_char, CharClass};

pub mod dictionary;
pub use dictionary::WordDictionary;

pub mod segmenter;
pub use segmenter::{RemoteSegmenter, Segmenter, SegmenterProvider};

pub mod detect;
pub use detect::{Cursor, Line, Target, WordDetector};

pub mod allocate;
pub use allocate::{allocate, Assignment, AssignmentTable, LabelPool, Strategy};

pub mod session;
pub use session::{HintSession, InputState, Phase};

pub mod context;
pub use context::{HintContext, JumpPosition, PaintedLabel};

pub mod engine;
pub use engine::{HintEngine, KeyEvent};

pub mod cache;
pub use cache::CachedDetector;

/// Configuration for one hinting session.
///
/// This is a plain value object: it is passed by reference into every
/// operation and never mutated by the core. Hosts construct it once (or load
/// it from TOML) and hand it to the engine per trigger.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HintConfig {
    /// Characters eligible for 1-character hint labels, in priority order
    pub single_char_keys: String,

    /// Characters combined pairwise into multi-character hint labels
    pub multi_char_keys: String,

    /// Cap on how many targets receive 1-character labels.
    /// `None` means every `single_char_keys` character may be used.
    pub max_single_char_hints: Option<usize>,

    /// Generate digit-pair labels ("01".."99", "00") once the
    /// multi-character label space is exhausted
    pub use_numeric_fallback: bool,

    /// Minimum word length (in chars) for a segment to become a target
    pub default_min_word_length: usize,

    /// Per-trigger-key override of the minimum word length.
    /// Keyed by the motion key that started the hinting session.
    pub per_key_min_length: HashMap<String, usize>,

    /// Delegate long CJK runs to the external morphological segmenter
    pub use_script_aware_segmentation: bool,

    /// Minimum CJK run length (in chars) worth delegating to the segmenter
    pub segmenter_threshold: usize,

    /// Maximum char length of a trailing particle eligible for merging
    /// into its preceding segment
    pub merge_threshold: usize,

    // Disambiguation Settings
    /// How long the host should wait for a follow-up keystroke before
    /// calling `on_timeout` to force a pending single-char match.
    /// The core itself never sleeps; this is advisory for the host loop.
    pub resolve_timeout_ms: u64,

    // Remote Segmenter Settings
    /// Endpoint of a user-deployed morphological segmenter service
    pub segmenter_url: Option<String>,
    /// Request timeout for the segmenter; on expiry the whole run is kept
    pub segmenter_timeout_ms: u64,

    // Cache Management
    /// Maximum number of entries in the per-line detection cache
    pub max_cache_size: usize,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            // Home-row first; digits last so they rarely appear as labels
            single_char_keys: "ASDFGHJKLNM0123456789".to_string(),
            multi_char_keys: "BCEIOPQRTUVWXYZ".to_string(),
            // Nearest jumps stay one keystroke away
            max_single_char_hints: Some(7),
            use_numeric_fallback: false,
            default_min_word_length: 2,
            per_key_min_length: HashMap::new(),
            use_script_aware_segmentation: false,
            segmenter_threshold: 4,
            merge_threshold: 2,
            resolve_timeout_ms: 750,
            segmenter_url: None,
            segmenter_timeout_ms: 500,
            max_cache_size: 256,
        }
    }
}

impl HintConfig {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HintConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    // ========== Minimum Word Length ==========

    /// Minimum word length for a session started by `trigger_key`.
    ///
    /// Falls back to `default_min_word_length` when the key has no override
    /// (or no key is known).
    pub fn resolve_min_length(&self, trigger_key: Option<&str>) -> usize {
        trigger_key
            .and_then(|k| self.per_key_min_length.get(k))
            .copied()
            .unwrap_or(self.default_min_word_length)
    }

    /// Set a per-key minimum word length override.
    pub fn set_min_length_for_key(&mut self, key: &str, min_length: usize) {
        self.per_key_min_length.insert(key.to_string(), min_length);
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim trailing line breaks.
    ///
    /// Hosts that read lines from sources with inconsistent normalization
    /// (clipboard, RPC) should normalize before calling `detect`, so that
    /// column arithmetic agrees with what is on screen.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc()
            .collect::<String>()
            .trim_end_matches(['\r', '\n'])
            .to_string()
    }

    /// Whether a keystroke character can participate in a hint label.
    ///
    /// Control characters and other non-printable input never advance the
    /// disambiguation prefix.
    pub fn is_printable_key(ch: char) -> bool {
        !ch.is_control()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_shape() {
        let config = HintConfig::default();
        assert_eq!(config.single_char_keys.len(), 21);
        assert_eq!(config.multi_char_keys.len(), 15);
        assert_eq!(config.max_single_char_hints, Some(7));
        assert!(!config.use_numeric_fallback);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = HintConfig::default();
        config.default_min_word_length = 3;
        config.set_min_length_for_key("w", 1);
        config.segmenter_url = Some("http://localhost:8710/segment".to_string());

        let text = config.to_toml_string().unwrap();
        let loaded = HintConfig::from_toml_str(&text).unwrap();

        assert_eq!(loaded.default_min_word_length, 3);
        assert_eq!(loaded.resolve_min_length(Some("w")), 1);
        assert_eq!(
            loaded.segmenter_url.as_deref(),
            Some("http://localhost:8710/segment")
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let loaded = HintConfig::from_toml_str("default_min_word_length = 5").unwrap();
        assert_eq!(loaded.default_min_word_length, 5);
        assert_eq!(
            loaded.single_char_keys,
            HintConfig::default().single_char_keys
        );
        assert_eq!(loaded.resolve_timeout_ms, 750);
    }

    #[test]
    fn test_resolve_min_length() {
        let mut config = HintConfig::default();
        config.set_min_length_for_key("f", 1);

        assert_eq!(config.resolve_min_length(None), 2);
        assert_eq!(config.resolve_min_length(Some("w")), 2);
        assert_eq!(config.resolve_min_length(Some("f")), 1);
    }

    #[test]
    fn test_normalize_strips_line_breaks() {
        assert_eq!(utils::normalize("hello\r\n"), "hello");
        // NFC: combining acute onto 'e'
        assert_eq!(utils::normalize("e\u{0301}"), "\u{00e9}");
    }

    #[test]
    fn test_printable_key() {
        assert!(utils::is_printable_key('a'));
        assert!(utils::is_printable_key('あ'));
        assert!(!utils::is_printable_key('\u{1b}'));
        assert!(!utils::is_printable_key('\t'));
    }
}
