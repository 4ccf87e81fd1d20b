//! External morphological segmenter boundary.
//!
//! Japanese text has no spaces, so boundary detection by script class alone
//! produces long runs (a whole clause of hiragana, say). A morphological
//! analyzer splits such runs into linguistically meaningful sub-words. The
//! analyzer lives out of process; this module is only the client side.
//!
//! Degrade path: segmentation is an enhancement, never a requirement. If the
//! service is disabled, unreachable, slow, or returns garbage, the caller
//! keeps the whole run as one segment. No failure here is an error.
//!
//! Uses `reqwest` blocking client for simplicity - no async runtime needed.

use serde::Deserialize;
use std::time::Duration;

/// A source of sub-word boundaries for a CJK run.
///
/// Implementations must be total: return the sub-words on success and an
/// empty vector on any failure. The detector treats an empty reply as "keep
/// the run whole".
pub trait Segmenter {
    /// Split `text` into sub-words. The concatenation of the returned
    /// pieces must equal `text`; replies that do not are discarded by the
    /// caller.
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Segmenter service endpoint options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmenterProvider {
    /// Custom endpoint URL for a user-deployed segmenter service
    /// (e.g. a thin HTTP wrapper around MeCab or kagome)
    Custom(String),
}

/// Reply shape of the segmenter service.
#[derive(Debug, Deserialize)]
struct SegmentReply {
    segments: Vec<String>,
}

/// Client for a remote morphological segmenter.
pub struct RemoteSegmenter {
    provider: SegmenterProvider,
    enabled: bool,
    timeout_ms: u64,
}

impl RemoteSegmenter {
    /// Create a new client for the given provider.
    pub fn new(provider: SegmenterProvider) -> Self {
        Self {
            provider,
            enabled: false,
            timeout_ms: 500,
        }
    }

    /// Create an enabled client for a custom endpoint.
    pub fn custom(url: &str, timeout_ms: u64) -> Self {
        Self {
            provider: SegmenterProvider::Custom(url.to_string()),
            enabled: true,
            timeout_ms,
        }
    }

    /// Enable or disable the client.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check if the client is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the request timeout in milliseconds.
    pub fn set_timeout(&mut self, timeout_ms: u64) {
        self.timeout_ms = timeout_ms;
    }

    /// Blocking query implementation.
    fn query_blocking(&self, text: &str) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        let SegmenterProvider::Custom(url) = &self.provider;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(self.timeout_ms))
            .build()?;

        let body = serde_json::json!({ "text": text });

        // Expected response: {"segments": ["これ", "は", "テスト", "です"]}
        let response = client.post(url).json(&body).send()?;
        let reply: SegmentReply = response.json()?;
        Ok(reply.segments)
    }
}

impl Segmenter for RemoteSegmenter {
    /// Query the service (blocking call with timeout).
    ///
    /// Returns an empty vector if the client is disabled, the input is
    /// empty, the request fails, or the reply is malformed. The caller
    /// falls back to the whole run in every one of those cases.
    fn segment(&self, text: &str) -> Vec<String> {
        if !self.enabled || text.is_empty() {
            return vec![];
        }

        match self.query_blocking(text) {
            Ok(segments) => segments,
            Err(err) => {
                tracing::warn!(error = %err, "segmenter unavailable, keeping run whole");
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_disabled() {
        let seg = RemoteSegmenter::new(SegmenterProvider::Custom("http://x".into()));
        assert!(!seg.is_enabled());
        assert_eq!(seg.timeout_ms, 500);
    }

    #[test]
    fn test_custom_is_enabled() {
        let seg = RemoteSegmenter::custom("http://localhost:8710/segment", 300);
        assert!(seg.is_enabled());
        assert_eq!(seg.timeout_ms, 300);
    }

    #[test]
    fn test_enable_disable() {
        let mut seg = RemoteSegmenter::new(SegmenterProvider::Custom("http://x".into()));
        seg.set_enabled(true);
        assert!(seg.is_enabled());
        seg.set_enabled(false);
        assert!(!seg.is_enabled());
    }

    #[test]
    fn test_segment_when_disabled() {
        let seg = RemoteSegmenter::new(SegmenterProvider::Custom("http://x".into()));
        assert!(seg.segment("これはテストです").is_empty());
    }

    #[test]
    fn test_segment_empty_input() {
        let mut seg = RemoteSegmenter::new(SegmenterProvider::Custom("http://x".into()));
        seg.set_enabled(true);
        assert!(seg.segment("").is_empty());
    }

    #[test]
    fn test_unreachable_endpoint_degrades() {
        // Nothing listens here; the client must swallow the error
        let seg = RemoteSegmenter::custom("http://127.0.0.1:1/segment", 50);
        assert!(seg.segment("これはテストです").is_empty());
    }
}
