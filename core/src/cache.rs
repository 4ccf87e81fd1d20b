//! Optional per-line detection cache.
//!
//! A purely additive memoization wrapper around `WordDetector`: results are
//! keyed by line content, so redraws of an unchanged viewport skip
//! re-scanning every line. Core correctness never depends on this cache -
//! `CachedDetector::detect` returns exactly what the wrapped detector
//! would, and hosts that skip the wrapper lose nothing but speed.
//!
//! The cache fingerprints the detection-relevant configuration and clears
//! itself when it changes. Mutating the word dictionary (or swapping the
//! segmenter) is invisible to the fingerprint; call `clear_cache` after
//! doing so.

use crate::detect::{Line, Target, WordDetector};
use crate::HintConfig;
use lru::LruCache;
use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

/// A cached target span, independent of the line number it was seen on.
#[derive(Debug, Clone)]
struct CachedSpan {
    text: String,
    start_col: u32,
    end_col: u32,
}

/// LRU memoization wrapper around word detection.
pub struct CachedDetector {
    cache: RefCell<LruCache<String, Vec<CachedSpan>>>,
    hits: RefCell<usize>,
    misses: RefCell<usize>,
    fingerprint: RefCell<Option<u64>>,
}

impl CachedDetector {
    /// Create a cache holding up to `capacity` distinct lines.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: RefCell::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(256).unwrap()),
            )),
            hits: RefCell::new(0),
            misses: RefCell::new(0),
            fingerprint: RefCell::new(None),
        }
    }

    /// Detect targets across `lines`, serving unchanged lines from cache.
    pub fn detect(
        &self,
        detector: &WordDetector,
        lines: &[Line],
        config: &HintConfig,
    ) -> Vec<Target> {
        let fp = config_fingerprint(config, detector.trigger_key());
        if *self.fingerprint.borrow() != Some(fp) {
            // Detection-relevant settings changed; stale spans are useless
            self.clear_cache();
            *self.fingerprint.borrow_mut() = Some(fp);
        }

        let mut out = Vec::new();
        for line in lines {
            if let Some(spans) = self.cache.borrow_mut().get(&line.text) {
                *self.hits.borrow_mut() += 1;
                out.extend(spans.iter().map(|s| Target {
                    text: s.text.clone(),
                    line: line.number,
                    start_col: s.start_col,
                    end_col: s.end_col,
                }));
                continue;
            }

            *self.misses.borrow_mut() += 1;
            let targets = detector.detect_line(line, config);
            let spans = targets
                .iter()
                .map(|t| CachedSpan {
                    text: t.text.clone(),
                    start_col: t.start_col,
                    end_col: t.end_col,
                })
                .collect();
            self.cache.borrow_mut().put(line.text.clone(), spans);
            out.extend(targets);
        }
        out
    }

    /// (hits, misses) since creation or the last clear.
    pub fn cache_stats(&self) -> (usize, usize) {
        (*self.hits.borrow(), *self.misses.borrow())
    }

    /// Hit rate as a percentage; `None` before any access.
    pub fn cache_hit_rate(&self) -> Option<f32> {
        let (hits, misses) = self.cache_stats();
        let total = hits + misses;
        if total == 0 {
            None
        } else {
            Some(hits as f32 / total as f32 * 100.0)
        }
    }

    /// Number of cached lines.
    pub fn cache_size(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Configured capacity.
    pub fn cache_capacity(&self) -> usize {
        self.cache.borrow().cap().get()
    }

    /// Drop every cached line and reset the statistics.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
        *self.hits.borrow_mut() = 0;
        *self.misses.borrow_mut() = 0;
    }
}

/// Hash of the configuration fields that influence detection output.
fn config_fingerprint(config: &HintConfig, trigger_key: Option<&str>) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    config.default_min_word_length.hash(&mut hasher);
    let mut overrides: Vec<(&String, &usize)> = config.per_key_min_length.iter().collect();
    overrides.sort();
    overrides.hash(&mut hasher);
    config.use_script_aware_segmentation.hash(&mut hasher);
    config.segmenter_threshold.hash(&mut hasher);
    config.merge_threshold.hash(&mut hasher);
    trigger_key.hash(&mut hasher);
    hasher.finish()
}
