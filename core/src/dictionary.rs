//! Allow-list dictionary of short words.
//!
//! Segments shorter than the configured minimum word length are normally
//! dropped. Words in this dictionary stay eligible regardless of length, so
//! short but meaningful tokens (single-char particles, "a", "I") never lose
//! their hint to the generic threshold. The detector consults the dictionary
//! before applying the length filter.

use ahash::AHashSet;

/// Words that are always eligible as hint targets.
///
/// Single-char Japanese particles are included by default so the merge rules
/// in `detect` can see them; English one-letter words round the set out.
const DEFAULT_WORDS: &[&str] = &[
    "a", "I", "を", "が", "は", "に", "の", "と", "で", "へ", "も", "や", "か",
];

/// Allow-list of words exempt from the minimum-length filter.
#[derive(Debug, Clone, Default)]
pub struct WordDictionary {
    words: AHashSet<String>,
}

impl WordDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self {
            words: AHashSet::new(),
        }
    }

    /// Create a dictionary seeded with the built-in short-word set.
    pub fn with_defaults() -> Self {
        let mut dict = Self::new();
        for w in DEFAULT_WORDS {
            dict.insert(w);
        }
        dict
    }

    /// Create a dictionary from an explicit word list.
    pub fn from_words<T: AsRef<str>>(words: &[T]) -> Self {
        let mut dict = Self::new();
        for w in words {
            dict.insert(w.as_ref());
        }
        dict
    }

    /// Add a word to the allow-list.
    pub fn insert(&mut self, word: &str) {
        if !word.is_empty() {
            self.words.insert(word.to_string());
        }
    }

    /// Remove a word from the allow-list. Returns true if it was present.
    pub fn remove(&mut self, word: &str) -> bool {
        self.words.remove(word)
    }

    /// Whether the word is always eligible as a target.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of words in the dictionary.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: Into<String>> Extend<S> for WordDictionary {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        for w in iter {
            let w = w.into();
            if !w.is_empty() {
                self.words.insert(w);
            }
        }
    }
}
