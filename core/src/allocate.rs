//! Hint label allocation.
//!
//! Given the detector's targets and the configured label pools, `allocate`
//! decides how many targets get 1-character labels, generates the remaining
//! multi-character (and optionally digit-pair) labels deterministically, and
//! binds each label to a target. The result is one session's immutable
//! `AssignmentTable`; the next trigger rebuilds it from scratch.
//!
//! Label construction guarantees: labels are unique, and same-length labels
//! never prefix one another (fixed-width alphabets). A 1-char label sharing
//! its first character with a 2-char label is intentional; the session state
//! machine disambiguates that case.

use crate::detect::Target;
use crate::HintConfig;
use ahash::AHashMap;

/// Built-in fallback pools used when the configured pools are degenerate.
pub const DEFAULT_SINGLE_KEYS: &str = "ASDFGHJKLNM0123456789";
pub const DEFAULT_MULTI_KEYS: &str = "BCEIOPQRTUVWXYZ";

/// How many digit-pair labels the numeric fallback can produce
/// ("01".."09", "10".."99", then "00").
const NUMERIC_CAPACITY: usize = 100;

/// One label bound to one target.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub label: String,
    pub target: Target,
}

/// Which kinds of labels one allocation produces.
///
/// Selected once per `allocate` call; each variant composes the pure label
/// generators below. A tagged enum keeps the variants exhaustiveness-checked
/// instead of hiding them behind dynamic dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Every target fits in a single-character label
    Single,
    /// No single-character budget; multi-character labels only
    Multi,
    /// Single-character labels followed by multi-character labels
    Hybrid,
    /// Digit-pair fallback engaged beyond the multi-character space
    Numeric,
}

impl Strategy {
    /// Pick the label mix for `n` targets given the pool capacities.
    pub fn select(n: usize, single_cap: usize, multi_cap: usize, numeric: bool) -> Self {
        if n <= single_cap {
            Strategy::Single
        } else if single_cap == 0 && n <= multi_cap {
            Strategy::Multi
        } else if n <= single_cap + multi_cap {
            Strategy::Hybrid
        } else if numeric {
            Strategy::Numeric
        } else {
            // Over capacity without a fallback: the tail is dropped
            Strategy::Hybrid
        }
    }
}

/// Ordered, deduplicated label character pools.
///
/// Invariants: no character appears in both partitions (overlap is stripped
/// from the multi pool), and both partitions are non-empty - a degenerate
/// configuration falls back to the built-in default pools instead of
/// failing.
#[derive(Debug, Clone)]
pub struct LabelPool {
    single: Vec<char>,
    multi: Vec<char>,
}

impl LabelPool {
    pub fn from_config(config: &HintConfig) -> Self {
        let single = dedup_chars(&config.single_char_keys);
        let mut multi = dedup_chars(&config.multi_char_keys);
        multi.retain(|c| !single.contains(c));

        if single.is_empty() || multi.is_empty() {
            tracing::debug!("degenerate label pools, using built-in defaults");
            return Self {
                single: dedup_chars(DEFAULT_SINGLE_KEYS),
                multi: dedup_chars(DEFAULT_MULTI_KEYS),
            };
        }
        Self { single, multi }
    }

    pub fn single_keys(&self) -> &[char] {
        &self.single
    }

    pub fn multi_keys(&self) -> &[char] {
        &self.multi
    }

    /// Effective single-label budget after the configured cap.
    pub fn single_capacity(&self, cap: Option<usize>) -> usize {
        match cap {
            Some(cap) => self.single.len().min(cap),
            None => self.single.len(),
        }
    }

    /// Size of the 2-character Cartesian label space.
    pub fn multi_capacity(&self) -> usize {
        self.multi.len() * self.multi.len()
    }
}

fn dedup_chars(s: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        if !ch.is_whitespace() && !out.contains(&ch) {
            out.push(ch);
        }
    }
    out
}

/// Single-character labels in pool order, up to the configured cap.
fn single_labels(pool: &LabelPool, cap: usize) -> impl Iterator<Item = String> + '_ {
    pool.single.iter().take(cap).map(|c| c.to_string())
}

/// Two-character labels as the row-major Cartesian product of the multi
/// pool with itself (first character varies slower).
fn multi_labels(pool: &LabelPool) -> impl Iterator<Item = String> + '_ {
    pool.multi.iter().flat_map(move |&a| {
        pool.multi.iter().map(move |&b| {
            let mut label = String::with_capacity(2);
            label.push(a);
            label.push(b);
            label
        })
    })
}

/// Digit-pair labels in the fixed order "01".."09", "10".."99", "00".
/// "00" is reserved as the final overflow label and never starts the
/// sequence.
fn numeric_labels() -> impl Iterator<Item = String> {
    (1..=99)
        .map(|i| format!("{:02}", i))
        .chain(std::iter::once("00".to_string()))
}

/// The complete label→target mapping for one hinting session.
///
/// Immutable for the session's lifetime; rebuilt from scratch on the next
/// trigger so stale labels can never leak across sessions.
#[derive(Debug, Clone)]
pub struct AssignmentTable {
    assignments: Vec<Assignment>,
    index: AHashMap<String, usize>,
    strategy: Strategy,
    dropped: usize,
}

impl AssignmentTable {
    /// Build a table from explicit assignments (strategy derived from the
    /// label mix). `allocate` is the normal constructor.
    pub fn from_assignments(assignments: Vec<Assignment>) -> Self {
        let all_single = assignments.iter().all(|a| a.label.chars().count() == 1);
        let all_multi = assignments.iter().all(|a| a.label.chars().count() > 1);
        let strategy = match (all_single, all_multi) {
            (true, _) => Strategy::Single,
            (_, true) => Strategy::Multi,
            _ => Strategy::Hybrid,
        };
        Self::from_parts(assignments, strategy, 0)
    }

    fn from_parts(assignments: Vec<Assignment>, strategy: Strategy, dropped: usize) -> Self {
        let index = assignments
            .iter()
            .enumerate()
            .map(|(i, a)| (a.label.clone(), i))
            .collect();
        Self {
            assignments,
            index,
            strategy,
            dropped,
        }
    }

    /// All assignments in allocation order.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Target bound to an exact label, if any.
    pub fn get(&self, label: &str) -> Option<&Target> {
        self.index.get(label).map(|&i| &self.assignments[i].target)
    }

    /// All labels in allocation order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.assignments.iter().map(|a| a.label.as_str())
    }

    /// Labels that start with `prefix`, in allocation order.
    pub fn labels_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.assignments
            .iter()
            .filter(|a| a.label.starts_with(prefix))
            .map(|a| a.label.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Targets that received no label because capacity ran out.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// The label mix this table was built with.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

/// Allocate hint labels for `targets` in emission order.
///
/// Deterministic for a given input order. Targets beyond the total label
/// capacity receive no label and are dropped from the session; that is a
/// capacity bound, not an error.
pub fn allocate(targets: &[Target], config: &HintConfig) -> AssignmentTable {
    let pool = LabelPool::from_config(config);
    let single_cap = pool.single_capacity(config.max_single_char_hints);
    let multi_cap = pool.multi_capacity();
    let n = targets.len();

    let strategy = Strategy::select(n, single_cap, multi_cap, config.use_numeric_fallback);
    let labels: Vec<String> = match strategy {
        Strategy::Single => single_labels(&pool, single_cap).take(n).collect(),
        Strategy::Multi => multi_labels(&pool).take(n).collect(),
        Strategy::Hybrid => single_labels(&pool, single_cap)
            .chain(multi_labels(&pool))
            .take(n)
            .collect(),
        Strategy::Numeric => single_labels(&pool, single_cap)
            .chain(multi_labels(&pool))
            .chain(numeric_labels())
            .take(n)
            .collect(),
    };

    let dropped = n - labels.len();
    if dropped > 0 {
        tracing::warn!(
            targets = n,
            capacity = labels.len(),
            dropped,
            "target count exceeds label capacity, dropping the tail"
        );
    }

    let assignments: Vec<Assignment> = labels
        .into_iter()
        .zip(targets.iter().cloned())
        .map(|(label, target)| Assignment { label, target })
        .collect();

    debug_assert!(
        {
            let mut seen = std::collections::HashSet::new();
            assignments.iter().all(|a| seen.insert(a.label.as_str()))
        },
        "generated labels must be unique"
    );

    AssignmentTable::from_parts(assignments, strategy, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(n: usize) -> Vec<Target> {
        (0..n)
            .map(|i| Target {
                text: format!("w{}", i),
                line: 1,
                start_col: (i * 4 + 1) as u32,
                end_col: (i * 4 + 2) as u32,
            })
            .collect()
    }

    fn config(single: &str, multi: &str) -> HintConfig {
        HintConfig {
            single_char_keys: single.to_string(),
            multi_char_keys: multi.to_string(),
            max_single_char_hints: None,
            use_numeric_fallback: false,
            ..HintConfig::default()
        }
    }

    #[test]
    fn test_all_single_when_targets_fit() {
        let table = allocate(&targets(3), &config("ASD", "XY"));
        let labels: Vec<&str> = table.labels().collect();
        assert_eq!(labels, vec!["A", "S", "D"]);
        assert_eq!(table.strategy(), Strategy::Single);
        assert_eq!(table.dropped(), 0);
    }

    #[test]
    fn test_multi_labels_row_major() {
        let table = allocate(&targets(6), &config("A", "XY"));
        let labels: Vec<&str> = table.labels().collect();
        // 1 single, then the row-major product of "XY" x "XY"
        assert_eq!(labels, vec!["A", "XX", "XY", "YX", "YY"]);
        assert_eq!(table.strategy(), Strategy::Hybrid);
        assert_eq!(table.dropped(), 1);
    }

    #[test]
    fn test_max_single_char_hints_cap() {
        let mut cfg = config("ASDF", "XY");
        cfg.max_single_char_hints = Some(2);
        let table = allocate(&targets(4), &cfg);
        let labels: Vec<&str> = table.labels().collect();
        assert_eq!(labels, vec!["A", "S", "XX", "XY"]);
    }

    #[test]
    fn test_zero_single_budget_is_multi_only() {
        let mut cfg = config("ASDF", "XY");
        cfg.max_single_char_hints = Some(0);
        let table = allocate(&targets(3), &cfg);
        let labels: Vec<&str> = table.labels().collect();
        assert_eq!(labels, vec!["XX", "XY", "YX"]);
        assert_eq!(table.strategy(), Strategy::Multi);
    }

    #[test]
    fn test_numeric_fallback_order() {
        let mut cfg = config("A", "XY");
        cfg.use_numeric_fallback = true;
        // 1 single + 4 multi + numeric tail
        let table = allocate(&targets(17), &cfg);
        let labels: Vec<&str> = table.labels().collect();
        assert_eq!(table.strategy(), Strategy::Numeric);
        assert_eq!(&labels[..5], &["A", "XX", "XY", "YX", "YY"]);
        assert_eq!(&labels[5..14], &["01", "02", "03", "04", "05", "06", "07", "08", "09"]);
        assert_eq!(&labels[14..], &["10", "11", "12"]);
    }

    #[test]
    fn test_numeric_fallback_ends_with_double_zero() {
        let mut cfg = config("A", "XY");
        cfg.use_numeric_fallback = true;
        // Exhaust the numeric space entirely: 1 + 4 + 100
        let table = allocate(&targets(200), &cfg);
        assert_eq!(table.len(), 105);
        assert_eq!(table.dropped(), 95);
        let labels: Vec<&str> = table.labels().collect();
        assert_eq!(*labels.last().unwrap(), "00");
        assert_eq!(labels[labels.len() - 2], "99");
    }

    #[test]
    fn test_capacity_drop_is_silent() {
        let table = allocate(&targets(7), &config("A", "XY"));
        // 1 + 4 labels, 2 dropped
        assert_eq!(table.len(), 5);
        assert_eq!(table.dropped(), 2);
    }

    #[test]
    fn test_empty_pools_fall_back_to_defaults() {
        let table = allocate(&targets(2), &config("", ""));
        let labels: Vec<&str> = table.labels().collect();
        assert_eq!(labels, vec!["A", "S"]);
    }

    #[test]
    fn test_overlap_stripped_from_multi_pool() {
        let cfg = config("AS", "ASXY");
        let pool = LabelPool::from_config(&cfg);
        assert_eq!(pool.multi_keys(), &['X', 'Y']);
    }

    #[test]
    fn test_duplicate_pool_chars_deduplicated() {
        let pool = LabelPool::from_config(&config("AAS", "XXYY"));
        assert_eq!(pool.single_keys(), &['A', 'S']);
        assert_eq!(pool.multi_keys(), &['X', 'Y']);
    }

    #[test]
    fn test_labels_unique_for_disjoint_pools() {
        let mut cfg = config("ASDFG", "XYZW");
        cfg.use_numeric_fallback = true;
        let table = allocate(&targets(80), &cfg);
        let mut seen = std::collections::HashSet::new();
        for label in table.labels() {
            assert!(seen.insert(label.to_string()), "duplicate label {label}");
        }
    }

    #[test]
    fn test_lookup_by_label() {
        let table = allocate(&targets(3), &config("ASD", "XY"));
        assert_eq!(table.get("S").unwrap().text, "w1");
        assert!(table.get("Q").is_none());
    }

    #[test]
    fn test_labels_with_prefix() {
        let table = allocate(&targets(5), &config("Q", "XY"));
        // Labels: Q, XX, XY, YX, YY
        assert_eq!(table.labels_with_prefix("X"), vec!["XX", "XY"]);
        assert_eq!(table.labels_with_prefix("Y"), vec!["YX", "YY"]);
        assert_eq!(table.labels_with_prefix("Q"), vec!["Q"]);
        assert!(table.labels_with_prefix("Z").is_empty());
    }

    #[test]
    fn test_from_assignments_derives_strategy() {
        let t = targets(2);
        let table = AssignmentTable::from_assignments(vec![
            Assignment {
                label: "a".into(),
                target: t[0].clone(),
            },
            Assignment {
                label: "aa".into(),
                target: t[1].clone(),
            },
        ]);
        assert_eq!(table.strategy(), Strategy::Hybrid);
        assert_eq!(table.len(), 2);
    }
}
