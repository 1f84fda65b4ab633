//! history.rs — bounded, most-recent-first log of past analyses.
//!
//! One ledger per session. The ledger itself is plain (`&mut self`); anything
//! shared across clients wraps it in a lock, see `api::SessionStore`.

use std::collections::VecDeque;

use crate::classifier::Analysis;

/// Number of analyses a session keeps.
pub const CAPACITY: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    // index 0 = newest
    inner: VecDeque<Analysis>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self {
            inner: VecDeque::with_capacity(CAPACITY + 1),
        }
    }

    /// Prepend; anything past `CAPACITY` falls off the old end.
    pub fn insert(&mut self, analysis: Analysis) {
        self.inner.push_front(analysis);
        self.inner.truncate(CAPACITY);
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Owned snapshot, newest first. Later mutations are not reflected.
    pub fn entries(&self) -> Vec<Analysis> {
        self.inner.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify_at;
    use crate::sentiment::PolarityScores;
    use chrono::{Duration, TimeZone, Utc};

    fn nth(i: i64) -> Analysis {
        let t0 = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
        classify_at(
            &format!("entry {i}"),
            PolarityScores::new(0.0, 1.0, 0.0, 0.0),
            t0 + Duration::seconds(i),
        )
        .unwrap()
    }

    fn texts(l: &HistoryLedger) -> Vec<String> {
        l.entries().iter().map(|a| a.text().to_string()).collect()
    }

    #[test]
    fn length_is_min_of_inserts_and_capacity() {
        for n in 0..12 {
            let mut l = HistoryLedger::new();
            for i in 0..n {
                l.insert(nth(i));
            }
            assert_eq!(l.entries().len(), (n as usize).min(CAPACITY), "after {n} inserts");
        }
    }

    #[test]
    fn newest_first_and_capped() {
        let mut l = HistoryLedger::new();
        for i in 1..=7 {
            l.insert(nth(i));
        }
        assert_eq!(
            texts(&l),
            vec!["entry 7", "entry 6", "entry 5", "entry 4", "entry 3"]
        );
        let ts: Vec<_> = l.entries().iter().map(|a| a.timestamp()).collect();
        assert!(ts.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn sixth_insert_evicts_first() {
        let mut l = HistoryLedger::new();
        for i in 1..=5 {
            l.insert(nth(i));
        }
        assert!(texts(&l).contains(&"entry 1".to_string()));
        l.insert(nth(6));
        assert_eq!(l.len(), CAPACITY);
        assert!(!texts(&l).contains(&"entry 1".to_string()));
        assert_eq!(l.entries()[0].text(), "entry 6");
    }

    #[test]
    fn clear_resets_and_is_idempotent() {
        let mut l = HistoryLedger::new();
        l.insert(nth(1));
        l.insert(nth(2));
        l.clear();
        assert!(l.is_empty());
        l.clear();
        assert_eq!(l.entries().len(), 0);

        l.insert(nth(3));
        assert_eq!(texts(&l), vec!["entry 3"]);
    }

    #[test]
    fn snapshot_is_detached() {
        let mut l = HistoryLedger::new();
        l.insert(nth(1));
        let snap = l.entries();
        l.insert(nth(2));
        assert_eq!(snap.len(), 1);
        assert_eq!(l.len(), 2);
    }
}
