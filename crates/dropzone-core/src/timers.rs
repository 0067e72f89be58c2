//! Cancel-and-reschedule timers keyed by purpose.
//!
//! State machines never spawn tasks of their own. They arm deadlines in a
//! [`TimerSet`] and the engine driver sleeps until the earliest one, then
//! hands back whatever is due. At most one deadline exists per key, so
//! arming an already armed key replaces it.

use std::{
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
    time::{Duration, Instant},
};

use tracing::trace;

/// One outstanding deadline.
#[derive(Debug, Clone, Copy)]
struct Entry {
    /// When the timer is due.
    deadline: Instant,
    /// Arm sequence number; breaks ties between equal deadlines.
    seq: u64,
}

/// Deadline table with at most one timer per key.
#[derive(Debug)]
pub struct TimerSet<K> {
    /// Outstanding deadlines.
    entries: HashMap<K, Entry>,
    /// Monotonic arm counter.
    seq: u64,
}

impl<K> Default for TimerSet<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            seq: 0,
        }
    }
}

impl<K: Copy + Eq + Hash + Debug> TimerSet<K> {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key` to fire `delay` after `now`, replacing any outstanding timer.
    pub fn arm(&mut self, key: K, now: Instant, delay: Duration) {
        self.seq = self.seq.wrapping_add(1);
        let deadline = now + delay;
        trace!(?key, delay_ms = delay.as_millis() as u64, "timer_arm");
        self.entries.insert(
            key,
            Entry {
                deadline,
                seq: self.seq,
            },
        );
    }

    /// Cancel `key`. Returns true if a timer was outstanding.
    pub fn cancel(&mut self, key: K) -> bool {
        let had = self.entries.remove(&key).is_some();
        if had {
            trace!(?key, "timer_cancel");
        }
        had
    }

    /// True if `key` has an outstanding deadline.
    pub fn is_armed(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    /// Earliest outstanding deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.values().map(|e| e.deadline).min()
    }

    /// Remove and return every key whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(K, Entry)> = self
            .entries
            .iter()
            .filter(|(_, e)| e.deadline <= now)
            .map(|(k, e)| (*k, *e))
            .collect();
        due.sort_by(|a, b| a.1.deadline.cmp(&b.1.deadline).then(a.1.seq.cmp(&b.1.seq)));
        for (k, _) in &due {
            self.entries.remove(k);
        }
        due.into_iter().map(|(k, _)| k).collect()
    }

    /// Drop every outstanding timer.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            trace!(count = self.entries.len(), "timer_clear");
        }
        self.entries.clear();
    }

    /// Number of outstanding timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no timer is outstanding.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Key {
        A,
        B,
    }

    #[test]
    fn rearm_replaces_deadline() {
        let t0 = Instant::now();
        let mut set = TimerSet::new();
        set.arm(Key::A, t0, Duration::from_millis(100));
        set.arm(Key::A, t0, Duration::from_millis(300));
        assert_eq!(set.len(), 1);
        assert!(set.take_due(t0 + Duration::from_millis(150)).is_empty());
        assert_eq!(set.take_due(t0 + Duration::from_millis(300)), vec![Key::A]);
        assert!(!set.is_armed(Key::A));
    }

    #[test]
    fn due_keys_fire_once_in_deadline_order() {
        let t0 = Instant::now();
        let mut set = TimerSet::new();
        set.arm(Key::A, t0, Duration::from_millis(50));
        set.arm(Key::B, t0, Duration::from_millis(10));
        assert_eq!(set.next_deadline(), Some(t0 + Duration::from_millis(10)));
        let due = set.take_due(t0 + Duration::from_millis(60));
        assert_eq!(due, vec![Key::B, Key::A]);
        assert!(set.take_due(t0 + Duration::from_millis(60)).is_empty());
    }

    #[test]
    fn cancel_and_clear() {
        let t0 = Instant::now();
        let mut set = TimerSet::new();
        set.arm(Key::A, t0, Duration::from_millis(5));
        assert!(set.cancel(Key::A));
        assert!(!set.cancel(Key::A));
        set.arm(Key::B, t0, Duration::from_millis(5));
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.next_deadline(), None);
    }
}
