//! Latest-value coalescing between producers and a single consumer context.
//!
//! Producers call [`LatestValueCoalescer::submit`] from any thread. Only the
//! newest pending value is kept. The first submit after the pending slot
//! empties invokes the schedule hook exactly once; the consumer later runs
//! [`LatestValueCoalescer::flush`] on its own context, which keeps draining
//! until no value arrived during its callback. The lock only guards the
//! pending slot and the scheduled flag and is never held while the callback
//! runs.

use std::{fmt, mem};

use parking_lot::Mutex;

/// Pending slot guarded by the coalescer lock.
struct Pending<T> {
    /// Most recent value not yet delivered.
    value: Option<T>,
    /// A flush has been requested and has not yet observed an empty slot.
    scheduled: bool,
}

/// Hook invoked when a flush must be scheduled on the consumer context.
type ScheduleFn = Box<dyn Fn() + Send + Sync>;

/// Collapses bursts of submissions into one delivery of the latest value.
pub struct LatestValueCoalescer<T> {
    pending: Mutex<Pending<T>>,
    schedule: ScheduleFn,
}

impl<T> fmt::Debug for LatestValueCoalescer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = self.pending.lock();
        f.debug_struct("LatestValueCoalescer")
            .field("has_pending", &g.value.is_some())
            .field("scheduled", &g.scheduled)
            .finish()
    }
}

impl<T: Send> LatestValueCoalescer<T> {
    /// Create a coalescer. `schedule` must arrange for `flush` to run on the
    /// consumer context; it is called outside the lock.
    pub fn new<F>(schedule: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            pending: Mutex::new(Pending {
                value: None,
                scheduled: false,
            }),
            schedule: Box::new(schedule),
        }
    }

    /// Replace the pending value, scheduling a flush if none is outstanding.
    pub fn submit(&self, value: T) {
        let should_schedule = {
            let mut g = self.pending.lock();
            g.value = Some(value);
            !mem::replace(&mut g.scheduled, true)
        };
        if should_schedule {
            (self.schedule)();
        }
    }

    /// Deliver pending values to `on_value` until the slot stays empty.
    ///
    /// Returns the number of deliveries. Must only be called from the
    /// consumer context.
    pub fn flush<F>(&self, mut on_value: F) -> usize
    where
        F: FnMut(T),
    {
        let mut delivered = 0;
        loop {
            let next = {
                let mut g = self.pending.lock();
                match g.value.take() {
                    Some(v) => v,
                    None => {
                        g.scheduled = false;
                        return delivered;
                    }
                }
            };
            on_value(next);
            delivered += 1;
        }
    }

    /// True while a flush has been requested but has not yet completed.
    pub fn is_flush_scheduled(&self) -> bool {
        self.pending.lock().scheduled
    }

    /// True while a submitted value awaits a flush.
    pub fn has_pending(&self) -> bool {
        self.pending.lock().value.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
    };

    use super::*;

    fn counting() -> (Arc<AtomicUsize>, LatestValueCoalescer<i32>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let co = LatestValueCoalescer::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (count, co)
    }

    #[test]
    fn burst_collapses_to_latest_value() {
        let (scheduled, co) = counting();
        for v in 1..=100 {
            co.submit(v);
        }
        assert_eq!(scheduled.load(Ordering::SeqCst), 1);
        let mut seen = Vec::new();
        co.flush(|v| seen.push(v));
        assert_eq!(seen, vec![100]);
    }

    #[test]
    fn each_cycle_schedules_once() {
        let (scheduled, co) = counting();
        let mut seen = Vec::new();
        co.submit(1);
        co.submit(2);
        co.flush(|v| seen.push(v));
        co.submit(3);
        co.submit(4);
        co.flush(|v| seen.push(v));
        assert_eq!(seen, vec![2, 4]);
        assert_eq!(scheduled.load(Ordering::SeqCst), 2);
        assert!(!co.is_flush_scheduled());
    }

    #[test]
    fn submit_during_callback_is_drained_in_same_flush() {
        let (scheduled, co) = counting();
        let co = Arc::new(co);
        co.submit(1);
        let inner = co.clone();
        let mut seen = Vec::new();
        let n = co.flush(|v| {
            seen.push(v);
            if v == 1 {
                inner.submit(2);
            }
        });
        assert_eq!(n, 2);
        assert_eq!(seen, vec![1, 2]);
        // The nested submit found the flag still set and did not reschedule.
        assert_eq!(scheduled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_flush_clears_schedule_flag() {
        let (scheduled, co) = counting();
        assert_eq!(co.flush(|_| {}), 0);
        co.submit(7);
        assert!(co.is_flush_scheduled());
        assert_eq!(scheduled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_producers_schedule_one_flush() {
        let (scheduled, co) = counting();
        let co = Arc::new(co);
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let co = co.clone();
                thread::spawn(move || {
                    for i in 0..250 {
                        co.submit(t * 1000 + i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("producer thread");
        }
        assert_eq!(scheduled.load(Ordering::SeqCst), 1);
        let mut seen = Vec::new();
        co.flush(|v| seen.push(v));
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0] % 1000, 249);
    }
}
