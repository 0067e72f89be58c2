//! Horizontal shake recognition over a sliding time window.
//!
//! Samples arrive whenever the platform delivers a drag event, so the rate
//! is irregular. Each call to [`ShakeDetector::ingest`] prunes samples older
//! than the window and re-scans what remains:
//!
//! - segments whose horizontal travel is below `min_step` are skipped; they
//!   neither extend nor break a run of reversals
//! - a reversal is a sign change between consecutive qualifying segments
//! - a shake needs `min_samples` samples, `min_reversals` reversals and at
//!   least `min_total` summed qualifying travel
//!
//! After a positive result further shakes are suppressed for `cooldown`.

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use tracing::{debug, trace};

use crate::{config::ShakeCfg, geom::Point};

/// One pointer position with its arrival time.
#[derive(Debug, Clone, Copy)]
pub struct PointerSample {
    /// Pointer location.
    pub point: Point,
    /// Arrival time.
    pub at: Instant,
}

/// Stateful shake classifier.
#[derive(Debug)]
pub struct ShakeDetector {
    cfg: ShakeCfg,
    /// Samples inside the window, oldest first.
    samples: VecDeque<PointerSample>,
    /// Time of the last positive detection.
    last_shake: Option<Instant>,
}

/// Aggregate of the qualifying segments within the window.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Scan {
    reversals: usize,
    total: f64,
}

impl ShakeDetector {
    /// An empty detector.
    pub fn new(cfg: ShakeCfg) -> Self {
        Self {
            cfg,
            samples: VecDeque::new(),
            last_shake: None,
        }
    }

    /// Drop the sample window. The cooldown survives so that a shake at the
    /// very end of one drag cannot be followed instantly by another.
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Number of samples currently inside the window.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Add a sample; true iff a shake is recognized at this call.
    pub fn ingest(&mut self, point: Point, at: Instant) -> bool {
        self.samples.push_back(PointerSample { point, at });
        self.prune(at);

        if let Some(last) = self.last_shake
            && at.saturating_duration_since(last) <= self.cfg.cooldown()
        {
            return false;
        }
        if self.samples.len() < self.cfg.min_samples.max(2) {
            return false;
        }

        let scan = self.scan();
        trace!(
            samples = self.samples.len(),
            reversals = scan.reversals,
            total = scan.total,
            "shake_scan"
        );
        if scan.reversals < self.cfg.min_reversals || scan.total < self.cfg.min_total {
            return false;
        }
        debug!(
            reversals = scan.reversals,
            total = scan.total,
            "shake_detected"
        );
        self.last_shake = Some(at);
        true
    }

    fn prune(&mut self, now: Instant) {
        let window: Duration = self.cfg.window();
        while let Some(front) = self.samples.front() {
            if now.saturating_duration_since(front.at) > window {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    fn scan(&self) -> Scan {
        let mut scan = Scan::default();
        let mut last_sign = 0i8;
        for (prev, cur) in self.samples.iter().zip(self.samples.iter().skip(1)) {
            let dx = cur.point.x - prev.point.x;
            if dx.abs() < self.cfg.min_step {
                continue;
            }
            scan.total += dx.abs();
            let sign = if dx > 0.0 { 1 } else { -1 };
            if last_sign != 0 && sign != last_sign {
                scan.reversals += 1;
            }
            last_sign = sign;
        }
        scan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Feed x positions at a fixed cadence, returning every ingest result.
    fn feed(det: &mut ShakeDetector, t0: Instant, step_ms: u64, xs: &[f64]) -> Vec<bool> {
        xs.iter()
            .enumerate()
            .map(|(i, x)| det.ingest(Point::new(*x, 100.0), t0 + ms(step_ms * i as u64)))
            .collect()
    }

    #[test]
    fn alternating_strokes_trigger_on_fifth_sample() {
        let mut det = ShakeDetector::new(ShakeCfg::default());
        let t0 = Instant::now();
        // Deltas +40,-40,+40,-40: three reversals, 160 total.
        let out = feed(&mut det, t0, 50, &[0.0, 40.0, 0.0, 40.0, 0.0]);
        assert_eq!(out, vec![false, false, false, false, true]);
    }

    #[test]
    fn small_strokes_need_a_lower_total() {
        let t0 = Instant::now();
        let xs = [0.0, 10.0, 0.0, 10.0, 0.0];

        let mut det = ShakeDetector::new(ShakeCfg::default());
        assert!(!feed(&mut det, t0, 50, &xs).iter().any(|b| *b));

        let cfg = ShakeCfg {
            min_total: 40.0,
            ..ShakeCfg::default()
        };
        let mut det = ShakeDetector::new(cfg);
        assert_eq!(feed(&mut det, t0, 50, &xs).last(), Some(&true));
    }

    #[test]
    fn sub_step_jitter_neither_counts_nor_breaks() {
        let mut det = ShakeDetector::new(ShakeCfg::default());
        let t0 = Instant::now();
        // +50, -3 (ignored), -50, +2 (ignored), +50, -50
        let out = feed(&mut det, t0, 30, &[0.0, 50.0, 47.0, -3.0, -1.0, 49.0, -1.0]);
        assert_eq!(out.last(), Some(&true));
    }

    #[test]
    fn samples_outside_window_are_pruned() {
        let mut det = ShakeDetector::new(ShakeCfg::default());
        let t0 = Instant::now();
        // 200ms cadence: at most three samples fit in 450ms.
        let out = feed(&mut det, t0, 200, &[0.0, 60.0, 0.0, 60.0, 0.0, 60.0]);
        assert!(out.iter().all(|b| !b));
        assert!(det.sample_count() <= 3);
    }

    #[test]
    fn cooldown_suppresses_retrigger() {
        let mut det = ShakeDetector::new(ShakeCfg::default());
        let t0 = Instant::now();
        let first = feed(&mut det, t0, 40, &[0.0, 50.0, 0.0, 50.0, 0.0]);
        assert_eq!(first.last(), Some(&true));
        // Keep shaking immediately; still inside the 800ms cooldown.
        let t1 = t0 + ms(200);
        let again = feed(&mut det, t1, 40, &[50.0, 0.0, 50.0, 0.0, 50.0]);
        assert!(again.iter().all(|b| !b));
        // Well after the cooldown a fresh shake is accepted.
        let t2 = t0 + ms(1500);
        let later = feed(&mut det, t2, 40, &[0.0, 50.0, 0.0, 50.0, 0.0]);
        assert_eq!(later.last(), Some(&true));
    }

    #[test]
    fn reset_clears_samples_but_keeps_cooldown() {
        let mut det = ShakeDetector::new(ShakeCfg::default());
        let t0 = Instant::now();
        assert_eq!(
            feed(&mut det, t0, 40, &[0.0, 50.0, 0.0, 50.0, 0.0]).last(),
            Some(&true)
        );
        det.reset();
        assert_eq!(det.sample_count(), 0);
        let again = feed(&mut det, t0 + ms(300), 40, &[0.0, 50.0, 0.0, 50.0, 0.0]);
        assert!(again.iter().all(|b| !b));
    }

    #[test]
    fn vertical_motion_is_not_a_shake() {
        let mut det = ShakeDetector::new(ShakeCfg::default());
        let t0 = Instant::now();
        let mut hit = false;
        for i in 0..8u64 {
            let y = if i % 2 == 0 { 0.0 } else { 80.0 };
            hit |= det.ingest(Point::new(10.0, y), t0 + ms(i * 30));
        }
        assert!(!hit);
    }
}
