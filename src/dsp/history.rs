//! Fixed-size circular history of input samples with incrementally
//! maintained sum-of-squares accumulators for the full window and a short
//! "recent" window, periodically resynced to bound floating-point drift.
//!
//! Grounded on `original_source/zeros.c`'s `set_hist`/`get_hist` (a plain
//! ring buffer indexed by age), generalized per spec.md section 4.1 to also
//! carry the running RMS accumulators the original computed inline in
//! `start_audio`'s sample loop.

use super::constants::{HISTORY_LEN, RECENT_LEN, RESYNC_INTERVAL};

pub struct HistoryBuffer {
    buf: [f32; HISTORY_LEN],
    cursor: usize,
    sum_sq_full: f32,
    sum_sq_recent: f32,
    push_count: u64,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self {
            buf: [0.0; HISTORY_LEN],
            cursor: 0,
            sum_sq_full: 0.0,
            sum_sq_recent: 0.0,
            push_count: 0,
        }
    }

    /// Writes `s` at the cursor and advances it, keeping both RMS
    /// accumulators current.
    pub fn push(&mut self, s: f32) {
        let overwritten = self.buf[self.cursor];
        self.sum_sq_full -= overwritten * overwritten;
        self.sum_sq_full += s * s;
        self.sum_sq_recent += s * s;

        self.buf[self.cursor] = s;
        self.cursor = (self.cursor + 1) % HISTORY_LEN;

        // The sample now exactly RECENT_LEN behind the new cursor just aged
        // out of the recent window.
        let retire_idx = (self.cursor + HISTORY_LEN - 1 - RECENT_LEN) % HISTORY_LEN;
        let retired = self.buf[retire_idx];
        self.sum_sq_recent -= retired * retired;

        self.push_count += 1;
        if self.push_count % RESYNC_INTERVAL == 0 {
            self.resync_full();
        }
        if self.cursor == 0 {
            self.resync_recent();
        }
    }

    /// Returns the sample `age` positions back from the most recent write.
    /// `age` must be in `[0, HISTORY_LEN)`; out of range is a programmer
    /// error and is not guarded against on the per-sample path.
    #[inline]
    pub fn get(&self, age: usize) -> f32 {
        debug_assert!(age < HISTORY_LEN, "history age out of range: {age}");
        self.buf[(self.cursor + HISTORY_LEN - 1 - age) % HISTORY_LEN]
    }

    pub fn sum_sq_full(&self) -> f32 {
        self.sum_sq_full
    }

    pub fn sum_sq_recent(&self) -> f32 {
        self.sum_sq_recent
    }

    /// Recomputes `sum_sq_full` exactly from the buffer contents.
    pub fn resync_full(&mut self) {
        self.sum_sq_full = self.buf.iter().map(|v| v * v).sum();
    }

    /// Recomputes `sum_sq_recent` exactly from the last `RECENT_LEN` samples.
    pub fn resync_recent(&mut self) {
        self.sum_sq_recent = (0..RECENT_LEN).map(|age| {
            let v = self.get(age);
            v * v
        }).sum();
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_most_recent_sample_at_age_zero() {
        let mut h = HistoryBuffer::new();
        h.push(0.25);
        assert_eq!(h.get(0), 0.25);
    }

    #[test]
    fn get_tracks_ages_in_push_order() {
        let mut h = HistoryBuffer::new();
        h.push(1.0);
        h.push(2.0);
        h.push(3.0);
        assert_eq!(h.get(0), 3.0);
        assert_eq!(h.get(1), 2.0);
        assert_eq!(h.get(2), 1.0);
    }

    #[test]
    fn sum_sq_full_tracks_true_sum_within_epsilon() {
        let mut h = HistoryBuffer::new();
        for i in 0..10_000 {
            h.push(((i % 7) as f32) * 0.1 - 0.3);
        }
        let true_sum: f32 = h.buf.iter().map(|v| v * v).sum();
        assert!((h.sum_sq_full() - true_sum).abs() < 1e-2);
    }

    #[test]
    fn resync_full_matches_exact_recomputation() {
        let mut h = HistoryBuffer::new();
        for i in 0..HISTORY_LEN * 2 {
            h.push((i as f32).sin());
        }
        h.resync_full();
        let true_sum: f32 = h.buf.iter().map(|v| v * v).sum();
        assert!((h.sum_sq_full() - true_sum).abs() < 1e-3);
    }

    #[test]
    fn sum_sq_recent_only_covers_last_recent_len_samples() {
        let mut h = HistoryBuffer::new();
        for _ in 0..RECENT_LEN {
            h.push(1.0);
        }
        // Fully warmed up: recent window is all 1.0 samples.
        assert!((h.sum_sq_recent() - RECENT_LEN as f32).abs() < 1e-3);
        // Push zeros past the window length; recent sum should drop to zero.
        for _ in 0..RECENT_LEN {
            h.push(0.0);
        }
        assert!(h.sum_sq_recent().abs() < 1e-3);
    }

    #[test]
    fn all_zero_input_keeps_sums_at_zero() {
        let mut h = HistoryBuffer::new();
        for _ in 0..1000 {
            h.push(0.0);
        }
        assert_eq!(h.sum_sq_full(), 0.0);
        assert_eq!(h.sum_sq_recent(), 0.0);
    }
}
