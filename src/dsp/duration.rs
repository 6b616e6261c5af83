//! Moving-minimum-of-means "sustain" estimate.
//!
//! Grounded on `original_source/zeros.c`'s `update_duration`, ported
//! directly: a ring of block averages of `|sample|`, with `duration_val`
//! recomputed as the mean, over the ring's positions, of the running
//! minimum seen walking back from the newest block.

use super::constants::{DURATION_BLOCKS, DURATION_MAX, DURATION_UNITS};

pub struct DurationTracker {
    block_hist: [f32; DURATION_BLOCKS],
    pos: usize,
    current_total: f32,
    current_count: u32,
    value: f32,
}

impl DurationTracker {
    pub fn new() -> Self {
        Self {
            block_hist: [0.0; DURATION_BLOCKS],
            pos: 0,
            current_total: 0.0,
            current_count: 0,
            value: 0.0,
        }
    }

    /// Feeds one input sample; recomputes `value` whenever a block
    /// completes (every `DURATION_UNITS` samples).
    pub fn update(&mut self, sample: f32) {
        self.current_total += sample.abs();
        self.current_count += 1;

        if self.current_count > DURATION_UNITS {
            let block_val = self.current_total / self.current_count as f32;
            self.current_total = 0.0;
            self.current_count = 0;

            self.pos = (self.pos + 1) % DURATION_BLOCKS;
            self.block_hist[self.pos] = block_val;

            let mut total = 0.0;
            let mut block_min: Option<f32> = None;
            for i in 0..DURATION_BLOCKS {
                let idx = (DURATION_BLOCKS + self.pos - i) % DURATION_BLOCKS;
                let histval = self.block_hist[idx];
                block_min = Some(match block_min {
                    Some(m) if m < histval => m,
                    _ => histval,
                });
                total += block_min.unwrap();
            }
            self.value = (total / DURATION_BLOCKS as f32).min(DURATION_MAX);
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

impl Default for DurationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_amplitude_converges_to_capped_amplitude() {
        let mut d = DurationTracker::new();
        let c = 0.02;
        for _ in 0..(DURATION_UNITS as usize + 1) * (DURATION_BLOCKS + 1) {
            d.update(c);
        }
        assert!((d.value() - c.min(DURATION_MAX)).abs() < 1e-3);
    }

    #[test]
    fn silence_drives_value_to_zero() {
        let mut d = DurationTracker::new();
        for _ in 0..(DURATION_UNITS as usize + 1) * (DURATION_BLOCKS + 1) {
            d.update(0.0);
        }
        assert_eq!(d.value(), 0.0);
    }

    #[test]
    fn value_is_capped_at_duration_max() {
        let mut d = DurationTracker::new();
        for _ in 0..(DURATION_UNITS as usize + 1) * (DURATION_BLOCKS + 1) {
            d.update(1.0);
        }
        assert!(d.value() <= DURATION_MAX + 1e-6);
    }
}
