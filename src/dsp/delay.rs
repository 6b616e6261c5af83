//! Optional BPM-synchronized multi-tap delay line.
//!
//! Grounded on `original_source/zeros.c`'s Leslie-style single modulated
//! delay tap (a ring buffer read back at a slowly varying offset) as the
//! structural ancestor, generalized per spec.md section 4.6 to `N_rep` fixed
//! taps spaced at multiples of `F_s*60/BPM` samples, averaged and scaled.
//! Independent of the octaver itself; a handful of presets may route the
//! raw input through it before, or in addition to, the oscillator bank.

pub const MAX_TAPS: usize = 4;

pub struct DelayLine {
    buf: Vec<f32>,
    write_pos: usize,
    sample_rate: f32,
}

impl DelayLine {
    /// `capacity_samples` should cover the longest tap this instance will
    /// ever be asked for; spec.md section 3 sizes it around `F_s * 900`
    /// samples when enabled, to allow very slow BPM settings.
    pub fn new(capacity_samples: usize, sample_rate: f32) -> Self {
        Self {
            buf: vec![0.0; capacity_samples.max(1)],
            write_pos: 0,
            sample_rate,
        }
    }

    pub fn push(&mut self, s: f32) {
        self.buf[self.write_pos] = s;
        self.write_pos = (self.write_pos + 1) % self.buf.len();
    }

    /// Reads `n_taps` taps spaced `bpm`-derived samples apart, sums them,
    /// divides by `n_taps`, and scales by `delay_volume`. `n_taps` is
    /// clamped to `MAX_TAPS`.
    pub fn read(&self, bpm: f32, n_taps: usize, delay_volume: f32) -> f32 {
        if bpm <= 0.0 || n_taps == 0 {
            return 0.0;
        }
        let n_taps = n_taps.min(MAX_TAPS);
        let tap_spacing = self.sample_rate * 60.0 / bpm;

        let mut total = 0.0;
        for tap in 1..=n_taps {
            total += self.tap_at(tap_spacing * tap as f32);
        }
        total / n_taps as f32 * delay_volume
    }

    fn tap_at(&self, samples_back: f32) -> f32 {
        let len = self.buf.len();
        let samples_back = samples_back.rem_euclid(len as f32);
        let back_floor = samples_back.floor();
        let amt = samples_back - back_floor;

        let idx_a = (self.write_pos + len - 1 - back_floor as usize % len) % len;
        let idx_b = (idx_a + len - 1) % len;
        self.buf[idx_a] * (1.0 - amt) + self.buf[idx_b] * amt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_input_reads_back_silent() {
        let mut d = DelayLine::new(1000, 44_100.0);
        for _ in 0..1000 {
            d.push(0.0);
        }
        assert_eq!(d.read(120.0, 2, 1.0), 0.0);
    }

    #[test]
    fn zero_taps_or_zero_bpm_reads_silent() {
        let d = DelayLine::new(1000, 44_100.0);
        assert_eq!(d.read(0.0, 2, 1.0), 0.0);
        assert_eq!(d.read(120.0, 0, 1.0), 0.0);
    }

    #[test]
    fn constant_input_reads_back_constant() {
        let mut d = DelayLine::new(2000, 44_100.0);
        for _ in 0..2000 {
            d.push(0.7);
        }
        let out = d.read(90.0, 3, 1.0);
        assert!((out - 0.7).abs() < 1e-3);
    }
}
