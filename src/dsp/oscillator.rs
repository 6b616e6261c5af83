//! A single synthesis voice: one oscillator slot in the bank.
//!
//! Grounded on `original_source/zeros.c`'s `struct Osc` / `osc_init` /
//! `osc_next`, generalized per spec.md section 3/4.4 from a mode integer
//! into a tagged `OscMode` enum matched once per sample (spec.md section 9:
//! "the natural re-architecture is a tagged variant ... over a shared
//! parameter record").

use super::history::HistoryBuffer;
use std::f32::consts::TAU;

/// How an oscillator turns its phase position into a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscMode {
    /// Replay the input history at a fractional phase position.
    Natural,
    /// `sign()` of the natural sample.
    Square,
    /// A synthesized sine referenced to the period captured at init.
    Sine,
}

pub struct Oscillator {
    active: bool,
    mode: OscMode,
    pos: f32,
    speed: f32,
    polarity: f32,
    vol: f32,
    amp: f32,
    samples: u32,
    total_amplitude: f32,
    duration: i32,
    lfo_pos: f32,
    lfo_rate: f32,
    lfo_amplitude: f32,
    lfo_is_volume: bool,
    rough_input_period: f32,
}

impl Oscillator {
    pub fn silent() -> Self {
        Self {
            active: false,
            mode: OscMode::Natural,
            pos: 0.0,
            speed: 0.0,
            polarity: 1.0,
            vol: 0.0,
            amp: 0.0,
            samples: 0,
            total_amplitude: 0.0,
            duration: 0,
            lfo_pos: 0.0,
            lfo_rate: 1.0,
            lfo_amplitude: 0.0,
            lfo_is_volume: true,
            rough_input_period: 40.0,
        }
    }

    /// Initializes this slot for a freshly accepted cycle.
    ///
    /// `cycle` and `modulus` together produce the fixed polarity flip that
    /// synthesizes sub-octave divisions below the oscillator's own `speed`:
    /// `polarity = -1` every time `floor(cycle * cycles) % modulus == 0`,
    /// preserved exactly per spec.md section 9 including its behavior for
    /// `cycle < 1` (flips every `1/cycle` cycles).
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &mut self,
        cycles: u64,
        adjustment: f32,
        vol: f32,
        mode: OscMode,
        speed: f32,
        cycle: f32,
        modulus: u32,
        lfo_rate: f32,
        lfo_amplitude: f32,
        lfo_is_volume: bool,
        duration_cycles: i32,
        rough_input_period: f32,
    ) {
        self.active = true;
        self.amp = 0.0;
        self.pos = -adjustment;
        self.samples = 0;
        self.total_amplitude = 0.0;
        self.duration = duration_cycles;

        self.mode = mode;
        self.speed = speed;
        self.vol = vol;
        self.lfo_rate = lfo_rate;
        self.lfo_amplitude = lfo_amplitude;
        self.lfo_is_volume = lfo_is_volume;
        self.lfo_pos = 0.0;

        self.polarity = if modulus == 0 {
            1.0
        } else {
            let phase = (cycle * cycles as f32).floor() as i64;
            if phase.rem_euclid(modulus as i64) == 0 {
                -1.0
            } else {
                1.0
            }
        };

        self.rough_input_period = rough_input_period;
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Decrements the release timer once per detected cycle, deactivating
    /// the slot once the envelope has fully decayed.
    pub fn handle_cycle(&mut self) {
        if !self.active {
            return;
        }
        if self.duration > 0 {
            self.duration -= 1;
        }
        if self.duration < 1 && self.amp < 0.001 {
            self.active = false;
        }
    }

    /// Advances this oscillator by one sample, returning its contribution.
    pub fn next(&mut self, history: &HistoryBuffer) -> f32 {
        if !self.active {
            return 0.0;
        }

        self.samples += 1;
        if self.duration > 0 {
            self.amp += 0.01 * (1.0 - self.amp);
        } else {
            self.amp *= 0.95;
        }

        let pos_floor = self.pos.floor();
        let age_a = pos_floor as i64;
        let age_b = age_a + 1;
        let amt_a = self.pos - pos_floor;

        let sample_a = history_get_signed(history, age_a);
        let sample_b = history_get_signed(history, age_b);
        // `original_source/zeros.c:496-501` weights the nearer sample
        // (age `floor(pos)`) by `amtA` itself, not `1 - amtA`.
        let mut val = sample_a * amt_a + sample_b * (1.0 - amt_a);

        self.total_amplitude += val.abs();
        if self.mode != OscMode::Natural {
            val = match self.mode {
                OscMode::Square => {
                    if val > 0.0 {
                        1.0
                    } else {
                        -1.0
                    }
                }
                OscMode::Sine => ((self.pos / self.rough_input_period) + 0.5).fract_sin_tau(),
                OscMode::Natural => unreachable!(),
            };
            val *= self.total_amplitude / self.samples as f32;
        }

        self.pos += self.speed;
        let mut val = self.amp * val * self.polarity * self.vol;

        if self.lfo_amplitude > 0.0 {
            let m = ((self.lfo_pos + 0.5).fract_sin_tau() + 1.0) * self.lfo_amplitude;
            if self.lfo_is_volume {
                val = val * m + val * (1.0 - self.lfo_amplitude);
            } else {
                self.pos += m;
            }
            self.lfo_pos += 1.0 / self.lfo_rate;
        }

        val
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::silent()
    }
}

/// Reads history at a possibly-negative or past-horizon integer age; ages
/// before the oscillator's init point (which can dip slightly negative from
/// `-adjustment`) read as silence rather than as a history wraparound.
fn history_get_signed(history: &HistoryBuffer, age: i64) -> f32 {
    if age < 0 {
        0.0
    } else {
        history.get(age as usize)
    }
}

/// `sin(2*pi*v)`, matching `original_source/zeros.c`'s `sine_decimal`.
trait SineDecimal {
    fn fract_sin_tau(self) -> f32;
}

impl SineDecimal for f32 {
    fn fract_sin_tau(self) -> f32 {
        (self * TAU).sin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_oscillator_emits_silence() {
        let mut osc = Oscillator::silent();
        let history = HistoryBuffer::new();
        assert_eq!(osc.next(&history), 0.0);
    }

    #[test]
    fn amp_never_exceeds_unity_or_goes_negative() {
        let mut osc = Oscillator::silent();
        let history = HistoryBuffer::new();
        osc.init(0, 0.0, 1.0, OscMode::Natural, 0.5, 1.0, 2, 0.0, 0.0, true, 3, 40.0);
        for _ in 0..10_000 {
            osc.next(&history);
            assert!(osc.amp >= 0.0 && osc.amp <= 1.0);
        }
    }

    #[test]
    fn polarity_flips_every_cycle_when_modulus_is_two_and_cycle_is_one() {
        let mut osc = Oscillator::silent();
        osc.init(0, 0.0, 1.0, OscMode::Natural, 0.5, 1.0, 2, 0.0, 0.0, true, 3, 40.0);
        assert_eq!(osc.polarity, -1.0);
        osc.init(1, 0.0, 1.0, OscMode::Natural, 0.5, 1.0, 2, 0.0, 0.0, true, 3, 40.0);
        assert_eq!(osc.polarity, 1.0);
        osc.init(2, 0.0, 1.0, OscMode::Natural, 0.5, 1.0, 2, 0.0, 0.0, true, 3, 40.0);
        assert_eq!(osc.polarity, -1.0);
    }

    #[test]
    fn zero_modulus_never_flips_polarity() {
        let mut osc = Oscillator::silent();
        for cycles in 0..10 {
            osc.init(cycles, 0.0, 1.0, OscMode::Natural, 0.5, 1.0, 0, 0.0, 0.0, true, 3, 40.0);
            assert_eq!(osc.polarity, 1.0);
        }
    }

    #[test]
    fn deactivates_once_duration_and_amp_both_drop() {
        let mut osc = Oscillator::silent();
        let history = HistoryBuffer::new();
        osc.init(0, 0.0, 1.0, OscMode::Natural, 0.5, 1.0, 2, 0.0, 0.0, true, 1, 40.0);
        osc.handle_cycle(); // duration -> 0
        // amp is still ~0 right after init, so handle_cycle can deactivate
        // immediately once duration has reached zero.
        assert!(!osc.active());
        for _ in 0..10 {
            assert_eq!(osc.next(&history), 0.0);
        }
    }
}
