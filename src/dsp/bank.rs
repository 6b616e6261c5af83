//! Fixed ring of oscillator slots with overlapping "duration generations".
//!
//! Grounded on spec.md section 3/4.3's `OscBank`: each accepted cycle writes
//! a contiguous block of `N_LAYER` oscillators at
//! `(cycles mod D_GEN) * N_LAYER`, overwriting the oldest generation while
//! leaving the other two generations (and any still-releasing oscillators
//! within them) untouched.

use super::constants::{D_DUR, D_GEN, N_LAYER, N_OSC};
use super::history::HistoryBuffer;
use super::oscillator::Oscillator;
use super::voice::OscConfig;

pub struct OscBank {
    oscs: [Oscillator; N_OSC],
}

impl OscBank {
    pub fn new() -> Self {
        Self {
            oscs: std::array::from_fn(|_| Oscillator::silent()),
        }
    }

    /// Advances every oscillator's release timer by one cycle.
    pub fn handle_cycle(&mut self) {
        for o in &mut self.oscs {
            o.handle_cycle();
        }
    }

    /// Instantiates this cycle's generation: `configs[0..count]` are written
    /// into the slot block selected by `cycles`; the remaining `N_LAYER -
    /// count` positions in that block are left untouched, per spec.md
    /// section 4.3.
    pub fn spawn(
        &mut self,
        cycles: u64,
        adjustment: f32,
        rough_input_period: f32,
        configs: &[OscConfig; N_LAYER],
        count: usize,
    ) {
        let offset = (cycles % D_GEN as u64) as usize * N_LAYER;
        for (i, cfg) in configs.iter().take(count).enumerate() {
            self.oscs[offset + i].init(
                cycles,
                adjustment,
                cfg.vol,
                cfg.mode,
                cfg.speed,
                cfg.cycle,
                cfg.modulus,
                cfg.lfo_rate,
                cfg.lfo_amplitude,
                cfg.lfo_is_volume,
                D_DUR,
                rough_input_period,
            );
        }
    }

    /// Advances every oscillator by one sample and sums their contributions.
    pub fn sum(&mut self, history: &HistoryBuffer) -> f32 {
        let mut total = 0.0;
        for o in &mut self.oscs {
            total += o.next(history);
        }
        total
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.oscs.iter().filter(|o| o.active()).count()
    }
}

impl Default for OscBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::OscMode;

    fn mono_config() -> OscConfig {
        OscConfig {
            vol: 1.0,
            mode: OscMode::Natural,
            speed: 0.5,
            cycle: 1.0,
            modulus: 0,
            lfo_rate: 1.0,
            lfo_amplitude: 0.0,
            lfo_is_volume: true,
        }
    }

    #[test]
    fn bank_has_exactly_n_osc_slots_always() {
        let bank = OscBank::new();
        assert_eq!(bank.oscs.len(), N_OSC);
    }

    #[test]
    fn spawn_only_touches_requested_count_within_its_generation() {
        let mut bank = OscBank::new();
        let configs: [OscConfig; N_LAYER] = std::array::from_fn(|_| mono_config());
        bank.spawn(0, 0.0, 40.0, &configs, 2);
        assert_eq!(bank.active_count(), 2);
    }

    #[test]
    fn later_generation_does_not_disturb_earlier_generation() {
        let mut bank = OscBank::new();
        let configs: [OscConfig; N_LAYER] = std::array::from_fn(|_| mono_config());
        bank.spawn(0, 0.0, 40.0, &configs, N_LAYER);
        bank.spawn(1, 0.0, 40.0, &configs, N_LAYER);
        assert_eq!(bank.active_count(), 2 * N_LAYER);
    }

    #[test]
    fn generation_wraps_after_d_gen_cycles() {
        let mut bank = OscBank::new();
        let configs: [OscConfig; N_LAYER] = std::array::from_fn(|_| mono_config());
        for cycle in 0..D_GEN as u64 {
            bank.spawn(cycle, 0.0, 40.0, &configs, N_LAYER);
        }
        assert_eq!(bank.active_count(), D_GEN * N_LAYER);
        // Wrapping back to generation 0 overwrites it in place, not additively.
        bank.spawn(D_GEN as u64, 0.0, 40.0, &configs, N_LAYER);
        assert_eq!(bank.active_count(), D_GEN * N_LAYER);
    }
}
