//! Named presets: pure mappings from a detected cycle to an oscillator
//! generation plus the post-chain parameters that go with it.
//!
//! Grounded on spec.md section 6's preset table and section 4.3's prose
//! description of `V_EBASS`/`V_SOPRANO_RECORDER`/`V_VOCAL_2`. The original
//! snapshots in `original_source/` disagree with each other on several of
//! these presets' exact oscillator counts and LFO settings across different
//! historical versions; where they disagree, spec.md section 6's table is
//! authoritative and deviations are recorded in DESIGN.md.

use super::constants::{PitchBand, ALPHA_HIGH, ALPHA_LOW, ALPHA_MEDIUM, VOCAL_BAND, WHISTLE_BAND};
use super::oscillator::OscMode;
use super::pitch::ValidationRule;
use super::post::Saturator;

pub const N_LAYER: usize = super::constants::N_LAYER;

/// The static parameters a preset hands an oscillator slot at spawn time.
#[derive(Debug, Clone, Copy)]
pub struct OscConfig {
    pub vol: f32,
    pub mode: OscMode,
    pub speed: f32,
    pub cycle: f32,
    pub modulus: u32,
    pub lfo_rate: f32,
    pub lfo_amplitude: f32,
    pub lfo_is_volume: bool,
}

impl OscConfig {
    const fn silent() -> Self {
        Self {
            vol: 0.0,
            mode: OscMode::Natural,
            speed: 0.0,
            cycle: 1.0,
            modulus: 0,
            lfo_rate: 1.0,
            lfo_amplitude: 0.0,
            lfo_is_volume: true,
        }
    }
}

/// The ten presets from spec.md section 6, in the same numeric order as
/// their control-file values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voice {
    RawDist,
    SopranoRecorder,
    Square,
    Dist,
    LowDist,
    LowLowDist,
    Ebass,
    Vocal2,
    Vocal1,
    Raw,
}

impl Voice {
    /// Maps a control-file `voice` value to a preset; out-of-range values
    /// fall back to `Raw`, matching `ControlParseError`'s "default to a
    /// harmless value" stance (spec.md section 7) rather than panicking.
    pub fn from_control_value(v: i32) -> Self {
        match v {
            0 => Voice::RawDist,
            1 => Voice::SopranoRecorder,
            2 => Voice::Square,
            3 => Voice::Dist,
            4 => Voice::LowDist,
            5 => Voice::LowLowDist,
            6 => Voice::Ebass,
            7 => Voice::Vocal2,
            8 => Voice::Vocal1,
            9 => Voice::Raw,
            _ => Voice::Raw,
        }
    }

    /// `true` for the two presets that route the raw input sample straight
    /// to the post-chain instead of synthesizing from the oscillator bank.
    pub fn is_passthrough(self) -> bool {
        matches!(self, Voice::RawDist | Voice::Raw)
    }

    pub fn pitch_band(self) -> PitchBand {
        match self {
            Voice::Vocal2 | Voice::Vocal1 => VOCAL_BAND,
            _ => WHISTLE_BAND,
        }
    }

    pub fn validation_rule(self) -> ValidationRule {
        match self {
            Voice::Vocal1 => ValidationRule::AmplitudeFloor,
            _ => ValidationRule::ErrorAndRms,
        }
    }

    pub fn alpha(self) -> f32 {
        match self {
            Voice::LowDist | Voice::LowLowDist => ALPHA_LOW,
            Voice::Ebass => ALPHA_MEDIUM,
            _ => ALPHA_HIGH,
        }
    }

    pub fn saturator(self) -> Saturator {
        match self {
            Voice::RawDist | Voice::Dist | Voice::LowDist | Voice::LowLowDist => {
                Saturator::Distortion
            }
            _ => Saturator::Identity,
        }
    }

    /// Pre-low-pass makeup: presets that synthesize several quiet
    /// oscillators boost here rather than raise each oscillator's own `vol`
    /// (so a single oscillator's envelope behavior stays comparable across
    /// presets).
    pub fn gain(self) -> f32 {
        match self {
            Voice::Ebass => 2.2,
            _ => 1.0,
        }
    }

    pub fn ungain(self) -> f32 {
        match self {
            Voice::Vocal1 => 0.6,
            _ => 1.0,
        }
    }

    /// Builds this cycle's oscillator generation. Returns the configs to
    /// spawn and how many of `N_LAYER` slots are actually used; passthrough
    /// presets return a count of 0 (the oscillator bank plays no role).
    pub fn configs(self, cycles: u64, duration_val: f32) -> ([OscConfig; N_LAYER], usize) {
        let mut configs = [OscConfig::silent(); N_LAYER];
        let count = match self {
            Voice::RawDist | Voice::Raw => 0,

            Voice::SopranoRecorder => {
                configs[0] = OscConfig {
                    vol: 1.0,
                    mode: OscMode::Natural,
                    speed: 0.5,
                    cycle: 1.0,
                    modulus: 0,
                    ..OscConfig::silent()
                };
                1
            }

            Voice::Square => {
                configs[0] = OscConfig {
                    vol: 1.0,
                    mode: OscMode::Square,
                    speed: 0.5,
                    cycle: 1.0,
                    modulus: 0,
                    ..OscConfig::silent()
                };
                1
            }

            Voice::Dist => {
                configs[0] = OscConfig {
                    vol: 1.0,
                    mode: OscMode::Square,
                    speed: 0.5,
                    cycle: 1.0,
                    modulus: 0,
                    ..OscConfig::silent()
                };
                1
            }

            Voice::LowDist => {
                configs[0] = OscConfig {
                    vol: 1.0,
                    mode: OscMode::Square,
                    speed: 0.25,
                    cycle: 1.0,
                    modulus: 2,
                    ..OscConfig::silent()
                };
                1
            }

            Voice::LowLowDist => {
                configs[0] = OscConfig {
                    vol: 1.0,
                    mode: OscMode::Square,
                    speed: 0.125,
                    cycle: 1.0,
                    modulus: 4,
                    ..OscConfig::silent()
                };
                1
            }

            Voice::Ebass => {
                // Six sines at (1..=6)/32 of the fundamental rate; the
                // lower three flip polarity every second cycle, splitting
                // them an octave down from the upper three and giving the
                // stack its "bass" weight. A slow, shallow LFO rides on top
                // as gentle pitch modulation, per spec.md section 4.3.
                for (i, osc) in configs.iter_mut().enumerate() {
                    let k = (i + 1) as f32;
                    let flips_octave = i < 3;
                    *osc = OscConfig {
                        vol: 0.4 + 0.05 * (duration_val * 10.0).min(1.0),
                        mode: OscMode::Sine,
                        speed: k / 32.0,
                        cycle: 1.0,
                        modulus: if flips_octave { 2 } else { 0 },
                        lfo_rate: 600.0,
                        lfo_amplitude: 0.03,
                        lfo_is_volume: false,
                    };
                }
                let _ = cycles;
                N_LAYER
            }

            Voice::Vocal2 => {
                configs[0] = OscConfig {
                    vol: 1.0,
                    mode: OscMode::Natural,
                    speed: 0.5,
                    cycle: 1.0,
                    modulus: 0,
                    ..OscConfig::silent()
                };
                1
            }

            Voice::Vocal1 => {
                configs[0] = OscConfig {
                    vol: 0.6,
                    mode: OscMode::Natural,
                    speed: 0.5,
                    cycle: 1.0,
                    modulus: 0,
                    ..OscConfig::silent()
                };
                1
            }
        };
        (configs, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_control_value_round_trips_the_documented_table() {
        assert_eq!(Voice::from_control_value(0), Voice::RawDist);
        assert_eq!(Voice::from_control_value(6), Voice::Ebass);
        assert_eq!(Voice::from_control_value(9), Voice::Raw);
    }

    #[test]
    fn unknown_control_value_falls_back_to_raw() {
        assert_eq!(Voice::from_control_value(42), Voice::Raw);
        assert_eq!(Voice::from_control_value(-1), Voice::Raw);
    }

    #[test]
    fn passthrough_presets_spawn_no_oscillators() {
        let (_, count) = Voice::RawDist.configs(0, 0.0);
        assert_eq!(count, 0);
        let (_, count) = Voice::Raw.configs(0, 0.0);
        assert_eq!(count, 0);
    }

    #[test]
    fn ebass_uses_the_full_layer_of_sine_oscillators() {
        let (configs, count) = Voice::Ebass.configs(3, 0.01);
        assert_eq!(count, N_LAYER);
        for cfg in &configs {
            assert_eq!(cfg.mode, OscMode::Sine);
        }
    }

    #[test]
    fn vocal_presets_use_the_vocal_band() {
        assert_eq!(Voice::Vocal1.pitch_band(), VOCAL_BAND);
        assert_eq!(Voice::Vocal2.pitch_band(), VOCAL_BAND);
        assert_eq!(Voice::Square.pitch_band(), WHISTLE_BAND);
    }
}
