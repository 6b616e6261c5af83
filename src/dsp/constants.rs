//! Fixed-point constants for the octaver's DSP pipeline.
//!
//! Grounded on `original_source/zeros.c`'s `#define` block and on the sizing
//! described in spec.md section 2/3/4; values here are the authoritative
//! ones where the two disagree (the C snapshot predates the gate/RMS-window
//! additions the spec describes).

/// Nominal sample rate in Hz. Pitch bands below are sized against this.
pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;

/// History ring length in samples.
pub const HISTORY_LEN: usize = 8192;
/// Recent-window length for the short RMS gate.
pub const RECENT_LEN: usize = 256;
/// Push count between exact resyncs of the full-window sum of squares.
pub const RESYNC_INTERVAL: u64 = 441_000;

/// Duration-tracker block size in samples.
pub const DURATION_UNITS: u32 = 400;
/// Number of blocks tracked by the duration tracker.
pub const DURATION_BLOCKS: usize = 100;
/// Ceiling on the duration tracker's sustain scalar.
pub const DURATION_MAX: f32 = 0.04;

/// Oscillators instantiated per accepted cycle.
pub const N_LAYER: usize = 6;
/// Overlapping duration generations kept alive at once.
pub const D_GEN: usize = 3;
/// Total oscillator slots in the bank.
pub const N_OSC: usize = N_LAYER * D_GEN;
/// Cycles an oscillator sustains before its envelope begins releasing.
pub const D_DUR: i32 = 3;

/// Low-pass smoothing coefficients, selected per voice.
pub const ALPHA_HIGH: f32 = 0.1;
pub const ALPHA_MEDIUM: f32 = 0.03;
pub const ALPHA_LOW: f32 = 0.01;

/// Master output scalar (applied ahead of the per-step volume table).
pub const VOLUME: f32 = 10.0;

/// Ten-step discrete volume table, indexed by the `volume` control value.
pub const VOLUMES: [f32; 10] = [
    0.026, 0.039, 0.059, 0.088, 0.132, 0.198, 0.296, 0.444, 0.667, 1.000,
];

/// Noise-gate threshold on `sum_sq_full / HISTORY_LEN`.
pub const GATE_SQ: f32 = 0.01 * 0.01;
/// Noise-gate threshold on `sum_sq_recent / RECENT_LEN`.
pub const RECENT_GATE_SQ: f32 = (40.0 * 0.01) * (40.0 * 0.01);

/// Validation RMS floor below which a cycle is always rejected.
pub const VALIDATION_EPS_LOW: f32 = 1e-5;
/// Validation RMS floor used together with the extrema-alignment error term.
pub const VALIDATION_EPS_MID: f32 = 1e-4;

/// Delay-line capacity in samples, `F_s * 900` per spec.md section 3 (long
/// enough to cover a very slow BPM's widest tap).
pub const DELAY_CAPACITY: usize = (DEFAULT_SAMPLE_RATE as usize) * 900;
/// Disabled by default — the ancestor `LESLIE_PERIOD = 0` toggle in
/// `original_source/zeros.c` (0 means "off"); `DelayLine::read` already
/// returns silence for a non-positive BPM.
pub const DELAY_BPM_DEFAULT: f32 = 0.0;
pub const DELAY_TAPS_DEFAULT: usize = 3;
pub const DELAY_VOLUME_DEFAULT: f32 = 0.3;

/// A pitch-detection band: periods strictly between `p_hi` and `p_lo`
/// samples are accepted (spec.md section 6's "Pitch bands").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchBand {
    pub p_hi: f32,
    pub p_lo: f32,
}

/// ~588 Hz to ~3150 Hz at 44.1 kHz: the default band for whistled input.
pub const WHISTLE_BAND: PitchBand = PitchBand {
    p_hi: 14.0,
    p_lo: 75.0,
};

/// ~147 Hz to ~882 Hz at 44.1 kHz: the band used by the vocal presets.
pub const VOCAL_BAND: PitchBand = PitchBand {
    p_hi: 50.0,
    p_lo: 300.0,
};
