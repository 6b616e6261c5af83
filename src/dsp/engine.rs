//! Top-level per-sample DSP pipeline, owned exclusively by the audio thread.
//!
//! Grounded on spec.md section 9's "Global DSP state" note: the source's
//! module-level globals become a single `EngineContext` threaded through the
//! audio callback, with no locking and no allocation on the per-sample path.

use super::bank::OscBank;
use super::constants::{
    DELAY_BPM_DEFAULT, DELAY_CAPACITY, DELAY_TAPS_DEFAULT, DELAY_VOLUME_DEFAULT,
    DEFAULT_SAMPLE_RATE, HISTORY_LEN, RECENT_LEN,
};
use super::delay::DelayLine;
use super::duration::DurationTracker;
use super::history::HistoryBuffer;
use super::pitch::{validate_cycle, PitchState};
use super::post::{clip, gate_engaged, gate_mult, scale, PostState};
use super::voice::Voice;

pub struct EngineContext {
    history: HistoryBuffer,
    duration: DurationTracker,
    pitch: PitchState,
    bank: OscBank,
    post: PostState,
    delay: DelayLine,
    delay_bpm: f32,
    voice: Voice,
    volume_step: i32,
    gate_step: i32,
}

impl EngineContext {
    pub fn new() -> Self {
        Self {
            history: HistoryBuffer::new(),
            duration: DurationTracker::new(),
            pitch: PitchState::new(),
            bank: OscBank::new(),
            post: PostState::new(),
            delay: DelayLine::new(DELAY_CAPACITY, DEFAULT_SAMPLE_RATE),
            delay_bpm: DELAY_BPM_DEFAULT,
            voice: Voice::Raw,
            volume_step: 9,
            gate_step: 5,
        }
    }

    /// Enables the optional Leslie-style tap delay at the given tempo;
    /// `bpm <= 0.0` disables it (the default), matching
    /// `original_source/zeros.c`'s `LESLIE_PERIOD == 0` toggle. No preset
    /// enables this on its own — it's a collaborator a caller may opt into.
    pub fn set_delay_bpm(&mut self, bpm: f32) {
        self.delay_bpm = bpm;
    }

    pub fn voice(&self) -> Voice {
        self.voice
    }

    /// A preset change resets the pitch state (spec.md section 5: a preset
    /// change may cut off currently-sounding oscillators abruptly, which is
    /// acceptable because presets change rarely and deliberately).
    pub fn set_voice(&mut self, voice: Voice) {
        if voice != self.voice {
            log::info!("voice: {:?} -> {:?}", self.voice, voice);
            self.voice = voice;
            self.pitch = PitchState::new();
        }
    }

    pub fn set_volume(&mut self, step: i32) {
        if step != self.volume_step {
            log::info!("volume: {} -> {}", self.volume_step, step);
            self.volume_step = step;
        }
    }

    pub fn set_gate(&mut self, step: i32) {
        if step != self.gate_step {
            log::info!("gate: {} -> {}", self.gate_step, step);
            self.gate_step = step;
        }
    }

    /// Advances the whole pipeline by one input sample and returns the
    /// corresponding output sample, already clipped to `[-1, 1]`.
    pub fn process_sample(&mut self, input: f32) -> f32 {
        self.history.push(input);
        self.duration.update(input);
        self.delay.push(input);

        if let Some(adjustment) = self.pitch.observe(input) {
            self.bank.handle_cycle();

            if !self.voice.is_passthrough() {
                let period = self.pitch.rough_input_period();
                let in_band_and_clean = validate_cycle(
                    period,
                    self.voice.pitch_band(),
                    &self.history,
                    self.voice.validation_rule(),
                );
                if in_band_and_clean {
                    let (configs, count) =
                        self.voice.configs(self.pitch.cycles(), self.duration.value());
                    self.bank
                        .spawn(self.pitch.cycles(), adjustment, period, &configs, count);
                }
            }
        }

        let mut raw = if self.voice.is_passthrough() {
            input
        } else {
            self.bank.sum(&self.history) * self.voice.gain()
        };
        raw += self
            .delay
            .read(self.delay_bpm, DELAY_TAPS_DEFAULT, DELAY_VOLUME_DEFAULT);

        let mult = gate_mult(self.gate_step);
        let gated = gate_engaged(
            self.history.sum_sq_full(),
            self.history.sum_sq_recent(),
            HISTORY_LEN,
            RECENT_LEN,
            mult,
        );
        if gated {
            raw = 0.0;
        }

        let filtered = self.post.low_pass(raw, self.voice.alpha());
        let shaped = self.voice.saturator().apply(filtered);
        let scaled = scale(shaped, self.volume_step, self.voice.ungain());

        // The distortion saturator has a nonzero DC bias (`apply(0.0) !=
        // 0.0`), so gating `raw` alone isn't enough to keep a gated sample
        // silent once it passes through `Saturator::Distortion`. Force the
        // final sample to silence here instead, after the low-pass has still
        // been allowed to relax toward zero for a smooth transition once the
        // gate releases.
        if gated {
            return 0.0;
        }
        clip(scaled)
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_in_yields_silence_out() {
        let mut engine = EngineContext::new();
        engine.set_voice(Voice::SopranoRecorder);
        engine.set_volume(9);
        for _ in 0..10_000 {
            assert_eq!(engine.process_sample(0.0), 0.0);
        }
    }

    #[test]
    fn silence_in_yields_silence_out_for_distortion_presets() {
        // The distortion saturator has a nonzero DC bias at v=0, so this
        // must hold via the gate's final-output override, not via the
        // saturator alone staying at zero (spec.md section 8 scenario 1:
        // "any preset").
        for voice in [Voice::RawDist, Voice::Dist, Voice::LowDist, Voice::LowLowDist] {
            let mut engine = EngineContext::new();
            engine.set_voice(voice);
            engine.set_volume(9);
            for _ in 0..10_000 {
                assert_eq!(engine.process_sample(0.0), 0.0);
            }
        }
    }

    #[test]
    fn output_never_exceeds_unity_magnitude() {
        let mut engine = EngineContext::new();
        engine.set_voice(Voice::Ebass);
        engine.set_volume(9);
        engine.set_gate(0);
        let period = 60.0f32;
        for i in 0..20_000 {
            let s = 0.9 * (2.0 * std::f32::consts::PI * i as f32 / period).sin();
            let out = engine.process_sample(s);
            assert!(out.abs() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn changing_voice_resets_pitch_state_cycle_count() {
        let mut engine = EngineContext::new();
        engine.set_voice(Voice::SopranoRecorder);
        let period = 50.0f32;
        for i in 0..500 {
            let s = (2.0 * std::f32::consts::PI * i as f32 / period).sin();
            engine.process_sample(s);
        }
        assert!(engine.pitch.cycles() > 0);
        engine.set_voice(Voice::Square);
        assert_eq!(engine.pitch.cycles(), 0);
    }

    #[test]
    fn delay_is_disabled_by_default() {
        let mut engine = EngineContext::new();
        engine.set_voice(Voice::Raw);
        engine.set_volume(9);
        engine.set_gate(0);
        for _ in 0..5_000 {
            assert_eq!(engine.process_sample(0.0), 0.0);
        }
    }

    #[test]
    fn enabling_delay_keeps_output_clipped() {
        let mut engine = EngineContext::new();
        engine.set_voice(Voice::Raw);
        engine.set_volume(9);
        engine.set_gate(0);
        engine.set_delay_bpm(120.0);
        let period = 60.0f32;
        for i in 0..10_000 {
            let s = 0.9 * (2.0 * std::f32::consts::PI * i as f32 / period).sin();
            let out = engine.process_sample(s);
            assert!(out.abs() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn raw_passthrough_spawns_no_oscillators() {
        let mut engine = EngineContext::new();
        engine.set_voice(Voice::Raw);
        engine.set_volume(9);
        let period = 40.0f32;
        for i in 0..2000 {
            let s = 0.5 * (2.0 * std::f32::consts::PI * i as f32 / period).sin();
            engine.process_sample(s);
        }
        assert_eq!(engine.bank.active_count(), 0);
    }
}
