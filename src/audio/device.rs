//! Audio device enumeration and selection.
//!
//! Grounded on the teacher's original `list_output_devices` /
//! `get_output_device` / `list_input_devices` / `get_input_device`
//! (same `cpal::Host` enumeration idiom), trimmed to what a fixed-rate,
//! mono CLI needs and extended with the signed device-index convention
//! supplemented from `original_source/`'s device-selection heuristic
//! (non-negative index selects the Nth enumerated device; `-1` selects the
//! host's default).

use cpal::traits::{DeviceTrait, HostTrait};

use crate::dsp::constants::DEFAULT_SAMPLE_RATE;

pub const FRAME_SIZE: u32 = 128;

#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub is_default: bool,
}

pub fn list_input_devices() -> Result<Vec<AudioDeviceInfo>, String> {
    list_devices(false)
}

pub fn list_output_devices() -> Result<Vec<AudioDeviceInfo>, String> {
    list_devices(true)
}

fn list_devices(output: bool) -> Result<Vec<AudioDeviceInfo>, String> {
    let host = cpal::default_host();
    let default_name = if output {
        host.default_output_device()
    } else {
        host.default_input_device()
    }
    .as_ref()
    .and_then(|d| d.name().ok());

    let devices = if output {
        host.output_devices()
    } else {
        host.input_devices()
    }
    .map_err(|e| format!("failed to enumerate devices: {e}"))?;

    let mut result = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            result.push(AudioDeviceInfo {
                is_default: Some(&name) == default_name.as_ref(),
                name,
            });
        }
    }
    Ok(result)
}

/// Selects an input device by the signed index convention from
/// `SPEC_FULL.md` section A.7: `-1` is the host default, any `n >= 0` is
/// the Nth device in enumeration order. An out-of-range non-negative index
/// is an `InitError`.
pub fn select_input_device(index: i32) -> Result<cpal::Device, String> {
    select_device(index, false)
}

pub fn select_output_device(index: i32) -> Result<cpal::Device, String> {
    select_device(index, true)
}

fn select_device(index: i32, output: bool) -> Result<cpal::Device, String> {
    let host = cpal::default_host();
    if index < 0 {
        return if output {
            host.default_output_device()
        } else {
            host.default_input_device()
        }
        .ok_or_else(|| "no default audio device found".to_string());
    }

    let devices: Box<dyn Iterator<Item = cpal::Device>> = if output {
        Box::new(
            host.output_devices()
                .map_err(|e| format!("failed to enumerate output devices: {e}"))?,
        )
    } else {
        Box::new(
            host.input_devices()
                .map_err(|e| format!("failed to enumerate input devices: {e}"))?,
        )
    };

    devices
        .into_iter()
        .nth(index as usize)
        .ok_or_else(|| format!("no audio device at index {index}"))
}

/// Fixed mono stream config at the engine's nominal sample rate and frame
/// size; the engine does not negotiate rates with the device (spec.md
/// section 5: the audio thread must never block or fail mid-stream on a
/// renegotiation).
pub fn stream_config() -> cpal::StreamConfig {
    cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(DEFAULT_SAMPLE_RATE as u32),
        buffer_size: cpal::BufferSize::Fixed(FRAME_SIZE),
    }
}
