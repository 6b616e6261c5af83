//! Control-plane file poller.
//!
//! Grounded on `original_source/zeros.c`'s `int_from_file` and its polling
//! loop (unsynchronized global ints, read every 50ms), generalized per
//! spec.md section 5 to atomic-relaxed single-word publication and per
//! `SPEC_FULL.md` section A.2 to a third polled file (`gate`), alongside the
//! original's `voice`/`volume`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const MAX_PARSE_BYTES: usize = 15;

/// Lock-free handle to the three control values the audio thread reads once
/// per sample. Cloning shares the same underlying atomics.
#[derive(Clone)]
pub struct ControlHandle {
    voice: Arc<AtomicI32>,
    volume: Arc<AtomicI32>,
    gate: Arc<AtomicI32>,
}

impl ControlHandle {
    pub fn voice(&self) -> i32 {
        self.voice.load(Ordering::Relaxed)
    }

    pub fn volume(&self) -> i32 {
        self.volume.load(Ordering::Relaxed)
    }

    pub fn gate(&self) -> i32 {
        self.gate.load(Ordering::Relaxed)
    }
}

/// Reads the three control files once to get initial values (a missing file
/// here is a fatal `InitError`, per spec.md section 7), then spawns a
/// background thread that re-reads them every 50ms and republishes any
/// change. A file that goes missing after startup, or that can't be parsed
/// as an integer, leaves the published value unchanged rather than
/// panicking or tearing down the session.
pub fn spawn(voice_path: PathBuf, volume_path: PathBuf, gate_path: PathBuf) -> Result<ControlHandle, String> {
    let voice0 = read_control_file(&voice_path)
        .map_err(|e| format!("failed to read voice control file {}: {e}", voice_path.display()))?;
    let volume0 = read_control_file(&volume_path)
        .map_err(|e| format!("failed to read volume control file {}: {e}", volume_path.display()))?;
    let gate0 = read_control_file(&gate_path)
        .map_err(|e| format!("failed to read gate control file {}: {e}", gate_path.display()))?;

    let handle = ControlHandle {
        voice: Arc::new(AtomicI32::new(parse_control_value(&voice0))),
        volume: Arc::new(AtomicI32::new(parse_control_value(&volume0))),
        gate: Arc::new(AtomicI32::new(parse_control_value(&gate0))),
    };

    let poller = handle.clone();
    thread::Builder::new()
        .name("octaver-control".into())
        .spawn(move || poll_loop(poller, voice_path, volume_path, gate_path))
        .map_err(|e| format!("failed to spawn control thread: {e}"))?;

    Ok(handle)
}

fn poll_loop(handle: ControlHandle, voice_path: PathBuf, volume_path: PathBuf, gate_path: PathBuf) {
    loop {
        thread::sleep(POLL_INTERVAL);
        poll_one(&voice_path, &handle.voice);
        poll_one(&volume_path, &handle.volume);
        poll_one(&gate_path, &handle.gate);
    }
}

fn poll_one(path: &Path, slot: &AtomicI32) {
    match read_control_file(path) {
        Ok(raw) => {
            let value = parse_control_value(&raw);
            if value != slot.load(Ordering::Relaxed) {
                slot.store(value, Ordering::Relaxed);
            }
        }
        Err(e) => {
            log::warn!("control file {} unreadable, keeping last value: {e}", path.display());
        }
    }
}

fn read_control_file(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    let take = bytes.len().min(MAX_PARSE_BYTES);
    Ok(String::from_utf8_lossy(&bytes[..take]).into_owned())
}

fn parse_control_value(raw: &str) -> i32 {
    raw.trim().parse::<i32>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_control_value_defaults_to_zero_on_garbage() {
        assert_eq!(parse_control_value("not a number"), 0);
        assert_eq!(parse_control_value(""), 0);
    }

    #[test]
    fn parse_control_value_trims_whitespace_and_newline() {
        assert_eq!(parse_control_value("  7\n"), 7);
    }

    #[test]
    fn parse_control_value_handles_negative_numbers() {
        assert_eq!(parse_control_value("-1"), -1);
    }
}
