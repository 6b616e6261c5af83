//! CLI entry point: `octaver <device_index_file> <voice_file> <volume_file> <gate_file>`.
//!
//! Grounded on the teacher's `editor_host.rs` (plain `env_logger` + `log`
//! CLI, no GUI framework) and spec.md section 6's external interface.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use octaver::audio::io::AudioIo;
use octaver::control;
use octaver::dsp::EngineContext;
use octaver::error::EngineError;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(never) => match never {},
        Err(err) => {
            eprintln!("{} {err}", err.exit_code());
            log::error!("{err}");
            // `ExitCode` only holds a `u8`; -1/-2 are carried through the
            // same wraparound the OS itself applies to negative exit codes.
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// `Ok` is never constructed — the audio pipeline runs until it hits a
/// fatal error, matching spec.md section 6 ("exit code 0 is never
/// returned").
fn run() -> Result<std::convert::Infallible, EngineError> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 5 {
        return Err(EngineError::Init(format!(
            "usage: {} <device_index_file> <voice_file> <volume_file> <gate_file>",
            args.first().map(String::as_str).unwrap_or("octaver")
        )));
    }

    let device_index_path = PathBuf::from(&args[1]);
    let voice_path = PathBuf::from(&args[2]);
    let volume_path = PathBuf::from(&args[3]);
    let gate_path = PathBuf::from(&args[4]);

    let device_index = read_device_index(&device_index_path)?;
    let control = control::spawn(voice_path, volume_path, gate_path).map_err(EngineError::Init)?;

    let engine = EngineContext::new();
    let io = AudioIo::start(engine, control, device_index, device_index)?;

    log::info!("octaver running");
    Err(io.wait())
}

fn read_device_index(path: &PathBuf) -> Result<i32, EngineError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| EngineError::Init(format!("failed to read device index file {}: {e}", path.display())))?;
    raw.trim()
        .parse::<i32>()
        .map_err(|e| EngineError::Init(format!("invalid device index in {}: {e}", path.display())))
}
