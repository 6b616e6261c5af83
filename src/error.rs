//! Process-boundary error type and exit-code mapping.
//!
//! The DSP and control modules use the teacher's pervasive `Result<T,
//! String>` convention internally; this enum exists only at the binary's
//! outer edge to carry the two exit codes spec.md section 6 defines.

use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// Device not found, stream open failure, or a missing control file at
    /// startup. Exit code -1.
    Init(String),
    /// Persistent audio read/write underrun or overrun. Exit code -2.
    Stream(String),
}

impl EngineError {
    pub fn exit_code(&self) -> i32 {
        match self {
            EngineError::Init(_) => -1,
            EngineError::Stream(_) => -2,
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Init(msg) => write!(f, "initialization error: {msg}"),
            EngineError::Stream(msg) => write!(f, "stream error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
