//! Audio device access and the duplex I/O adapter around the DSP engine.

pub mod device;
pub mod io;
