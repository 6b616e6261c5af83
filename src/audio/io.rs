//! Duplex audio I/O: one cpal input stream, one cpal output stream, and a
//! dedicated processing thread that owns the [`EngineContext`] and is the
//! only thing that ever touches it.
//!
//! Grounded on the teacher's `InputCapture`/`AudioEngine` pairing (cpal
//! streams feeding a lock-free `ringbuf` the rest of the system reads from),
//! restructured per spec.md section 5: instead of a handle the GUI polls,
//! the two cpal callback threads and the processing thread communicate
//! purely through two single-producer/single-consumer rings, and the
//! processing thread is the sole owner of all DSP state — no `Mutex` is
//! needed around the ring consumers because each ring has exactly one
//! consumer for its entire lifetime.

use cpal::traits::{DeviceTrait, StreamTrait};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::device::{select_input_device, select_output_device, stream_config, FRAME_SIZE};
use crate::control::ControlHandle;
use crate::dsp::EngineContext;
use crate::error::EngineError;

const RING_CAPACITY: usize = (FRAME_SIZE as usize) * 16;
const IDLE_BACKOFF: Duration = Duration::from_micros(200);

/// Owns the live cpal streams and the processing thread. Dropping this
/// tears the streams down.
pub struct AudioIo {
    _input_stream: cpal::Stream,
    _output_stream: cpal::Stream,
    processing: Option<thread::JoinHandle<EngineError>>,
}

impl AudioIo {
    /// Opens the selected input/output devices at the engine's fixed mono
    /// config and starts processing. Blocks the caller only long enough to
    /// open the streams; audio and control run on their own threads from
    /// here on.
    pub fn start(
        engine: EngineContext,
        control: ControlHandle,
        input_device_index: i32,
        output_device_index: i32,
    ) -> Result<Self, EngineError> {
        let input_device =
            select_input_device(input_device_index).map_err(EngineError::Init)?;
        let output_device =
            select_output_device(output_device_index).map_err(EngineError::Init)?;
        let config = stream_config();

        let input_ring = HeapRb::<f32>::new(RING_CAPACITY);
        let output_ring = HeapRb::<f32>::new(RING_CAPACITY);
        let (mut in_prod, in_cons) = input_ring.split();
        let (out_prod, mut out_cons) = output_ring.split();

        let stream_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let input_err = stream_error.clone();
        let input_stream = input_device
            .build_input_stream(
                &config,
                move |data: &[f32], _| {
                    in_prod.push_slice(data);
                },
                move |err| {
                    log::error!("input stream error: {err}");
                    *input_err.lock().unwrap() = Some(err.to_string());
                },
                None,
            )
            .map_err(|e| EngineError::Init(format!("failed to open input stream: {e}")))?;

        let output_err = stream_error.clone();
        let output_stream = output_device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _| {
                    let filled = out_cons.pop_slice(data);
                    for sample in &mut data[filled..] {
                        *sample = 0.0;
                    }
                },
                move |err| {
                    log::error!("output stream error: {err}");
                    *output_err.lock().unwrap() = Some(err.to_string());
                },
                None,
            )
            .map_err(|e| EngineError::Init(format!("failed to open output stream: {e}")))?;

        input_stream
            .play()
            .map_err(|e| EngineError::Init(format!("failed to start input stream: {e}")))?;
        output_stream
            .play()
            .map_err(|e| EngineError::Init(format!("failed to start output stream: {e}")))?;

        let processing_err = stream_error.clone();
        let processing = thread::Builder::new()
            .name("octaver-dsp".into())
            .spawn(move || process_loop(engine, control, in_cons, out_prod, processing_err))
            .map_err(|e| EngineError::Init(format!("failed to spawn processing thread: {e}")))?;

        Ok(Self {
            _input_stream: input_stream,
            _output_stream: output_stream,
            processing: Some(processing),
        })
    }

    /// Blocks until the processing thread observes a persistent stream
    /// error and tears itself down. Never returns under normal operation —
    /// the caller's `main` loops here for the lifetime of the process, per
    /// spec.md section 6 (exit code 0 is never returned).
    pub fn wait(mut self) -> EngineError {
        let handle = self.processing.take().expect("processing thread always set");
        match handle.join() {
            Ok(err) => err,
            Err(_) => EngineError::Stream("processing thread panicked".to_string()),
        }
    }
}

fn process_loop(
    mut engine: EngineContext,
    control: ControlHandle,
    mut in_cons: ringbuf::HeapCons<f32>,
    mut out_prod: ringbuf::HeapProd<f32>,
    stream_error: Arc<Mutex<Option<String>>>,
) -> EngineError {
    let mut scratch = vec![0.0f32; FRAME_SIZE as usize];

    loop {
        if let Some(msg) = stream_error.lock().unwrap().take() {
            return EngineError::Stream(msg);
        }

        let popped = in_cons.pop_slice(&mut scratch);
        if popped == 0 {
            thread::sleep(IDLE_BACKOFF);
            continue;
        }

        engine.set_voice(crate::dsp::Voice::from_control_value(control.voice()));
        engine.set_volume(control.volume());
        engine.set_gate(control.gate());

        for sample in &mut scratch[..popped] {
            *sample = engine.process_sample(*sample);
        }

        let mut written = 0;
        while written < popped {
            written += out_prod.push_slice(&scratch[written..popped]);
            if written < popped {
                thread::sleep(IDLE_BACKOFF);
            }
        }
    }
}
