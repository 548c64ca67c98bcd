//! Voice-input capture for the terminal chat session.
//!
//! Captures 16kHz mono f32 audio from the default input device, bounded by
//! a fixed maximum duration that stops buffering on its own. Transcription
//! is a deliberate stub: there is no speech-to-text collaborator yet, so a
//! finished capture resolves to a canned transcript. The capture state
//! machine (Idle → Recording → Stopped/TimedOut → Idle) is real either way.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, warn};

use crate::config::RecordingConfig;

/// Placeholder transcript until a speech-to-text collaborator exists.
pub const STUB_TRANSCRIPT: &str =
    "I want to know more about health insurance plans for my family";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
    TimedOut,
}

/// Result of one finished capture.
#[derive(Debug, Clone)]
pub struct CapturedVoice {
    pub duration_s: f64,
    pub timed_out: bool,
    pub transcript: String,
}

/// Stub boundary: captured samples are measured, then discarded.
fn resolve_transcript(_samples: &[f32]) -> String {
    STUB_TRANSCRIPT.to_string()
}

pub struct VoiceCapture {
    config: RecordingConfig,
    shared: Arc<SharedState>,
    /// Kept alive to hold the input stream open between captures.
    _stream: Option<Stream>,
}

struct SharedState {
    inner: Mutex<CaptureInner>,
}

struct CaptureInner {
    state: CaptureState,
    buffer: Vec<f32>,
    max_samples: usize,
    started: Option<Instant>,
}

impl VoiceCapture {
    pub fn new(config: RecordingConfig) -> Self {
        let max_samples = (config.max_duration * config.sample_rate as f64) as usize;

        let shared = Arc::new(SharedState {
            inner: Mutex::new(CaptureInner {
                state: CaptureState::Idle,
                buffer: Vec::with_capacity(max_samples),
                max_samples,
                started: None,
            }),
        });

        Self {
            config,
            shared,
            _stream: None,
        }
    }

    /// Open the input stream. Call once before the first capture.
    pub fn open_stream(&mut self) -> Result<(), String> {
        if self._stream.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or("No input audio device available")?;

        info!(
            "Using capture device: {}",
            device.name().unwrap_or("unknown".into())
        );

        let stream_config = StreamConfig {
            channels: self.config.channels,
            sample_rate: SampleRate(self.config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let shared = Arc::clone(&self.shared);
        let max_duration = self.config.max_duration;

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                    let mut inner = shared.inner.lock().unwrap();

                    if inner.state != CaptureState::Recording {
                        return;
                    }

                    let remaining = inner.max_samples.saturating_sub(inner.buffer.len());
                    let to_copy = data.len().min(remaining);
                    inner.buffer.extend_from_slice(&data[..to_copy]);

                    let elapsed = inner
                        .started
                        .map(|t| t.elapsed().as_secs_f64())
                        .unwrap_or(0.0);
                    if inner.buffer.len() >= inner.max_samples || elapsed >= max_duration {
                        info!("Capture limit reached ({max_duration}s), stopping");
                        inner.state = CaptureState::TimedOut;
                    }
                },
                move |err| {
                    warn!("Capture stream error: {err}");
                },
                None, // timeout
            )
            .map_err(|e| format!("Failed to build input stream: {e}"))?;

        stream
            .play()
            .map_err(|e| format!("Failed to start input stream: {e}"))?;

        self._stream = Some(stream);
        Ok(())
    }

    pub fn state(&self) -> CaptureState {
        self.shared.inner.lock().unwrap().state
    }

    /// Begin a capture. No-op while one is already running.
    pub fn start(&self) {
        let mut inner = self.shared.inner.lock().unwrap();
        if inner.state == CaptureState::Recording {
            return;
        }
        inner.buffer.clear();
        inner.state = CaptureState::Recording;
        inner.started = Some(Instant::now());
        info!("Voice capture started (max {:.0}s)", self.config.max_duration);
    }

    /// End the capture and resolve it to a transcript.
    pub fn stop(&self) -> CapturedVoice {
        let mut inner = self.shared.inner.lock().unwrap();
        let timed_out = inner.state == CaptureState::TimedOut;
        inner.state = CaptureState::Idle;
        inner.started = None;

        let samples = std::mem::take(&mut inner.buffer);
        let duration_s = samples.len() as f64 / self.config.sample_rate as f64;
        info!("Voice capture stopped: {duration_s:.1}s (timed_out={timed_out})");

        CapturedVoice {
            duration_s,
            timed_out,
            transcript: resolve_transcript(&samples),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_resolves_to_the_stub_transcript() {
        let capture = VoiceCapture::new(RecordingConfig::default());
        capture.start();
        let voice = capture.stop();
        assert_eq!(voice.transcript, STUB_TRANSCRIPT);
        assert_eq!(capture.state(), CaptureState::Idle);
    }

    #[test]
    fn start_is_idempotent_while_recording() {
        let capture = VoiceCapture::new(RecordingConfig::default());
        capture.start();
        assert_eq!(capture.state(), CaptureState::Recording);
        capture.start();
        assert_eq!(capture.state(), CaptureState::Recording);
        capture.stop();
    }

    #[test]
    fn stub_transcript_is_nonempty() {
        assert!(!resolve_transcript(&[]).is_empty());
    }
}
