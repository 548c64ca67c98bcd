//! Best-effort audio playback for bot replies.
//!
//! Audio references are opaque handles (data URIs in practice, plain URLs
//! tolerated). Playback never raises: a broken reference, a missing output
//! device, or a decoder failure all degrade to silence with a log line.
//!
//! Two strategies, tried in order:
//! 1. container decode via `rodio::Decoder` (handles the mp3 the gateway
//!    returns);
//! 2. raw WAV decode via hound into an f32 sample buffer.
//!
//! A forced timeout clears the speaking indicator if the device never
//! signals completion, so the session cannot get stuck "speaking".

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use base64::Engine;
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use crate::config::PlaybackConfig;

/// Terminal states of one playback attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Done,
    NoAudioDevice,
    DecodeFailed,
    /// The drain-wait task itself failed; playback state is unknown.
    Aborted,
    TimedOut,
}

/// "Speaking" indicator shared with the chat view.
///
/// Guarded by a generation counter: starting a new attempt supersedes any
/// earlier one, so only the most recent bot message can show as speaking.
#[derive(Clone, Default)]
pub struct SpeakingIndicator {
    inner: Arc<IndicatorInner>,
}

#[derive(Default)]
struct IndicatorInner {
    generation: AtomicU64,
    speaking: AtomicBool,
}

/// Token tying a clear back to the attempt that set the indicator.
pub struct SpeakingToken {
    generation: u64,
}

impl SpeakingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_speaking(&self) -> bool {
        self.inner.speaking.load(Ordering::Relaxed)
    }

    /// Mark a new attempt as speaking, superseding any previous attempt.
    pub fn begin(&self) -> SpeakingToken {
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.speaking.store(true, Ordering::Relaxed);
        SpeakingToken { generation }
    }

    /// Clear the indicator, unless a newer attempt already owns it.
    pub fn clear(&self, token: &SpeakingToken) {
        if self.inner.generation.load(Ordering::Relaxed) == token.generation {
            self.inner.speaking.store(false, Ordering::Relaxed);
        }
    }
}

/// Decode an audio reference into raw bytes.
///
/// Data URIs are decoded locally; http(s) references are fetched with a
/// bounded timeout.
pub async fn fetch_audio_bytes(reference: &str, timeout_secs: f64) -> Result<Vec<u8>, String> {
    if let Some(rest) = reference.strip_prefix("data:") {
        let (_mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| "data URI is not base64-encoded".to_string())?;
        return base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| format!("invalid base64 audio payload: {e}"));
    }

    if reference.starts_with("http://") || reference.starts_with("https://") {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs_f64(timeout_secs))
            .build()
            .map_err(|e| format!("failed to build audio fetch client: {e}"))?;
        let resp = client
            .get(reference)
            .send()
            .await
            .map_err(|e| format!("audio fetch failed: {e}"))?;
        if !resp.status().is_success() {
            return Err(format!("audio fetch returned status {}", resp.status()));
        }
        return resp
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| format!("audio fetch body error: {e}"));
    }

    Err(format!(
        "unsupported audio reference scheme: {}",
        reference.chars().take(16).collect::<String>()
    ))
}

/// Fallback decode: parse bytes as WAV into mono/stereo f32 samples.
fn wav_samples(bytes: &[u8]) -> Result<(u16, u32, Vec<f32>), String> {
    let mut reader =
        hound::WavReader::new(Cursor::new(bytes)).map_err(|e| format!("not a WAV file: {e}"))?;
    let spec = reader.spec();

    let samples: Result<Vec<f32>, _> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect(),
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect()
        }
    };

    let samples = samples.map_err(|e| format!("WAV sample decode failed: {e}"))?;
    Ok((spec.channels, spec.sample_rate, samples))
}

pub struct AudioPlayer {
    stream: Option<OutputStream>,
    indicator: SpeakingIndicator,
    config: PlaybackConfig,
}

impl AudioPlayer {
    /// Open the default output device. A machine without one still gets a
    /// functional player that simply skips playback.
    pub fn new(config: PlaybackConfig) -> Self {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => Some(s),
            Err(e) => {
                warn!("No audio output device, playback disabled: {e}");
                None
            }
        };

        Self {
            stream,
            indicator: SpeakingIndicator::new(),
            config,
        }
    }

    #[cfg(test)]
    fn silent(config: PlaybackConfig) -> Self {
        Self {
            stream: None,
            indicator: SpeakingIndicator::new(),
            config,
        }
    }

    /// Shared "speaking" indicator for transcript rendering.
    pub fn indicator(&self) -> &SpeakingIndicator {
        &self.indicator
    }

    /// Play one audio reference to completion, best-effort.
    ///
    /// Never raises. The speaking indicator is guaranteed false afterwards
    /// unless a newer attempt has started in the meantime.
    pub async fn play(&self, reference: &str) -> PlaybackOutcome {
        let token = self.indicator.begin();
        let outcome = self.play_inner(reference).await;
        self.indicator.clear(&token);

        match outcome {
            PlaybackOutcome::Done => debug!("Playback finished"),
            PlaybackOutcome::NoAudioDevice => debug!("Playback skipped: no output device"),
            PlaybackOutcome::DecodeFailed => warn!("Playback skipped: undecodable audio"),
            PlaybackOutcome::Aborted => warn!("Playback wait task failed"),
            PlaybackOutcome::TimedOut => warn!("Playback cut off by safety timeout"),
        }
        outcome
    }

    async fn play_inner(&self, reference: &str) -> PlaybackOutcome {
        let Some(stream) = &self.stream else {
            return PlaybackOutcome::NoAudioDevice;
        };

        let bytes = match fetch_audio_bytes(reference, self.config.start_timeout).await {
            Ok(b) => b,
            Err(e) => {
                warn!("Failed to resolve audio reference: {e}");
                return PlaybackOutcome::DecodeFailed;
            }
        };

        let sink = Arc::new(Sink::connect_new(stream.mixer()));

        // Primary strategy: container decode.
        match Decoder::new(Cursor::new(bytes.clone())) {
            Ok(source) => sink.append(source),
            Err(e) => {
                // Fallback strategy: raw WAV into a sample buffer.
                debug!("Container decode failed ({e}), trying WAV fallback");
                match wav_samples(&bytes) {
                    Ok((channels, sample_rate, samples)) => {
                        sink.append(SamplesBuffer::new(channels, sample_rate, samples));
                    }
                    Err(e) => {
                        warn!("Fallback WAV decode failed: {e}");
                        return PlaybackOutcome::DecodeFailed;
                    }
                }
            }
        }

        // Wait for the device to drain, bounded by the safety ceiling.
        let waiter = {
            let sink = Arc::clone(&sink);
            tokio::task::spawn_blocking(move || sink.sleep_until_end())
        };
        let ceiling = std::time::Duration::from_secs_f64(self.config.max_duration);

        let outcome = drain_bounded(ceiling, waiter).await;
        if outcome != PlaybackOutcome::Done {
            sink.stop();
        }
        outcome
    }
}

/// Bounded wait for the drain task: completion, a dead wait task, or the
/// safety ceiling, whichever comes first.
async fn drain_bounded<F>(ceiling: std::time::Duration, waiter: F) -> PlaybackOutcome
where
    F: std::future::Future<Output = Result<(), tokio::task::JoinError>>,
{
    match tokio::time::timeout(ceiling, waiter).await {
        Ok(Ok(())) => PlaybackOutcome::Done,
        Ok(Err(e)) => {
            warn!("Playback drain wait failed: {e}");
            PlaybackOutcome::Aborted
        }
        Err(_) => PlaybackOutcome::TimedOut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::MOCK_AUDIO;

    #[tokio::test]
    async fn mock_audio_reference_decodes() {
        let bytes = fetch_audio_bytes(MOCK_AUDIO, 1.0).await.unwrap();
        assert!(!bytes.is_empty());
    }

    #[tokio::test]
    async fn garbage_reference_is_rejected() {
        assert!(fetch_audio_bytes("blob:whatever", 1.0).await.is_err());
        assert!(fetch_audio_bytes("data:audio/mpeg;base64,!!!", 1.0).await.is_err());
        assert!(fetch_audio_bytes("data:audio/mpeg,plain", 1.0).await.is_err());
    }

    #[test]
    fn wav_fallback_decodes_generated_wav() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut buf, spec).unwrap();
            for i in 0..160 {
                writer.write_sample(((i % 32) * 1000) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        let (channels, rate, samples) = wav_samples(buf.get_ref()).unwrap();
        assert_eq!(channels, 1);
        assert_eq!(rate, 16000);
        assert_eq!(samples.len(), 160);
    }

    #[test]
    fn newer_attempt_supersedes_older_indicator() {
        let indicator = SpeakingIndicator::new();
        let first = indicator.begin();
        let _second = indicator.begin();
        // The stale attempt finishing must not clear the newer one.
        indicator.clear(&first);
        assert!(indicator.is_speaking());
    }

    #[test]
    fn current_attempt_clears_indicator() {
        let indicator = SpeakingIndicator::new();
        let token = indicator.begin();
        assert!(indicator.is_speaking());
        indicator.clear(&token);
        assert!(!indicator.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_drain_times_out_and_the_indicator_clears() {
        let indicator = SpeakingIndicator::new();
        let token = indicator.begin();

        // A drain that never completes must hit the ceiling, not hang.
        let stuck = std::future::pending::<Result<(), tokio::task::JoinError>>();
        let outcome = drain_bounded(std::time::Duration::from_secs(10), stuck).await;
        assert_eq!(outcome, PlaybackOutcome::TimedOut);

        indicator.clear(&token);
        assert!(!indicator.is_speaking());
    }

    #[tokio::test]
    async fn completed_drain_reports_done() {
        let done = async { Ok::<(), tokio::task::JoinError>(()) };
        let outcome = drain_bounded(std::time::Duration::from_secs(1), done).await;
        assert_eq!(outcome, PlaybackOutcome::Done);
    }

    #[tokio::test]
    async fn dead_drain_task_is_not_reported_as_done() {
        let waiter = tokio::task::spawn_blocking::<_, ()>(|| panic!("drain thread died"));
        let outcome = drain_bounded(std::time::Duration::from_secs(5), waiter).await;
        assert_eq!(outcome, PlaybackOutcome::Aborted);
    }

    #[tokio::test]
    async fn playback_without_device_never_raises() {
        let player = AudioPlayer::silent(PlaybackConfig::default());
        let outcome = player.play(MOCK_AUDIO).await;
        assert_eq!(outcome, PlaybackOutcome::NoAudioDevice);
        assert!(!player.indicator().is_speaking());
    }
}
