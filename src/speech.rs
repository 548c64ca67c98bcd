//! ElevenLabs text-to-speech gateway client.
//!
//! The vendor is treated as unreliable: every call either yields a playable
//! `data:audio/mpeg;base64,...` URI or a typed error the caller can absorb.
//! When no API key is configured the client reports [`SynthesisError::Unconfigured`]
//! so callers can substitute [`MOCK_AUDIO`] and keep the playback path
//! exercised without live credentials.

use base64::Engine;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::ElevenLabsConfig;
use crate::language::LanguageCode;

/// Short browser-safe tone used whenever real synthesis is unavailable.
pub const MOCK_AUDIO: &str = "data:audio/mp3;base64,//uQxAAAAAAAAAAAAAAAAAAAAAAAWGluZwAAAA8AAAACAAACcQCAgICAgICAgICAgICAgICAgICAgICAgICAgICAgICAgICAgICAgICAgICAgICAgICA//////////////////////////////////////////////////////////////////8AAABhTEFNRTMuMTAwA8MAAAAAAAAAABQgJAUHQQAB9AAAAnGMHkkIAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA//sQxAADgnABGiAAQBCqgCRMAAgEAH///////////////7+n/9FTuQsQH//////2NG0jWUGlio5gLQTOtIoeR2WX////X4s9Atb/JRVCbBUpeRUq//////////////////9RUi0f2jn/+xDECgPCjAEQAABN4AAANIAAAAQVTEFNRTMuMTAwVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVQ==";

/// ElevenLabs voice id per language. Most Indic languages share the vendor
/// default voice; English and a few others have dedicated ids.
pub fn voice_id_for(language: LanguageCode) -> &'static str {
    match language {
        LanguageCode::English => "siw1N9V8LmYeEWKyWBxv",
        LanguageCode::Hindi => "1qEiC6qsybMkmnNdVMbK",
        LanguageCode::Tamil => "izSi63MW0URDnszWlZMX",
        LanguageCode::Telugu
        | LanguageCode::Bengali
        | LanguageCode::Marathi
        | LanguageCode::Gujarati
        | LanguageCode::Kannada
        | LanguageCode::Malayalam
        | LanguageCode::Punjabi => "21m00Tcm4TlvDq8ikWAM",
    }
}

#[derive(Debug)]
pub enum SynthesisError {
    /// No API key available; callers substitute mock audio.
    Unconfigured,
    /// Vendor returned a non-success status or the transport failed.
    Gateway(String),
}

impl std::fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unconfigured => write!(f, "ElevenLabs API key not configured"),
            Self::Gateway(msg) => write!(f, "ElevenLabs gateway error: {msg}"),
        }
    }
}

pub struct ElevenLabsClient {
    api_url: String,
    api_key: Option<String>,
    model_id: String,
    stability: f32,
    similarity_boost: f32,
    client: Client,
}

impl ElevenLabsClient {
    pub fn new(config: &ElevenLabsConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        // Config key wins; fall back to the conventional env var.
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("ELEVENLABS_API_KEY").ok().filter(|k| !k.is_empty()));

        Self {
            api_url: config.api_url.clone(),
            api_key,
            model_id: config.model_id.clone(),
            stability: config.stability,
            similarity_boost: config.similarity_boost,
            client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Credential-less client for tests, independent of the process
    /// environment.
    #[cfg(test)]
    pub(crate) fn unconfigured() -> Self {
        let mut client = Self::new(&ElevenLabsConfig::default());
        client.api_key = None;
        client
    }

    /// Convert text to speech for the given language's voice.
    ///
    /// Returns a data URI on success. Never panics; all failure modes come
    /// back as [`SynthesisError`] for the caller to absorb.
    pub async fn synthesize(
        &self,
        text: &str,
        language: LanguageCode,
    ) -> Result<String, SynthesisError> {
        let Some(api_key) = &self.api_key else {
            return Err(SynthesisError::Unconfigured);
        };

        let voice_id = voice_id_for(language);
        let url = format!("{}/{voice_id}", self.api_url);

        let preview: String = text.chars().take(30).collect();
        debug!("Synthesizing for {language} (voice {voice_id}): \"{preview}...\"");

        let body = json!({
            "text": text,
            "model_id": self.model_id,
            "voice_settings": {
                "stability": self.stability,
                "similarity_boost": self.similarity_boost,
            }
        });

        let resp = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SynthesisError::Gateway(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            warn!("ElevenLabs returned status {status}: {detail}");
            return Err(SynthesisError::Gateway(format!("status {status}")));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SynthesisError::Gateway(format!("failed to read audio body: {e}")))?;

        if bytes.is_empty() {
            return Err(SynthesisError::Gateway("empty audio payload".into()));
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Ok(format!("data:audio/mpeg;base64,{encoded}"))
    }
}
