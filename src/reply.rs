//! Reply orchestration: canned text plus best-effort speech.
//!
//! One chat turn = select the reply text, then try to attach synthesized
//! audio. Audio is strictly optional: gateway failures degrade to a
//! text-only reply, and a missing API key degrades to mock audio so the
//! playback path still runs in development.

use std::sync::Arc;

use tracing::{info, warn};

use crate::language::LanguageCode;
use crate::responses::select_response;
use crate::speech::{ElevenLabsClient, SynthesisError, MOCK_AUDIO};

/// Result of one reply turn. `audio_url` is a data URI when present.
#[derive(Debug, Clone)]
pub struct BotReply {
    pub text: String,
    pub audio_url: Option<String>,
}

pub struct ReplyService {
    speech: Arc<ElevenLabsClient>,
}

impl ReplyService {
    pub fn new(speech: Arc<ElevenLabsClient>) -> Self {
        Self { speech }
    }

    /// Produce the reply for one turn. Never fails: every speech failure
    /// path degrades to "no audio" or placeholder audio.
    pub async fn reply(
        &self,
        language: LanguageCode,
        user_message: &str,
        override_text: Option<&str>,
    ) -> BotReply {
        let text = select_response(language, override_text, user_message).to_string();
        let audio_url = self.synthesize_or_degrade(&text, language).await;
        BotReply { text, audio_url }
    }

    /// Best-effort speech for already-chosen reply text.
    ///
    /// Gateway failure degrades to `None`; missing credentials degrade to
    /// the mock placeholder so playback stays exercised in development.
    pub async fn synthesize_or_degrade(
        &self,
        text: &str,
        language: LanguageCode,
    ) -> Option<String> {
        match self.speech.synthesize(text, language).await {
            Ok(uri) => {
                info!("Synthesized {} chars of speech for {language}", text.len());
                Some(uri)
            }
            Err(SynthesisError::Unconfigured) => {
                warn!("Speech gateway unconfigured — using mock audio");
                Some(MOCK_AUDIO.to_string())
            }
            Err(e) => {
                warn!("Speech synthesis failed, continuing without audio: {e}");
                None
            }
        }
    }
}
