//! Chat session: transcript log, per-turn state machine, terminal runner.
//!
//! One turn walks Idle → UserSubmitted → AwaitingReply → AwaitingAudio →
//! Rendered, with ErrorRendered when the reply fetch itself fails (audio
//! failure is absorbed earlier and never reaches here). The transcript is
//! append-only; audio arrives later and is attached by message id rather
//! than by position.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use uuid::Uuid;

use crate::language::LanguageCode;
use crate::playback::AudioPlayer;
use crate::recorder::{CaptureState, VoiceCapture};
use crate::reply::ReplyService;
use crate::responses::{greeting_for, select_response, APOLOGY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One turn in the transcript. Immutable once appended, except for the
/// late-arriving audio reference.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
    pub audio_url: Option<String>,
}

/// Append-only message log, insertion order significant.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its id for later audio attachment.
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.messages.push(ChatMessage {
            id,
            text: text.into(),
            sender,
            timestamp: Local::now(),
            audio_url: None,
        });
        id
    }

    /// Attach audio to an existing message by id. Returns false if the id
    /// is unknown.
    pub fn attach_audio(&mut self, id: Uuid, audio_url: String) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.audio_url = Some(audio_url);
                true
            }
            None => false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Per-turn states. `Rendered` and `ErrorRendered` are terminal; a new
/// submit may begin from either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    UserSubmitted,
    AwaitingReply,
    AwaitingAudio,
    Rendered,
    ErrorRendered,
}

/// Reply backend seam: the in-process [`ReplyService`] in production, a
/// scripted stand-in under test.
pub trait ReplyBackend {
    /// Fetch reply text for one turn. Failure here is unrecoverable for
    /// the turn and surfaces as an apology message.
    fn reply_text(
        &self,
        language: LanguageCode,
        user_message: &str,
        override_text: Option<&str>,
    ) -> impl std::future::Future<Output = Result<String, String>> + Send;

    /// Fetch audio for already-chosen reply text. Never fails; absence of
    /// audio is a valid outcome.
    fn reply_audio(
        &self,
        text: &str,
        language: LanguageCode,
    ) -> impl std::future::Future<Output = Option<String>> + Send;
}

impl ReplyBackend for ReplyService {
    async fn reply_text(
        &self,
        language: LanguageCode,
        user_message: &str,
        override_text: Option<&str>,
    ) -> Result<String, String> {
        Ok(select_response(language, override_text, user_message).to_string())
    }

    async fn reply_audio(&self, text: &str, language: LanguageCode) -> Option<String> {
        self.synthesize_or_degrade(text, language).await
    }
}

pub struct ChatSession<R: ReplyBackend> {
    language: LanguageCode,
    backend: R,
    player: Option<Arc<AudioPlayer>>,
    log: ChatLog,
    state: TurnState,
    is_processing: bool,
}

impl<R: ReplyBackend> ChatSession<R> {
    pub fn new(language: LanguageCode, backend: R, player: Option<Arc<AudioPlayer>>) -> Self {
        Self {
            language,
            backend,
            player,
            log: ChatLog::new(),
            state: TurnState::Idle,
            is_processing: false,
        }
    }

    pub fn language(&self) -> LanguageCode {
        self.language
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    /// Open the session with the per-language greeting, spoken aloud when
    /// audio is available. The greeting travels the override path, not the
    /// response table.
    pub async fn greet(&mut self) -> &ChatMessage {
        let greeting = greeting_for(self.language);
        let id = self.log.push(Sender::Bot, greeting);

        if let Some(audio_url) = self.backend.reply_audio(greeting, self.language).await {
            self.log.attach_audio(id, audio_url.clone());
            self.play(&audio_url).await;
        }

        self.log.messages().last().expect("greeting just appended")
    }

    /// Run one full chat turn. Returns false when the input is rejected
    /// (blank text, or a previous turn still in flight).
    pub async fn submit(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        if self.is_processing {
            warn!("Ignoring submit while a turn is in flight");
            return false;
        }

        self.is_processing = true;
        self.state = TurnState::UserSubmitted;
        self.log.push(Sender::User, text);

        self.state = TurnState::AwaitingReply;
        let reply_text = match self.backend.reply_text(self.language, text, None).await {
            Ok(t) => t,
            Err(e) => {
                warn!("Reply fetch failed: {e}");
                self.log.push(Sender::Bot, APOLOGY);
                self.state = TurnState::ErrorRendered;
                self.is_processing = false;
                return true;
            }
        };

        let bot_id = self.log.push(Sender::Bot, reply_text.clone());
        self.state = TurnState::AwaitingAudio;

        if let Some(audio_url) = self.backend.reply_audio(&reply_text, self.language).await {
            self.log.attach_audio(bot_id, audio_url.clone());
            self.state = TurnState::Rendered;
            self.play(&audio_url).await;
        } else {
            self.state = TurnState::Rendered;
        }

        self.is_processing = false;
        true
    }

    async fn play(&self, audio_url: &str) {
        if let Some(player) = &self.player {
            player.play(audio_url).await;
        }
    }
}

/// Interactive terminal front end for a chat session.
///
/// `/voice` runs a bounded voice capture (resolving to the stub
/// transcript), `/quit` exits, anything else is a chat turn.
pub async fn run_terminal(
    mut session: ChatSession<ReplyService>,
    mut capture: Option<VoiceCapture>,
) -> Result<(), Box<dyn std::error::Error>> {
    let greeting = session.greet().await;
    println!("bot> {}", greeting.text);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print_prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();

        match line.as_str() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/voice" => {
                let Some(capture) = capture.as_mut() else {
                    println!("(voice capture unavailable on this machine)");
                    continue;
                };
                if let Err(e) = capture.open_stream() {
                    warn!("Cannot open capture stream: {e}");
                    println!("(voice capture unavailable: {e})");
                    continue;
                }

                capture.start();
                println!("(listening — capture stops automatically)");
                while capture.state() == CaptureState::Recording {
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                }
                let voice = capture.stop();
                if voice.timed_out {
                    println!("(captured {:.1}s, stopped at the limit)", voice.duration_s);
                }
                println!("you> {}", voice.transcript);
                run_turn(&mut session, &voice.transcript).await;
            }
            text => {
                run_turn(&mut session, text).await;
            }
        }
    }

    info!("Chat session ended ({} messages)", session.log().len());
    Ok(())
}

async fn run_turn(session: &mut ChatSession<ReplyService>, text: &str) {
    if !session.submit(text).await {
        return;
    }
    if let Some(last) = session.log().messages().last() {
        if last.sender == Sender::Bot {
            println!("bot> {}", last.text);
        }
    }
}

fn print_prompt() {
    use std::io::Write;
    print!("you> ");
    let _ = std::io::stdout().flush();
}
