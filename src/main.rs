//! bima-sahayak: multilingual health-insurance assistant.
//!
//! Three modes share one pipeline: an HTTP API for the web front end, an
//! interactive terminal chat that speaks its replies, and a read-only
//! admin report over the hosted policy database.

mod admin;
mod chat;
mod config;
mod language;
mod plans;
mod playback;
mod recorder;
mod reply;
mod responses;
mod server;
mod speech;
mod store;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::language::LanguageCode;

#[derive(Parser, Debug)]
#[command(name = "bima-sahayak", about = "Multilingual health-insurance assistant")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run mode: serve, chat, or admin
    #[arg(short, long, default_value = "serve")]
    mode: String,

    /// Chat session language (chat mode only)
    #[arg(short, long, default_value = "english")]
    language: String,

    /// Override the configured API port (serve mode only)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging (suppress noisy HTTP internals)
    let filter = if args.verbose {
        EnvFilter::new("debug,hyper=info,reqwest=info")
    } else {
        EnvFilter::new("info,hyper=warn,reqwest=warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("bima-sahayak starting");

    let config = config::Config::load(args.config.as_deref());

    // Refuse to start with a hole in the language tables.
    responses::validate_tables()?;
    info!("Language tables validated ({} languages)", LanguageCode::ALL.len());

    let speech = Arc::new(speech::ElevenLabsClient::new(&config.elevenlabs));
    if !speech.is_configured() {
        warn!("No ElevenLabs API key — replies will carry mock audio");
    }
    let reply = Arc::new(reply::ReplyService::new(Arc::clone(&speech)));
    let store = Arc::new(store::PolicyStore::new(&config.policy_store));

    match args.mode.as_str() {
        "chat" => {
            let language = LanguageCode::parse_or_english(&args.language);
            info!("Starting terminal chat in {language}");

            let player = Arc::new(playback::AudioPlayer::new(config.playback.clone()));
            let session = chat::ChatSession::new(
                language,
                reply::ReplyService::new(Arc::clone(&speech)),
                Some(player),
            );
            let capture = Some(recorder::VoiceCapture::new(config.recording.clone()));
            chat::run_terminal(session, capture).await?;
        }
        "admin" => {
            admin::run_report(&store).await;
        }
        "serve" => {
            let state = server::ApiState {
                reply,
                speech,
                store,
                plans: config.plans.clone(),
            };
            let port = args.port.unwrap_or(config.server.port);
            server::serve(state, &config.server.host, port).await?;
        }
        other => {
            return Err(format!("unknown mode: {other} (expected serve, chat, or admin)").into());
        }
    }

    Ok(())
}
