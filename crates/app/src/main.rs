use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;

use stillvox_app::artifact::ArtifactStore;
use stillvox_app::manifest::{generate_session_audio, play_session_audio};
use stillvox_app::pipeline::{SchedulerConfig, SessionScheduler};
use stillvox_app::playback::FfplaySink;
use stillvox_session::{parse_markup, parse_records, ParseOptions, Session};
use stillvox_tts::TtsConfig;
use stillvox_tts_gemini::GeminiTtsBackend;

#[derive(Parser)]
#[command(name = "stillvox")]
#[command(about = "Narrates scripted yoga sessions with pipelined text-to-speech")]
struct Cli {
    /// Session file (.json statement records or .txt markup), or a
    /// directory of pre-generated audio to replay
    session: PathBuf,

    /// Narration segments synthesized ahead of the playback position
    #[arg(short, long, default_value_t = 2)]
    buffer_size: usize,

    /// Synthesis worker count
    #[arg(long, default_value_t = 3)]
    workers: usize,

    /// Persist synthesized audio under this directory instead of deleting
    /// it after playback
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Generate session audio without playing it
    #[arg(long)]
    generate_only: bool,

    /// Narration voice for segments that do not name one
    #[arg(long)]
    voice: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "stillvox.log");
    let (non_blocking_file, _guard) = tracing_appender::non_blocking(file_appender);
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout.and(non_blocking_file))
        .with_env_filter(log_level)
        .init();
    std::mem::forget(_guard);
    Ok(())
}

fn parse_session_file(cli: &Cli) -> anyhow::Result<Session> {
    let mut opts = ParseOptions::default();
    if let Some(voice) = &cli.voice {
        opts.default_voice = voice.clone();
    }

    let raw = std::fs::read_to_string(&cli.session)
        .with_context(|| format!("cannot read session file {}", cli.session.display()))?;

    let session = if cli.session.extension().is_some_and(|ext| ext == "json") {
        parse_records(&raw, &opts)?
    } else {
        parse_markup(&raw, &opts)
    };
    tracing::info!(
        segments = session.len(),
        narrations = session.narration_count(),
        "session parsed"
    );
    Ok(session)
}

fn build_backend(cli: &Cli) -> anyhow::Result<GeminiTtsBackend> {
    let mut config = TtsConfig {
        api_key: cli.api_key.clone().unwrap_or_default(),
        ..TtsConfig::default()
    };
    if let Some(voice) = &cli.voice {
        config.default_voice = voice.clone();
    }
    Ok(GeminiTtsBackend::new(config)?)
}

/// Default generation directory, derived from the session file name the
/// way pre-generated sessions are laid out: sessions/audio/<name>.
fn derived_audio_dir(session: &std::path::Path) -> PathBuf {
    let stem = session
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "session".to_string());
    PathBuf::from("sessions/audio").join(stem)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;
    let cli = Cli::parse();

    if cli.session.is_dir() {
        tracing::info!(dir = %cli.session.display(), "playing pre-generated session");
        let sink = FfplaySink::new();
        play_session_audio(&cli.session, &sink).await?;
        return Ok(());
    }

    let session = parse_session_file(&cli)?;
    let backend = build_backend(&cli)?;

    if cli.generate_only {
        let out_dir = cli
            .output_dir
            .clone()
            .unwrap_or_else(|| derived_audio_dir(&cli.session));
        generate_session_audio(&session, &backend, &out_dir).await?;
        tracing::info!(
            "generation complete; play it with: stillvox {}",
            out_dir.display()
        );
        return Ok(());
    }

    let sink = FfplaySink::new();
    if !sink.is_available().await {
        tracing::warn!("ffplay not found on PATH; playback will fail");
    }

    let store = match &cli.output_dir {
        Some(dir) => ArtifactStore::persistent(dir.clone()),
        None => ArtifactStore::ephemeral(),
    };
    store.prepare()?;

    let scheduler = SessionScheduler::new(
        session,
        Arc::new(backend),
        Box::new(sink),
        store,
        SchedulerConfig {
            buffer_size: cli.buffer_size,
            worker_count: cli.workers,
        },
    );
    scheduler.run().await?;
    Ok(())
}
