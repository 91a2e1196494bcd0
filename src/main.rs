use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voice_chat::audio::decode;
use voice_chat::terminal::{self, TerminalView};
use voice_chat::{
    AudioRecorder, Backend, Capture, Config, Driver, HttpBackend, Language, MicrophoneRecorder,
    SpeakerOutput,
};

/// vchat - talk to a chat backend by voice or text
#[derive(Parser)]
#[command(name = "vchat", version, about)]
struct Cli {
    /// Backend base URL (overrides VCHAT_BACKEND_URL and the config file)
    #[arg(long)]
    backend_url: Option<String>,

    /// Conversation language: en, hi, ta or te
    #[arg(short, long)]
    language: Option<Language>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List supported languages
    Languages,
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Synthesize text through the backend and play it
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,voice_chat=info",
        1 => "info,voice_chat=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?.with_overrides(cli.backend_url, cli.language);
    tracing::debug!(?config, "loaded configuration");

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Languages => {
                println!("{}", terminal::language_table(Some(config.language)));
                Ok(())
            }
            Command::TestMic { duration } => test_mic(&config, duration).await,
            Command::TestTts { text } => test_tts(&config, &text).await,
        };
    }

    let backend = Arc::new(HttpBackend::new(&config.backend_url)?);
    tracing::info!(backend = backend.base_url(), language = %config.language, "starting voice chat");

    let file_name = config.recording_file_name.clone();
    let capture = Capture::select(None, move || -> Box<dyn AudioRecorder> {
        Box::new(MicrophoneRecorder::new(file_name))
    });

    let mut driver = Driver::new(
        config.language,
        backend,
        capture,
        Box::new(SpeakerOutput::new()),
        TerminalView::new(std::io::stdout()),
    );

    println!("{}\n", terminal::HELP);
    driver.start();
    tokio::spawn(terminal::read_commands(driver.sender()));
    driver.run().await;

    Ok(())
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(config: &Config, duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut recorder = MicrophoneRecorder::new(config.recording_file_name.clone());
    recorder.start()?;

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = recorder.peek_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!("[{:2}s] RMS: {energy:.4} | Peak: {peak:.4} | [{meter}]", i + 1);

        recorder.clear_buffer();
    }

    let recording = recorder.stop()?;
    println!("\n---");
    println!(
        "Last second packaged as {} ({} bytes)",
        recording.file_name,
        recording.bytes.len()
    );
    println!("If RMS stayed near 0, check that a microphone is connected and not muted.");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test TTS output via the backend
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let backend = HttpBackend::new(&config.backend_url)?;
    println!("Synthesizing speech...");
    let audio = backend.synthesize_speech(text, config.language).await?;
    println!("Got {} bytes of {}", audio.len(), audio.content_type);

    let decoded = decode(&audio)?;
    println!("Playing audio...");
    tokio::task::spawn_blocking(move || {
        SpeakerOutput::play_blocking(decoded, Arc::new(AtomicBool::new(false)))
    })
    .await??;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");

    Ok(())
}
