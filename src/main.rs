use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use signbridge::capture::{EncoderConfig, FrameEncoder, FrameFormat};
use signbridge::cli::{Cli, Commands, ConfigAction};
use signbridge::config::Config;
use signbridge::speak::SpeakClient;
use signbridge::stream::{SessionRegistry, StreamClient, TokenEvent};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.backend_url)?;

    match cli.command {
        Commands::Send { image, png } => run_send(&config, &image, png).await?,
        Commands::Speak { text, output } => run_speak(&config, &text, output).await?,
        Commands::Config { action } => run_config(&config, cli.config.as_deref(), action)?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>, backend_url: Option<String>) -> Result<Config> {
    let path = path
        .map(PathBuf::from)
        .or_else(Config::env_path)
        .unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_default(&path)
        .with_context(|| format!("loading config from {}", path.display()))?
        .with_env_overrides();
    if let Some(url) = backend_url {
        config.backend.base_url = url;
    }
    config.validate()?;
    Ok(config)
}

/// Encodes one image file and streams its recognition tokens to stdout.
async fn run_send(config: &Config, image_path: &Path, png: bool) -> Result<()> {
    let image = image::open(image_path)
        .with_context(|| format!("opening {}", image_path.display()))?
        .to_rgb8();

    let encoder = FrameEncoder::with_config(EncoderConfig {
        max_width: config.capture.max_width,
        max_height: config.capture.max_height,
        format: if png {
            FrameFormat::Png
        } else {
            config.capture.format
        },
        quality: config.capture.quality,
    });
    let encoded = encoder.encode(&image)?;
    eprintln!(
        "Sending {} ({} bytes) to {}",
        encoded.file_name,
        encoded.bytes.len(),
        config.backend.base_url
    );

    let client = StreamClient::new(config.backend.base_url.clone());
    client.upload_snapshot(&encoded).await;

    let mut sessions = SessionRegistry::new();
    let session = sessions.begin();
    let (events_tx, mut events_rx) = mpsc::channel::<TokenEvent>(32);

    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            if event.is_diagnostic() {
                eprintln!("{}", event.display_text().red());
            } else {
                println!("{}", event.display_text());
            }
        }
    });

    let result = client.stream_tokens(&encoded, &session, &events_tx).await;
    drop(events_tx);
    let _ = printer.await;
    result?;
    Ok(())
}

/// Synthesizes speech for text and writes the audio bytes to a file.
async fn run_speak(config: &Config, text: &str, output: Option<PathBuf>) -> Result<()> {
    let client = SpeakClient::new(config.backend.base_url.clone());
    let audio = client.speak(text).await?;
    let path = output.unwrap_or_else(|| PathBuf::from("speech.mp3"));
    std::fs::write(&path, &audio)
        .with_context(|| format!("writing {}", path.display()))?;
    eprintln!("Wrote {} bytes to {}", audio.len(), path.display());
    Ok(())
}

fn run_config(config: &Config, path: Option<&Path>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigAction::Path => {
            let path = path
                .map(PathBuf::from)
                .or_else(Config::env_path)
                .unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
