//! Command-line interface for signbridge
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sign language frame streaming for the Speak-Bridge backend
#[derive(Parser, Debug)]
#[command(
    name = "signbridge",
    version,
    about = "Sign language frame streaming for the Speak-Bridge backend"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides config)
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode an image file and stream its recognition tokens to stdout
    Send {
        /// Image file to send (PNG or JPEG)
        image: PathBuf,

        /// Re-encode as PNG instead of JPEG
        #[arg(long)]
        png: bool,
    },

    /// Synthesize speech for text and write the audio bytes
    Speak {
        /// Text to speak
        text: String,

        /// Output file (default: speech.mp3)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the configuration file path
    Path,
}
