//! Command-line arguments for the headless player.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect sprite-sheet animations and play scripted requests against them.
#[derive(Parser)]
#[command(name = "tileclip_player")]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Playback policy JSON (direction fallback, idle name, held clips...)
    #[arg(long, global = true)]
    pub policy: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List every clip of a sheet with its resolved frames and timing
    Inspect {
        /// Tiled JSON tileset
        sheet: PathBuf,
    },

    /// Run a request script against a sheet and print the frame trace
    Play {
        /// Tiled JSON tileset
        sheet: PathBuf,

        /// Request script JSON
        script: PathBuf,

        /// Emit one JSON object per line instead of text
        #[arg(long)]
        json: bool,
    },
}
