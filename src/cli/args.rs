//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::Backend;

/// Grab frames from a webcam as if it were a still camera
#[derive(Parser, Debug)]
#[command(name = "frame-grabber")]
#[command(version, about = "Still-camera style webcam frame grabber", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Camera device index (overrides the config file)
    #[arg(long, short)]
    pub device: Option<u32>,

    /// Camera backend
    #[arg(long, short, default_value = "native")]
    pub backend: Backend,

    /// Debug snapshot path (overrides `recent_image` in the config file)
    #[arg(long)]
    pub recent_image: Option<PathBuf>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read one frame and save it
    Snapshot {
        /// Output image file (format from extension)
        #[arg(short, long, default_value = "snapshot.png")]
        output: PathBuf,

        /// Give up after this many milliseconds (default: wait forever)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Read frames continuously until Ctrl+C
    Watch {
        /// Delay between reads in milliseconds
        #[arg(long, default_value = "1000")]
        interval_ms: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults() {
        let args = Args::try_parse_from(["frame-grabber", "snapshot"]).unwrap();
        assert_eq!(args.backend, Backend::Native);
        assert!(args.device.is_none());
        match args.command {
            Command::Snapshot { output, timeout_ms } => {
                assert_eq!(output, PathBuf::from("snapshot.png"));
                assert!(timeout_ms.is_none());
            }
            other => panic!("Expected Snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_watch_with_global_options() {
        let args = Args::try_parse_from([
            "frame-grabber",
            "--device",
            "2",
            "--backend",
            "test-pattern",
            "watch",
            "--interval-ms",
            "250",
        ])
        .unwrap();
        assert_eq!(args.device, Some(2));
        assert_eq!(args.backend, Backend::TestPattern);
        assert!(matches!(args.command, Command::Watch { interval_ms: 250 }));
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Args::try_parse_from(["frame-grabber"]).is_err());
    }
}
