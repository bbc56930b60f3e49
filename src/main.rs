use clap::Parser;
use std::time::Duration;

use frame_grabber::cli::{self, Args, CliError, Command};
use frame_grabber::config::Config;

fn run(args: Args) -> Result<(), CliError> {
    let config = Config::load(args.config.as_deref())?;

    let mut settings = config.grabber_settings();
    if let Some(device) = args.device {
        settings.device_id = device;
    }
    if let Some(path) = args.recent_image {
        settings.snapshot.path = Some(path);
    }

    let grabber = cli::open_grabber(args.backend, settings)?;

    match args.command {
        Command::Snapshot { output, timeout_ms } => {
            cli::run_snapshot(&grabber, &output, timeout_ms.map(Duration::from_millis))
        }
        Command::Watch { interval_ms } => {
            if let Err(e) = cli::setup_ctrlc_handler() {
                log::warn!("Could not install Ctrl+C handler: {}", e);
            }
            cli::run_watch(&grabber, Duration::from_millis(interval_ms))
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
