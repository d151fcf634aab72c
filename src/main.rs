//! Tilde - a small terminal text editor

use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tilde::app::{CliArgs, Config};
use tilde::session::{EditorSession, SessionOptions, SessionResult};
use tilde::terminal::UnixTerminal;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let (config, skipped) = match Config::load_with_args(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = init_logging(&config) {
        eprintln!("Failed to open log file: {}", e);
        return ExitCode::FAILURE;
    }

    // Still in cooked mode, so stderr is readable
    if let Some(skipped) = &skipped {
        warn!("{}", skipped);
        eprintln!("{}", skipped);
    }

    info!("Tilde starting");

    match run(&args, &config) {
        Ok(()) => {
            info!("Tilde exited");
            ExitCode::SUCCESS
        },
        Err(e) => {
            // The session has been dropped by now, so the terminal is cooked again
            error!("Fatal error: {}", e);
            eprintln!("tilde: {}", e);
            ExitCode::FAILURE
        },
    }
}

/// Log to the configured file; the terminal itself belongs to the editor
fn init_logging(config: &Config) -> std::io::Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = File::options().create(true).append(true).open(path)?;

    let default_filter = config.log_filter.as_deref().unwrap_or("info");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn run(args: &CliArgs, config: &Config) -> SessionResult<()> {
    let mut session = EditorSession::new(UnixTerminal::new(), SessionOptions::from(config))?;

    if let Some(path) = &args.file {
        session.open_buffer_from_path(path)?;
        if let Some(line) = args.line {
            session.move_cursor_to_line(line)?;
        }
    }

    session.run()?;
    session.finish()
}
