use std::{
    ffi::OsString,
    io::{self, IsTerminal},
    process::ExitCode,
};

use anyhow::{bail, Context};
use chrono::Local;
use clap::Parser;
use dirs::{get_log_file, get_program_dir};
use speaker::{NoVoicesAvailable, SessionLogger, SpeechSession, TtsEngine, VoiceCatalog};
use tracing_subscriber::EnvFilter;

mod dirs;

/// Pick an installed voice, type text and hear it spoken.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Append session activity to a daily log file next to the executable
    #[arg(long)]
    logging: bool,
}

/// `-logging` is accepted as a spelling of `--logging`.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            if arg == "-logging" {
                OsString::from("--logging")
            } else {
                arg
            }
        })
        .collect()
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut engine = TtsEngine::new().context("Failed to initialize the speech subsystem")?;
    let catalog =
        VoiceCatalog::load(&mut engine).context("Failed to retrieve the installed voices")?;
    if catalog.is_empty() {
        bail!(NoVoicesAvailable);
    }

    let stdout = io::stdout();
    let logger = if args.logging {
        let dir = get_program_dir();
        let today = Local::now().date_naive();
        tracing::info!(path = %get_log_file(&dir, today).display(), "logging enabled");
        SessionLogger::daily_file(stdout, &dir, today)
    } else {
        SessionLogger::disabled(stdout)
    };

    let session = SpeechSession::start(&catalog, engine, io::stdin().lock(), logger)?;
    let summary = session.run()?;
    tracing::info!(
        voice = %summary.final_voice,
        spoken = summary.spoken,
        failed = summary.failed,
        "session finished"
    );
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse_from(normalize_args(std::env::args_os()));

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
