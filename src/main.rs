//! piptui binary entrypoint kept minimal. The full runtime lives in `app`.

use std::sync::OnceLock;

use clap::Parser;

use piptui::app::{self, RunOptions};

/// A terminal front-end for pip: browse installed packages, search the
/// package index, and install, uninstall or update packages.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Log mutating pip commands instead of executing them.
    #[arg(long)]
    dry_run: bool,
    /// Package index base URL (default: https://pypi.org).
    #[arg(long)]
    index_url: Option<String>,
    /// pip executable to use instead of resolving pip3/pip on PATH.
    #[arg(long)]
    pip: Option<String>,
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initialize tracing, writing to `~/.config/piptui/logs/piptui.log` with a
/// stderr fallback when the log file cannot be opened.
fn init_logging() {
    let mut log_path = piptui::theme::logs_dir();
    log_path.push("piptui.log");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(true)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let args = Args::parse();
    tracing::info!(dry_run = args.dry_run, "piptui starting");
    let opts = RunOptions {
        dry_run: args.dry_run,
        index_url: args.index_url,
        pip_command: args.pip,
    };
    if let Err(err) = app::run(opts).await {
        tracing::error!(error = ?err, "application error");
        eprintln!("piptui: {err}");
        std::process::exit(1);
    }
    tracing::info!("piptui exited");
}
