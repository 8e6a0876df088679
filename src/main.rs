//! waypoint binary entrypoint kept minimal. The resolvers live in the library.

mod args;

use std::fmt;
use std::sync::OnceLock;

use clap::Parser;

/// Log timestamp format: local time, second precision.
struct WaypointTimer;

impl tracing_subscriber::fmt::time::FormatTime for WaypointTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let ts = chrono::Local::now()
            .format("%Y-%m-%d-T %H:%M:%S")
            .to_string();
        w.write_str(&ts)
    }
}

/// Keeps the non-blocking log writer flushing until the process exits.
static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// What: Install the tracing subscriber.
///
/// Inputs:
/// - `level`: Fallback filter when `RUST_LOG` is unset.
///
/// Details:
/// - Writes to `<config>/logs/waypoint.log`; falls back to stderr when the file cannot
///   be opened so startup never blocks on logging.
fn init_logging(level: &str) {
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    let mut log_path = waypoint::config::logs_dir();
    log_path.push("waypoint.log");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(WaypointTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            // Fallback: stderr keeps stdout clean for results
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_timer(WaypointTimer)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = args::Args::parse();
    init_logging(&args::determine_log_level(&args));

    tracing::info!("waypoint starting");
    let settings = waypoint::config::load(args.config.as_deref())?;
    if let Err(err) = args::process_args(&args, &settings).await {
        tracing::error!(error = %err, "waypoint failed");
        return Err(err);
    }
    tracing::info!("waypoint exited");
    Ok(())
}
