//! Command-line argument definition and processing.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use waypoint::config::Settings;

/// waypoint - Find out where you are and where you could go
#[derive(Parser, Debug)]
#[command(name = "waypoint")]
#[command(version)]
#[command(about = "Resolve your approximate location and search travel destinations", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Args {
    /// Print the resolved location (default when no other action is given)
    #[arg(short = 'l', long)]
    pub locate: bool,

    /// Ignore the cached location and resolve again (implies --locate)
    #[arg(short = 'y', long)]
    pub refresh: bool,

    /// Search destinations matching QUERY
    #[arg(short, long, value_name = "QUERY")]
    pub search: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Remove the cached location and exit
    #[arg(long)]
    pub clear_cache: bool,

    /// Read settings from PATH instead of ~/.config/waypoint/settings.conf
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long)]
    pub verbose: bool,
}

/// What: Run the actions requested on the command line.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
/// - `settings`: Loaded configuration.
///
/// Output:
/// - `Ok(())` once every requested action has printed its output.
///
/// # Errors
/// - Returns `Err` when the cache record cannot be removed or output cannot be encoded.
///
/// Details:
/// - `--clear-cache` runs first and exits on its own.
/// - Location runs before search when both are requested; with no action flag the
///   location is printed.
pub async fn process_args(
    args: &Args,
    settings: &Settings,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    use crate::args::{cache, locate, search};

    // Handle clear cache flag
    if args.clear_cache {
        return cache::handle_clear_cache(settings).map_err(Into::into);
    }

    let wants_location = args.locate || args.refresh || args.search.is_none();
    if wants_location {
        locate::handle_locate(settings, args.refresh, args.json).await?;
    }

    // Handle command-line search mode
    if let Some(query) = &args.search {
        search::handle_search(settings, query, args.json).await?;
    }
    Ok(())
}
