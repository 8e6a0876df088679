//! Runtime settings for the resolvers and the command-line front end.
//!
//! Settings live in a `settings.conf` file of `key = value` lines. Every key is
//! optional; missing or unparsable values keep their defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::types::Coordinates;

mod parse;
mod paths;

pub use parse::{parse_duration, parse_settings};
pub use paths::{cache_dir, config_dir, logs_dir, resolve_settings_config_path};

/// What: Budgets and lifetimes of the location chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationConfig {
    /// Budget for the device position request.
    pub device_timeout: Duration,
    /// Budget for each reverse-geocoding attempt.
    pub geocode_timeout: Duration,
    /// Budget for each IP-geolocation attempt.
    pub ip_timeout: Duration,
    /// How long a resolved location stays fresh.
    pub cache_ttl: Duration,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            device_timeout: Duration::from_secs(10),
            geocode_timeout: Duration::from_secs(5),
            ip_timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(30 * 60),
        }
    }
}

/// What: Timing and limits of the destination search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Quiet period before a query is dispatched.
    pub debounce: Duration,
    /// Queries shorter than this (in characters, after trimming) are not sent.
    pub min_query_len: usize,
    /// Budget for the remote lookup before the static dataset stands in.
    pub remote_timeout: Duration,
    /// Lifetime of memoized remote answers.
    pub memo_ttl: Duration,
    /// Maximum number of memoized queries.
    pub memo_capacity: usize,
    /// Cap on delivered items.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(350),
            min_query_len: 2,
            remote_timeout: Duration::from_secs(5),
            memo_ttl: Duration::from_secs(5 * 60),
            memo_capacity: 128,
            max_results: 20,
        }
    }
}

/// What: Endpoint templates for the HTTP-backed providers.
///
/// Details:
/// - Any missing endpoint simply leaves that step of the chain without a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderEndpoints {
    /// Reverse geocoders in priority order (at most two are used).
    pub reverse_geocode: Vec<String>,
    /// IP-geolocation services in priority order (at most two are used).
    pub ip_location: Vec<String>,
    /// Destination search endpoint.
    pub destination_search: Option<String>,
}

/// What: Everything read from `settings.conf`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// Location chain tuning.
    pub location: LocationConfig,
    /// Search tuning.
    pub search: SearchConfig,
    /// Provider endpoints.
    pub endpoints: ProviderEndpoints,
    /// Overrides the default cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Position reported by the fixed device provider.
    pub device_coordinates: Option<Coordinates>,
}

impl Settings {
    /// What: Directory for durable cache records.
    ///
    /// Details:
    /// - `cache_dir` from the file wins, then `WAYPOINT_CACHE_DIR`, then the XDG default.
    #[must_use]
    pub fn effective_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(cache_dir)
    }
}

/// What: Load settings from an explicit file or the default location.
///
/// Inputs:
/// - `explicit`: Path given on the command line, if any.
///
/// Output:
/// - Parsed settings; defaults when no default file exists.
///
/// # Errors
/// - Returns `Err` when `explicit` is given but cannot be read.
pub fn load(explicit: Option<&Path>) -> io::Result<Settings> {
    let mut settings = Settings::default();
    if let Some(path) = explicit {
        let content = fs::read_to_string(path)?;
        parse_settings(&content, &mut settings);
        info!(path = %path.display(), "[Config] loaded settings");
        return Ok(settings);
    }
    match resolve_settings_config_path() {
        Some(path) => match fs::read_to_string(&path) {
            Ok(content) => {
                parse_settings(&content, &mut settings);
                info!(path = %path.display(), "[Config] loaded settings");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "[Config] unreadable settings; using defaults");
            }
        },
        None => debug!("[Config] no settings.conf found; using defaults"),
    }
    Ok(settings)
}
