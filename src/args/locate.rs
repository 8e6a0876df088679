//! Command-line location lookup.

use std::error::Error;

use waypoint::config::Settings;
use waypoint::location::ResolveOptions;
use waypoint::types::LocationResult;

use crate::args::utils;

/// What: Resolve the current location and print it.
///
/// Inputs:
/// - `settings`: Loaded configuration.
/// - `refresh`: Skip the cache.
/// - `json`: Print JSON instead of text.
///
/// # Errors
/// - Returns `Err` only when JSON encoding fails; resolution itself never fails.
pub async fn handle_locate(
    settings: &Settings,
    refresh: bool,
    json: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing::info!(refresh, "Location requested from CLI");
    let resolver = utils::location_resolver(settings);
    let result = resolver
        .resolve(ResolveOptions {
            force_refresh: refresh,
        })
        .await;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render(&result));
    }
    Ok(())
}

/// What: One-line human summary of a location.
///
/// Output:
/// - `"<name> (<coordinates>) [<source>]"`; the coordinates part is omitted when absent.
fn render(result: &LocationResult) -> String {
    match result.coordinates() {
        Some(c) => format!("{} ({c}) [{}]", result.display_name(), result.source()),
        None => format!("{} [{}]", result.display_name(), result.source()),
    }
}
