//! Command-line destination search.

use std::error::Error;
use std::fmt::Write as _;

use waypoint::config::Settings;
use waypoint::types::SearchResult;

use crate::args::utils;

/// What: Run a one-shot destination search and print the results.
///
/// Inputs:
/// - `settings`: Loaded configuration.
/// - `query`: Raw query text.
/// - `json`: Print JSON instead of text.
///
/// # Errors
/// - Returns `Err` only when JSON encoding fails.
///
/// Details:
/// - No debounce: the query is dispatched at once.
pub async fn handle_search(
    settings: &Settings,
    query: &str,
    json: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing::info!(query = %query, "Search mode requested from CLI");
    let resolver = utils::search_resolver(settings);
    let result = resolver.resolve(query).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render(&result));
    }
    Ok(())
}

/// What: Human listing, one destination per line, followed by a source note.
fn render(result: &SearchResult) -> String {
    let mut out = String::new();
    if result.items.is_empty() {
        let _ = writeln!(out, "No destinations found for \"{}\"", result.query);
    }
    for d in &result.items {
        match d.country_code.as_deref() {
            Some(code) => {
                let _ = writeln!(out, "{}, {} ({code})", d.name, d.country);
            }
            None => {
                let _ = writeln!(out, "{}, {}", d.name, d.country);
            }
        }
    }
    let _ = writeln!(out, "[{}]", result.source);
    out
}
