use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use super::Settings;
use crate::types::Coordinates;

/// What: Check if a line should be skipped (empty or comment).
///
/// Details:
/// - Skips empty lines and lines starting with `#`, `//`, or `;`
fn skip_comment_or_empty(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("//")
        || trimmed.starts_with(';')
}

/// What: Drop a trailing `# ...` or `// ...` comment from a value.
///
/// Details:
/// - `//` inside a URL scheme (`https://`) is kept: only `//` preceded by whitespace
///   starts a comment.
fn strip_inline_comment(s: &str) -> &str {
    let mut end = s.len();
    if let Some(i) = s.find(" //") {
        end = end.min(i);
    }
    if let Some(i) = s.find(" #") {
        end = end.min(i);
    }
    s[..end].trim()
}

/// What: Parse a duration such as `350ms`, `5s`, `30m`, `1h`.
///
/// Output:
/// - `Some(Duration)` on success; bare numbers are milliseconds.
///
/// Details:
/// - Fractional values are accepted (`1.5s`); negative values are rejected.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim().to_ascii_lowercase();
    let (number, unit_nanos) = if let Some(n) = raw.strip_suffix("ms") {
        (n, 1e6)
    } else if let Some(n) = raw.strip_suffix('s') {
        (n, 1e9)
    } else if let Some(n) = raw.strip_suffix('m') {
        (n, 60e9)
    } else if let Some(n) = raw.strip_suffix('h') {
        (n, 3600e9)
    } else {
        (raw.as_str(), 1e6)
    };
    let value: f64 = number.trim().parse().ok()?;
    let nanos = (value * unit_nanos).round();
    if !nanos.is_finite() || nanos < 0.0 || nanos >= u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(nanos as u64))
}

/// Parse `"lat, lon"`.
fn parse_coordinates(raw: &str) -> Option<Coordinates> {
    let (lat, lon) = raw.split_once(',')?;
    let c = Coordinates::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?);
    c.is_valid().then_some(c)
}

/// What: Apply `key = value` lines from settings.conf content onto `settings`.
///
/// Inputs:
/// - `content`: File contents.
/// - `settings`: Settings to update in place.
///
/// Details:
/// - Keys are case-insensitive; `.`, `-` and spaces are treated as `_`.
/// - Unknown keys and unparsable values are logged and ignored, leaving the previous
///   value in place.
pub fn parse_settings(content: &str, settings: &mut Settings) {
    let mut device_lat: Option<f64> = None;
    let mut device_lon: Option<f64> = None;
    for line in content.lines() {
        if skip_comment_or_empty(line) {
            continue;
        }
        let Some((raw_key, raw_val)) = line.trim().split_once('=') else {
            warn!(line, "[Config] ignoring line without '='");
            continue;
        };
        let key = raw_key.trim().to_lowercase().replace(['.', '-', ' '], "_");
        let val = strip_inline_comment(raw_val.trim());
        let ok = match key.as_str() {
            "device_timeout" => set_duration(val, &mut settings.location.device_timeout),
            "geocode_timeout" | "reverse_geocode_timeout" => {
                set_duration(val, &mut settings.location.geocode_timeout)
            }
            "ip_timeout" | "ip_location_timeout" => {
                set_duration(val, &mut settings.location.ip_timeout)
            }
            "location_ttl" | "location_cache_ttl" => {
                set_duration(val, &mut settings.location.cache_ttl)
            }
            "search_debounce" | "debounce" => set_duration(val, &mut settings.search.debounce),
            "search_timeout" | "remote_timeout" => {
                set_duration(val, &mut settings.search.remote_timeout)
            }
            "search_memo_ttl" => set_duration(val, &mut settings.search.memo_ttl),
            "search_min_length" | "min_query_length" => {
                set_usize(val, &mut settings.search.min_query_len)
            }
            "search_memo_capacity" => set_usize(val, &mut settings.search.memo_capacity),
            "search_max_results" | "max_results" => {
                set_usize(val, &mut settings.search.max_results)
            }
            "cache_dir" => {
                settings.cache_dir = (!val.is_empty()).then(|| PathBuf::from(val));
                true
            }
            "device_coordinates" | "device_location" => match parse_coordinates(val) {
                Some(c) => {
                    settings.device_coordinates = Some(c);
                    true
                }
                None => false,
            },
            "device_lat" => val.parse().map(|v| device_lat = Some(v)).is_ok(),
            "device_lon" => val.parse().map(|v| device_lon = Some(v)).is_ok(),
            "reverse_geocode_url" | "geocoder_url" => {
                push_endpoint(val, &mut settings.endpoints.reverse_geocode)
            }
            "reverse_geocode_fallback_url" | "geocoder_fallback_url" => {
                push_endpoint(val, &mut settings.endpoints.reverse_geocode)
            }
            "ip_location_url" | "ip_url" => push_endpoint(val, &mut settings.endpoints.ip_location),
            "ip_location_fallback_url" | "ip_fallback_url" => {
                push_endpoint(val, &mut settings.endpoints.ip_location)
            }
            "destination_search_url" | "search_url" => {
                settings.endpoints.destination_search = (!val.is_empty()).then(|| val.to_string());
                true
            }
            _ => {
                warn!(key = %key, "[Config] unknown setting");
                continue;
            }
        };
        if !ok {
            warn!(key = %key, value = val, "[Config] invalid value; keeping default");
        }
    }
    if let (Some(lat), Some(lon)) = (device_lat, device_lon) {
        let c = Coordinates::new(lat, lon);
        if c.is_valid() {
            settings.device_coordinates = Some(c);
        } else {
            warn!(lat, lon, "[Config] device coordinates out of range");
        }
    }
}

/// Parse a duration into `slot`; `false` when the value is invalid.
fn set_duration(val: &str, slot: &mut Duration) -> bool {
    parse_duration(val).map(|d| *slot = d).is_some()
}

/// Parse a count into `slot`; `false` when the value is invalid.
fn set_usize(val: &str, slot: &mut usize) -> bool {
    val.parse().map(|v| *slot = v).is_ok()
}

/// Append an endpoint in file order; `false` for empty values.
fn push_endpoint(val: &str, list: &mut Vec<String>) -> bool {
    if val.is_empty() {
        return false;
    }
    list.push(val.to_string());
    true
}
