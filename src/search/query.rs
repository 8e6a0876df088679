//! Input normalization applied before debouncing, memo lookups and provider calls.

/// What: Normalize raw user input into the form sent to providers and memo keys.
///
/// Output:
/// - Input trimmed and lower-cased.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// What: Check whether a normalized query is long enough to dispatch.
///
/// Details:
/// - Counts characters, not bytes, so `"zü"` has length 2.
#[must_use]
pub fn meets_min_length(normalized: &str, min_len: usize) -> bool {
    normalized.chars().count() >= min_len
}
