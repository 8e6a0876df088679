//! Result ordering shared by remote answers and the offline list.

use std::collections::HashSet;

use crate::types::Destination;

/// How closely a destination matches a query; variants are ordered best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchRank {
    /// Name equals the query.
    ExactName,
    /// Name starts with the query.
    NamePrefix,
    /// Query appears inside the name.
    NameSubstring,
    /// Only the country mentions the query.
    Country,
    /// No textual match (the provider had its own reasons).
    Unmatched,
}

impl MatchRank {
    /// What: Classify `destination` against a normalized query.
    ///
    /// Details:
    /// - Comparison is case-insensitive; an empty query matches nothing.
    #[must_use]
    pub fn of(destination: &Destination, query_lower: &str) -> Self {
        if query_lower.is_empty() {
            return Self::Unmatched;
        }
        let name = destination.name.to_lowercase();
        if name == query_lower {
            Self::ExactName
        } else if name.starts_with(query_lower) {
            Self::NamePrefix
        } else if name.contains(query_lower) {
            Self::NameSubstring
        } else if destination.country.to_lowercase().contains(query_lower) {
            Self::Country
        } else {
            Self::Unmatched
        }
    }
}

/// What: Order, deduplicate and cap a result list.
///
/// Inputs:
/// - `items`: Destinations in source order.
/// - `query_lower`: Normalized query.
/// - `max`: Cap on returned items.
///
/// Output:
/// - Items sorted by [`MatchRank`]; ties keep source order. Later duplicates (same name
///   and country, case-insensitive) are dropped.
pub(super) fn rank_destinations(
    mut items: Vec<Destination>,
    query_lower: &str,
    max: usize,
) -> Vec<Destination> {
    items.sort_by_cached_key(|d| MatchRank::of(d, query_lower));
    let mut seen = HashSet::new();
    items.retain(|d| seen.insert((d.name.to_lowercase(), d.country.to_lowercase())));
    items.truncate(max);
    items
}
