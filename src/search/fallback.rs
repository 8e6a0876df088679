//! Built-in destination list served when the remote provider is slow or failing.

use crate::types::{Coordinates, Destination};

/// Popular destinations: name, country, ISO code, latitude, longitude.
const BUILTIN: &[(&str, &str, &str, f64, f64)] = &[
    ("Paris", "France", "FR", 48.8566, 2.3522),
    ("London", "United Kingdom", "GB", 51.5074, -0.1278),
    ("New York", "United States", "US", 40.7128, -74.0060),
    ("Tokyo", "Japan", "JP", 35.6762, 139.6503),
    ("Rome", "Italy", "IT", 41.9028, 12.4964),
    ("Barcelona", "Spain", "ES", 41.3874, 2.1686),
    ("Amsterdam", "Netherlands", "NL", 52.3676, 4.9041),
    ("Berlin", "Germany", "DE", 52.5200, 13.4050),
    ("Lisbon", "Portugal", "PT", 38.7223, -9.1393),
    ("Prague", "Czechia", "CZ", 50.0755, 14.4378),
    ("Vienna", "Austria", "AT", 48.2082, 16.3738),
    ("Istanbul", "Turkey", "TR", 41.0082, 28.9784),
    ("Dubai", "United Arab Emirates", "AE", 25.2048, 55.2708),
    ("Singapore", "Singapore", "SG", 1.3521, 103.8198),
    ("Bangkok", "Thailand", "TH", 13.7563, 100.5018),
    ("Bali", "Indonesia", "ID", -8.3405, 115.0920),
    ("Sydney", "Australia", "AU", -33.8688, 151.2093),
    ("Cape Town", "South Africa", "ZA", -33.9249, 18.4241),
    ("Marrakesh", "Morocco", "MA", 31.6295, -7.9811),
    ("Cairo", "Egypt", "EG", 30.0444, 31.2357),
    ("Rio de Janeiro", "Brazil", "BR", -22.9068, -43.1729),
    ("Buenos Aires", "Argentina", "AR", -34.6037, -58.3816),
    ("Mexico City", "Mexico", "MX", 19.4326, -99.1332),
    ("Cancún", "Mexico", "MX", 21.1619, -86.8515),
    ("San Francisco", "United States", "US", 37.7749, -122.4194),
    ("Vancouver", "Canada", "CA", 49.2827, -123.1207),
    ("Reykjavík", "Iceland", "IS", 64.1466, -21.9426),
    ("Kyoto", "Japan", "JP", 35.0116, 135.7681),
    ("Seoul", "South Korea", "KR", 37.5665, 126.9780),
    ("Hanoi", "Vietnam", "VN", 21.0278, 105.8342),
    ("Santorini", "Greece", "GR", 36.3932, 25.4615),
    ("Athens", "Greece", "GR", 37.9838, 23.7275),
    ("Dubrovnik", "Croatia", "HR", 42.6507, 18.0944),
    ("Edinburgh", "United Kingdom", "GB", 55.9533, -3.1883),
    ("Florence", "Italy", "IT", 43.7696, 11.2558),
    ("Venice", "Italy", "IT", 45.4408, 12.3155),
];

/// What: Offline destination list with a substring filter.
///
/// Details:
/// - Order is significant: it breaks ranking ties, so more popular entries come first.
#[derive(Debug, Clone, Default)]
pub struct StaticDestinations {
    /// Entries in popularity order.
    items: Vec<Destination>,
}

impl StaticDestinations {
    /// Use a caller-supplied list.
    #[must_use]
    pub const fn new(items: Vec<Destination>) -> Self {
        Self { items }
    }

    /// The list shipped with the crate.
    #[must_use]
    pub fn builtin() -> Self {
        let items = BUILTIN
            .iter()
            .map(|&(name, country, code, lat, lon)| Destination {
                country_code: Some(code.to_string()),
                coordinates: Some(Coordinates::new(lat, lon)),
                ..Destination::new(name, country)
            })
            .collect();
        Self { items }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// What: Entries whose name or country contains the query.
    ///
    /// Inputs:
    /// - `query_lower`: Normalized (lower-cased) query.
    ///
    /// Output:
    /// - Matching entries in list order; possibly empty.
    #[must_use]
    pub fn filter(&self, query_lower: &str) -> Vec<Destination> {
        self.items
            .iter()
            .filter(|d| {
                d.name.to_lowercase().contains(query_lower)
                    || d.country.to_lowercase().contains(query_lower)
            })
            .cloned()
            .collect()
    }
}
