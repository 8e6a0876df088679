//! Value types produced and consumed by the resolution pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Human-readable reason carried by an `unavailable` location.
pub const LOCATION_UNAVAILABLE: &str = "Location unavailable";

/// What: A latitude/longitude pair in decimal degrees.
///
/// Details:
/// - Providers may hand back garbage (NaN, swapped axes); use [`Coordinates::is_valid`]
///   before trusting a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, `-90..=90`.
    pub lat: f64,
    /// Longitude in degrees, `-180..=180`.
    pub lon: f64,
}

impl Coordinates {
    /// Build a coordinate pair without validation.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// What: Check that both axes are finite and inside their ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}, {:.2}", self.lat, self.lon)
    }
}

/// Which step of the location chain produced a [`LocationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    /// Served from the last-known-location cache.
    Cache,
    /// Device fix, enriched with a place name.
    DeviceGeolocation,
    /// IP-based lookup.
    IpGeolocation,
    /// Device fix whose naming failed; only coordinates are known.
    CoordsOnly,
    /// Every provider failed.
    Unavailable,
}

impl LocationSource {
    /// What: `true` when the value came from a degraded path callers may want to flag.
    #[must_use]
    pub const fn is_degraded(self) -> bool {
        matches!(self, Self::CoordsOnly | Self::Unavailable)
    }

    /// Stable lowercase label, identical to the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::DeviceGeolocation => "device_geolocation",
            Self::IpGeolocation => "ip_geolocation",
            Self::CoordsOnly => "coords_only",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What: A human-readable place returned by a reverse geocoder.
///
/// Details:
/// - A value with every field empty is unusable; see [`PlaceName::is_empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceName {
    /// Full label chosen by the provider, if any.
    #[serde(default)]
    pub display_name: Option<String>,
    /// City, town or village.
    #[serde(default)]
    pub city: Option<String>,
    /// State, province or region.
    #[serde(default)]
    pub region: Option<String>,
    /// Country name.
    #[serde(default, alias = "country_name")]
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2 code.
    #[serde(default)]
    pub country_code: Option<String>,
}

impl PlaceName {
    /// `true` when no naming field carries text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.display_name,
            &self.city,
            &self.region,
            &self.country,
            &self.country_code,
        ]
        .iter()
        .all(|f| non_blank(f.as_deref()).is_none())
    }
}

/// What: Answer of an IP-geolocation provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpLocation {
    /// City, when the provider knows it.
    #[serde(default)]
    pub city: Option<String>,
    /// Region, when the provider knows it.
    #[serde(default)]
    pub region: Option<String>,
    /// Country name.
    #[serde(default, alias = "country_name")]
    pub country: Option<String>,
    /// ISO country code.
    #[serde(default)]
    pub country_code: Option<String>,
    /// Latitude in degrees.
    #[serde(alias = "latitude")]
    pub lat: f64,
    /// Longitude in degrees.
    #[serde(alias = "longitude")]
    pub lon: f64,
}

impl IpLocation {
    /// Coordinates of the lookup.
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }

    /// `true` when the answer already names a city.
    #[must_use]
    pub fn has_city(&self) -> bool {
        non_blank(self.city.as_deref()).is_some()
    }
}

/// What: Normalized outcome of one location resolution.
///
/// Details:
/// - Built through the named constructors, which keep the invariant that an
///   `unavailable` value has neither coordinates nor a city. Deserialized values skip
///   them; the location cache refuses stored `unavailable` and `cache` records.
/// - Never mutated after construction; [`LocationResult::as_cached`] returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    /// Label to show the user.
    display_name: String,
    /// City, if known.
    city: Option<String>,
    /// Region, if known.
    region: Option<String>,
    /// Country, if known.
    country: Option<String>,
    /// Country code, if known.
    country_code: Option<String>,
    /// Position, if known.
    coordinates: Option<Coordinates>,
    /// Chain step that produced the value.
    source: LocationSource,
    /// When the resolution finished.
    resolved_at: DateTime<Utc>,
}

impl LocationResult {
    /// What: Terminal value when every provider failed.
    ///
    /// Inputs:
    /// - `reason`: Text shown in place of a location name.
    /// - `at`: Resolution timestamp.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            display_name: reason.into(),
            city: None,
            region: None,
            country: None,
            country_code: None,
            coordinates: None,
            source: LocationSource::Unavailable,
            resolved_at: at,
        }
    }

    /// What: Device fix that could not be named; labelled with its coordinates.
    #[must_use]
    pub fn coords_only(coordinates: Coordinates, at: DateTime<Utc>) -> Self {
        Self {
            display_name: coordinates.to_string(),
            city: None,
            region: None,
            country: None,
            country_code: None,
            coordinates: Some(coordinates),
            source: LocationSource::CoordsOnly,
            resolved_at: at,
        }
    }

    /// What: Device fix enriched with a reverse-geocoded place.
    #[must_use]
    pub fn from_device(coordinates: Coordinates, place: PlaceName, at: DateTime<Utc>) -> Self {
        let city = owned_non_blank(place.city);
        let region = owned_non_blank(place.region);
        let country = owned_non_blank(place.country);
        let display_name = owned_non_blank(place.display_name)
            .or_else(|| compose_label(city.as_deref(), region.as_deref(), country.as_deref()))
            .unwrap_or_else(|| coordinates.to_string());
        Self {
            display_name,
            city,
            region,
            country,
            country_code: owned_non_blank(place.country_code),
            coordinates: Some(coordinates),
            source: LocationSource::DeviceGeolocation,
            resolved_at: at,
        }
    }

    /// What: IP lookup, optionally completed by a reverse-geocoded place.
    ///
    /// Inputs:
    /// - `ip`: Provider answer; its own fields win over the enrichment.
    /// - `enrichment`: Place found for the IP coordinates, if any.
    /// - `at`: Resolution timestamp.
    #[must_use]
    pub fn from_ip(ip: IpLocation, enrichment: Option<PlaceName>, at: DateTime<Utc>) -> Self {
        let coordinates = ip.coordinates();
        let place = enrichment.unwrap_or_default();
        let city = owned_non_blank(ip.city).or_else(|| owned_non_blank(place.city));
        let region = owned_non_blank(ip.region).or_else(|| owned_non_blank(place.region));
        let country = owned_non_blank(ip.country).or_else(|| owned_non_blank(place.country));
        let country_code =
            owned_non_blank(ip.country_code).or_else(|| owned_non_blank(place.country_code));
        let display_name = compose_label(city.as_deref(), region.as_deref(), country.as_deref())
            .or_else(|| owned_non_blank(place.display_name))
            .unwrap_or_else(|| coordinates.to_string());
        Self {
            display_name,
            city,
            region,
            country,
            country_code,
            coordinates: Some(coordinates),
            source: LocationSource::IpGeolocation,
            resolved_at: at,
        }
    }

    /// What: Copy of this value re-labelled as served from cache.
    ///
    /// Details:
    /// - Name, place fields, coordinates and `resolved_at` are kept verbatim.
    #[must_use]
    pub fn as_cached(&self) -> Self {
        Self {
            source: LocationSource::Cache,
            ..self.clone()
        }
    }

    /// Label to show the user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// City, if known.
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Region, if known.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Country, if known.
    #[must_use]
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Country code, if known.
    #[must_use]
    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    /// Position, if known.
    #[must_use]
    pub const fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    /// Chain step that produced the value.
    #[must_use]
    pub const fn source(&self) -> LocationSource {
        self.source
    }

    /// When the resolution finished.
    #[must_use]
    pub const fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }
}

/// What: A destination offered by search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Destination name (city, region or landmark).
    pub name: String,
    /// Country the destination belongs to.
    #[serde(default, alias = "country_name")]
    pub country: String,
    /// ISO country code.
    #[serde(default)]
    pub country_code: Option<String>,
    /// Position, if the provider supplies one.
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Short blurb.
    #[serde(default)]
    pub description: Option<String>,
}

impl Destination {
    /// Build a destination with only a name and country.
    #[must_use]
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            country_code: None,
            coordinates: None,
            description: None,
        }
    }
}

/// Where the items of a [`SearchResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    /// The remote destination provider answered in time.
    Remote,
    /// The built-in dataset stood in for a slow or failing provider.
    StaticFallback,
}

impl fmt::Display for SearchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Remote => "remote",
            Self::StaticFallback => "static_fallback",
        })
    }
}

/// What: A normalized query stamped with the sequence id it was dispatched under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Trimmed, lower-cased query text.
    pub text: String,
    /// Token from the request sequencer.
    pub sequence_id: u64,
}

/// What: Result set for one dispatched query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Sequence id of the query that produced this set.
    pub sequence_id: u64,
    /// Normalized query text.
    pub query: String,
    /// Ranked destinations; may be empty.
    pub items: Vec<Destination>,
    /// Origin of `items`.
    pub source: SearchSource,
}

/// Return the trimmed text when it is not blank.
fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Owned variant of [`non_blank`].
fn owned_non_blank(s: Option<String>) -> Option<String> {
    non_blank(s.as_deref()).map(ToString::to_string)
}

/// What: Build "City, Country" style labels.
///
/// Details:
/// - Uses the city, falling back to the region, and appends the country when it differs.
fn compose_label(city: Option<&str>, region: Option<&str>, country: Option<&str>) -> Option<String> {
    let locality = city.or(region);
    match (locality, country) {
        (Some(l), Some(c)) if !l.eq_ignore_ascii_case(c) => Some(format!("{l}, {c}")),
        (Some(l), _) => Some(l.to_string()),
        (None, Some(c)) => Some(c.to_string()),
        (None, None) => None,
    }
}
