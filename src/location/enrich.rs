//! Reverse-geocoding enrichment: turn raw coordinates into a place name.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::timed;
use crate::error::ResolveError;
use crate::providers::GeocodingProvider;
use crate::types::{Coordinates, PlaceName};

/// Upper bound on reverse-geocoding attempts per resolution.
pub const MAX_GEOCODING_ATTEMPTS: usize = 2;

/// What: Ask the geocoders, in order, to name `coordinates`.
///
/// Inputs:
/// - `geocoders`: Primary first; only the first [`MAX_GEOCODING_ATTEMPTS`] are used.
/// - `coordinates`: Position to name.
/// - `budget`: Timeout for each attempt.
///
/// Output:
/// - The first usable place name, or `None` when every attempt failed.
///
/// Details:
/// - A place with no naming field counts as a malformed response and moves on to the
///   next geocoder.
pub(super) async fn reverse_geocode(
    geocoders: &[Arc<dyn GeocodingProvider>],
    coordinates: Coordinates,
    budget: Duration,
) -> Option<PlaceName> {
    for geocoder in geocoders.iter().take(MAX_GEOCODING_ATTEMPTS) {
        let outcome = timed(budget, geocoder.reverse_geocode(coordinates))
            .await
            .and_then(|place| {
                if place.is_empty() {
                    Err(ResolveError::MalformedResponse("empty place name".to_string()))
                } else {
                    Ok(place)
                }
            });
        match outcome {
            Ok(place) => {
                debug!(provider = geocoder.name(), "reverse geocoding succeeded");
                return Some(place);
            }
            Err(e) => {
                warn!(provider = geocoder.name(), kind = e.kind(), error = %e, "reverse geocoding failed");
            }
        }
    }
    None
}
