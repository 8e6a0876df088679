//! Shared utilities for argument processing.

use std::sync::Arc;

use waypoint::cache::{JsonFileStore, LocationCache};
use waypoint::clock::{Clock, SystemClock};
use waypoint::config::Settings;
use waypoint::location::{LocationProviders, LocationResolver};
use waypoint::providers::{
    DestinationSearchProvider, FixedDeviceLocation, GeocodingProvider, HttpJsonProvider,
    IpLocationProvider, OfflineSearch,
};
use waypoint::search::{SearchResolver, StaticDestinations};
use waypoint::sequencer::RequestSequencer;

/// What: Determine the log level based on command-line arguments.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
///
/// Output:
/// - Log level string (trace, debug, info, warn, error).
///
/// Details:
/// - Verbose flag overrides the `log_level` argument.
pub fn determine_log_level(args: &crate::args::Args) -> String {
    if args.verbose {
        "debug".to_string()
    } else {
        args.log_level.clone()
    }
}

/// What: The durable location cache configured in `settings`.
pub fn location_cache(settings: &Settings, clock: Arc<dyn Clock>) -> Arc<LocationCache> {
    let store = JsonFileStore::new(settings.effective_cache_dir());
    Arc::new(LocationCache::new(
        Arc::new(store),
        settings.location.cache_ttl,
        clock,
    ))
}

/// What: Build a location resolver from settings.
///
/// Details:
/// - Endpoints are tried in file order; each HTTP provider gets its step budget as the
///   request timeout so slow sockets are closed, not just abandoned.
pub fn location_resolver(settings: &Settings) -> LocationResolver {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let geocoders = settings
        .endpoints
        .reverse_geocode
        .iter()
        .enumerate()
        .map(|(i, url)| {
            Arc::new(
                HttpJsonProvider::new(format!("geocoder-{}", i + 1), url.as_str())
                    .with_timeout(settings.location.geocode_timeout),
            ) as Arc<dyn GeocodingProvider>
        })
        .collect();
    let ip = settings
        .endpoints
        .ip_location
        .iter()
        .enumerate()
        .map(|(i, url)| {
            Arc::new(
                HttpJsonProvider::new(format!("ip-{}", i + 1), url.as_str())
                    .with_timeout(settings.location.ip_timeout),
            ) as Arc<dyn IpLocationProvider>
        })
        .collect();
    let providers = LocationProviders {
        device: Some(Arc::new(FixedDeviceLocation::new(settings.device_coordinates))),
        geocoders,
        ip,
    };
    LocationResolver::new(
        location_cache(settings, Arc::clone(&clock)),
        providers,
        settings.location.clone(),
        clock,
    )
}

/// What: Build a search resolver from settings.
///
/// Details:
/// - Without a configured endpoint every query is served from the built-in list.
pub fn search_resolver(settings: &Settings) -> SearchResolver {
    let provider: Arc<dyn DestinationSearchProvider> =
        match settings.endpoints.destination_search.as_deref() {
            Some(url) => Arc::new(
                HttpJsonProvider::new("destinations", url)
                    .with_timeout(settings.search.remote_timeout),
            ),
            None => Arc::new(OfflineSearch),
        };
    SearchResolver::new(
        provider,
        StaticDestinations::builtin(),
        Arc::new(RequestSequencer::new()),
        settings.search.clone(),
        Arc::new(SystemClock),
    )
}
