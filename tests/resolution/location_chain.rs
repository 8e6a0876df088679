//! Location chain: cache short-circuit, fallbacks, total failure, refresh, single flight.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use waypoint::cache::{LocationCache, MemoryStore};
use waypoint::clock::{Clock, ManualClock};
use waypoint::config::LocationConfig;
use waypoint::error::ResolveError;
use waypoint::location::{LocationProviders, LocationResolver, ResolveOptions};
use waypoint::providers::{DeviceLocationProvider, GeocodingProvider, IpLocationProvider};
use waypoint::types::{
    Coordinates, IpLocation, LOCATION_UNAVAILABLE, LocationResult, LocationSource, PlaceName,
};

use crate::common::{Delay, Scripted, city, ip_answer};

const PARIS: Coordinates = Coordinates::new(48.8566, 2.3522);
const LYON: Coordinates = Coordinates::new(45.764, 4.8357);

/// Resolver plus the pieces tests inspect.
struct Fixture {
    /// System under test.
    resolver: LocationResolver,
    /// Durable layer behind the cache.
    store: Arc<MemoryStore>,
    /// Clock driving cache expiry.
    clock: Arc<ManualClock>,
}

fn start_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_780_000_000, 0).expect("valid timestamp")
}

fn cache_over(store: &Arc<MemoryStore>, clock: &Arc<ManualClock>) -> Arc<LocationCache> {
    Arc::new(LocationCache::new(
        store.clone(),
        LocationConfig::default().cache_ttl,
        clock.clone(),
    ))
}

fn fixture_with(
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
    providers: LocationProviders,
) -> Fixture {
    let resolver = LocationResolver::new(
        cache_over(&store, &clock),
        providers,
        LocationConfig::default(),
        clock.clone(),
    );
    Fixture {
        resolver,
        store,
        clock,
    }
}

fn fixture(providers: LocationProviders) -> Fixture {
    fixture_with(
        Arc::new(MemoryStore::new()),
        Arc::new(ManualClock::new(start_time())),
        providers,
    )
}

fn providers(
    device: &Arc<Scripted<Coordinates>>,
    geocoders: &[&Arc<Scripted<PlaceName>>],
    ip: &[&Arc<Scripted<IpLocation>>],
) -> LocationProviders {
    LocationProviders {
        device: Some(Arc::clone(device) as Arc<dyn DeviceLocationProvider>),
        geocoders: geocoders
            .iter()
            .map(|g| Arc::clone(g) as Arc<dyn GeocodingProvider>)
            .collect(),
        ip: ip
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn IpLocationProvider>)
            .collect(),
    }
}

#[tokio::test(start_paused = true)]
/// What: A fresh durable record answers without touching any provider.
///
/// Inputs:
/// - Record written by an earlier process (separate cache instance, same store).
///
/// Output:
/// - `source = cache`, same name and coordinates, zero provider calls.
async fn fresh_cache_short_circuits_providers() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let earlier = LocationResult::from_device(PARIS, city("Paris"), clock.now());
    cache_over(&store, &clock).put(&earlier);
    clock.advance(chrono::Duration::minutes(10));

    let device = Scripted::ok("device", LYON);
    let geocoder = Scripted::ok("geo", city("Lyon"));
    let ip = Scripted::ok("ip", ip_answer(LYON, Some("Lyon")));
    let f = fixture_with(store, clock, providers(&device, &[&geocoder], &[&ip]));

    let result = f.resolver.resolve(ResolveOptions::default()).await;
    assert_eq!(result.source(), LocationSource::Cache);
    assert_eq!(result.display_name(), earlier.display_name());
    assert_eq!(result.coordinates(), Some(PARIS));
    assert_eq!(result.resolved_at(), earlier.resolved_at());
    assert_eq!(device.calls() + geocoder.calls() + ip.calls(), 0);
}

#[tokio::test(start_paused = true)]
/// What: Device timeout, city-less IP answer, failing primary and working secondary
/// geocoder still yield a named IP location.
///
/// Output:
/// - `ip_geolocation` carrying the secondary geocoder's city; the result is cached.
async fn device_timeout_then_enriched_ip() {
    let device = Scripted::new("device", Ok(PARIS), Delay::Never);
    let primary = Scripted::err("geo-1", ResolveError::Network("HTTP 502".into()));
    let secondary = Scripted::ok("geo-2", city("Lyon"));
    let ip = Scripted::ok("ip", ip_answer(LYON, None));
    let f = fixture(providers(&device, &[&primary, &secondary], &[&ip]));

    let started = tokio::time::Instant::now();
    let result = f.resolver.resolve(ResolveOptions::default()).await;
    assert!(started.elapsed() >= LocationConfig::default().device_timeout);
    assert_eq!(result.source(), LocationSource::IpGeolocation);
    assert_eq!(result.city(), Some("Lyon"));
    assert_eq!(result.display_name(), "Lyon, France");
    assert_eq!(result.coordinates(), Some(LYON));
    assert_eq!((primary.calls(), secondary.calls()), (1, 1));
    assert!(!f.store.is_empty());
}

#[tokio::test(start_paused = true)]
/// What: A device fix is named by the secondary geocoder when the primary hangs.
///
/// Output:
/// - `device_geolocation` with the secondary's city, reached after the geocode budget.
async fn device_fix_named_by_secondary_geocoder() {
    let device = Scripted::ok("device", PARIS);
    let primary = Scripted::new("geo-1", Ok(city("Never")), Delay::Never);
    let secondary = Scripted::ok("geo-2", city("Paris"));
    let ip = Scripted::ok("ip", ip_answer(LYON, Some("Lyon")));
    let f = fixture(providers(&device, &[&primary, &secondary], &[&ip]));

    let result = f.resolver.resolve(ResolveOptions::default()).await;
    assert_eq!(result.source(), LocationSource::DeviceGeolocation);
    assert_eq!(result.city(), Some("Paris"));
    assert_eq!(result.coordinates(), Some(PARIS));
    assert_eq!(ip.calls(), 0);
}

#[tokio::test(start_paused = true)]
/// What: When everything fails the resolver returns `unavailable` and caches nothing.
///
/// Inputs:
/// - Denied device, two failing IP providers and a third that must never be asked.
///
/// Output:
/// - One `unavailable` result without coordinates or city; store untouched.
async fn total_failure_is_unavailable_and_uncached() {
    let device = Scripted::err("device", ResolveError::PermissionDenied);
    let ip1 = Scripted::err("ip-1", ResolveError::Network("connection refused".into()));
    let ip2 = Scripted::new("ip-2", Ok(ip_answer(LYON, None)), Delay::Never);
    let ip3 = Scripted::ok("ip-3", ip_answer(LYON, Some("Lyon")));
    let f = fixture(providers(&device, &[], &[&ip1, &ip2, &ip3]));

    let result = f.resolver.resolve(ResolveOptions::default()).await;
    assert_eq!(result.source(), LocationSource::Unavailable);
    assert_eq!(result.display_name(), LOCATION_UNAVAILABLE);
    assert_eq!(result.coordinates(), None);
    assert_eq!(result.city(), None);
    assert_eq!(ip3.calls(), 0);
    assert!(f.store.is_empty());
}

#[tokio::test(start_paused = true)]
/// What: When the first IP provider fails, the alternate one answers.
///
/// Output:
/// - `ip_geolocation` from `ip-2`; each IP provider asked exactly once.
async fn alternate_ip_provider_answers() {
    let device = Scripted::err("device", ResolveError::PermissionDenied);
    let ip1 = Scripted::err("ip-1", ResolveError::Network("HTTP 503".into()));
    let ip2 = Scripted::ok("ip-2", ip_answer(LYON, Some("Lyon")));
    let f = fixture(providers(&device, &[], &[&ip1, &ip2]));

    let result = f.resolver.resolve(ResolveOptions::default()).await;
    assert_eq!(result.source(), LocationSource::IpGeolocation);
    assert_eq!(result.city(), Some("Lyon"));
    assert_eq!(result.display_name(), "Lyon, France");
    assert_eq!(result.coordinates(), Some(LYON));
    assert_eq!((ip1.calls(), ip2.calls()), (1, 1));
    assert_eq!(f.store.len(), 1);
}

#[tokio::test(start_paused = true)]
/// What: Out-of-range device coordinates count as a failure and fall through to IP.
async fn garbage_device_fix_falls_through() {
    let device = Scripted::ok("device", Coordinates::new(123.0, 500.0));
    let ip = Scripted::ok("ip", ip_answer(LYON, Some("Lyon")));
    let f = fixture(providers(&device, &[], &[&ip]));

    let result = f.resolver.resolve(ResolveOptions::default()).await;
    assert_eq!(result.source(), LocationSource::IpGeolocation);
    assert_eq!(result.city(), Some("Lyon"));
}

#[tokio::test(start_paused = true)]
/// What: Coordinate-only results are cached; refresh and expiry re-run the chain.
///
/// Inputs:
/// - Device fix with no geocoders configured.
///
/// Output:
/// - First call `coords_only`, second served from cache, refresh and post-TTL calls
///   ask the device again.
async fn refresh_and_expiry_bypass_cache() {
    let device = Scripted::ok("device", PARIS);
    let f = fixture(providers(&device, &[], &[]));

    let first = f.resolver.resolve(ResolveOptions::default()).await;
    assert_eq!(first.source(), LocationSource::CoordsOnly);
    assert_eq!(first.display_name(), "48.86, 2.35");

    let second = f.resolver.resolve(ResolveOptions::default()).await;
    assert_eq!(second.source(), LocationSource::Cache);
    assert_eq!(device.calls(), 1);

    let refreshed = f.resolver.refresh().await;
    assert_eq!(refreshed.source(), LocationSource::CoordsOnly);
    assert_eq!(device.calls(), 2);

    f.clock.advance(chrono::Duration::minutes(31));
    let expired = f.resolver.resolve(ResolveOptions::default()).await;
    assert_eq!(expired.source(), LocationSource::CoordsOnly);
    assert_eq!(device.calls(), 3);
}

#[tokio::test(start_paused = true)]
/// What: Invalidation forgets both layers.
async fn invalidate_forgets_location() {
    let device = Scripted::ok("device", PARIS);
    let f = fixture(providers(&device, &[], &[]));
    let _ = f.resolver.resolve(ResolveOptions::default()).await;
    f.resolver.invalidate();
    assert!(f.store.is_empty());
    let again = f.resolver.resolve(ResolveOptions::default()).await;
    assert_eq!(again.source(), LocationSource::CoordsOnly);
    assert_eq!(device.calls(), 2);
}

#[tokio::test(start_paused = true)]
/// What: Concurrent resolutions share a single provider chain.
///
/// Output:
/// - One device call; the waiting caller gets the same location from cache.
async fn concurrent_callers_share_one_chain() {
    let device = Scripted::new("device", Ok(PARIS), Delay::After(Duration::from_secs(1)));
    let geocoder = Scripted::ok("geo", city("Paris"));
    let f = fixture(providers(&device, &[&geocoder], &[]));

    let (a, b) = tokio::join!(
        f.resolver.resolve(ResolveOptions::default()),
        f.resolver.resolve(ResolveOptions::default())
    );
    assert_eq!(device.calls(), 1);
    assert_eq!(a.display_name(), b.display_name());
    let mut sources = [a.source(), b.source()];
    sources.sort_by_key(|s| s.as_str());
    assert_eq!(
        sources,
        [LocationSource::Cache, LocationSource::DeviceGeolocation]
    );
}
