//! Location resolution: an ordered provider chain that always ends in a usable value.
//!
//! Chain: cached location → device fix (+ reverse geocoding) → IP geolocation
//! (+ reverse geocoding when the IP answer has no city) → `unavailable`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::LocationCache;
use crate::clock::Clock;
use crate::config::LocationConfig;
use crate::error::ResolveError;
use crate::providers::{
    DeviceLocationProvider, GeocodingProvider, IpLocationProvider, ProviderResult,
};
use crate::types::{Coordinates, LOCATION_UNAVAILABLE, LocationResult};

mod enrich;

/// Upper bound on IP-geolocation attempts per resolution.
pub const MAX_IP_ATTEMPTS: usize = 2;
pub use enrich::MAX_GEOCODING_ATTEMPTS;

/// What: The providers a [`LocationResolver`] may consult, in priority order.
///
/// Details:
/// - Only the first [`MAX_GEOCODING_ATTEMPTS`] geocoders and [`MAX_IP_ATTEMPTS`] IP
///   providers are ever tried.
/// - A missing device provider behaves like a denied permission prompt.
#[derive(Clone, Default)]
pub struct LocationProviders {
    /// On-device positioning.
    pub device: Option<Arc<dyn DeviceLocationProvider>>,
    /// Reverse geocoders, primary first.
    pub geocoders: Vec<Arc<dyn GeocodingProvider>>,
    /// IP-geolocation services, primary first.
    pub ip: Vec<Arc<dyn IpLocationProvider>>,
}

/// Per-call switches for [`LocationResolver::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Skip the cache and re-run the provider chain.
    pub force_refresh: bool,
}

/// What: Resolves the user's approximate location through a fallback chain.
///
/// Inputs:
/// - `cache`: Shared last-known-location cache (owned by the composition root).
/// - `providers`: Device, geocoding and IP providers.
/// - `config`: Per-step budgets.
/// - `clock`: Time source for `resolved_at`.
///
/// Details:
/// - Never fails: every failure path ends in a `LocationResult` whose `source` tells the
///   caller how degraded it is.
/// - Concurrent callers share one resolution: a caller that had to wait for another
///   resolution re-checks the cache before touching any provider.
pub struct LocationResolver {
    /// Last known location.
    cache: Arc<LocationCache>,
    /// Provider chain.
    providers: LocationProviders,
    /// Budgets.
    config: LocationConfig,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Serializes provider chains.
    in_flight: tokio::sync::Mutex<()>,
}

impl LocationResolver {
    /// Build a resolver over a shared cache.
    #[must_use]
    pub fn new(
        cache: Arc<LocationCache>,
        providers: LocationProviders,
        config: LocationConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cache,
            providers,
            config,
            clock,
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// The cache this resolver reads and writes.
    #[must_use]
    pub const fn cache(&self) -> &Arc<LocationCache> {
        &self.cache
    }

    /// What: Resolve the current location.
    ///
    /// Inputs:
    /// - `options`: `force_refresh` bypasses the cache.
    ///
    /// Output:
    /// - A cached value (`source = cache`), a fresh resolution, or `unavailable`.
    ///
    /// Details:
    /// - A fresh cache hit performs no provider call.
    /// - Successful fresh resolutions are written back to the cache before returning.
    pub async fn resolve(&self, options: ResolveOptions) -> LocationResult {
        if !options.force_refresh
            && let Some(hit) = self.cached()
        {
            return hit;
        }
        let _guard = self.in_flight.lock().await;
        if !options.force_refresh
            && let Some(hit) = self.cached()
        {
            debug!("resolution finished while waiting; reusing it");
            return hit;
        }
        let result = self.run_chain().await;
        self.cache.put(&result);
        info!(
            source = %result.source(),
            name = result.display_name(),
            "location resolved"
        );
        result
    }

    /// Re-run the provider chain regardless of the cache.
    pub async fn refresh(&self) -> LocationResult {
        self.resolve(ResolveOptions {
            force_refresh: true,
        })
        .await
    }

    /// Forget the cached location.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// Fresh cache hit relabelled as `cache`.
    fn cached(&self) -> Option<LocationResult> {
        let hit = self.cache.get_fresh()?.as_cached();
        debug!(name = hit.display_name(), "location served from cache");
        Some(hit)
    }

    /// Steps 2–5 of the chain.
    async fn run_chain(&self) -> LocationResult {
        if let Some(coordinates) = self.device_fix().await {
            let place = enrich::reverse_geocode(
                &self.providers.geocoders,
                coordinates,
                self.config.geocode_timeout,
            )
            .await;
            let now = self.clock.now();
            return match place {
                Some(place) => LocationResult::from_device(coordinates, place, now),
                None => {
                    debug!(%coordinates, "naming failed; keeping bare coordinates");
                    LocationResult::coords_only(coordinates, now)
                }
            };
        }
        if let Some(result) = self.ip_lookup().await {
            return result;
        }
        warn!("every location provider failed");
        LocationResult::unavailable(LOCATION_UNAVAILABLE, self.clock.now())
    }

    /// What: Ask the device for a fix.
    ///
    /// Output:
    /// - Valid coordinates, or `None` after denial, timeout, garbage or no provider.
    async fn device_fix(&self) -> Option<Coordinates> {
        let Some(device) = self.providers.device.as_ref() else {
            debug!("no device provider; treating as permission denied");
            return None;
        };
        let budget = self.config.device_timeout;
        let outcome = timed(budget, device.current_position(budget))
            .await
            .and_then(|c| {
                if c.is_valid() {
                    Ok(c)
                } else {
                    Err(ResolveError::MalformedResponse(format!(
                        "coordinates out of range: {}, {}",
                        c.lat, c.lon
                    )))
                }
            });
        match outcome {
            Ok(c) => {
                debug!(provider = device.name(), "device fix acquired");
                Some(c)
            }
            Err(e) => {
                warn!(provider = device.name(), kind = e.kind(), error = %e, "device location failed");
                None
            }
        }
    }

    /// What: Try the IP providers in order.
    ///
    /// Details:
    /// - An answer without a city is enriched through the geocoders; enrichment failure
    ///   keeps the IP answer as-is.
    async fn ip_lookup(&self) -> Option<LocationResult> {
        for provider in self.providers.ip.iter().take(MAX_IP_ATTEMPTS) {
            let outcome = timed(self.config.ip_timeout, provider.locate())
                .await
                .and_then(|ip| {
                    if ip.coordinates().is_valid() {
                        Ok(ip)
                    } else {
                        Err(ResolveError::MalformedResponse(
                            "coordinates out of range".to_string(),
                        ))
                    }
                });
            let ip = match outcome {
                Ok(ip) => ip,
                Err(e) => {
                    warn!(provider = provider.name(), kind = e.kind(), error = %e, "IP geolocation failed");
                    continue;
                }
            };
            debug!(provider = provider.name(), "IP location acquired");
            let enrichment = if ip.has_city() {
                None
            } else {
                enrich::reverse_geocode(
                    &self.providers.geocoders,
                    ip.coordinates(),
                    self.config.geocode_timeout,
                )
                .await
            };
            return Some(LocationResult::from_ip(ip, enrichment, self.clock.now()));
        }
        None
    }
}

/// What: Race a provider call against its budget.
///
/// Output:
/// - The provider's own result, or `Timeout(budget)` when the timer wins. The losing
///   provider future is dropped and can no longer report anything.
pub(crate) async fn timed<T>(
    budget: Duration,
    call: impl Future<Output = ProviderResult<T>>,
) -> ProviderResult<T> {
    tokio::time::timeout(budget, call)
        .await
        .unwrap_or(Err(ResolveError::Timeout(budget)))
}
