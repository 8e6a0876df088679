//! Capability interfaces the resolvers consume, plus the implementations shipped with
//! the crate.
//!
//! Every trait is object safe and returns a boxed future, so a composition root can
//! hold heterogeneous providers behind `Arc<dyn ...>` and swap them in tests.

use std::time::Duration;

use futures::future::BoxFuture;

use crate::error::ResolveError;
use crate::types::{Coordinates, Destination, IpLocation, PlaceName};

mod device;
mod http;
mod offline;

pub use device::FixedDeviceLocation;
pub use http::{HttpJsonProvider, shared_client};
pub use offline::OfflineSearch;

/// Result type returned by every provider.
pub type ProviderResult<T> = Result<T, ResolveError>;

/// What: On-device positioning (GPS, OS location service, browser geolocation).
pub trait DeviceLocationProvider: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// What: Ask the device for its current position.
    ///
    /// Inputs:
    /// - `timeout`: Budget the provider should honour; implementations should trade
    ///   precision for latency. The resolver enforces the same budget on its side.
    ///
    /// Output:
    /// - Coordinates, or `PermissionDenied` / `Timeout` / any other failure.
    fn current_position(&self, timeout: Duration) -> BoxFuture<'_, ProviderResult<Coordinates>>;
}

/// What: Coordinates → human-readable place.
pub trait GeocodingProvider: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Resolve a place name for `coordinates`.
    fn reverse_geocode(&self, coordinates: Coordinates) -> BoxFuture<'_, ProviderResult<PlaceName>>;
}

/// What: Approximate position from the caller's public IP (no permission prompt).
pub trait IpLocationProvider: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Locate the current network origin.
    fn locate(&self) -> BoxFuture<'_, ProviderResult<IpLocation>>;
}

/// What: Free-text destination lookup.
pub trait DestinationSearchProvider: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// What: Search destinations for a normalized (trimmed, lower-cased) query.
    ///
    /// Output:
    /// - Matching destinations; an empty list is a valid answer, not an error.
    fn search(&self, query: String) -> BoxFuture<'_, ProviderResult<Vec<Destination>>>;
}
