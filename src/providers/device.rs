use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};

use super::{DeviceLocationProvider, ProviderResult};
use crate::error::ResolveError;
use crate::types::Coordinates;

/// What: Device provider for hosts without a positioning sensor.
///
/// Details:
/// - Answers with the configured coordinates immediately.
/// - With no coordinates configured it behaves like a user who declined the prompt
///   (`PermissionDenied`), which sends the chain on to IP geolocation.
#[derive(Debug, Clone, Default)]
pub struct FixedDeviceLocation {
    /// Position to report, if the user configured one.
    coordinates: Option<Coordinates>,
}

impl FixedDeviceLocation {
    /// Report `coordinates` (or deny access when `None`).
    #[must_use]
    pub const fn new(coordinates: Option<Coordinates>) -> Self {
        Self { coordinates }
    }
}

impl DeviceLocationProvider for FixedDeviceLocation {
    fn name(&self) -> &str {
        "fixed"
    }

    fn current_position(&self, _timeout: Duration) -> BoxFuture<'_, ProviderResult<Coordinates>> {
        future::ready(self.coordinates.ok_or(ResolveError::PermissionDenied)).boxed()
    }
}
