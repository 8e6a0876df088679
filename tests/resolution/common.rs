//! Scripted providers shared by the resolution tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use waypoint::error::ResolveError;
use waypoint::providers::{
    DestinationSearchProvider, DeviceLocationProvider, GeocodingProvider, IpLocationProvider,
    ProviderResult,
};
use waypoint::types::{Coordinates, Destination, IpLocation, PlaceName};

/// When a scripted provider answers.
#[derive(Debug, Clone, Copy)]
pub enum Delay {
    /// After the given (virtual) time.
    After(Duration),
    /// Never.
    Never,
}

/// What: Provider that answers with a fixed outcome after a scripted delay and counts
/// its calls.
pub struct Scripted<T> {
    /// Name used in logs.
    name: &'static str,
    /// Outcome to return.
    outcome: ProviderResult<T>,
    /// When to answer.
    delay: Delay,
    /// Calls received.
    calls: AtomicUsize,
}

impl<T: Clone + Send + 'static> Scripted<T> {
    /// Answer immediately.
    pub fn ok(name: &'static str, value: T) -> Arc<Self> {
        Self::new(name, Ok(value), Delay::After(Duration::ZERO))
    }

    /// Fail immediately.
    pub fn err(name: &'static str, error: ResolveError) -> Arc<Self> {
        Self::new(name, Err(error), Delay::After(Duration::ZERO))
    }

    /// Full control.
    pub fn new(name: &'static str, outcome: ProviderResult<T>, delay: Delay) -> Arc<Self> {
        Arc::new(Self {
            name,
            outcome,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    /// Calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Count the call and produce the scripted answer.
    fn answer(&self) -> BoxFuture<'_, ProviderResult<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.clone();
        let delay = self.delay;
        async move {
            match delay {
                Delay::After(d) => tokio::time::sleep(d).await,
                Delay::Never => futures::future::pending::<()>().await,
            }
            outcome
        }
        .boxed()
    }
}

impl DeviceLocationProvider for Scripted<Coordinates> {
    fn name(&self) -> &str {
        self.name
    }

    fn current_position(&self, _timeout: Duration) -> BoxFuture<'_, ProviderResult<Coordinates>> {
        self.answer()
    }
}

impl GeocodingProvider for Scripted<PlaceName> {
    fn name(&self) -> &str {
        self.name
    }

    fn reverse_geocode(&self, _coordinates: Coordinates) -> BoxFuture<'_, ProviderResult<PlaceName>> {
        self.answer()
    }
}

impl IpLocationProvider for Scripted<IpLocation> {
    fn name(&self) -> &str {
        self.name
    }

    fn locate(&self) -> BoxFuture<'_, ProviderResult<IpLocation>> {
        self.answer()
    }
}

/// Per-query script for [`RecordingSearch`].
type Responder = dyn Fn(&str) -> (Delay, ProviderResult<Vec<Destination>>) + Send + Sync;

/// What: Search provider that records every query it receives.
pub struct RecordingSearch {
    /// Answers by query.
    responder: Box<Responder>,
    /// Queries in arrival order.
    queries: Mutex<Vec<String>>,
}

impl RecordingSearch {
    /// Answer each query through `responder`.
    pub fn new(
        responder: impl Fn(&str) -> (Delay, ProviderResult<Vec<Destination>>) + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }
}

impl DestinationSearchProvider for RecordingSearch {
    fn name(&self) -> &str {
        "recording"
    }

    fn search(&self, query: String) -> BoxFuture<'_, ProviderResult<Vec<Destination>>> {
        let (delay, outcome) = (self.responder)(&query);
        self.queries.lock().expect("queries lock").push(query);
        async move {
            match delay {
                Delay::After(d) => tokio::time::sleep(d).await,
                Delay::Never => futures::future::pending::<()>().await,
            }
            outcome
        }
        .boxed()
    }
}

/// Place with only a city.
pub fn city(name: &str) -> PlaceName {
    PlaceName {
        city: Some(name.to_string()),
        ..PlaceName::default()
    }
}

/// IP answer at `coordinates`, optionally with a city.
pub fn ip_answer(coordinates: Coordinates, city: Option<&str>) -> IpLocation {
    IpLocation {
        city: city.map(ToString::to_string),
        region: None,
        country: Some("France".to_string()),
        country_code: Some("FR".to_string()),
        lat: coordinates.lat,
        lon: coordinates.lon,
    }
}
