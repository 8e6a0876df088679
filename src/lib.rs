//! Library entry for waypoint: resilient location and destination resolution.
//!
//! Two resolvers sit on top of pluggable providers:
//! - [`location::LocationResolver`] walks cache → device → IP → `unavailable` and never
//!   fails.
//! - [`search::SearchResolver`] debounces free-text input, races the remote lookup
//!   against a timeout and falls back to a built-in destination list.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod location;
pub mod providers;
pub mod search;
pub mod sequencer;
pub mod types;

pub use error::ResolveError;
pub use location::{LocationProviders, LocationResolver, ResolveOptions};
pub use search::{SearchHandle, SearchResolver, SearchState, StaticDestinations};
pub use sequencer::RequestSequencer;
pub use types::{
    Coordinates, Destination, IpLocation, LocationResult, LocationSource, PlaceName,
    SearchResult, SearchSource,
};
