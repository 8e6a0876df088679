//! Result caching: a generic TTL cache, durable stores and the location cache built on both.

mod location;
mod store;
mod ttl;

pub use location::{LAST_KNOWN_LOCATION_KEY, LocationCache, PersistedLocation};
pub use store::{DurableStore, JsonFileStore, MemoryStore};
pub use ttl::{CacheEntry, TtlCache};
