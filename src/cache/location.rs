//! Last-known-location cache: an in-memory layer in front of a durable record.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::store::DurableStore;
use super::ttl::TtlCache;
use crate::clock::Clock;
use crate::types::{LocationResult, LocationSource};

/// Fixed key of the durable last-known-location record.
pub const LAST_KNOWN_LOCATION_KEY: &str = "last_known_location";

/// What: Shape of the durable record.
///
/// Details:
/// - The expiry travels with the value so a restarted process honours the original TTL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedLocation {
    /// The cached resolution.
    pub location: LocationResult,
    /// First instant at which the record is stale.
    pub expires_at: DateTime<Utc>,
}

/// What: Shared cache of the last successfully resolved location.
///
/// Inputs:
/// - `store`: Durable backing store (survives reloads).
/// - `ttl`: Lifetime of a fresh resolution.
/// - `clock`: Time source for expiry.
///
/// Details:
/// - Meant to be created once by the composition root and handed to every resolver and
///   UI caller that needs the location.
/// - Reads check memory first, then the durable record; a durable hit re-warms memory
///   with the record's own expiry.
/// - Expired durable records are deleted on the lookup that finds them.
/// - Store failures are logged and treated as a miss; they never fail a resolution.
pub struct LocationCache {
    /// Hot copy of the record.
    memory: TtlCache<&'static str, LocationResult>,
    /// Durable copy of the record.
    store: Arc<dyn DurableStore>,
    /// Lifetime of new records.
    ttl: TimeDelta,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl LocationCache {
    /// Build a cache over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DurableStore>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            memory: TtlCache::new(1, ttl, Arc::clone(&clock)),
            store,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    /// What: Return the cached location while it is fresh.
    ///
    /// Output:
    /// - The stored value exactly as it was resolved (its original `source`); callers
    ///   relabel it with [`LocationResult::as_cached`].
    pub fn get_fresh(&self) -> Option<LocationResult> {
        if let Some(hit) = self.memory.get(&LAST_KNOWN_LOCATION_KEY) {
            debug!("[Location cache] memory hit");
            return Some(hit);
        }
        let record = self.load_durable()?;
        if record.expires_at <= self.clock.now() {
            debug!(expires_at = %record.expires_at, "[Location cache] durable record expired");
            self.remove_durable();
            return None;
        }
        debug!(expires_at = %record.expires_at, "[Location cache] durable hit");
        self.memory.insert_until(
            LAST_KNOWN_LOCATION_KEY,
            record.location.clone(),
            record.expires_at,
        );
        Some(record.location)
    }

    /// What: Store a freshly resolved location in memory and on disk.
    ///
    /// Details:
    /// - `cache` and `unavailable` values are ignored: a cache hit is not a new
    ///   resolution, and a failure must not overwrite a usable older record.
    pub fn put(&self, location: &LocationResult) {
        if !is_storable(location) {
            debug!(source = %location.source(), "[Location cache] skip write");
            return;
        }
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.memory
            .insert_until(LAST_KNOWN_LOCATION_KEY, location.clone(), expires_at);
        let record = PersistedLocation {
            location: location.clone(),
            expires_at,
        };
        match serde_json::to_string(&record) {
            Ok(json) => {
                if let Err(e) = self.store.save(LAST_KNOWN_LOCATION_KEY, &json) {
                    warn!(error = %e, "[Location cache] failed to persist location");
                } else {
                    info!(
                        source = %location.source(),
                        name = location.display_name(),
                        %expires_at,
                        "[Location cache] stored location"
                    );
                }
            }
            Err(e) => warn!(error = %e, "[Location cache] failed to serialize location"),
        }
    }

    /// Forget the cached location everywhere.
    pub fn invalidate(&self) {
        self.memory.clear();
        self.remove_durable();
        info!("[Location cache] invalidated");
    }

    /// What: Read and decode the durable record.
    ///
    /// Details:
    /// - Undecodable records and records `put` would never have written are a miss and
    ///   are deleted.
    fn load_durable(&self) -> Option<PersistedLocation> {
        let raw = match self.store.load(LAST_KNOWN_LOCATION_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "[Location cache] failed to read durable record");
                return None;
            }
        };
        match serde_json::from_str::<PersistedLocation>(&raw) {
            Ok(record) if is_storable(&record.location) => Some(record),
            Ok(record) => {
                warn!(
                    source = %record.location.source(),
                    "[Location cache] discarding durable record with a non-storable source"
                );
                self.remove_durable();
                None
            }
            Err(e) => {
                warn!(error = %e, "[Location cache] discarding corrupt durable record");
                self.remove_durable();
                None
            }
        }
    }

    /// Delete the durable record, logging failures.
    fn remove_durable(&self) {
        if let Err(e) = self.store.remove(LAST_KNOWN_LOCATION_KEY) {
            warn!(error = %e, "[Location cache] failed to remove durable record");
        }
    }
}

/// `true` for values that describe a real resolution: not a cache relabel, not a failure.
fn is_storable(location: &LocationResult) -> bool {
    !matches!(
        location.source(),
        LocationSource::Cache | LocationSource::Unavailable
    )
}
