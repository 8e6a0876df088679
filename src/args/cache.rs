//! Command-line cache management functionality.

use std::io;

use waypoint::cache::{DurableStore, JsonFileStore, LAST_KNOWN_LOCATION_KEY};
use waypoint::config::Settings;

/// What: Remove the durable location record.
///
/// Inputs:
/// - `settings`: Supplies the cache directory.
///
/// Output:
/// - `Ok(())` whether or not a record existed; prints what happened.
///
/// # Errors
/// - Returns `Err` when the record exists but cannot be removed.
pub fn handle_clear_cache(settings: &Settings) -> io::Result<()> {
    tracing::info!("Clear cache requested from CLI");
    let store = JsonFileStore::new(settings.effective_cache_dir());
    let path = store.path_for(LAST_KNOWN_LOCATION_KEY);
    let existed = path.is_file();
    store.remove(LAST_KNOWN_LOCATION_KEY)?;
    if existed {
        tracing::info!(path = %path.display(), "cleared cache file");
        println!("Cleared cached location ({})", path.display());
    } else {
        tracing::info!("No cache files found to clear");
        println!("No cached location to clear");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Clearing removes an existing record and tolerates a missing one.
    fn clears_existing_and_missing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = Settings {
            cache_dir: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };
        let store = JsonFileStore::new(dir.path());
        store
            .save(LAST_KNOWN_LOCATION_KEY, "{}")
            .expect("seed record");
        handle_clear_cache(&settings).expect("first clear");
        assert_eq!(
            store.load(LAST_KNOWN_LOCATION_KEY).expect("load"),
            None
        );
        handle_clear_cache(&settings).expect("second clear");
    }
}
