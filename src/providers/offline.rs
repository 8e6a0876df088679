use futures::future::{self, BoxFuture, FutureExt};

use super::{DestinationSearchProvider, ProviderResult};
use crate::error::ResolveError;
use crate::types::Destination;

/// What: Search provider used when no remote endpoint is configured.
///
/// Details:
/// - Fails at once with a `Network` error, so every query is answered from the static
///   fallback without waiting for the remote timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSearch;

impl DestinationSearchProvider for OfflineSearch {
    fn name(&self) -> &str {
        "offline"
    }

    fn search(&self, _query: String) -> BoxFuture<'_, ProviderResult<Vec<Destination>>> {
        future::ready(Err(ResolveError::Network(
            "no destination search endpoint configured".to_string(),
        )))
        .boxed()
    }
}
