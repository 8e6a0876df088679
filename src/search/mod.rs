//! Destination search: remote lookup raced against a timeout, with a static fallback.
//!
//! [`SearchResolver::resolve`] answers one query. [`SearchResolver::spawn`] wraps it in a
//! debounced worker that stamps every dispatch with a sequence id and only delivers the
//! newest answer.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::config::SearchConfig;
use crate::error::ResolveError;
use crate::providers::DestinationSearchProvider;
use crate::sequencer::RequestSequencer;
use crate::types::{Destination, SearchQuery, SearchResult, SearchSource};

mod fallback;
mod query;
mod rank;
mod state;
mod worker;

pub use fallback::StaticDestinations;
pub use query::{meets_min_length, normalize};
pub use rank::MatchRank;
pub use state::{SearchEvent, SearchState};
pub use worker::SearchHandle;

/// What: Turns free text into ranked destinations.
///
/// Inputs:
/// - `provider`: Remote destination lookup.
/// - `fallback`: Offline list used when the remote is slow or failing.
/// - `sequencer`: Shared token source; the newest id wins.
/// - `config`: Debounce, minimum length, timeout and memo settings.
/// - `clock`: Time source for the memo.
///
/// Details:
/// - Remote answers are memoized per normalized query; a memo hit is served as `remote`
///   without a network call.
/// - Failures never surface as errors: they turn into `static_fallback` results.
pub struct SearchResolver {
    /// Remote lookup.
    provider: Arc<dyn DestinationSearchProvider>,
    /// Offline list.
    fallback: StaticDestinations,
    /// Token source.
    sequencer: Arc<RequestSequencer>,
    /// Tunables.
    config: SearchConfig,
    /// Ranked remote answers by normalized query.
    memo: TtlCache<String, Vec<Destination>>,
}

impl SearchResolver {
    /// Build a resolver.
    #[must_use]
    pub fn new(
        provider: Arc<dyn DestinationSearchProvider>,
        fallback: StaticDestinations,
        sequencer: Arc<RequestSequencer>,
        config: SearchConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let memo = TtlCache::new(config.memo_capacity, config.memo_ttl, clock);
        Self {
            provider,
            fallback,
            sequencer,
            config,
            memo,
        }
    }

    /// Tunables in use.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// What: Check whether `result` answers the newest request.
    ///
    /// Output:
    /// - `false` once any later query (or clear) has been issued.
    #[must_use]
    pub fn is_current(&self, result: &SearchResult) -> bool {
        self.sequencer.is_current(result.sequence_id)
    }

    /// What: Resolve one query without debouncing.
    ///
    /// Inputs:
    /// - `raw`: User input; normalized here.
    ///
    /// Output:
    /// - A `remote` result, or a `static_fallback` result when the query is too short,
    ///   the remote failed, or the remote missed its timeout.
    ///
    /// Details:
    /// - Always issues a new sequence id, so any earlier answer becomes stale.
    pub async fn resolve(&self, raw: &str) -> SearchResult {
        let text = normalize(raw);
        if !meets_min_length(&text, self.config.min_query_len) {
            return self.below_min_length(text);
        }
        let query = self.stamp(text);
        self.run(query).await.0
    }

    /// Issue a sequence id for a dispatchable query.
    fn stamp(&self, text: String) -> SearchQuery {
        SearchQuery {
            text,
            sequence_id: self.sequencer.issue(),
        }
    }

    /// What: Empty `static_fallback` answer for a too-short query.
    ///
    /// Details:
    /// - Still consumes a sequence id so in-flight answers for older text go stale.
    fn below_min_length(&self, text: String) -> SearchResult {
        let sequence_id = self.sequencer.issue();
        debug!(query = %text, sequence_id, "query below minimum length; no request");
        SearchResult {
            sequence_id,
            query: text,
            items: Vec::new(),
            source: SearchSource::StaticFallback,
        }
    }

    /// What: Memo lookup, then the remote call raced against the timeout.
    ///
    /// Output:
    /// - The result plus the lifecycle event describing how it was obtained.
    ///
    /// Details:
    /// - The remote call runs in its own task. When the timer wins the task is detached:
    ///   it may still finish, but its answer is never seen.
    async fn run(&self, query: SearchQuery) -> (SearchResult, SearchEvent) {
        if let Some(items) = self.memo.get(&query.text) {
            debug!(query = %query.text, sequence_id = query.sequence_id, "search memo hit");
            return (
                finish(query, items, SearchSource::Remote),
                SearchEvent::RemoteOk,
            );
        }

        let provider = Arc::clone(&self.provider);
        let text = query.text.clone();
        let remote = tokio::spawn(async move { provider.search(text).await });
        let budget = self.config.remote_timeout;

        let outcome = tokio::select! {
            joined = remote => Some(joined.unwrap_or_else(|e| {
                Err(ResolveError::Network(format!("search task failed: {e}")))
            })),
            () = sleep(budget) => None,
        };

        match outcome {
            Some(Ok(items)) => {
                let items = rank::rank_destinations(items, &query.text, self.config.max_results);
                self.memo.insert(query.text.clone(), items.clone());
                info!(
                    provider = self.provider.name(),
                    query = %query.text,
                    count = items.len(),
                    "destination search answered"
                );
                (
                    finish(query, items, SearchSource::Remote),
                    SearchEvent::RemoteOk,
                )
            }
            Some(Err(e)) => {
                warn!(
                    provider = self.provider.name(),
                    kind = e.kind(),
                    error = %e,
                    "destination search failed; serving static fallback"
                );
                let items = self.fallback_items(&query.text);
                (
                    finish(query, items, SearchSource::StaticFallback),
                    SearchEvent::RemoteErr,
                )
            }
            None => {
                let e = ResolveError::Timeout(budget);
                warn!(
                    provider = self.provider.name(),
                    kind = e.kind(),
                    error = %e,
                    "destination search timed out; serving static fallback"
                );
                let items = self.fallback_items(&query.text);
                (
                    finish(query, items, SearchSource::StaticFallback),
                    SearchEvent::TimedOut,
                )
            }
        }
    }

    /// Ranked offline matches.
    fn fallback_items(&self, query_lower: &str) -> Vec<Destination> {
        rank::rank_destinations(
            self.fallback.filter(query_lower),
            query_lower,
            self.config.max_results,
        )
    }
}

/// Assemble a result for `query`.
fn finish(query: SearchQuery, items: Vec<Destination>, source: SearchSource) -> SearchResult {
    SearchResult {
        sequence_id: query.sequence_id,
        query: query.text,
        items,
        source,
    }
}
