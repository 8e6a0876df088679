//! Debounced search: burst collapse, staleness, minimum length, timeout fallback.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, sleep};
use waypoint::clock::SystemClock;
use waypoint::config::SearchConfig;
use waypoint::error::ResolveError;
use waypoint::search::{SearchHandle, SearchResolver, SearchState, StaticDestinations};
use waypoint::sequencer::RequestSequencer;
use waypoint::types::{Destination, SearchResult, SearchSource};

use crate::common::{Delay, RecordingSearch};

fn resolver(provider: &Arc<RecordingSearch>) -> Arc<SearchResolver> {
    Arc::new(SearchResolver::new(
        provider.clone(),
        StaticDestinations::builtin(),
        Arc::new(RequestSequencer::new()),
        SearchConfig::default(),
        Arc::new(SystemClock),
    ))
}

fn start(provider: &Arc<RecordingSearch>) -> (SearchHandle, UnboundedReceiver<SearchResult>) {
    resolver(provider).spawn()
}

fn named(names: &[&str]) -> Vec<Destination> {
    names.iter().map(|n| Destination::new(*n, "Somewhere")).collect()
}

fn names(result: &SearchResult) -> Vec<&str> {
    result.items.iter().map(|d| d.name.as_str()).collect()
}

#[tokio::test(start_paused = true)]
/// What: A typing burst inside the debounce window sends one request.
///
/// Inputs:
/// - `p`, `pa`, `par`, `pari`, `paris`, 50 ms apart.
///
/// Output:
/// - The one-letter prefix yields an immediate empty result; the provider sees only
///   `"paris"` and its answer is delivered.
async fn burst_collapses_to_last_query() {
    let provider = RecordingSearch::new(|_| {
        (
            Delay::After(Duration::from_millis(20)),
            Ok(named(&["Paris"])),
        )
    });
    let (handle, mut results) = start(&provider);
    for text in ["p", "pa", "par", "pari", "paris"] {
        handle.search(text);
        sleep(Duration::from_millis(50)).await;
    }

    let short = results.recv().await.expect("short-query result");
    assert_eq!(short.query, "p");
    assert!(short.items.is_empty());

    let answer = results.recv().await.expect("debounced result");
    assert_eq!(answer.query, "paris");
    assert_eq!(answer.source, SearchSource::Remote);
    assert_eq!(names(&answer), vec!["Paris"]);
    assert_eq!(provider.queries(), vec!["paris".to_string()]);
    assert!(handle.is_current(&answer));
}

#[tokio::test(start_paused = true)]
/// What: A slow answer to an older query is never delivered.
///
/// Inputs:
/// - `alpha` dispatched and answering after 2 s; `beta` typed 100 ms after dispatch and
///   answering after 50 ms.
///
/// Output:
/// - Only `beta` arrives, and nothing else arrives after `alpha` finishes.
async fn stale_answer_is_dropped() {
    let provider = RecordingSearch::new(|q| {
        if q == "alpha" {
            (Delay::After(Duration::from_secs(2)), Ok(named(&["Alpha City"])))
        } else {
            (Delay::After(Duration::from_millis(50)), Ok(named(&["Beta Town"])))
        }
    });
    let debounce = SearchConfig::default().debounce;
    let (handle, mut results) = start(&provider);

    handle.search("alpha");
    sleep(debounce + Duration::from_millis(100)).await;
    handle.search("beta");

    let delivered = results.recv().await.expect("beta result");
    assert_eq!(delivered.query, "beta");
    assert_eq!(names(&delivered), vec!["Beta Town"]);

    sleep(Duration::from_secs(3)).await;
    assert!(results.try_recv().is_err());
    assert_eq!(
        provider.queries(),
        vec!["alpha".to_string(), "beta".to_string()]
    );
}

#[tokio::test(start_paused = true)]
/// What: The awaitable resolver marks the older of two overlapping answers stale.
async fn overlapping_resolves_only_latest_is_current() {
    let provider = RecordingSearch::new(|q| {
        let delay = if q == "slow" { 2000 } else { 50 };
        (Delay::After(Duration::from_millis(delay)), Ok(named(&[q])))
    });
    let resolver = resolver(&provider);
    let slow = resolver.resolve("slow");
    let fast = async {
        sleep(Duration::from_millis(100)).await;
        resolver.resolve("fast").await
    };
    let (a, b) = tokio::join!(slow, fast);
    assert!(!resolver.is_current(&a));
    assert!(resolver.is_current(&b));
    assert!(b.sequence_id > a.sequence_id);
}

#[tokio::test(start_paused = true)]
/// What: Input shorter than the minimum is answered at once without a request.
async fn short_query_answers_immediately() {
    let provider = RecordingSearch::new(|_| (Delay::After(Duration::ZERO), Ok(named(&["X"]))));
    let (handle, mut results) = start(&provider);
    let started = Instant::now();
    handle.search(" p ");
    let result = results.recv().await.expect("short-query result");
    assert!(started.elapsed() < SearchConfig::default().debounce);
    assert!(result.items.is_empty());
    assert_eq!(result.source, SearchSource::StaticFallback);
    assert!(provider.queries().is_empty());
    assert_eq!(handle.state(), SearchState::Idle);
}

#[tokio::test(start_paused = true)]
/// What: A remote that never answers is replaced by the static list at the timeout.
///
/// Output:
/// - `static_fallback` after debounce + timeout, holding only name/country substring
///   matches for the case-folded query.
async fn hanging_remote_falls_back_at_timeout() {
    let provider = RecordingSearch::new(|_| (Delay::Never, Ok(Vec::new())));
    let config = SearchConfig::default();
    let (handle, mut results) = start(&provider);
    let mut state = handle.watch_state();

    let started = Instant::now();
    handle.search("PAR");
    sleep(config.debounce + Duration::from_millis(10)).await;
    assert_eq!(handle.state(), SearchState::InFlight);

    let result = results.recv().await.expect("fallback result");
    let elapsed = started.elapsed();
    assert!(elapsed >= config.debounce + config.remote_timeout);
    assert!(elapsed < config.debounce + config.remote_timeout + Duration::from_secs(1));
    assert_eq!(result.source, SearchSource::StaticFallback);
    assert_eq!(result.query, "par");
    assert_eq!(names(&result), vec!["Paris"]);
    for d in &result.items {
        assert!(
            d.name.to_lowercase().contains("par") || d.country.to_lowercase().contains("par")
        );
    }
    state
        .wait_for(|s| *s == SearchState::Idle)
        .await
        .expect("worker alive");
}

#[tokio::test(start_paused = true)]
/// What: A failing remote falls back right away instead of waiting for the timeout.
async fn failing_remote_falls_back_immediately() {
    let provider = RecordingSearch::new(|_| {
        (
            Delay::After(Duration::from_millis(30)),
            Err(ResolveError::Network("HTTP 503".into())),
        )
    });
    let config = SearchConfig::default();
    let (handle, mut results) = start(&provider);
    let started = Instant::now();
    handle.search("italy");
    let result = results.recv().await.expect("fallback result");
    assert!(started.elapsed() < config.debounce + Duration::from_secs(1));
    assert_eq!(result.source, SearchSource::StaticFallback);
    assert_eq!(names(&result), vec!["Rome", "Florence", "Venice"]);
    assert_eq!(provider.queries(), vec!["italy".to_string()]);
}

#[tokio::test(start_paused = true)]
/// What: Repeating a query within the memo lifetime reuses the remote answer.
async fn repeated_query_served_from_memo() {
    let provider = RecordingSearch::new(|_| {
        (
            Delay::After(Duration::from_millis(10)),
            Ok(named(&["Lisbon"])),
        )
    });
    let (handle, mut results) = start(&provider);
    handle.search("lisbon");
    let first = results.recv().await.expect("first result");
    handle.search("Lisbon ");
    let second = results.recv().await.expect("second result");
    assert_eq!(first.items, second.items);
    assert_eq!(second.source, SearchSource::Remote);
    assert_eq!(provider.queries().len(), 1);
}

#[tokio::test(start_paused = true)]
/// What: Clearing drops pending input and silences the in-flight answer.
async fn clear_silences_in_flight_answer() {
    let provider = RecordingSearch::new(|_| {
        (
            Delay::After(Duration::from_secs(1)),
            Ok(named(&["Oslo"])),
        )
    });
    let debounce = SearchConfig::default().debounce;
    let (handle, mut results) = start(&provider);
    handle.search("oslo");
    sleep(debounce + Duration::from_millis(10)).await;
    handle.clear();
    handle.search("bergen");
    handle.clear();
    sleep(Duration::from_secs(3)).await;
    assert!(results.try_recv().is_err());
    assert_eq!(provider.queries(), vec!["oslo".to_string()]);
    assert_eq!(handle.state(), SearchState::Idle);
}
