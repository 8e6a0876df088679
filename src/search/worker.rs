//! Debounced background worker behind [`SearchHandle`].

use std::sync::Arc;

use tokio::select;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{debug, trace};

use super::state::{SearchEvent, SearchState, apply};
use super::{SearchResolver, meets_min_length, normalize};
use crate::types::SearchResult;

/// Messages from a [`SearchHandle`] to its worker.
#[derive(Debug)]
enum Command {
    /// Raw user input.
    Query(String),
    /// Input was cleared.
    Clear,
}

/// What: Caller side of a running search worker.
///
/// Details:
/// - Cheap to clone; every clone feeds the same worker.
/// - Dropping every handle stops the worker once its queue drains. Requests already
///   dispatched still finish, and a current answer is still delivered.
#[derive(Clone)]
pub struct SearchHandle {
    /// Command queue.
    tx: mpsc::UnboundedSender<Command>,
    /// Lifecycle state published by the worker.
    state: watch::Receiver<SearchState>,
    /// Resolver, for staleness checks.
    resolver: Arc<SearchResolver>,
}

impl SearchHandle {
    /// What: Submit input. Fire-and-forget; the answer (if still current) arrives on the
    /// result receiver.
    pub fn search(&self, query: impl Into<String>) {
        if self.tx.send(Command::Query(query.into())).is_err() {
            debug!("search worker stopped; input ignored");
        }
    }

    /// What: Drop any pending input and make in-flight answers stale.
    pub fn clear(&self) {
        if self.tx.send(Command::Clear).is_err() {
            debug!("search worker stopped; clear ignored");
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SearchState {
        *self.state.borrow()
    }

    /// A receiver for watching state changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }

    /// See [`SearchResolver::is_current`].
    #[must_use]
    pub fn is_current(&self, result: &SearchResult) -> bool {
        self.resolver.is_current(result)
    }
}

impl SearchResolver {
    /// What: Start the debounced search worker.
    ///
    /// Output:
    /// - A handle for submitting input and the receiver on which results arrive.
    ///
    /// Details:
    /// - Each input restarts the debounce window; only the last text of a burst is
    ///   dispatched.
    /// - Input shorter than the minimum length cancels the pending window and delivers an
    ///   empty `static_fallback` result at once.
    /// - A result is sent only while its sequence id is still the newest; the check and
    ///   the send happen under the sequencer's gate.
    /// - Input submitted after a result was sent can still supersede it before the
    ///   consumer reads it; consumers re-check with [`SearchHandle::is_current`].
    /// - Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(self: Arc<Self>) -> (SearchHandle, mpsc::UnboundedReceiver<SearchResult>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SearchState::Idle);
        tokio::spawn(run_worker(
            Arc::clone(&self),
            cmd_rx,
            result_tx,
            Arc::new(state_tx),
        ));
        let handle = SearchHandle {
            tx: cmd_tx,
            state: state_rx,
            resolver: self,
        };
        (handle, result_rx)
    }
}

/// What: Debounce loop.
///
/// Details:
/// - While a query is pending, every iteration races the next command against a fresh
///   debounce timer, so each new input restarts the window.
/// - Dispatched queries run in their own task; the loop never waits on the network.
async fn run_worker(
    resolver: Arc<SearchResolver>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    results: mpsc::UnboundedSender<SearchResult>,
    state: Arc<watch::Sender<SearchState>>,
) {
    let debounce = resolver.config.debounce;
    let mut pending: Option<String> = None;
    loop {
        let command = if pending.is_some() {
            select! {
                command = commands.recv() => command,
                () = sleep(debounce) => {
                    if let Some(text) = pending.take() {
                        dispatch(&resolver, text, &results, &state);
                    }
                    continue;
                }
            }
        } else {
            commands.recv().await
        };
        let Some(command) = command else {
            break;
        };
        match command {
            Command::Query(raw) => {
                let text = normalize(&raw);
                if meets_min_length(&text, resolver.config.min_query_len) {
                    trace!(query = %text, "debounce window restarted");
                    pending = Some(text);
                    apply(&state, SearchEvent::Input);
                } else {
                    pending = None;
                    let result = resolver.below_min_length(text);
                    apply(&state, SearchEvent::Clear);
                    let _ = results.send(result);
                }
            }
            Command::Clear => {
                pending = None;
                let _ = resolver.sequencer.issue();
                apply(&state, SearchEvent::Clear);
            }
        }
    }
    debug!("search worker stopped");
}

/// What: Send one query and deliver its answer if still current.
fn dispatch(
    resolver: &Arc<SearchResolver>,
    text: String,
    results: &mpsc::UnboundedSender<SearchResult>,
    state: &Arc<watch::Sender<SearchState>>,
) {
    let query = resolver.stamp(text);
    debug!(query = %query.text, sequence_id = query.sequence_id, "dispatching search");
    apply(state, SearchEvent::Dispatch);
    let resolver = Arc::clone(resolver);
    let results = results.clone();
    let state = Arc::clone(state);
    tokio::spawn(async move {
        let (result, outcome) = resolver.run(query).await;
        let sequence_id = result.sequence_id;
        let text = result.query.clone();
        let sent = resolver.sequencer.run_if_current(sequence_id, || {
            apply(&state, outcome);
            results.send(result).is_ok()
        });
        match sent {
            Some(true) => {
                apply(&state, SearchEvent::Delivered);
            }
            Some(false) => debug!(query = %text, "result receiver dropped"),
            None => debug!(
                query = %text,
                sequence_id,
                latest = resolver.sequencer.latest(),
                "discarding stale search result"
            ),
        }
    });
}
