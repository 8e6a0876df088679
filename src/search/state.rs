//! Observable lifecycle of the debounced search worker.

use std::fmt;

use tracing::trace;

/// What: Where the search worker is in its request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchState {
    /// Nothing pending or in flight.
    #[default]
    Idle,
    /// Input received; debounce window open.
    Pending,
    /// Remote lookup racing its timeout.
    InFlight,
    /// Remote answered in time.
    Resolved,
    /// Timeout won; static fallback served.
    TimedOut,
    /// Remote failed; static fallback served.
    Failed,
}

/// Inputs that drive [`SearchState::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEvent {
    /// A long-enough query arrived.
    Input,
    /// Input cleared or shortened below the minimum length.
    Clear,
    /// Debounce window elapsed; the query was sent.
    Dispatch,
    /// Current request answered by the remote provider.
    RemoteOk,
    /// Current request hit its timeout.
    TimedOut,
    /// Current request failed.
    RemoteErr,
    /// The current result reached the subscriber.
    Delivered,
}

impl SearchState {
    /// What: Apply `event` to the current state.
    ///
    /// Output:
    /// - `Some(next)` for a legal transition, `None` otherwise.
    ///
    /// Details:
    /// - `Input` and `Clear` are accepted from every state; outcomes are only accepted
    ///   while in flight, and `Delivered` only from a terminal outcome.
    #[must_use]
    pub const fn transition(self, event: SearchEvent) -> Option<Self> {
        match (self, event) {
            (_, SearchEvent::Input) => Some(Self::Pending),
            (_, SearchEvent::Clear) => Some(Self::Idle),
            (Self::Pending, SearchEvent::Dispatch) => Some(Self::InFlight),
            (Self::InFlight, SearchEvent::RemoteOk) => Some(Self::Resolved),
            (Self::InFlight, SearchEvent::TimedOut) => Some(Self::TimedOut),
            (Self::InFlight, SearchEvent::RemoteErr) => Some(Self::Failed),
            (Self::Resolved | Self::TimedOut | Self::Failed, SearchEvent::Delivered) => {
                Some(Self::Idle)
            }
            _ => None,
        }
    }

    /// `true` for the three outcome states.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::TimedOut | Self::Failed)
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Resolved => "resolved",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
        })
    }
}

/// What: Apply `event` to a shared state cell.
///
/// Output:
/// - `true` when the state changed; rejected transitions leave it as-is.
pub(super) fn apply(state: &tokio::sync::watch::Sender<SearchState>, event: SearchEvent) -> bool {
    state.send_if_modified(|current| match current.transition(event) {
        Some(next) => {
            let changed = next != *current;
            *current = next;
            changed
        }
        None => {
            trace!(state = %current, ?event, "rejected search state transition");
            false
        }
    })
}
