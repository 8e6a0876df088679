//! Failure taxonomy shared by every provider in the resolution pipeline.
//!
//! None of these errors reach the callers of the resolvers. They are produced by
//! providers, logged, and turned into the next step of a fallback chain. The only
//! caller-visible trace of a failure is the degraded `source` on the returned value.

use std::time::Duration;

use thiserror::Error;

/// Errors a provider can report while resolving a location or running a search.
///
/// An empty answer is not an error: providers return an empty list and the
/// pipeline treats it as a valid (empty) result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The user (or platform) refused access to the device position.
    #[error("permission denied")]
    PermissionDenied,

    /// The provider did not answer within its budget.
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Transport failure or non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered, but the payload was unusable.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl ResolveError {
    /// What: Short machine-friendly label for structured log fields.
    ///
    /// Output:
    /// - One of `permission_denied`, `timeout`, `network`, `malformed`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::Timeout(_) => "timeout",
            Self::Network(_) => "network",
            Self::MalformedResponse(_) => "malformed",
        }
    }
}
