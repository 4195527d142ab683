//! Request-scoped trace identifier for correlation across logs and errors.
//!
//! `TraceId` is a domain primitive representing the correlation identifier
//! that follows a request through the system. The active identifier is held
//! by the [`DiagnosticContext`](super::DiagnosticContext) scope the failure
//! boundary opens for each request; [`TraceId::current`] reads it without
//! explicit parameter threading.

use uuid::Uuid;

use super::diagnostic::DiagnosticContext;

/// Per-request trace identifier.
///
/// # Examples
/// ```
/// use faultline::domain::TraceId;
///
/// async fn handler() {
///     if let Some(id) = TraceId::current() {
///         tracing::info!(trace_id = %id, "handling");
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

/// Raised when a trace identifier is not well-formed.
#[derive(Debug, thiserror::Error)]
#[error("trace identifier must be a UUID: {0}")]
pub struct ParseTraceIdError(#[from] uuid::Error);

impl TraceId {
    /// Generate a new random trace identifier.
    #[must_use]
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct a trace identifier from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the identifier of the request in scope, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        DiagnosticContext::current_trace_id()
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TraceId {
    type Err = ParseTraceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}
