//! Request-scoped diagnostic context consumed by the structured logger.
//!
//! The context carries the correlation identifier plus an append-only map of
//! enrichment fields for exactly one request. It lives in tokio task-local
//! storage tied to the request future, so it is cleared on every exit path
//! (success, failure, cancellation) and never crosses request boundaries on
//! the pooled runtime.
//!
//! Task-local variables are not inherited across spawned tasks. Use
//! [`DiagnosticContext::scope`] when spawning new tasks or moving work onto
//! blocking threads so the active context propagates correctly.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::future::Future;

use tokio::task_local;

use super::trace_id::TraceId;

task_local! {
    static DIAGNOSTICS: DiagnosticContext;
}

/// Per-request diagnostic state: trace identifier and enrichment fields.
///
/// # Examples
/// ```
/// use faultline::domain::{DiagnosticContext, TraceId};
/// use uuid::Uuid;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let context = DiagnosticContext::new(TraceId::from_uuid(Uuid::nil()));
/// context
///     .scope(async {
///         DiagnosticContext::enrich("tenant", "acme");
///         assert!(TraceId::current().is_some());
///     })
///     .await;
/// assert!(TraceId::current().is_none());
/// # });
/// ```
#[derive(Debug)]
pub struct DiagnosticContext {
    trace_id: TraceId,
    enrichment: RefCell<BTreeMap<String, String>>,
}

impl DiagnosticContext {
    /// Create a context for the given correlation identifier.
    #[must_use]
    pub fn new(trace_id: TraceId) -> Self {
        Self {
            trace_id,
            enrichment: RefCell::new(BTreeMap::new()),
        }
    }

    /// Execute `fut` with this context in scope.
    ///
    /// The context is dropped when the future completes or is cancelled.
    pub async fn scope<Fut>(self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        DIAGNOSTICS.scope(self, fut).await
    }

    /// Correlation identifier of the request in scope, if any.
    #[must_use]
    pub fn current_trace_id() -> Option<TraceId> {
        DIAGNOSTICS.try_with(|context| context.trace_id).ok()
    }

    /// Append an enrichment field to the active context.
    ///
    /// The map is append-only: the first value recorded for a key wins and
    /// later calls with the same key are ignored. A no-op when no context
    /// is in scope.
    pub fn enrich(key: impl Into<String>, value: impl Into<String>) {
        let _ = DIAGNOSTICS.try_with(|context| {
            context
                .enrichment
                .borrow_mut()
                .entry(key.into())
                .or_insert_with(|| value.into());
        });
    }

    /// Snapshot of the active context's enrichment fields.
    #[must_use]
    pub fn enrichment_snapshot() -> Option<BTreeMap<String, String>> {
        DIAGNOSTICS
            .try_with(|context| context.enrichment.borrow().clone())
            .ok()
    }
}
