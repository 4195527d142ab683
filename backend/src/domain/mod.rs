//! Domain primitives for failure classification and request diagnostics.
//!
//! Purpose: define the transport-agnostic types the failure boundary is
//! built from. Inbound adapters map them to HTTP responses; nothing in this
//! module knows about actix beyond the status codes carried by rules.
//!
//! Public surface:
//! - `Failure` / `FailureCategory` — tagged failure values raised by handlers.
//! - `ClassificationRule` / `RuleRegistry` — the ordered first-match taxonomy.
//! - `TraceId` — per-request correlation identifier.
//! - `DiagnosticContext` — request-scoped enrichment state for the logger.

pub mod classify;
pub mod diagnostic;
pub mod failure;
pub mod trace_id;

pub use self::classify::{ClassificationRule, RuleRegistry, RuleRegistryBuilder};
pub use self::diagnostic::DiagnosticContext;
pub use self::failure::{Failure, FailureCategory};
pub use self::trace_id::{ParseTraceIdError, TraceId};

/// Name of the request and response header carrying the correlation
/// identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";
