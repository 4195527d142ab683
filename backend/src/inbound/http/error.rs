//! HTTP error envelope and the single failure-to-response translation path.
//!
//! Purpose: keep [`Failure`] transport agnostic while the failure boundary
//! turns failures into consistent JSON envelopes and status codes. The
//! classify-then-build path here is the only place that translation
//! happens; the `ResponseError` impl exists so `?` works in handlers and
//! delegates to the same path against the process-wide default registry.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{
    ClassificationRule, Failure, FailureCategory, RuleRegistry, TRACE_ID_HEADER, TraceId,
};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Failure>;

/// Fixed detail disclosed for catch-all classifications.
///
/// The original failure message never reaches the caller on this path; it
/// is logged at error level instead.
pub const GENERIC_DETAIL: &str = "An unexpected error occurred while processing the request.";

/// Wire-format error body returned for every classified failure.
///
/// Field names and order are part of the wire contract; the builder never
/// adds or omits fields based on environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct ErrorEnvelope {
    /// Short stable title from the matched rule.
    #[schema(example = "Not Found")]
    pub title: String,
    /// Safe message, or the fixed generic string for catch-all failures.
    #[schema(example = "Order 42 not found")]
    pub detail: String,
    /// HTTP status; equals the transport status code.
    #[schema(example = 404)]
    pub status: u16,
    /// Correlation identifier, also echoed in the `trace-id` header.
    #[schema(example = "00000000-0000-0000-0000-000000000000")]
    pub trace_id: String,
    /// Category tag of the matched rule.
    #[schema(example = "not-found")]
    pub category: String,
}

/// Render a classified failure into the wire envelope.
///
/// For catch-all classifications the detail is [`GENERIC_DETAIL`] and the
/// original message goes to the logger at error level. For every other rule
/// the failure's safe message is disclosed, falling back to the rule title
/// when the failure carries none.
pub fn build_envelope(
    rule: &ClassificationRule,
    trace_id: TraceId,
    failure: &Failure,
) -> ErrorEnvelope {
    let detail = if rule.is_catch_all() {
        error!(
            trace_id = %trace_id,
            category = %failure.category(),
            diagnostic = failure.diagnostic(),
            "unclassified failure: {}",
            failure.message().unwrap_or("no message"),
        );
        GENERIC_DETAIL.to_owned()
    } else {
        failure.message().unwrap_or_else(|| rule.title()).to_owned()
    };

    ErrorEnvelope {
        title: rule.title().to_owned(),
        detail,
        status: rule.status().as_u16(),
        trace_id: trace_id.to_string(),
        category: rule.category().to_string(),
    }
}

/// Recover the raised [`Failure`] from a boxed actix error.
///
/// Foreign errors (extractor failures, third-party middleware) carry no
/// category tag and are promoted to untagged failures; their text survives
/// as an internal diagnostic only, so nothing leaks to the caller.
pub(crate) fn failure_from_actix(err: &actix_web::Error) -> Failure {
    match err.as_error::<Failure>() {
        Some(failure) => failure.clone(),
        None => Failure::tagged(FailureCategory::UNKNOWN).with_diagnostic(err.to_string()),
    }
}

impl ResponseError for Failure {
    fn status_code(&self) -> StatusCode {
        RuleRegistry::shared_default().classify(self).status()
    }

    fn error_response(&self) -> HttpResponse {
        let rule = RuleRegistry::shared_default().classify(self);
        let trace_id = TraceId::current().unwrap_or_else(TraceId::generate);
        let envelope = build_envelope(rule, trace_id, self);
        HttpResponse::build(rule.status())
            .insert_header((TRACE_ID_HEADER, envelope.trace_id.clone()))
            .json(envelope)
    }
}
