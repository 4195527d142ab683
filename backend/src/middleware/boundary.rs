//! Failure boundary middleware: the outermost request pipeline stage.
//!
//! For each request the boundary resolves the correlation identifier
//! (inbound `trace-id` header when well-formed, fresh UUID otherwise),
//! opens a request-scoped [`DiagnosticContext`] plus a tracing span, and
//! invokes the inner service chain exactly once. Uncaught failures are
//! classified against the injected registry and written as the sole
//! response; once the inner chain has produced a response, later failures
//! inside the boundary are logged but never written as a second response.
//!
//! Tokio task-local scoping ties the context to the request future, so a
//! cancelled request (client disconnect, deadline) clears it on drop; a
//! guard logs the abort with the correlation identifier.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{Error, HttpRequest, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, error, info_span, warn};

use crate::domain::{DiagnosticContext, Failure, RuleRegistry, TRACE_ID_HEADER, TraceId};
use crate::inbound::http::error::{build_envelope, failure_from_actix};

/// Middleware wrapping the handler chain in the failure boundary.
///
/// The classification registry is injected at construction and shared
/// read-only across workers.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use faultline::FailureBoundary;
///
/// let app = App::new().wrap(FailureBoundary::with_defaults());
/// ```
#[derive(Clone)]
pub struct FailureBoundary {
    registry: Arc<RuleRegistry>,
}

impl FailureBoundary {
    /// Boundary classifying against the supplied registry.
    #[must_use]
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self { registry }
    }

    /// Boundary classifying against the default taxonomy.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(RuleRegistry::with_defaults()))
    }
}

impl<S, B> Transform<S, ServiceRequest> for FailureBoundary
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = FailureBoundaryMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(FailureBoundaryMiddleware {
            service,
            registry: Arc::clone(&self.registry),
        }))
    }
}

/// Service wrapper produced by [`FailureBoundary`].
///
/// Applications should not use this type directly.
pub struct FailureBoundaryMiddleware<S> {
    service: S,
    registry: Arc<RuleRegistry>,
}

impl<S, B> Service<ServiceRequest> for FailureBoundaryMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = inbound_trace_id(&req);
        let registry = Arc::clone(&self.registry);

        // Keep a handle to the request so a failure can still be rendered
        // after the inner service has consumed it.
        let (http_req, payload) = req.into_parts();
        let req = ServiceRequest::from_parts(http_req.clone(), payload);

        let fut = self.service.call(req);
        let span = info_span!("request", trace_id = %trace_id);

        Box::pin(DiagnosticContext::new(trace_id).scope(
            async move {
                let mut guard = AbortGuard::new(trace_id);
                let mut res = match fut.await {
                    Ok(res) => intercept(res, &registry, trace_id, &http_req),
                    Err(err) => {
                        let failure = failure_from_actix(&err);
                        render_failure(&registry, trace_id, &failure, &http_req)
                    }
                };
                // The response exists from here on: anything that goes
                // wrong now is logged, never written as a second response.
                attach_trace_header(&mut res, trace_id);
                guard.disarm();
                Ok(res)
            }
            .instrument(span),
        ))
    }
}

/// Inspect a response the inner chain produced.
///
/// Responses the handler wrote itself pass through untouched. Responses
/// actix rendered from an error are re-examined: tagged failures whose
/// classification against the injected registry matches the default one
/// were already rendered through the same rule and pass through; anything
/// else is rebuilt so the injected registry alone governs translation.
fn intercept<B>(
    res: ServiceResponse<B>,
    registry: &RuleRegistry,
    trace_id: TraceId,
    http_req: &HttpRequest,
) -> ServiceResponse<EitherBody<B>> {
    let rebuild = match res.response().error() {
        None => None,
        Some(err) => match err.as_error::<Failure>() {
            Some(failure)
                if RuleRegistry::shared_default().classify(failure)
                    == registry.classify(failure) =>
            {
                None
            }
            Some(failure) => Some(failure.clone()),
            None => Some(failure_from_actix(err)),
        },
    };
    match rebuild {
        None => res.map_into_left_body(),
        Some(failure) => render_failure(registry, trace_id, &failure, http_req),
    }
}

fn render_failure<B>(
    registry: &RuleRegistry,
    trace_id: TraceId,
    failure: &Failure,
    http_req: &HttpRequest,
) -> ServiceResponse<EitherBody<B>> {
    let rule = registry.classify(failure);
    let envelope = build_envelope(rule, trace_id, failure);
    let response = HttpResponse::build(rule.status()).json(envelope);
    ServiceResponse::new(http_req.clone(), response).map_into_right_body()
}

fn inbound_trace_id(req: &ServiceRequest) -> TraceId {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or_else(TraceId::generate)
}

fn attach_trace_header<B>(res: &mut ServiceResponse<B>, trace_id: TraceId) {
    match HeaderValue::from_str(&trace_id.to_string()) {
        Ok(value) => {
            res.response_mut()
                .headers_mut()
                .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(err) => {
            error!(
                %err,
                trace_id = %trace_id,
                "failed to encode trace identifier header"
            );
        }
    }
}

/// Logs an abort when the request future is dropped before a response was
/// produced (client disconnect, deadline exceeded).
struct AbortGuard {
    trace_id: TraceId,
    armed: bool,
}

impl AbortGuard {
    fn new(trace_id: TraceId) -> Self {
        Self {
            trace_id,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        if self.armed {
            warn!(
                trace_id = %self.trace_id,
                "request aborted before a response was written"
            );
        }
    }
}
