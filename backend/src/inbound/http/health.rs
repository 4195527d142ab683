//! Health endpoints: liveness and readiness probes for orchestration.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};

/// Shared readiness flag flipped once the server is bound.
#[derive(Debug, Default)]
pub struct HealthState {
    ready: AtomicBool,
}

impl HealthState {
    /// Create a health state starting as not ready.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready to receive traffic.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Return readiness state.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

fn probe_response(probe_ok: bool) -> HttpResponse {
    let mut response = if probe_ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Liveness probe. The process is alive if it can answer at all.
#[utoipa::path(
    get,
    path = "/healthz/live",
    tag = "health",
    responses((status = 200, description = "Process is alive"))
)]
#[get("/healthz/live")]
pub async fn live() -> HttpResponse {
    probe_response(true)
}

/// Readiness probe, 503 until the server has finished binding.
#[utoipa::path(
    get,
    path = "/healthz/ready",
    tag = "health",
    responses(
        (status = 200, description = "Ready to receive traffic"),
        (status = 503, description = "Still starting up")
    )
)]
#[get("/healthz/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_ready())
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    use super::*;

    #[::core::prelude::v1::test]
    fn health_state_starts_not_ready() {
        let state = HealthState::new();
        assert!(!state.is_ready());
        state.mark_ready();
        assert!(state.is_ready());
    }

    #[actix_web::test]
    async fn ready_reports_service_unavailable_until_marked() {
        let state = web::Data::new(HealthState::new());
        let app =
            test::init_service(App::new().app_data(state.clone()).service(ready).service(live))
                .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/healthz/ready").to_request())
            .await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.mark_ready();
        let res = test::call_service(&app, test::TestRequest::get().uri("/healthz/ready").to_request())
            .await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = test::call_service(&app, test::TestRequest::get().uri("/healthz/live").to_request())
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get(header::CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("no-store")
        );
    }
}
