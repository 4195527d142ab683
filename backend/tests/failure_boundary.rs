//! Behavioural tests driving a full in-memory application through the
//! failure boundary: envelope bodies, correlation headers, and transport
//! status codes exactly as a caller observes them.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use actix_web::{App, HttpResponse, web};
use rstest::rstest;
use uuid::Uuid;

use faultline::FailureBoundary;
use faultline::domain::{Failure, FailureCategory, RuleRegistry, TRACE_ID_HEADER, TraceId};
use faultline::inbound::http::error::GENERIC_DETAIL;
use faultline::inbound::http::health::HealthState;
use faultline::inbound::http::{ApiResult, ErrorEnvelope};
use faultline::server::build_app;

const TRACE_ID: &str = "11111111-2222-3333-4444-555555555555";

async fn get_order(path: web::Path<u32>) -> ApiResult<HttpResponse> {
    Err(Failure::not_found(format!(
        "Order {} not found",
        path.into_inner()
    )))
}

async fn export_orders() -> ApiResult<HttpResponse> {
    Err(Failure::new(
        FailureCategory::new("disk-full"),
        "volume /data full",
    ))
}

/// Raises a failure tagged with the category named in the path.
async fn raise(path: web::Path<String>) -> ApiResult<HttpResponse> {
    Err(Failure::new(
        FailureCategory::new(path.into_inner()),
        "raised for classification",
    ))
}

/// Echoes the correlation identifier the handler observes in scope.
async fn whoami() -> ApiResult<HttpResponse> {
    let id = TraceId::current()
        .map(|id| id.to_string())
        .unwrap_or_default();
    Ok(HttpResponse::Ok().body(id))
}

fn demo_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/orders/{id}", web::get().to(get_order))
        .route("/orders/export", web::post().to(export_orders))
        .route("/fail/{category}", web::get().to(raise))
        .route("/whoami", web::get().to(whoami));
}

fn default_registry() -> Arc<RuleRegistry> {
    Arc::new(RuleRegistry::with_defaults())
}

/// Drive one request through a boundary-wrapped app and flatten the parts a
/// caller can observe.
async fn call(
    registry: Arc<RuleRegistry>,
    req: TestRequest,
) -> (StatusCode, Option<String>, String) {
    let app = test::init_service(
        App::new()
            .wrap(FailureBoundary::new(registry))
            .configure(demo_routes),
    )
    .await;
    let res = test::call_service(&app, req.to_request()).await;
    let status = res.status();
    let trace_header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned);
    let body = test::read_body(res).await;
    let body = String::from_utf8(body.to_vec()).expect("utf8 body");
    (status, trace_header, body)
}

fn correlated(req: TestRequest) -> TestRequest {
    req.insert_header((TRACE_ID_HEADER, TRACE_ID))
}

#[actix_web::test]
async fn not_found_scenario_matches_the_wire_contract() {
    let req = correlated(TestRequest::get().uri("/orders/42"));
    let (status, trace_header, body) = call(default_registry(), req).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(trace_header.as_deref(), Some(TRACE_ID));
    // Byte-for-byte: field order and names are part of the wire contract.
    assert_eq!(
        body,
        format!(
            "{{\"title\":\"Not Found\",\"detail\":\"Order 42 not found\",\
             \"status\":404,\"traceId\":\"{TRACE_ID}\",\"category\":\"not-found\"}}"
        )
    );
}

#[rstest]
#[case("validation-error", StatusCode::BAD_REQUEST, "Validation Failed")]
#[case("not-authenticated", StatusCode::UNAUTHORIZED, "Not Authenticated")]
#[case("not-authorized", StatusCode::FORBIDDEN, "Not Authorized")]
#[case("not-found", StatusCode::NOT_FOUND, "Not Found")]
#[case(
    "business-rule-violation",
    StatusCode::UNPROCESSABLE_ENTITY,
    "Business Rule Violated"
)]
#[actix_web::test]
async fn registered_categories_map_to_documented_statuses(
    #[case] category: &str,
    #[case] status: StatusCode,
    #[case] title: &str,
) {
    let req = correlated(TestRequest::get().uri(&format!("/fail/{category}")));
    let (observed, _, body) = call(default_registry(), req).await;

    assert_eq!(observed, status);
    let envelope: ErrorEnvelope = serde_json::from_str(&body).expect("envelope body");
    assert_eq!(envelope.title, title);
    assert_eq!(envelope.detail, "raised for classification");
    assert_eq!(envelope.status, status.as_u16());
    assert_eq!(envelope.category, category);
}

#[actix_web::test]
async fn unregistered_category_is_redacted_to_the_catch_all() {
    let req = correlated(TestRequest::post().uri("/orders/export"));
    let (status, trace_header, body) = call(default_registry(), req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(trace_header.as_deref(), Some(TRACE_ID));

    let envelope: ErrorEnvelope = serde_json::from_str(&body).expect("envelope body");
    assert_eq!(envelope.detail, GENERIC_DETAIL);
    assert_eq!(envelope.status, 500);
    assert_eq!(envelope.category, "unknown");
    assert!(!body.contains("volume /data full"));
}

#[actix_web::test]
async fn extractor_failures_surface_as_the_catch_all() {
    let req = TestRequest::get().uri("/orders/not-a-number");
    let (status, trace_header, body) = call(default_registry(), req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(trace_header.is_some());

    let envelope: ErrorEnvelope = serde_json::from_str(&body).expect("envelope body");
    assert_eq!(envelope.category, "unknown");
    assert_eq!(envelope.detail, GENERIC_DETAIL);
}

#[actix_web::test]
async fn success_passes_through_and_echoes_the_trace_id() {
    let req = correlated(TestRequest::get().uri("/whoami"));
    let (status, trace_header, body) = call(default_registry(), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(trace_header.as_deref(), Some(TRACE_ID));
    // The handler saw the same identifier the caller received.
    assert_eq!(body, TRACE_ID);
}

#[actix_web::test]
async fn generated_trace_id_is_shared_between_handler_and_header() {
    let (status, trace_header, body) =
        call(default_registry(), TestRequest::get().uri("/whoami")).await;

    assert_eq!(status, StatusCode::OK);
    let trace_header = trace_header.expect("trace-id header");
    assert!(Uuid::parse_str(&trace_header).is_ok());
    assert_eq!(body, trace_header);
}

#[actix_web::test]
async fn malformed_inbound_trace_id_is_replaced() {
    let req = TestRequest::get()
        .uri("/whoami")
        .insert_header((TRACE_ID_HEADER, "not-a-uuid"));
    let (_, trace_header, body) = call(default_registry(), req).await;

    let trace_header = trace_header.expect("trace-id header");
    assert_ne!(trace_header, "not-a-uuid");
    assert!(Uuid::parse_str(&trace_header).is_ok());
    assert_eq!(body, trace_header);
}

#[actix_web::test]
async fn custom_registry_governs_classification() {
    let registry = Arc::new(
        RuleRegistry::builder()
            .rule(
                FailureCategory::new("disk-full"),
                StatusCode::INSUFFICIENT_STORAGE,
                "Out Of Storage",
            )
            .build(),
    );
    let req = correlated(TestRequest::post().uri("/orders/export"));
    let (status, _, body) = call(registry, req).await;

    assert_eq!(status, StatusCode::INSUFFICIENT_STORAGE);
    let envelope: ErrorEnvelope = serde_json::from_str(&body).expect("envelope body");
    assert_eq!(envelope.title, "Out Of Storage");
    assert_eq!(envelope.detail, "volume /data full");
    assert_eq!(envelope.category, "disk-full");
}

#[actix_web::test]
async fn production_wiring_serves_probes_behind_the_boundary() {
    let state = web::Data::new(HealthState::new());
    let app = test::init_service(build_app(state.clone(), default_registry())).await;

    let res = test::call_service(
        &app,
        TestRequest::get().uri("/healthz/ready").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    state.mark_ready();
    let res = test::call_service(
        &app,
        TestRequest::get().uri("/healthz/ready").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(&app, TestRequest::get().uri("/healthz/live").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok()),
        Some("no-store")
    );
    // Every response out of the boundary carries the correlation header.
    assert!(res.headers().get(TRACE_ID_HEADER).is_some());
}
