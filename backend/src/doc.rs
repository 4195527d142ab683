//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: the health probe endpoints from the inbound layer
//! - **Schemas**: the error envelope every classified failure response uses
//!
//! The generated specification is consumed by external tooling; no UI
//! bundle is served.

use utoipa::OpenApi;

use crate::inbound::http::ErrorEnvelope;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Faultline backend API",
        description = "Classified failure envelopes, correlation headers, and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorEnvelope)),
    tags(
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
