//! Faultline backend library modules.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod server;
pub mod telemetry;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
pub use middleware::FailureBoundary;
