//! Server construction and middleware wiring.
//!
//! [`ServerConfig`] carries the bind address and the classification registry
//! the failure boundary is parameterised with; [`build_app`] assembles the
//! application so integration tests can drive the exact production wiring
//! in memory.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use crate::domain::RuleRegistry;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::middleware::FailureBoundary;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    bind_addr: SocketAddr,
    registry: Arc<RuleRegistry>,
}

impl ServerConfig {
    /// Construct a server configuration with the default taxonomy.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            registry: Arc::new(RuleRegistry::with_defaults()),
        }
    }

    /// Replace the classification registry the boundary is built with.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<RuleRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

/// Assemble the application: failure boundary outermost, health probes.
#[must_use]
pub fn build_app(
    health_state: web::Data<HealthState>,
    registry: Arc<RuleRegistry>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .wrap(FailureBoundary::new(registry))
        .service(ready)
        .service(live)
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// The readiness probe flips to 200 once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        registry,
    } = config;

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), Arc::clone(&registry))
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_the_default_taxonomy() {
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("socket address");
        let config = ServerConfig::new(addr);
        assert_eq!(config.bind_addr(), addr);
        let defaults = RuleRegistry::with_defaults();
        assert_eq!(
            config.registry.rules().count(),
            defaults.rules().count()
        );
    }

    #[test]
    fn with_registry_replaces_the_taxonomy() {
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("socket address");
        let registry = Arc::new(RuleRegistry::builder().build());
        let config = ServerConfig::new(addr).with_registry(Arc::clone(&registry));
        assert_eq!(config.registry.rules().count(), 1);
    }
}
