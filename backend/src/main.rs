//! Backend entry-point: wires the failure boundary and health probes.

use std::env;
use std::net::SocketAddr;

use actix_web::web;

use faultline::inbound::http::health::HealthState;
use faultline::server::{ServerConfig, create_server};
use faultline::telemetry;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init();

    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .map_err(std::io::Error::other)?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, ServerConfig::new(bind_addr))?;
    server.await
}
