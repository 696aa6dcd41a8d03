//! HTTP → gRPC gateway
//!
//! Wires configuration, the authentication dispatcher, the backend channel
//! and the REST routes together. The binary only adds logging and the server.

use actix_web::web;
use anyhow::{Context, Result};
use error_types::ResponseHandler;
use gateway_auth::{AuthDispatcher, RouteBinder};
use std::sync::Arc;

pub mod clients;
pub mod config;
pub mod metrics;
pub mod rest_api;

use clients::BackendClients;
use config::Config;

/// Everything a worker needs to build its `App`
#[derive(Clone)]
pub struct GatewayState {
    pub binder: RouteBinder,
    pub clients: BackendClients,
    pub responses: ResponseHandler,
}

impl GatewayState {
    pub fn new(binder: RouteBinder, clients: BackendClients, responses: ResponseHandler) -> Self {
        Self {
            binder,
            clients,
            responses,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let authenticator = config
            .jwt
            .authenticator()
            .context("Failed to configure JWT authentication")?;
        let dispatcher = Arc::new(AuthDispatcher::new(Arc::new(authenticator)));
        let policies = Arc::new(config.policy_table());

        let clients = BackendClients::new(&config.backend)
            .with_context(|| format!("Invalid backend URL: {}", config.backend.url))?;

        Ok(Self::new(
            RouteBinder::new(dispatcher, Some(policies)),
            clients,
            ResponseHandler::new(config.mode),
        ))
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Register shared data, local endpoints and the REST API
pub fn configure(cfg: &mut web::ServiceConfig, state: &GatewayState) {
    cfg.app_data(web::Data::new(state.clients.clone()))
        .app_data(web::Data::new(state.responses))
        .route("/health", web::get().to(health_handler))
        .route("/metrics", web::get().to(metrics::metrics_handler));

    rest_api::routes(cfg, &state.binder);
}
