use actix_web::{middleware::Logger, App, HttpServer};
use anyhow::Context;
use http_gateway::config::Config;
use http_gateway::{configure, GatewayState};
use tracing::info;
use tracing_subscriber::prelude::*;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Structured JSON logs for log aggregation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,http_gateway=debug,gateway_auth=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    info!("Starting HTTP gateway...");

    let config = Config::load()?;
    let state = GatewayState::from_config(&config)?;

    let bind_addr = config.server.bind_addr();
    let workers = config.server.worker_count();
    info!(%bind_addr, workers, mode = %config.mode, "HTTP gateway listening");

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(Logger::default())
            .configure(move |cfg| configure(cfg, &state))
    })
    .workers(workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await
    .context("HTTP server terminated with an error")
}
