//! Backend gRPC clients
//!
//! One lazily-connected `Channel` is shared by every worker; HTTP/2
//! multiplexing handles concurrency. Each outgoing request carries its own
//! deadline on top of the channel's connect timeout.

use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tonic_health::pb::health_client::HealthClient;
use tracing::info;

use crate::config::BackendConfig;

#[derive(Clone)]
pub struct BackendClients {
    channel: Channel,
    request_timeout: Duration,
}

impl BackendClients {
    /// Build the channel without connecting; the first call connects
    pub fn new(config: &BackendConfig) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(config.url.clone())?
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .tcp_nodelay(true)
            .connect_lazy();

        info!(
            url = %config.url,
            connect_timeout_ms = config.connect_timeout_ms,
            request_timeout_ms = config.request_timeout_ms,
            "Backend channel configured"
        );

        Ok(Self {
            channel,
            request_timeout: config.request_timeout(),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn health(&self) -> HealthClient<Channel> {
        HealthClient::new(self.channel.clone())
    }
}
