/// REST API Module
///
/// HTTP endpoints that translate JSON requests into gRPC calls on the backend.
/// Each route is bound to the gRPC method it forwards to; that binding decides
/// which authentication runs before the handler.
///
/// ```text
/// Client (HTTP JSON)
///     ↓
/// Authenticate (per-route policy)
///     ↓
/// REST API Handler (this module)
///     ↓
/// gRPC Client → Backend
/// ```
use actix_web::http::Method;
use actix_web::web;
use gateway_auth::RouteBinder;

pub mod health;

pub use health::{HEALTH_CHECK_METHOD, HEALTH_WATCH_METHOD};

pub fn routes(cfg: &mut web::ServiceConfig, binder: &RouteBinder) {
    binder.mount(
        cfg,
        Method::POST,
        "/v1/health/check",
        HEALTH_CHECK_METHOD,
        web::post().to(health::check),
    );
    binder.mount(
        cfg,
        Method::POST,
        "/v1/health/watch",
        HEALTH_WATCH_METHOD,
        web::post().to(health::watch),
    );
}
