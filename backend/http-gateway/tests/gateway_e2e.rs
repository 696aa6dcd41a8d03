use actix_web::http::StatusCode;
use actix_web::{test, App};
use error_types::{DeploymentMode, ResponseHandler};
use gateway_auth::{AuthDispatcher, InterceptionPolicy, JwtAuthenticator, PolicyTable, RouteBinder};
use grpc_jwt_propagation::{JwtClaims, TokenKind};
use http_gateway::clients::BackendClients;
use http_gateway::config::BackendConfig;
use http_gateway::rest_api::{HEALTH_CHECK_METHOD, HEALTH_WATCH_METHOD};
use http_gateway::{configure, GatewayState};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic_health::server::HealthReporter;
use tonic_health::ServingStatus;

const SECRET: &[u8] = b"e2e-secret";

/// In-process grpc.health.v1 backend on an ephemeral port
async fn start_backend() -> (SocketAddr, HealthReporter) {
    let (mut reporter, service) = tonic_health::server::health_reporter();
    reporter
        .set_service_status("users", ServingStatus::NotServing)
        .await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        Server::builder()
            .add_service(service)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
    });

    (addr, reporter)
}

fn gateway_state(addr: SocketAddr, mode: DeploymentMode) -> GatewayState {
    let backend = BackendConfig {
        url: format!("http://{}", addr),
        connect_timeout_ms: 1000,
        request_timeout_ms: 2000,
    };
    let clients = BackendClients::new(&backend).unwrap();

    let policies: PolicyTable = [
        (HEALTH_CHECK_METHOD, InterceptionPolicy::None),
        (HEALTH_WATCH_METHOD, InterceptionPolicy::RequiresAccessToken),
    ]
    .into_iter()
    .collect();
    let dispatcher = Arc::new(AuthDispatcher::new(Arc::new(JwtAuthenticator::from_secret(
        SECRET,
    ))));

    GatewayState::new(
        RouteBinder::new(dispatcher, Some(Arc::new(policies))),
        clients,
        ResponseHandler::new(mode),
    )
}

fn access_token() -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        sub: "user-1".to_string(),
        iat: now,
        exp: now + 600,
        token_type: TokenKind::Access,
        email: None,
        jti: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap()
}

#[actix_web::test]
async fn test_public_check_reaches_backend() {
    let (addr, _reporter) = start_backend().await;
    let state = gateway_state(addr, DeploymentMode::Production);
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    // Empty body checks the server as a whole
    let req = test::TestRequest::post().uri("/v1/health/check").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": "SERVING"}));

    let req = test::TestRequest::post()
        .uri("/v1/health/check")
        .set_json(json!({"service": "users"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": "NOT_SERVING"}));
}

#[actix_web::test]
async fn test_unknown_service_is_not_found() {
    let (addr, _reporter) = start_backend().await;
    let state = gateway_state(addr, DeploymentMode::Production);
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::post()
        .uri("/v1/health/check")
        .set_json(json!({"service": "billing"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));
}

#[actix_web::test]
async fn test_malformed_body_is_bad_request() {
    let (addr, _reporter) = start_backend().await;
    let state = gateway_state(addr, DeploymentMode::Production);
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::post()
        .uri("/v1/health/check")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_watch_requires_access_token() {
    let (addr, _reporter) = start_backend().await;
    let state = gateway_state(addr, DeploymentMode::Production);
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::post().uri("/v1/health/watch").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/v1/health/watch")
        .insert_header(("Authorization", format!("Bearer {}", access_token())))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": "SERVING"}));
}

#[actix_web::test]
async fn test_unreachable_backend_is_redacted_in_production() {
    // Bind and drop to get a port nobody listens on
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let state = gateway_state(addr, DeploymentMode::Production);
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::post().uri("/v1/health/check").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_server_error());
    let body: serde_json::Value = test::read_body_json(resp).await;
    let message = body["error"].as_str().unwrap_or_default().to_string();
    assert!(
        message == "service unavailable" || message == "internal server error",
        "unexpected body: {}",
        message
    );
}

#[actix_web::test]
async fn test_liveness_and_metrics_endpoints() {
    let (addr, _reporter) = start_backend().await;
    let state = gateway_state(addr, DeploymentMode::Development);
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "ok");

    // One authenticated-route decision so the counters have samples
    let req = test::TestRequest::post().uri("/v1/health/watch").to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("gateway_auth_decisions_total"));
}
