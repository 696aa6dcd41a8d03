//! Backend health endpoints (`grpc.health.v1.Health`)

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use error_types::{GatewayError, ResponseHandler, ValidationHandler};
use grpc_jwt_propagation::prepare_request;
use serde::{Deserialize, Serialize};
use tonic::Status;
use tonic_health::pb::{HealthCheckRequest, HealthCheckResponse};
use tracing::debug;

use crate::clients::BackendClients;

pub const HEALTH_CHECK_METHOD: &str = "/grpc.health.v1.Health/Check";
pub const HEALTH_WATCH_METHOD: &str = "/grpc.health.v1.Health/Watch";

/// Request body; an empty body checks the server as a whole
#[derive(Debug, Default, Deserialize)]
pub struct HealthCheckBody {
    #[serde(default)]
    pub service: String,
}

impl From<HealthCheckBody> for HealthCheckRequest {
    fn from(body: HealthCheckBody) -> Self {
        HealthCheckRequest {
            service: body.service,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatusBody {
    pub status: String,
}

impl From<HealthCheckResponse> for HealthStatusBody {
    fn from(response: HealthCheckResponse) -> Self {
        Self {
            status: response.status().as_str_name().to_string(),
        }
    }
}

/// POST /v1/health/check
pub async fn check(
    req: HttpRequest,
    body: web::Bytes,
    clients: web::Data<BackendClients>,
    responses: web::Data<ResponseHandler>,
) -> HttpResponse {
    let request = match outgoing(&req, &body, &clients, &responses) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let result = clients
        .health()
        .check(request)
        .await
        .map(|response| HealthStatusBody::from(response.into_inner()));

    responses.handle_result(result, StatusCode::OK)
}

/// POST /v1/health/watch
///
/// Returns the first status the backend streams.
pub async fn watch(
    req: HttpRequest,
    body: web::Bytes,
    clients: web::Data<BackendClients>,
    responses: web::Data<ResponseHandler>,
) -> HttpResponse {
    let request = match outgoing(&req, &body, &clients, &responses) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let result = first_status(&clients, request).await;
    responses.handle_result(result, StatusCode::OK)
}

async fn first_status(
    clients: &BackendClients,
    request: tonic::Request<HealthCheckRequest>,
) -> Result<HealthStatusBody, Status> {
    let mut stream = clients.health().watch(request).await?.into_inner();

    match stream.message().await? {
        Some(response) => Ok(response.into()),
        None => Err(Status::unavailable("health watch stream closed")),
    }
}

fn outgoing(
    req: &HttpRequest,
    body: &[u8],
    clients: &BackendClients,
    responses: &ResponseHandler,
) -> Result<tonic::Request<HealthCheckRequest>, HttpResponse> {
    let mut request = prepare_request::<HealthCheckBody>(req, body).map_err(|e| match e {
        GatewayError::Bind(err) => ValidationHandler::new(*responses).handle_error(&err),
        other => other.error_response(),
    })?;

    debug!(service = %request.get_ref().service, "Forwarding health request");
    request.set_timeout(clients.request_timeout());
    Ok(request.map(HealthCheckRequest::from))
}
