//! Authenticator seam
//!
//! An `Authenticator` turns a policy into an `AuthStep`; the step is what runs
//! against each request. Steps are built once per gRPC method and shared
//! across workers, hence `Send + Sync`.

use actix_web::dev::ServiceRequest;
use error_types::{GatewayError, GatewayResult};
use std::sync::Arc;

use crate::interception::InterceptionPolicy;

/// Enforces one policy against a request
///
/// `Ok(())` lets the request through; an error short-circuits it with the
/// error's response. A step may store identity data in request extensions.
pub trait AuthStep: Send + Sync {
    fn authenticate(&self, req: &ServiceRequest) -> GatewayResult<()>;
}

/// Builds the step enforcing a policy
pub trait Authenticator: Send + Sync {
    fn build_step(&self, policy: InterceptionPolicy) -> Arc<dyn AuthStep>;
}

/// Step that lets every request through
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl AuthStep for PassThrough {
    fn authenticate(&self, _req: &ServiceRequest) -> GatewayResult<()> {
        Ok(())
    }
}

impl<F> AuthStep for F
where
    F: Fn(&ServiceRequest) -> Result<(), GatewayError> + Send + Sync,
{
    fn authenticate(&self, req: &ServiceRequest) -> GatewayResult<()> {
        self(req)
    }
}
