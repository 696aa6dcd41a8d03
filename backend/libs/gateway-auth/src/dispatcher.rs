//! Authentication dispatcher
//!
//! Resolves the interception policy of the gRPC method behind a route and
//! runs the matching authentication step before the route handler.
//!
//! - No policy table, or no entry for the method: 500, handler never runs
//! - `none` policy: request passes untouched
//! - Anything else: the step built for the method decides (401 or pass)
//!
//! Steps are memoized per (method, policy). The cache is a `DashMap`, so
//! concurrent first requests to the same method still build the step exactly
//! once. Keying on the policy as well keeps routes that share a dispatcher but
//! carry different tables from reusing each other's step.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
};
use dashmap::DashMap;
use error_types::{GatewayError, GatewayResult};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::authenticator::{AuthStep, Authenticator};
use crate::interception::{InterceptionPolicy, PolicyTable};
use crate::metrics::{self, Decision};

/// Outcome of policy resolution for one method
#[derive(Clone)]
pub enum Resolution {
    Bypass,
    Authenticate(Arc<dyn AuthStep>),
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Bypass => f.write_str("Bypass"),
            Resolution::Authenticate(_) => f.write_str("Authenticate"),
        }
    }
}

type StepKey = (String, InterceptionPolicy);

pub struct AuthDispatcher {
    authenticator: Arc<dyn Authenticator>,
    steps: DashMap<StepKey, Arc<dyn AuthStep>>,
}

impl AuthDispatcher {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            authenticator,
            steps: DashMap::new(),
        }
    }

    /// Resolve what must run for `grpc_method`
    ///
    /// ## Errors
    ///
    /// `MissingPolicyTable` / `MissingMethodPolicy` when configuration is
    /// incomplete. Neither is ever treated as an implicit policy.
    pub fn resolve(
        &self,
        grpc_method: &str,
        policies: Option<&PolicyTable>,
    ) -> GatewayResult<Resolution> {
        let Some(policies) = policies else {
            error!(grpc_method, "Missing gRPC interceptions");
            return Err(GatewayError::MissingPolicyTable);
        };

        let Some(policy) = policies.get(grpc_method) else {
            warn!(grpc_method, "Missing gRPC method in interceptions");
            return Err(GatewayError::MissingMethodPolicy {
                method: grpc_method.to_string(),
            });
        };

        if policy == InterceptionPolicy::None {
            return Ok(Resolution::Bypass);
        }

        Ok(Resolution::Authenticate(self.step_for(grpc_method, policy)))
    }

    fn step_for(&self, grpc_method: &str, policy: InterceptionPolicy) -> Arc<dyn AuthStep> {
        let key = (grpc_method.to_string(), policy);
        if let Some(step) = self.steps.get(&key) {
            return Arc::clone(step.value());
        }

        // The entry holds the shard lock while building
        let entry = self.steps.entry(key).or_insert_with(|| {
            debug!(grpc_method, ?policy, "Building authentication step");
            metrics::record_step_built();
            self.authenticator.build_step(policy)
        });
        Arc::clone(entry.value())
    }

    /// Number of memoized steps
    pub fn cached_steps(&self) -> usize {
        self.steps.len()
    }

    /// Middleware enforcing the policy of `grpc_method` on one route
    pub fn authenticate(
        self: &Arc<Self>,
        grpc_method: impl Into<String>,
        policies: Option<Arc<PolicyTable>>,
    ) -> Authenticate {
        Authenticate {
            dispatcher: Arc::clone(self),
            grpc_method: Arc::from(grpc_method.into()),
            policies,
        }
    }

    /// Run resolution and the step against a request
    pub fn check(
        &self,
        grpc_method: &str,
        policies: Option<&PolicyTable>,
        req: &ServiceRequest,
    ) -> GatewayResult<()> {
        let result = match self.resolve(grpc_method, policies) {
            Ok(Resolution::Bypass) => {
                metrics::record_decision(Decision::Bypass);
                return Ok(());
            }
            Ok(Resolution::Authenticate(step)) => step.authenticate(req),
            Err(e) => Err(e),
        };

        let decision = match &result {
            Ok(()) => Decision::Authenticated,
            Err(e) if e.is_configuration() => Decision::Misconfigured,
            Err(e) => {
                debug!(grpc_method, error = %e, "Request rejected by authentication step");
                Decision::Rejected
            }
        };
        metrics::record_decision(decision);
        result
    }
}

/// Per-route authentication middleware
#[derive(Clone)]
pub struct Authenticate {
    dispatcher: Arc<AuthDispatcher>,
    grpc_method: Arc<str>,
    policies: Option<Arc<PolicyTable>>,
}

impl Authenticate {
    pub fn grpc_method(&self) -> &str {
        &self.grpc_method
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authenticate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthenticateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateService {
            service: Rc::new(service),
            dispatcher: Arc::clone(&self.dispatcher),
            grpc_method: Arc::clone(&self.grpc_method),
            policies: self.policies.clone(),
        }))
    }
}

pub struct AuthenticateService<S> {
    service: Rc<S>,
    dispatcher: Arc<AuthDispatcher>,
    grpc_method: Arc<str>,
    policies: Option<Arc<PolicyTable>>,
}

impl<S, B> Service<ServiceRequest> for AuthenticateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let checked = self
            .dispatcher
            .check(&self.grpc_method, self.policies.as_deref(), &req);

        if let Err(e) = checked {
            let response = HttpResponse::from_error(e).map_into_right_body();
            return Box::pin(async move { Ok(req.into_response(response)) });
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
