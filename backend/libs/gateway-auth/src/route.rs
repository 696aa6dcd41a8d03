//! Route binding
//!
//! Pairs an HTTP route with the gRPC method it forwards to. The binder holds
//! no policy logic; it only asks the dispatcher for the route's middleware.

use actix_web::http::Method;
use actix_web::{guard, web, Route};
use std::sync::Arc;
use tracing::debug;

use crate::dispatcher::{AuthDispatcher, Authenticate};
use crate::interception::PolicyTable;

/// (path, authentication middleware, handler)
pub type Binding = (String, Authenticate, Route);

#[derive(Clone)]
pub struct RouteBinder {
    dispatcher: Arc<AuthDispatcher>,
    policies: Option<Arc<PolicyTable>>,
}

impl RouteBinder {
    pub fn new(dispatcher: Arc<AuthDispatcher>, policies: Option<Arc<PolicyTable>>) -> Self {
        Self {
            dispatcher,
            policies,
        }
    }

    pub fn bind(&self, path: impl Into<String>, grpc_method: &str, handler: Route) -> Binding {
        (
            path.into(),
            self.dispatcher.authenticate(grpc_method, self.policies.clone()),
            handler,
        )
    }

    /// Bind and register in one go
    pub fn mount(
        &self,
        cfg: &mut web::ServiceConfig,
        method: Method,
        path: impl Into<String>,
        grpc_method: &str,
        handler: Route,
    ) {
        mount(cfg, method, self.bind(path, grpc_method, handler));
    }
}

/// Register a binding as a resource guarded by `method`
///
/// The guard lets several bindings share a path with different HTTP methods.
pub fn mount(cfg: &mut web::ServiceConfig, method: Method, binding: Binding) {
    let (path, authenticate, handler) = binding;
    debug!(%path, %method, grpc_method = authenticate.grpc_method(), "Mounting route");
    cfg.service(
        web::resource(path)
            .guard(guard::Method(method))
            .wrap(authenticate)
            .route(handler),
    );
}
