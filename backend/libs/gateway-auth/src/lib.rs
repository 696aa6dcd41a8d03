//! # Gateway Authentication
//!
//! Per-route authentication for the HTTP gateway, driven by the interception
//! policy of the gRPC method each route forwards to.
//!
//! ## Modules
//! - `interception`: policies and the method → policy table
//! - `authenticator`: `Authenticator` / `AuthStep` seam
//! - `jwt`: bearer-token authenticator
//! - `dispatcher`: policy resolution, step cache, actix-web middleware
//! - `route`: binds routes to gRPC methods
//! - `metrics`: Prometheus counters for authentication decisions

pub mod authenticator;
pub mod dispatcher;
pub mod interception;
pub mod jwt;
pub mod metrics;
pub mod route;

pub use authenticator::{AuthStep, Authenticator, PassThrough};
pub use dispatcher::{AuthDispatcher, Authenticate, Resolution};
pub use interception::{InterceptionPolicy, PolicyTable};
pub use jwt::{bearer_token, JwtAuthenticator};
pub use route::{mount, Binding, RouteBinder};
