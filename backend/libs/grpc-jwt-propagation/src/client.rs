//! Client-side JWT Interceptor
//!
//! Injects the caller's bearer token into outgoing gRPC requests via metadata.

use tonic::metadata::{AsciiMetadataValue, MetadataMap};
use tonic::service::Interceptor;
use tonic::{Request, Status};

/// Metadata key carrying the bearer token
pub const AUTHORIZATION_METADATA_KEY: &str = "authorization";

/// Scheme prefix of the authorization value
pub const BEARER_PREFIX: &str = "Bearer";

/// Client-side interceptor that injects JWT tokens into gRPC metadata
///
/// The header value is formatted and validated once at construction, so
/// every call only clones it.
///
/// ## Usage
///
/// ```rust,no_run
/// use grpc_jwt_propagation::JwtClientInterceptor;
/// use tonic::transport::Channel;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let interceptor = JwtClientInterceptor::new("eyJhbGc...")?;
///
/// let channel = Channel::from_static("http://[::1]:50051")
///     .connect()
///     .await?;
///
/// // let mut client = SomeServiceClient::with_interceptor(channel, interceptor);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct JwtClientInterceptor {
    /// Pre-formatted "Bearer {token}" value
    auth_header: AsciiMetadataValue,
}

impl JwtClientInterceptor {
    /// Create a new JWT client interceptor
    ///
    /// ## Errors
    ///
    /// Returns `Status::internal` if the token is not valid header text.
    /// Valid JWTs (base64url) never fail this check.
    pub fn new(jwt_token: impl AsRef<str>) -> Result<Self, Status> {
        let value = format!("{} {}", BEARER_PREFIX, jwt_token.as_ref());
        let auth_header = value.parse::<AsciiMetadataValue>().map_err(|_| {
            tracing::warn!("Bearer token contains invalid metadata characters");
            Status::internal("invalid bearer token")
        })?;

        Ok(Self { auth_header })
    }

    /// Extract the authorization value from request metadata
    pub fn extract_from_metadata(metadata: &MetadataMap) -> Result<&AsciiMetadataValue, Status> {
        metadata
            .get(AUTHORIZATION_METADATA_KEY)
            .ok_or_else(|| Status::unauthenticated("Missing authorization header"))
    }

    /// Attach the authorization header to a typed request
    pub fn attach<T>(&self, mut request: Request<T>) -> Request<T> {
        request
            .metadata_mut()
            .insert(AUTHORIZATION_METADATA_KEY, self.auth_header.clone());
        request
    }
}

impl Interceptor for JwtClientInterceptor {
    fn call(&mut self, request: Request<()>) -> Result<Request<()>, Status> {
        Ok(self.attach(request))
    }
}
