//! Configuration for the HTTP gateway
//!
//! Loads settings from, in increasing priority:
//! 1. Embedded `config/defaults.toml`
//! 2. The file named by `GATEWAY_CONFIG_PATH`, if any
//! 3. `GATEWAY__<SECTION>__<KEY>` environment variables (`.env` honoured)

use anyhow::{bail, Context, Result};
use error_types::DeploymentMode;
use gateway_auth::{InterceptionPolicy, JwtAuthenticator, PolicyTable};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

pub const CONFIG_PATH_VAR: &str = "GATEWAY_CONFIG_PATH";
const ENV_PREFIX: &str = "GATEWAY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Redaction of backend error messages
    #[serde(default)]
    pub mode: DeploymentMode,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Backend gRPC endpoint
    pub backend: BackendConfig,

    /// Interception policy per gRPC method
    #[serde(default)]
    pub policies: Vec<PolicyEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 0 means one worker per CPU
    #[serde(default)]
    pub workers: usize,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    #[serde(default)]
    pub secret: String,
    pub algorithm: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub audience: Vec<String>,
    #[serde(default)]
    pub leeway_seconds: u64,
}

// Keeps the secret out of logs
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl JwtConfig {
    /// Build the token authenticator (HMAC algorithms only)
    pub fn authenticator(&self) -> Result<JwtAuthenticator> {
        if self.secret.trim().is_empty() {
            bail!("JWT secret is not configured (set GATEWAY__JWT__SECRET)");
        }

        let algorithm = Algorithm::from_str(&self.algorithm)
            .with_context(|| format!("Unknown JWT algorithm: {}", self.algorithm))?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            bail!(
                "JWT algorithm {:?} needs a key pair; only HS256/HS384/HS512 are supported",
                algorithm
            );
        }

        let mut validation = Validation::new(algorithm);
        validation.leeway = self.leeway_seconds;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        if self.audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&self.audience);
        }

        Ok(JwtAuthenticator::new(
            DecodingKey::from_secret(self.secret.as_bytes()),
            validation,
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl BackendConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// One row of the policy table
///
/// Stored as a list because gRPC method names contain `.` and `/`, which the
/// config key syntax would split.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyEntry {
    pub method: String,
    pub policy: InterceptionPolicy,
}

impl Config {
    /// Load configuration from defaults, optional file and environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
        let config = Self::load_from(path)?;

        if config.policies.is_empty() {
            warn!("Interception policy table is empty; every routed request will fail with 500");
        }

        info!(
            mode = %config.mode,
            backend = %config.backend.url,
            policies = config.policies.len(),
            "Configuration loaded"
        );

        Ok(config)
    }

    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        let mut builder = config::Config::builder().add_source(config::File::from_str(
            include_str!("../config/defaults.toml"),
            config::FileFormat::Toml,
        ));

        if let Some(path) = path {
            if !path.exists() {
                bail!("Config file {} does not exist", path.display());
            }
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: Config = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.jwt.secret.trim().is_empty() {
            bail!("JWT secret is not configured (set GATEWAY__JWT__SECRET)");
        }

        let mut seen = std::collections::HashSet::new();
        for entry in &self.policies {
            if !seen.insert(entry.method.as_str()) {
                bail!("Duplicate interception policy for {}", entry.method);
            }
        }
        Ok(())
    }

    pub fn policy_table(&self) -> PolicyTable {
        self.policies
            .iter()
            .map(|entry| (entry.method.clone(), entry.policy))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for (key, _) in env::vars() {
            if key.starts_with("GATEWAY__") || key == CONFIG_PATH_VAR {
                env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_missing_secret_is_an_error() {
        clear_env();

        let result = Config::load_from(None);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_defaults_with_secret_from_env() {
        clear_env();
        env::set_var("GATEWAY__JWT__SECRET", "s3cret");

        let config = Config::load_from(None).unwrap();
        clear_env();

        assert_eq!(config.mode, DeploymentMode::Production);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.backend.request_timeout(), Duration::from_secs(10));

        let table = config.policy_table();
        assert_eq!(
            table.get("/grpc.health.v1.Health/Check"),
            Some(InterceptionPolicy::None)
        );
        assert_eq!(
            table.get("/grpc.health.v1.Health/Watch"),
            Some(InterceptionPolicy::RequiresAccessToken)
        );
    }

    #[test]
    #[serial]
    fn test_env_overrides_mode_and_port() {
        clear_env();
        env::set_var("GATEWAY__JWT__SECRET", "s3cret");
        env::set_var("GATEWAY__MODE", "dev");
        env::set_var("GATEWAY__SERVER__PORT", "9090");

        let config = Config::load_from(None).unwrap();
        clear_env();

        assert_eq!(config.mode, DeploymentMode::Development);
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    #[serial]
    fn test_unknown_mode_is_an_error() {
        clear_env();
        env::set_var("GATEWAY__JWT__SECRET", "s3cret");
        env::set_var("GATEWAY__MODE", "staging");

        let result = Config::load_from(None);
        clear_env();

        assert!(result.is_err());
    }

    #[test]
    fn test_asymmetric_algorithm_rejected() {
        let jwt = JwtConfig {
            secret: "s3cret".to_string(),
            algorithm: "RS256".to_string(),
            issuer: None,
            audience: vec![],
            leeway_seconds: 0,
        };
        assert!(jwt.authenticator().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let jwt = JwtConfig {
            secret: "s3cret".to_string(),
            algorithm: "HS256".to_string(),
            issuer: None,
            audience: vec![],
            leeway_seconds: 0,
        };
        assert!(!format!("{:?}", jwt).contains("s3cret"));
    }
}
