//! Client configuration.
//!
//! Loaded from YAML (or built in code) and then overridden from the
//! environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `STUDIO_RPC_ENDPOINT` | `endpoint` |
//! | `STUDIO_RPC_TIMEOUT_SECS` | `timeout_secs` |
//! | `STUDIO_RPC_PROXY_URL` | `proxy_url` |
//! | `STUDIO_RPC_MAX_ATTEMPTS` | `retry.max_attempts` |
//! | `STUDIO_RPC_CREDENTIAL_PLACEMENT` | `credential_placement` |
//!
//! ```yaml
//! endpoint: https://script.google.com/macros/s/XXXX/exec
//! credential_placement: embedded
//! retry:
//!   max_attempts: 4
//!   base_delay_ms: 500
//! actions:
//!   archiveTask: { method: POST }
//! ```

use crate::actions::ActionDescriptor;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Where the bearer credential travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialPlacement {
    /// `Authorization: Bearer` header on every request; POST bodies also carry `token`.
    #[default]
    Header,
    /// No custom headers: `token` query parameter for GET, `token` body field for POST.
    Embedded,
}

impl std::str::FromStr for CredentialPlacement {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "header" => Ok(Self::Header),
            "embedded" => Ok(Self::Embedded),
            other => Err(format!(
                "unknown credential placement '{other}' (expected header or embedded)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_login_redirect_delay_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub credential_placement: CredentialPlacement,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_concurrency: Option<usize>,
    #[serde(default = "default_login_redirect_delay_ms")]
    pub login_redirect_delay_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    /// Descriptor overrides merged over the default action catalog.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub actions: HashMap<String, ActionDescriptor>,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_secs: default_timeout_secs(),
            credential_placement: CredentialPlacement::default(),
            retry: RetryConfig::default(),
            batch_concurrency: None,
            login_redirect_delay_ms: default_login_redirect_delay_ms(),
            proxy_url: None,
            actions: HashMap::new(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration(
                format!("invalid configuration: {e}"),
                ErrorContext::new().with_source("config_loader"),
            )
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&raw)
    }

    /// Apply `STUDIO_RPC_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("STUDIO_RPC_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(raw) = lookup("STUDIO_RPC_TIMEOUT_SECS") {
            self.timeout_secs = parse_override("STUDIO_RPC_TIMEOUT_SECS", &raw)?;
        }
        if let Some(proxy) = lookup("STUDIO_RPC_PROXY_URL") {
            self.proxy_url = Some(proxy);
        }
        if let Some(raw) = lookup("STUDIO_RPC_MAX_ATTEMPTS") {
            self.retry.max_attempts = parse_override("STUDIO_RPC_MAX_ATTEMPTS", &raw)?;
        }
        if let Some(raw) = lookup("STUDIO_RPC_CREDENTIAL_PLACEMENT") {
            self.credential_placement = parse_override("STUDIO_RPC_CREDENTIAL_PLACEMENT", &raw)?;
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn login_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.login_redirect_delay_ms)
    }
}

fn parse_override<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        Error::configuration(
            format!("invalid value '{raw}': {e}"),
            ErrorContext::new()
                .with_field_path(key)
                .with_source("env_override"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpMethod;

    #[test]
    fn minimal_yaml_uses_defaults() {
        let cfg = ClientConfig::from_yaml_str("endpoint: https://backend.test/exec").unwrap();
        assert_eq!(cfg, ClientConfig::new("https://backend.test/exec"));
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.credential_placement, CredentialPlacement::Header);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.login_redirect_delay(), Duration::from_secs(2));
    }

    #[test]
    fn full_yaml() {
        let yaml = r#"
endpoint: https://backend.test/exec
timeout_secs: 10
credential_placement: embedded
retry:
  max_attempts: 5
  base_delay_ms: 250
batch_concurrency: 4
actions:
  archiveTask:
    method: POST
    retryable: false
"#;
        let cfg = ClientConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.credential_placement, CredentialPlacement::Embedded);
        assert_eq!(cfg.retry.max_attempts, 5);
        assert_eq!(cfg.retry.base_delay_ms, 250);
        assert_eq!(cfg.retry.max_delay_ms, 30_000);
        assert_eq!(cfg.batch_concurrency, Some(4));
        let archive = cfg.actions["archiveTask"];
        assert_eq!(archive.method, HttpMethod::Post);
        assert!(!archive.retryable);
        assert!(archive.requires_auth);
    }

    #[test]
    fn missing_endpoint_is_a_configuration_error() {
        let err = ClientConfig::from_yaml_str("timeout_secs: 5").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }

    #[test]
    fn overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("STUDIO_RPC_ENDPOINT", "https://other.test/exec"),
            ("STUDIO_RPC_MAX_ATTEMPTS", "7"),
            ("STUDIO_RPC_CREDENTIAL_PLACEMENT", "Embedded"),
        ]
        .into_iter()
        .collect();
        let cfg = ClientConfig::new("https://backend.test/exec")
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(cfg.endpoint, "https://other.test/exec");
        assert_eq!(cfg.retry.max_attempts, 7);
        assert_eq!(cfg.credential_placement, CredentialPlacement::Embedded);
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn bad_override_names_the_variable() {
        let err = ClientConfig::new("https://backend.test/exec")
            .with_overrides(|k| (k == "STUDIO_RPC_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("STUDIO_RPC_TIMEOUT_SECS")
        );
    }
}
