//! Client and application configuration structures
//!
//! Configs are built once at process start and handed to the client registry
//! explicitly; nothing here reads the environment.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AUTH_TOKEN_KEY, BARE_TIMEOUT_MS, DEFAULT_LOGIN_PATH, FINOPS_TOKEN_KEY, JSON_CONTENT_TYPE,
    PRIMARY_TIMEOUT_MS, SECONDARY_TIMEOUT_MS,
};

/// Which of the two long-lived backend clients to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// Main application backend.
    Primary,
    /// FinOps backend.
    Secondary,
}

impl ClientKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reaction of a client to a 401 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum UnauthorizedPolicy {
    /// Remove the client's stored token.
    ClearToken,
    /// Remove the stored token and navigate to the login boundary.
    ClearTokenAndRedirect { login_path: String },
}

/// Configuration of one backend client.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix for relative endpoints; absolute URLs bypass it.
    pub base_url: Option<String>,
    pub timeout_ms: u64,
    /// Headers attached to every request; call-level headers win on conflict.
    pub default_headers: BTreeMap<String, String>,
    /// Persisted-state key holding this client's bearer token.
    pub token_key: String,
    pub on_unauthorized: UnauthorizedPolicy,
    /// Static key sent by `get_call_auth`.
    pub api_key: Option<String>,
}

impl ClientConfig {
    /// Defaults of the main application client.
    #[must_use]
    pub fn primary() -> Self {
        Self {
            base_url: None,
            timeout_ms: PRIMARY_TIMEOUT_MS,
            default_headers: json_headers(),
            token_key: AUTH_TOKEN_KEY.to_string(),
            on_unauthorized: UnauthorizedPolicy::ClearTokenAndRedirect {
                login_path: DEFAULT_LOGIN_PATH.to_string(),
            },
            api_key: None,
        }
    }

    /// Defaults of the FinOps client.
    #[must_use]
    pub fn secondary() -> Self {
        Self {
            base_url: None,
            timeout_ms: SECONDARY_TIMEOUT_MS,
            default_headers: json_headers(),
            token_key: FINOPS_TOKEN_KEY.to_string(),
            on_unauthorized: UnauthorizedPolicy::ClearToken,
            api_key: None,
        }
    }

    /// Defaults for `kind`.
    #[must_use]
    pub fn for_kind(kind: ClientKind) -> Self {
        match kind {
            ClientKind::Primary => Self::primary(),
            ClientKind::Secondary => Self::secondary(),
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::primary()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("default_headers", &self.default_headers)
            .field("token_key", &self.token_key)
            .field("on_unauthorized", &self.on_unauthorized)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn json_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())])
}

/// ServiceNow credential check used by the login flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceNowConfig {
    /// Cheap table query answered with 200 for valid basic-auth credentials.
    pub verify_url: Option<String>,
    pub timeout_ms: u64,
}

impl Default for ServiceNowConfig {
    fn default() -> Self {
        Self { verify_url: None, timeout_ms: BARE_TIMEOUT_MS }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub primary: ClientConfig,
    pub secondary: ClientConfig,
    pub service_now: ServiceNowConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            primary: ClientConfig::primary(),
            secondary: ClientConfig::secondary(),
            service_now: ServiceNowConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_defaults_differ_by_kind() {
        let primary = ClientConfig::for_kind(ClientKind::Primary);
        let secondary = ClientConfig::for_kind(ClientKind::Secondary);

        assert_eq!(primary.timeout(), Duration::from_secs(900));
        assert_eq!(secondary.timeout(), Duration::from_secs(30));
        assert_eq!(primary.token_key, "authToken");
        assert_eq!(secondary.token_key, "finopsToken");
        assert_eq!(
            primary.on_unauthorized,
            UnauthorizedPolicy::ClearTokenAndRedirect { login_path: "/login".into() }
        );
        assert_eq!(secondary.on_unauthorized, UnauthorizedPolicy::ClearToken);
        assert_eq!(
            primary.default_headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = ClientConfig::primary().with_api_key("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn unauthorized_policy_serializes_with_mode_tag() {
        let policy = UnauthorizedPolicy::ClearTokenAndRedirect { login_path: "/signin".into() };
        let value = serde_json::to_value(&policy).unwrap();
        assert_eq!(value["mode"], "clear_token_and_redirect");
        assert_eq!(value["login_path"], "/signin");
    }
}
