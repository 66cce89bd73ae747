//! On-disk shape of the configuration file
//!
//! Every field is optional; absent values fall back to the client defaults
//! from `opsassist-domain`.

use std::collections::BTreeMap;

use opsassist_domain::{
    ApiError, AppConfig, ClientConfig, Result, ServiceNowConfig, UnauthorizedPolicy,
};
use serde::{Deserialize, Serialize};

/// Raw representation of `config.{json,toml}`
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawConfig {
    pub primary: RawClient,
    pub secondary: RawClient,
    pub service_now: RawServiceNow,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawClient {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    /// Added to the client's default headers; same-name entries win.
    pub headers: BTreeMap<String, String>,
    pub token_key: Option<String>,
    pub api_key: Option<String>,
    pub on_unauthorized: Option<UnauthorizedPolicy>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawServiceNow {
    pub verify_url: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl RawConfig {
    /// Resolve against the built-in defaults.
    ///
    /// # Errors
    /// Returns `ApiError::Config` for a zero timeout or an empty token key.
    pub fn into_app_config(self) -> Result<AppConfig> {
        let defaults = AppConfig::default();
        let primary = self.primary.apply("primary", defaults.primary)?;
        let mut secondary = self.secondary.apply("secondary", defaults.secondary)?;
        // FinOps shares the primary backend unless pointed elsewhere
        if secondary.base_url.is_none() {
            secondary.base_url.clone_from(&primary.base_url);
        }
        let service_now = self.service_now.apply(defaults.service_now)?;
        Ok(AppConfig { primary, secondary, service_now })
    }
}

impl RawClient {
    fn apply(self, section: &str, mut config: ClientConfig) -> Result<ClientConfig> {
        if let Some(base_url) = non_empty(self.base_url) {
            config.base_url = Some(base_url);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = positive(section, timeout_ms)?;
        }
        config.default_headers.extend(self.headers);
        if let Some(token_key) = self.token_key {
            if token_key.is_empty() {
                return Err(ApiError::Config(format!("{section}.token_key must not be empty")));
            }
            config.token_key = token_key;
        }
        if let Some(api_key) = non_empty(self.api_key) {
            config.api_key = Some(api_key);
        }
        if let Some(policy) = self.on_unauthorized {
            config.on_unauthorized = policy;
        }
        Ok(config)
    }
}

impl RawServiceNow {
    fn apply(self, mut config: ServiceNowConfig) -> Result<ServiceNowConfig> {
        if let Some(verify_url) = non_empty(self.verify_url) {
            config.verify_url = Some(verify_url);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = positive("service_now", timeout_ms)?;
        }
        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn positive(section: &str, timeout_ms: u64) -> Result<u64> {
    if timeout_ms == 0 {
        return Err(ApiError::Config(format!("{section}.timeout_ms must be greater than zero")));
    }
    Ok(timeout_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = RawConfig::default().into_app_config().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn headers_extend_defaults() {
        let mut raw = RawConfig::default();
        raw.primary.headers.insert("X-Client".into(), "desk".into());

        let config = raw.into_app_config().unwrap();

        assert_eq!(config.primary.default_headers.len(), 2);
        assert_eq!(config.primary.default_headers["X-Client"], "desk");
        assert_eq!(config.secondary.default_headers.len(), 1);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut raw = RawConfig::default();
        raw.secondary.timeout_ms = Some(0);
        let err = raw.into_app_config().unwrap_err();
        assert!(matches!(err, ApiError::Config(msg) if msg.starts_with("secondary.timeout_ms")));
    }

    #[test]
    fn blank_strings_are_treated_as_absent() {
        let mut raw = RawConfig::default();
        raw.primary.base_url = Some("  ".into());
        raw.primary.api_key = Some(String::new());

        let config = raw.into_app_config().unwrap();
        assert!(config.primary.base_url.is_none());
        assert!(config.primary.api_key.is_none());
    }

    #[test]
    fn secondary_inherits_primary_base_url() {
        let mut raw = RawConfig::default();
        raw.primary.base_url = Some("https://api.example.com".into());

        let config = raw.into_app_config().unwrap();
        assert_eq!(config.secondary.base_url.as_deref(), Some("https://api.example.com"));
    }

    #[test]
    fn explicit_secondary_base_url_wins() {
        let mut raw = RawConfig::default();
        raw.primary.base_url = Some("https://api.example.com".into());
        raw.secondary.base_url = Some("https://finops.example.com".into());

        let config = raw.into_app_config().unwrap();
        assert_eq!(config.secondary.base_url.as_deref(), Some("https://finops.example.com"));
    }
}
