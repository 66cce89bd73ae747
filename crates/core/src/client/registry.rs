//! Client registry
//!
//! Builds the two long-lived backend clients from explicit configs and shared
//! collaborators, plus a bare client without interceptors for third-party
//! credential probes.

use std::collections::BTreeMap;
use std::sync::Arc;

use opsassist_domain::constants::BARE_TIMEOUT_MS;
use opsassist_domain::{AppConfig, ClientConfig, ClientKind, UnauthorizedPolicy};
use tracing::debug;

use super::api_client::ApiClient;
use super::interceptors::{BearerTokenInterceptor, InterceptorChain, UnauthorizedInterceptor};
use crate::navigation_ports::Navigator;
use crate::storage_ports::TokenStore;
use crate::transport_ports::Transport;

/// Collaborators shared by every client.
#[derive(Clone)]
pub struct RegistryDeps {
    pub transport: Arc<dyn Transport>,
    pub store: Arc<dyn TokenStore>,
    pub navigator: Arc<dyn Navigator>,
}

/// Holds the primary, secondary and bare clients for the process lifetime.
pub struct ClientRegistry {
    primary: ApiClient,
    secondary: ApiClient,
    bare: ApiClient,
    store: Arc<dyn TokenStore>,
}

impl ClientRegistry {
    /// Build both backend clients. Infallible.
    pub fn new(primary: ClientConfig, secondary: ClientConfig, deps: RegistryDeps) -> Self {
        Self::with_bare_timeout(primary, secondary, BARE_TIMEOUT_MS, deps)
    }

    pub fn from_app_config(config: &AppConfig, deps: RegistryDeps) -> Self {
        Self::with_bare_timeout(
            config.primary.clone(),
            config.secondary.clone(),
            config.service_now.timeout_ms,
            deps,
        )
    }

    fn with_bare_timeout(
        primary: ClientConfig,
        secondary: ClientConfig,
        bare_timeout_ms: u64,
        deps: RegistryDeps,
    ) -> Self {
        let bare_config = ClientConfig {
            base_url: None,
            timeout_ms: bare_timeout_ms,
            default_headers: BTreeMap::new(),
            token_key: String::new(),
            on_unauthorized: UnauthorizedPolicy::ClearToken,
            api_key: None,
        };

        let registry = Self {
            primary: build_client(ClientKind::Primary, primary, &deps),
            secondary: build_client(ClientKind::Secondary, secondary, &deps),
            bare: ApiClient::new("bare", bare_config, deps.transport.clone()),
            store: deps.store,
        };

        debug!(
            primary_timeout_ms = registry.primary.config().timeout_ms,
            secondary_timeout_ms = registry.secondary.config().timeout_ms,
            "client registry initialised"
        );
        registry
    }

    pub fn client(&self, kind: ClientKind) -> &ApiClient {
        match kind {
            ClientKind::Primary => &self.primary,
            ClientKind::Secondary => &self.secondary,
        }
    }

    /// Client with no default headers and no interceptors.
    pub fn bare(&self) -> &ApiClient {
        &self.bare
    }

    /// The persisted-state store the interceptors read.
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }
}

fn build_client(kind: ClientKind, config: ClientConfig, deps: &RegistryDeps) -> ApiClient {
    let chain = InterceptorChain::new()
        .with(Arc::new(BearerTokenInterceptor::new(deps.store.clone(), config.token_key.clone())))
        .with(Arc::new(UnauthorizedInterceptor::from_policy(
            &config.on_unauthorized,
            deps.store.clone(),
            config.token_key.clone(),
            deps.navigator.clone(),
        )));

    ApiClient::new(kind.as_str(), config, deps.transport.clone()).with_interceptors(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryTokenStore;
    use crate::testing::{RecordingNavigator, RecordingTransport};

    fn deps() -> RegistryDeps {
        RegistryDeps {
            transport: Arc::new(RecordingTransport::new()),
            store: Arc::new(MemoryTokenStore::new()),
            navigator: Arc::new(RecordingNavigator::new()),
        }
    }

    #[test]
    fn registry_binds_each_kind_to_its_config() {
        let registry = ClientRegistry::new(
            ClientConfig::primary().with_base_url("https://primary"),
            ClientConfig::secondary().with_base_url("https://finops"),
            deps(),
        );

        let primary = registry.client(ClientKind::Primary);
        let secondary = registry.client(ClientKind::Secondary);

        assert_eq!(primary.name(), "primary");
        assert_eq!(primary.config().base_url.as_deref(), Some("https://primary"));
        assert_eq!(secondary.config().base_url.as_deref(), Some("https://finops"));
        assert_eq!(primary.interceptors().len(), 2);
        assert_eq!(secondary.interceptors().len(), 2);
    }

    #[test]
    fn bare_client_has_no_policy() {
        let mut config = AppConfig::default();
        config.service_now.timeout_ms = 12_000;
        let registry = ClientRegistry::from_app_config(&config, deps());

        let bare = registry.bare();
        assert!(bare.interceptors().is_empty());
        assert!(bare.default_headers().is_empty());
        assert_eq!(bare.config().timeout_ms, 12_000);
    }
}
