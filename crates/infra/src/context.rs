//! Application context
//!
//! Wires the production adapters into the core services once at start-up.

use std::sync::Arc;

use opsassist_core::{
    Api, ClientRegistry, Navigator, RegistryDeps, SessionService, TokenStore, Transport,
};
use opsassist_domain::{AppConfig, Result};
use tracing::info;

use crate::http::ReqwestTransport;

/// Process-wide handles to the API façade and the session service.
pub struct AppContext {
    pub api: Api,
    pub session: SessionService,
}

impl AppContext {
    /// Build with the reqwest transport.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the HTTP client cannot be built.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(config, transport, store, navigator))
    }

    /// Build over an explicit transport.
    pub fn with_transport(
        config: &AppConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let registry =
            ClientRegistry::from_app_config(config, RegistryDeps { transport, store, navigator });
        let api = Api::new(Arc::new(registry));
        let session = SessionService::new(api.clone(), config.service_now.verify_url.clone());

        info!(
            primary = config.primary.base_url.as_deref().unwrap_or("<relative>"),
            secondary = config.secondary.base_url.as_deref().unwrap_or("<relative>"),
            "application context ready"
        );
        Self { api, session }
    }
}
