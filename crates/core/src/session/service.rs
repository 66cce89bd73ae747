//! Session service
//!
//! Signs users in by checking their ServiceNow credentials through the bare
//! client, then persists the three session keys the rest of the application
//! reads: `serviceNowAuth`, `authToken` and `userData`.

use std::sync::Arc;

use http::StatusCode;
use opsassist_domain::constants::{
    AUTH_TOKEN_KEY, SERVICE_NOW_AUTH_KEY, SERVICE_NOW_SESSION_SENTINEL, USER_DATA_KEY,
};
use opsassist_domain::{ApiError, BasicAuth, RequestOptions, Result, UserData};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::error::LoginError;
use crate::api::Api;
use crate::storage_ports::TokenStore;

const SESSION_KEYS: [&str; 3] = [AUTH_TOKEN_KEY, USER_DATA_KEY, SERVICE_NOW_AUTH_KEY];

/// Login, restore and logout over the persisted-state store.
pub struct SessionService {
    api: Api,
    store: Arc<dyn TokenStore>,
    verify_url: Option<String>,
}

impl SessionService {
    /// Session service sharing the store of `api`'s registry.
    pub fn new(api: Api, verify_url: Option<String>) -> Self {
        let store = api.registry().store().clone();
        Self { api, store, verify_url }
    }

    /// Verify `user_id`/`password` against ServiceNow and persist the session.
    ///
    /// Only a 200 answer counts as success.
    ///
    /// # Errors
    /// A classified [`LoginError`]; nothing is persisted on failure.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        user_id: &str,
        password: &str,
    ) -> std::result::Result<UserData, LoginError> {
        let verify_url = self.verify_url.as_deref().ok_or(LoginError::MissingVerifyUrl)?;
        let credentials = BasicAuth::new(user_id, password);

        let options = RequestOptions::new().basic_auth(credentials.clone());
        let response = self.api.service_now_auth(verify_url, options).await.map_err(|err| {
            warn!(kind = err.label(), "credential check failed");
            LoginError::from(err)
        })?;

        if response.status != StatusCode::OK {
            warn!(status = %response.status, "credential check answered without 200");
            return Err(LoginError::rejected(response.status, &response.data));
        }

        let user = UserData::from_user_id(user_id);
        self.store.set(SERVICE_NOW_AUTH_KEY, &encode(&credentials)?)?;
        self.store.set(AUTH_TOKEN_KEY, SERVICE_NOW_SESSION_SENTINEL)?;
        self.store.set(USER_DATA_KEY, &encode(&user)?)?;

        info!(user_id = %user.user_id, "signed in");
        Ok(user)
    }

    /// The previously signed-in user, if the persisted session is intact.
    ///
    /// A partial or unreadable session is cleared.
    pub fn restore(&self) -> Option<UserData> {
        match self.read_session() {
            Some((user, _)) => {
                info!(user_id = %user.user_id, "session restored");
                Some(user)
            }
            None => {
                if SESSION_KEYS.iter().any(|key| self.store.get(key).is_some()) {
                    warn!("discarding incomplete session");
                }
                if let Err(err) = self.clear() {
                    warn!(error = %err, "failed to clear session");
                }
                None
            }
        }
    }

    /// Forget the signed-in user.
    ///
    /// # Errors
    /// The first store failure; the remaining keys are still removed.
    pub fn logout(&self) -> Result<()> {
        self.clear()?;
        info!("signed out");
        Ok(())
    }

    /// Persisted ServiceNow credentials for basic-auth ticket queries.
    pub fn stored_credentials(&self) -> Option<BasicAuth> {
        self.read_session().map(|(_, credentials)| credentials)
    }

    fn read_session(&self) -> Option<(UserData, BasicAuth)> {
        if self.store.get(AUTH_TOKEN_KEY).as_deref() != Some(SERVICE_NOW_SESSION_SENTINEL) {
            return None;
        }
        let user = decode::<UserData>(&self.store.get(USER_DATA_KEY)?)?;
        let credentials = decode::<BasicAuth>(&self.store.get(SERVICE_NOW_AUTH_KEY)?)?;
        Some((user, credentials))
    }

    fn clear(&self) -> Result<()> {
        let mut first_error = None;
        for key in SESSION_KEYS {
            if let Err(err) = self.store.remove(key) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| ApiError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use opsassist_domain::ClientConfig;
    use serde_json::{json, Value};

    use super::*;
    use crate::client::{ClientRegistry, RegistryDeps};
    use crate::memory_store::MemoryTokenStore;
    use crate::testing::{RecordingNavigator, RecordingTransport};

    const VERIFY_URL: &str = "https://sn.example.com/api/now/table/incident?sysparm_limit=1";

    fn service(
        transport: RecordingTransport,
        store: MemoryTokenStore,
    ) -> (SessionService, Arc<RecordingTransport>, Arc<MemoryTokenStore>) {
        let transport = Arc::new(transport);
        let store = Arc::new(store);
        let deps = RegistryDeps {
            transport: transport.clone(),
            store: store.clone(),
            navigator: Arc::new(RecordingNavigator::new()),
        };
        let registry =
            ClientRegistry::new(ClientConfig::primary(), ClientConfig::secondary(), deps);
        let api = Api::new(Arc::new(registry));
        (SessionService::new(api, Some(VERIFY_URL.to_string())), transport, store)
    }

    fn signed_in_store() -> MemoryTokenStore {
        MemoryTokenStore::with_entries([
            (AUTH_TOKEN_KEY, SERVICE_NOW_SESSION_SENTINEL),
            (USER_DATA_KEY, r#"{"user_id":"jdoe","name":"jdoe","role":"User"}"#),
            (SERVICE_NOW_AUTH_KEY, r#"{"username":"jdoe","password":"pw"}"#),
        ])
    }

    #[tokio::test]
    async fn login_persists_session_keys() {
        let (service, transport, store) = service(
            RecordingTransport::new().respond_with(200, json!({"result": []})),
            MemoryTokenStore::new(),
        );

        let user = service.login("jdoe", "pw").await.unwrap();

        assert_eq!(user, UserData::from_user_id("jdoe"));
        assert_eq!(store.get(AUTH_TOKEN_KEY).as_deref(), Some(SERVICE_NOW_SESSION_SENTINEL));
        let stored: Value = serde_json::from_str(&store.get(USER_DATA_KEY).unwrap()).unwrap();
        assert_eq!(stored, json!({"user_id": "jdoe", "name": "jdoe", "role": "User"}));
        assert_eq!(service.stored_credentials(), Some(BasicAuth::new("jdoe", "pw")));

        let request = transport.last_request().unwrap();
        assert_eq!(request.url, VERIFY_URL);
        assert_eq!(request.headers.get(http::header::AUTHORIZATION).unwrap(), "Basic amRvZTpwdw==");
    }

    #[tokio::test]
    async fn failed_login_persists_nothing() {
        let (service, _, store) = service(
            RecordingTransport::new().respond_with(401, Value::Null),
            MemoryTokenStore::new(),
        );

        let err = service.login("jdoe", "wrong").await.unwrap_err();

        assert!(matches!(err, LoginError::InvalidCredentials));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn non_200_success_is_rejected() {
        let (service, _, store) = service(
            RecordingTransport::new().respond_with(204, Value::Null),
            MemoryTokenStore::new(),
        );

        let err = service.login("jdoe", "pw").await.unwrap_err();

        assert!(matches!(err, LoginError::Rejected { status: StatusCode::NO_CONTENT, .. }));
        assert!(store.get(AUTH_TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn network_failure_is_classified() {
        let transport = RecordingTransport::new().fail_with(ApiError::Network("dns".into()));
        let (service, _, _) = service(transport, MemoryTokenStore::new());

        let err = service.login("jdoe", "pw").await.unwrap_err();
        assert!(matches!(err, LoginError::Network(_)));
    }

    #[tokio::test]
    async fn login_without_verify_url_is_rejected_locally() {
        let (service, transport, _) = service(RecordingTransport::new(), MemoryTokenStore::new());
        let service = SessionService { verify_url: None, ..service };

        let err = service.login("jdoe", "pw").await.unwrap_err();

        assert!(matches!(err, LoginError::MissingVerifyUrl));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn restore_returns_intact_session() {
        let (service, _, store) = service(RecordingTransport::new(), signed_in_store());

        let user = service.restore().unwrap();

        assert_eq!(user.user_id, "jdoe");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn restore_with_corrupt_user_data_clears_everything() {
        let store = signed_in_store();
        store.set(USER_DATA_KEY, "{not json").unwrap();
        let (service, _, store) = service(RecordingTransport::new(), store);

        assert!(service.restore().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn restore_requires_sentinel_token() {
        let store = signed_in_store();
        store.set(AUTH_TOKEN_KEY, "some-jwt").unwrap();
        store.set("finopsToken", "fin").unwrap();
        let (service, _, store) = service(RecordingTransport::new(), store);

        assert!(service.restore().is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("finopsToken").as_deref(), Some("fin"));
    }

    #[test]
    fn logout_clears_session_keys_only() {
        let store = signed_in_store();
        store.set("finopsToken", "fin").unwrap();
        let (service, _, store) = service(RecordingTransport::new(), store);

        service.logout().unwrap();

        assert_eq!(store.len(), 1);
        assert!(service.stored_credentials().is_none());
    }
}
