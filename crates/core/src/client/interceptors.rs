//! Request/response interceptors
//!
//! Each client owns an [`InterceptorChain`]. Request hooks run after default
//! and call-level headers are merged, right before dispatch. Error hooks see
//! every failure of the call and never alter it; the client returns the
//! original error to the caller afterwards.

use std::fmt;
use std::sync::Arc;

use http::header::{HeaderValue, AUTHORIZATION};
use opsassist_domain::{ApiError, RequestDescriptor, UnauthorizedPolicy};
use tracing::{debug, warn};

use crate::navigation_ports::Navigator;
use crate::storage_ports::TokenStore;

/// Cross-cutting hook pair applied to every request of a client.
///
/// Hooks are infallible and stateless per request.
pub trait Interceptor: Send + Sync {
    /// Mutate the request before dispatch.
    fn on_request(&self, _request: &mut RequestDescriptor) {}

    /// Observe a failed call.
    fn on_error(&self, _error: &ApiError) {}
}

/// Ordered list of interceptors.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn apply_request(&self, request: &mut RequestDescriptor) {
        for interceptor in &self.interceptors {
            interceptor.on_request(request);
        }
    }

    pub fn apply_error(&self, error: &ApiError) {
        for interceptor in &self.interceptors {
            interceptor.on_error(error);
        }
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain").field("len", &self.interceptors.len()).finish()
    }
}

/// Sets `Authorization: Bearer <token>` from the persisted store.
///
/// A stored token replaces any `Authorization` header already on the request.
/// An absent or empty token leaves the headers untouched.
pub struct BearerTokenInterceptor {
    store: Arc<dyn TokenStore>,
    token_key: String,
}

impl BearerTokenInterceptor {
    pub fn new(store: Arc<dyn TokenStore>, token_key: impl Into<String>) -> Self {
        Self { store, token_key: token_key.into() }
    }
}

impl Interceptor for BearerTokenInterceptor {
    fn on_request(&self, request: &mut RequestDescriptor) {
        let Some(token) = self.store.get(&self.token_key).filter(|token| !token.is_empty()) else {
            return;
        };

        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => {
                warn!(
                    token_key = %self.token_key,
                    "stored token is not a valid header value; skipping"
                );
            }
        }
    }
}

/// Clears the stored token on 401 and optionally redirects to the login page.
pub struct UnauthorizedInterceptor {
    store: Arc<dyn TokenStore>,
    token_key: String,
    redirect: Option<(Arc<dyn Navigator>, String)>,
}

impl UnauthorizedInterceptor {
    /// Only clear the token.
    pub fn clear_token(store: Arc<dyn TokenStore>, token_key: impl Into<String>) -> Self {
        Self { store, token_key: token_key.into(), redirect: None }
    }

    /// Clear the token and navigate to `login_path`.
    pub fn clear_and_redirect(
        store: Arc<dyn TokenStore>,
        token_key: impl Into<String>,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        Self { store, token_key: token_key.into(), redirect: Some((navigator, login_path.into())) }
    }

    pub fn from_policy(
        policy: &UnauthorizedPolicy,
        store: Arc<dyn TokenStore>,
        token_key: impl Into<String>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        match policy {
            UnauthorizedPolicy::ClearToken => Self::clear_token(store, token_key),
            UnauthorizedPolicy::ClearTokenAndRedirect { login_path } => {
                Self::clear_and_redirect(store, token_key, navigator, login_path.clone())
            }
        }
    }
}

impl Interceptor for UnauthorizedInterceptor {
    fn on_error(&self, error: &ApiError) {
        if !error.is_unauthorized() {
            return;
        }

        warn!(token_key = %self.token_key, "unauthorized response; clearing stored token");
        if let Err(err) = self.store.remove(&self.token_key) {
            warn!(token_key = %self.token_key, error = %err, "failed to clear stored token");
        }

        if let Some((navigator, login_path)) = &self.redirect {
            debug!(login_path = %login_path, "redirecting to login");
            navigator.navigate(login_path);
        }
    }
}
