//! Backend client bound to one [`ClientConfig`]
//!
//! A client turns a [`RequestDescriptor`] into an [`OutgoingRequest`]
//! (header merge, interceptors, basic auth, base URL, timeout), sends it
//! through the injected [`Transport`] and maps non-2xx responses to
//! `ApiError::Status`. No retries.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::HeaderMap;
use opsassist_domain::{
    ApiError, BasicAuth, ClientConfig, OutgoingRequest, RequestDescriptor, ResponseEnvelope,
    Result,
};
use tracing::{debug, warn};

use super::interceptors::InterceptorChain;
use crate::transport_ports::Transport;

/// Pre-configured HTTP client.
pub struct ApiClient {
    name: &'static str,
    config: ClientConfig,
    default_headers: HeaderMap,
    transport: Arc<dyn Transport>,
    interceptors: InterceptorChain,
}

impl ApiClient {
    /// Create a client without interceptors.
    ///
    /// Default headers that are not legal HTTP headers are logged and dropped;
    /// construction never fails.
    pub fn new(name: &'static str, config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let default_headers = build_default_headers(name, &config.default_headers);
        Self { name, config, default_headers, transport, interceptors: InterceptorChain::new() }
    }

    #[must_use]
    pub fn with_interceptors(mut self, interceptors: InterceptorChain) -> Self {
        self.interceptors = interceptors;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    /// Apply client policy to `request` without sending it.
    ///
    /// Order: defaults merged with call-level headers (call-level wins),
    /// request interceptors, basic auth (replaces any `Authorization`), base
    /// URL. Bodiless requests carry no `Content-Type`.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidRequest` if the basic-auth header cannot be
    /// encoded.
    pub fn prepare(&self, mut request: RequestDescriptor) -> Result<OutgoingRequest> {
        let overrides = std::mem::take(&mut request.headers);
        request.headers = self.default_headers.clone();
        // same-name entries are replaced, not appended
        request.headers.extend(overrides);

        self.interceptors.apply_request(&mut request);

        if let Some(auth) = request.basic_auth.take() {
            request.headers.insert(AUTHORIZATION, basic_auth_header(&auth)?);
        }

        if request.body.is_none() {
            request.headers.remove(CONTENT_TYPE);
        }

        Ok(OutgoingRequest {
            url: resolve_url(self.config.base_url.as_deref(), &request.endpoint),
            method: request.method,
            headers: request.headers,
            body: request.body,
            timeout: self.config.timeout(),
        })
    }

    /// Prepare and send `request`.
    ///
    /// Every failure is shown to the error interceptors and then returned as
    /// is.
    ///
    /// # Errors
    /// `ApiError::Status` for non-2xx responses, otherwise whatever the
    /// transport reported.
    pub async fn execute(&self, request: RequestDescriptor) -> Result<ResponseEnvelope> {
        let outgoing = self.prepare(request)?;
        let method = outgoing.method.clone();
        let url = outgoing.url.clone();

        debug!(client = self.name, %method, %url, "sending HTTP request");

        let outcome = self.transport.send(outgoing).await.and_then(|response| {
            if response.is_success() {
                Ok(response)
            } else {
                Err(ApiError::Status(Box::new(response)))
            }
        });

        match &outcome {
            Ok(response) => {
                debug!(
                    client = self.name,
                    %method,
                    %url,
                    status = %response.status,
                    "received HTTP response"
                );
            }
            Err(err) => {
                debug!(
                    client = self.name,
                    %method,
                    %url,
                    kind = err.label(),
                    error = %err,
                    "HTTP request failed"
                );
                self.interceptors.apply_error(err);
            }
        }

        outcome
    }
}

/// Join `endpoint` onto `base_url`.
///
/// Absolute endpoints (`scheme://` or `//`) and clients without a base URL
/// use the endpoint unchanged. Otherwise exactly one `/` separates the two.
pub fn resolve_url(base_url: Option<&str>, endpoint: &str) -> String {
    match base_url {
        Some(base) if !base.is_empty() && !is_absolute_url(endpoint) => {
            if endpoint.is_empty() {
                base.to_string()
            } else {
                format!("{}/{}", base.trim_end_matches('/'), endpoint.trim_start_matches('/'))
            }
        }
        _ => endpoint.to_string(),
    }
}

fn is_absolute_url(url: &str) -> bool {
    if url.starts_with("//") {
        return true;
    }
    url.split_once("://").is_some_and(|(scheme, _)| {
        scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

fn basic_auth_header(auth: &BasicAuth) -> Result<HeaderValue> {
    let encoded = STANDARD.encode(format!("{}:{}", auth.username, auth.password));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|_| ApiError::InvalidRequest("basic auth header could not be encoded".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

fn build_default_headers(client: &str, headers: &BTreeMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => warn!(client, header = %name, "dropping invalid default header"),
        }
    }
    map
}
