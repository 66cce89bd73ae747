//! Request-side types
//!
//! [`RequestDescriptor`] is what the façade builds; the client merges headers,
//! runs interceptors and resolves the URL to produce an [`OutgoingRequest`]
//! for the transport.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use http::{HeaderMap, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ApiError, Result};

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as `application/json`.
    Json(Value),
    /// Serialized as `application/x-www-form-urlencoded`; must be a flat object.
    Form(Value),
    Multipart(MultipartForm),
}

/// Ordered list of multipart parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<MultipartPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    pub name: String,
    pub content: PartContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartContent {
    Text(String),
    File { file_name: String, bytes: Vec<u8>, mime: Option<String> },
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts
            .push(MultipartPart { name: name.into(), content: PartContent::Text(value.into()) });
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        mime: Option<String>,
    ) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            content: PartContent::File { file_name: file_name.into(), bytes, mime },
        });
        self
    }

    #[must_use]
    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Username/password pair for HTTP basic authentication.
///
/// Also the persisted shape of the ServiceNow credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Caller-supplied overrides spread over a request, last writer wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
    pub basic_auth: Option<BasicAuth>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn basic_auth(mut self, auth: BasicAuth) -> Self {
        self.basic_auth = Some(auth);
        self
    }
}

/// A request as shaped by a façade operation, before client policy applies.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Relative path or absolute URL; never escaped or validated.
    pub endpoint: String,
    pub method: Method,
    pub body: Option<RequestBody>,
    /// Call-level header overrides.
    pub headers: HeaderMap,
    pub basic_auth: Option<BasicAuth>,
}

impl RequestDescriptor {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            body: None,
            headers: HeaderMap::new(),
            basic_auth: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a call-level header from raw strings.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidRequest` if the name or value is not a legal
    /// header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let (name, value) = parse_header(name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Set `Authorization: Bearer <token>` as a call-level header.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidRequest` if the token contains characters that
    /// cannot appear in a header value.
    pub fn with_bearer(mut self, token: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| {
                ApiError::InvalidRequest("bearer token is not a valid header value".into())
            })?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    #[must_use]
    pub fn with_basic_auth(mut self, auth: BasicAuth) -> Self {
        self.basic_auth = Some(auth);
        self
    }

    /// Spread `options` over this descriptor.
    ///
    /// Method, body and basic auth replace the current values when set; each
    /// option header replaces the header of the same name.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidRequest` for an illegal option header.
    pub fn apply_options(mut self, options: RequestOptions) -> Result<Self> {
        if let Some(method) = options.method {
            self.method = method;
        }
        if let Some(body) = options.body {
            self.body = Some(body);
        }
        if let Some(auth) = options.basic_auth {
            self.basic_auth = Some(auth);
        }
        for (name, value) in &options.headers {
            let (name, value) = parse_header(name, value)?;
            self.headers.insert(name, value);
        }
        Ok(self)
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ApiError::InvalidRequest(format!("invalid header name: {name}")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| ApiError::InvalidRequest(format!("invalid value for header {name}")))?;
    Ok((header_name, header_value))
}

/// Fully prepared request handed to a transport.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    /// Base URL already applied.
    pub url: String,
    /// Defaults, overrides and interceptor output merged.
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
}
