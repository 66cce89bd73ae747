use std::time::Duration;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use opsassist_core::Transport;
use opsassist_domain::{
    ApiError, MultipartForm, OutgoingRequest, PartContent, RequestBody, ResponseEnvelope, Result,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::errors::InfraError;

/// [`Transport`] backed by a shared reqwest client.
///
/// Each request carries its own timeout; the client applies no retries and no
/// status handling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    fn prepare(&self, request: OutgoingRequest) -> Result<RequestBuilder> {
        let OutgoingRequest { method, url, mut headers, body, timeout } = request;

        if matches!(body, Some(RequestBody::Multipart(_))) {
            // reqwest writes the boundary-carrying content type itself
            headers.remove(CONTENT_TYPE);
        }

        let builder = self.client.request(method, url.as_str()).timeout(timeout).headers(headers);

        Ok(match body {
            None => builder,
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Form(value)) => builder.form(&form_pairs(&value)?),
            Some(RequestBody::Multipart(form)) => builder.multipart(multipart_form(form)?),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<ResponseEnvelope> {
        let timeout = request.timeout;
        let builder = self.prepare(request)?;
        let request = builder.build().map_err(|err| ApiError::from(InfraError::from(err)))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, timeout_ms = timeout.as_millis(), "dispatching HTTP request");

        let response = self.client.execute(request).await.map_err(|err| send_error(err, timeout))?;

        let status = response.status();
        let headers: HeaderMap = response.headers().clone();
        let body = response.bytes().await.map_err(|err| send_error(err, timeout))?;
        debug!(%method, %url, %status, bytes = body.len(), "received HTTP response");

        Ok(ResponseEnvelope::from_body(status, headers, &body))
    }
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    user_agent: String,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self { user_agent: concat!("opsassist/", env!("CARGO_PKG_VERSION")).to_string() }
    }
}

impl ReqwestTransportBuilder {
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// # Errors
    /// Returns `ApiError::Config` if the reqwest client cannot be built.
    pub fn build(self) -> Result<ReqwestTransport> {
        let client = ReqwestClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(self.user_agent)
            .no_proxy()
            .build()
            .map_err(|err| ApiError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(ReqwestTransport { client })
    }
}

fn send_error(err: reqwest::Error, timeout: Duration) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout(timeout);
    }
    InfraError::from(err).into()
}

/// Flatten a JSON object into urlencoded pairs.
///
/// Null fields are skipped; nested values cannot be form-encoded.
fn form_pairs(value: &Value) -> Result<Vec<(String, String)>> {
    let Value::Object(fields) = value else {
        return Err(ApiError::Encode("form body must be a JSON object".into()));
    };

    let mut pairs = Vec::with_capacity(fields.len());
    for (name, field) in fields {
        let encoded = match field {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            Value::Bool(_) | Value::Number(_) => field.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(ApiError::Encode(format!("form field {name} must be a scalar")));
            }
        };
        pairs.push((name.clone(), encoded));
    }
    Ok(pairs)
}

fn multipart_form(form: MultipartForm) -> Result<Form> {
    let mut multipart = Form::new();
    for part in form.parts().iter().cloned() {
        multipart = match part.content {
            PartContent::Text(text) => multipart.text(part.name, text),
            PartContent::File { file_name, bytes, mime } => {
                let mut file = Part::bytes(bytes).file_name(file_name);
                if let Some(mime) = mime {
                    file = file.mime_str(&mime).map_err(|_| {
                        ApiError::InvalidRequest(format!(
                            "invalid MIME type for part {}: {mime}",
                            part.name
                        ))
                    })?;
                }
                multipart.part(part.name, file)
            }
        };
    }
    Ok(multipart)
}
