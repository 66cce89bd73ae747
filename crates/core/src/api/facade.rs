//! API façade
//!
//! The fixed vocabulary of request-shaping operations used by callers instead
//! of building [`RequestDescriptor`]s themselves. Each operation picks a
//! client, a method, a body encoding and the auth override, then hands the
//! result of the call back without retrying or remapping errors.
//!
//! Endpoint and id are joined by plain concatenation; callers own path and
//! query composition.

use std::fmt::Display;
use std::sync::Arc;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use opsassist_domain::constants::{
    API_KEY_SCHEME, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE, MULTIPART_CONTENT_TYPE,
};
use opsassist_domain::{
    ApiError, ClientKind, MultipartForm, RequestBody, RequestDescriptor, RequestOptions,
    ResponseEnvelope, Result,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::client::{ApiClient, ClientRegistry};

/// Named request operations over the client registry.
#[derive(Clone)]
pub struct Api {
    registry: Arc<ClientRegistry>,
}

impl Api {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    fn primary(&self) -> &ApiClient {
        self.registry.client(ClientKind::Primary)
    }

    fn secondary(&self) -> &ApiClient {
        self.registry.client(ClientKind::Secondary)
    }

    /// GET `endpoint` and return `response.data.data`.
    ///
    /// # Errors
    /// Propagates transport and status errors.
    #[instrument(skip(self))]
    pub async fn get_data(&self, endpoint: &str) -> Result<Value> {
        let response = self.primary().execute(RequestDescriptor::get(endpoint)).await?;
        Ok(response.into_nested_data())
    }

    /// [`Api::get_data`] deserialized into `T`.
    ///
    /// # Errors
    /// Additionally `ApiError::Decode` when the payload does not match `T`.
    pub async fn get_data_as<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        decode(self.get_data(endpoint).await?)
    }

    /// GET `url`, full response.
    ///
    /// # Errors
    /// Propagates transport and status errors.
    #[instrument(skip(self))]
    pub async fn get_call(&self, url: &str) -> Result<ResponseEnvelope> {
        self.primary().execute(RequestDescriptor::get(url)).await
    }

    /// GET `url` with `options` spread over the request.
    ///
    /// Options may change the method, add a body, headers or basic auth.
    ///
    /// # Errors
    /// `ApiError::InvalidRequest` for illegal option headers; otherwise
    /// transport and status errors.
    #[instrument(skip(self, options))]
    pub async fn get_call_options(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope> {
        let request = RequestDescriptor::get(url).apply_options(options)?;
        self.primary().execute(request).await
    }

    /// GET `url` with the static API-key authorization header.
    ///
    /// A stored bearer token still replaces this header.
    ///
    /// # Errors
    /// `ApiError::Config` when the primary client has no API key configured;
    /// otherwise transport and status errors.
    #[instrument(skip(self))]
    pub async fn get_call_auth(&self, url: &str) -> Result<ResponseEnvelope> {
        let client = self.primary();
        let api_key = client
            .config()
            .api_key
            .as_deref()
            .ok_or_else(|| {
                ApiError::Config("no API key configured for the primary client".into())
            })?;

        let request = RequestDescriptor::get(url)
            .with_header(AUTHORIZATION.as_str(), &format!("{API_KEY_SCHEME} {api_key}"))?;
        client.execute(request).await
    }

    /// POST a JSON body to `url`.
    ///
    /// # Errors
    /// `ApiError::Encode` if `body` cannot be serialized; otherwise transport
    /// and status errors.
    #[instrument(skip(self, body))]
    pub async fn post_call<B>(&self, url: &str, body: &B) -> Result<ResponseEnvelope>
    where
        B: Serialize + ?Sized,
    {
        let request = RequestDescriptor::post(url).with_body(json_body(body)?);
        self.primary().execute(request).await
    }

    /// POST a multipart form to `url`.
    ///
    /// `Content-Type` is always `multipart/form-data`.
    ///
    /// # Errors
    /// Propagates transport and status errors.
    #[instrument(skip(self, form), fields(parts = form.parts().len()))]
    pub async fn post_image(&self, url: &str, form: MultipartForm) -> Result<ResponseEnvelope> {
        let request = RequestDescriptor::post(url)
            .with_body(RequestBody::Multipart(form))
            .with_header(CONTENT_TYPE.as_str(), MULTIPART_CONTENT_TYPE)?;
        self.primary().execute(request).await
    }

    /// POST a JSON body to `endpoint`.
    ///
    /// # Errors
    /// `ApiError::Encode` if `body` cannot be serialized; otherwise transport
    /// and status errors.
    #[instrument(skip(self, body))]
    pub async fn post_data<B>(&self, endpoint: &str, body: &B) -> Result<ResponseEnvelope>
    where
        B: Serialize + ?Sized,
    {
        let request = RequestDescriptor::post(endpoint).with_body(json_body(body)?);
        self.primary().execute(request).await
    }

    /// POST a form-encoded body to `endpoint` on the secondary client.
    ///
    /// No per-call authorization; the secondary client's stored token applies
    /// if present.
    ///
    /// # Errors
    /// `ApiError::Encode` if `body` cannot be serialized; otherwise transport
    /// and status errors.
    #[instrument(skip(self, body))]
    pub async fn post_auth_data<B>(&self, endpoint: &str, body: &B) -> Result<ResponseEnvelope>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        let request = RequestDescriptor::post(endpoint)
            .with_body(RequestBody::Form(body))
            .with_header(CONTENT_TYPE.as_str(), FORM_CONTENT_TYPE)?
            .with_header(ACCEPT.as_str(), JSON_CONTENT_TYPE)?;
        self.secondary().execute(request).await
    }

    /// POST a JSON body to `endpoint` on the secondary client with an explicit
    /// bearer token.
    ///
    /// # Errors
    /// `ApiError::InvalidRequest` if `token` is not a legal header value;
    /// otherwise as [`Api::post_data`].
    #[instrument(skip(self, body, token))]
    pub async fn post_finops_data<B>(
        &self,
        endpoint: &str,
        body: &B,
        token: &str,
    ) -> Result<ResponseEnvelope>
    where
        B: Serialize + ?Sized,
    {
        let request =
            RequestDescriptor::post(endpoint).with_body(json_body(body)?).with_bearer(token)?;
        self.secondary().execute(request).await
    }

    /// GET `endpoint` followed directly by `id` and return `response.data.data`.
    ///
    /// # Errors
    /// Propagates transport and status errors.
    #[instrument(skip(self, id), fields(id = %id))]
    pub async fn get_data_by_id(&self, endpoint: &str, id: impl Display) -> Result<Value> {
        let response =
            self.primary().execute(RequestDescriptor::get(format!("{endpoint}{id}"))).await?;
        Ok(response.into_nested_data())
    }

    /// [`Api::get_data_by_id`] deserialized into `T`.
    ///
    /// # Errors
    /// Additionally `ApiError::Decode` when the payload does not match `T`.
    pub async fn get_data_by_id_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        id: impl Display,
    ) -> Result<T> {
        decode(self.get_data_by_id(endpoint, id).await?)
    }

    /// PUT a JSON body to `endpoint` followed directly by `id`.
    ///
    /// # Errors
    /// `ApiError::Encode` if `body` cannot be serialized; otherwise transport
    /// and status errors.
    #[instrument(skip(self, body, id), fields(id = %id))]
    pub async fn put_data<B>(
        &self,
        endpoint: &str,
        body: &B,
        id: impl Display,
    ) -> Result<ResponseEnvelope>
    where
        B: Serialize + ?Sized,
    {
        let request = RequestDescriptor::put(format!("{endpoint}{id}")).with_body(json_body(body)?);
        self.primary().execute(request).await
    }

    /// POST a JSON body to `url` with `options` spread over the request.
    ///
    /// An options body replaces `body`; an options method replaces POST.
    ///
    /// # Errors
    /// `ApiError::Encode` / `ApiError::InvalidRequest` for bad input;
    /// otherwise transport and status errors.
    #[instrument(skip(self, options, body))]
    pub async fn post_call_options<B>(
        &self,
        url: &str,
        options: RequestOptions,
        body: &B,
    ) -> Result<ResponseEnvelope>
    where
        B: Serialize + ?Sized,
    {
        let request =
            RequestDescriptor::post(url).with_body(json_body(body)?).apply_options(options)?;
        self.primary().execute(request).await
    }

    /// GET `url` through the bare client, typically with basic-auth options.
    ///
    /// Bypasses default headers, stored tokens and 401 handling.
    ///
    /// # Errors
    /// Propagates transport and status errors.
    #[instrument(skip(self, options))]
    pub async fn service_now_auth(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope> {
        let request = RequestDescriptor::get(url).apply_options(options)?;
        self.registry.bare().execute(request).await
    }

    /// POST a JSON body to `endpoint` on the primary client with an optional
    /// explicit bearer token.
    ///
    /// # Errors
    /// As [`Api::post_finops_data`].
    #[instrument(skip(self, body, token))]
    pub async fn post_tech_assist_data<B>(
        &self,
        endpoint: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<ResponseEnvelope>
    where
        B: Serialize + ?Sized,
    {
        let mut request = RequestDescriptor::post(endpoint)
            .with_body(json_body(body)?)
            .with_header(CONTENT_TYPE.as_str(), JSON_CONTENT_TYPE)?;
        if let Some(token) = token {
            request = request.with_bearer(token)?;
        }
        self.primary().execute(request).await
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody> {
    serde_json::to_value(body).map(RequestBody::Json).map_err(|e| ApiError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
