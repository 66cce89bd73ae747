//! Response envelope returned by every client call

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{ApiError, Result};

/// Status, headers and decoded body of a response.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body, a JSON string for non-JSON bodies, `Null` when empty.
    pub data: Value,
}

impl ResponseEnvelope {
    pub fn new(status: StatusCode, data: Value) -> Self {
        Self { status, headers: HeaderMap::new(), data }
    }

    /// Build an envelope from raw body bytes.
    ///
    /// Bodies that parse as JSON become that value; anything else is kept as a
    /// (lossily decoded) string.
    pub fn from_body(status: StatusCode, headers: HeaderMap, body: &[u8]) -> Self {
        let data = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice::<Value>(body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
        };
        Self { status, headers, data }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The nested `data.data` field used by list and detail endpoints.
    #[must_use]
    pub fn nested_data(&self) -> Option<&Value> {
        self.data.get("data")
    }

    /// Take `data.data` by value; `Null` when the payload has no such field.
    #[must_use]
    pub fn into_nested_data(self) -> Value {
        match self.data {
            Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Deserialize the whole payload.
    ///
    /// # Errors
    /// Returns `ApiError::Decode` if the payload does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.data.clone()).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
