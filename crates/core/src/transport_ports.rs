//! Transport port: the single network capability the clients depend on.
//!
//! Production code plugs in the reqwest adapter from `opsassist-infra`; tests
//! plug in [`crate::testing::RecordingTransport`].
//!
//! # Example
//!
//! ```no_run
//! use opsassist_core::Transport;
//! use opsassist_domain::{OutgoingRequest, Result};
//!
//! async fn status_of(transport: &dyn Transport, request: OutgoingRequest) -> Result<u16> {
//!     Ok(transport.send(request).await?.status.as_u16())
//! }
//! ```

use async_trait::async_trait;
use opsassist_domain::{OutgoingRequest, ResponseEnvelope, Result};

/// Sends one prepared request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatch `request` and wait for the response.
    ///
    /// Any received response is `Ok`, whatever its status; status policy
    /// belongs to the client. `Err` means no usable response: connection
    /// failure (`Network`), `request.timeout` elapsed (`Timeout`) or a request
    /// the transport could not build (`InvalidRequest`, `Encode`).
    async fn send(&self, request: OutgoingRequest) -> Result<ResponseEnvelope>;
}
