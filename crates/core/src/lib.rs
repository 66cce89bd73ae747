//! # OpsAssist Core
//!
//! Request pipeline and session logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for transport, persisted state and navigation
//! - The client registry and its interceptor chain
//! - The API façade and the session service
//!
//! ## Architecture Principles
//! - Only depends on `opsassist-domain`
//! - No sockets, files or environment access
//! - All external effects via traits
//! - Exercised in tests through recording fakes

pub mod api;
pub mod client;
pub mod memory_store;
pub mod session;

// Infrastructure ports
pub mod navigation_ports;
pub mod storage_ports;
pub mod transport_ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use api::Api;
pub use client::{
    ApiClient, BearerTokenInterceptor, ClientRegistry, Interceptor, InterceptorChain,
    RegistryDeps, UnauthorizedInterceptor,
};
pub use memory_store::MemoryTokenStore;
pub use navigation_ports::Navigator;
pub use session::{LoginError, SessionService};
pub use storage_ports::TokenStore;
pub use transport_ports::Transport;
