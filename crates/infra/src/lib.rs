//! # OpsAssist Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest-backed HTTP transport
//! - Persisted-state stores (JSON file)
//! - A logging navigator for headless hosts
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `opsassist-core`
//! - Depends on `opsassist-domain` and `opsassist-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod config;
pub mod context;
pub mod errors;
pub mod http;
pub mod logging;
pub mod navigation;
pub mod storage;

// Re-export commonly used items
pub use context::AppContext;
pub use errors::InfraError;
pub use crate::http::{ReqwestTransport, ReqwestTransportBuilder};
pub use logging::{init_tracing, LogFormat};
pub use navigation::TracingNavigator;
pub use storage::FileTokenStore;
