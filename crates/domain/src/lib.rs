//! # OpsAssist Domain
//!
//! Data types shared by every layer of the OpsAssist HTTP façade.
//!
//! This crate contains:
//! - Error type and Result definition
//! - Client and application configuration structures
//! - Request/response data model
//! - Persisted-state keys and defaults
//!
//! ## Architecture
//! - No dependencies on other OpsAssist crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
