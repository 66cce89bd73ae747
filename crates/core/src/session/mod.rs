//! ServiceNow-backed sign-in and the persisted session it produces

pub mod error;
pub mod service;

pub use error::LoginError;
pub use service::SessionService;
