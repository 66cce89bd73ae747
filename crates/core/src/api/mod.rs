//! Named request operations used by UI-facing callers

pub mod facade;

pub use facade::Api;
