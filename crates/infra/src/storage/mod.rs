//! Persisted-state store adapters

pub mod file_store;

pub use file_store::FileTokenStore;
