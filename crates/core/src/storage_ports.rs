//! Persisted-state port
//!
//! Process-wide string key/value storage holding credentials and session data
//! (`authToken`, `finopsToken`, `userData`, `serviceNowAuth`). Entries have no
//! expiry; an absent key always means "unauthenticated".

use opsassist_domain::Result;

/// String-keyed persisted state.
///
/// Reads are infallible: a store that cannot read an entry reports it as
/// absent. Concurrent writers follow last-write-wins.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns `ApiError::Storage` if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<()>;
}
