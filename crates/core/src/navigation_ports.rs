//! Navigation port used to send the user to the login boundary.

/// Host-provided navigation primitive.
pub trait Navigator: Send + Sync {
    /// Navigate to `path` (e.g. `/login`). Must not block.
    fn navigate(&self, path: &str);
}
