//! [`Navigator`] adapter for headless hosts.

use opsassist_core::Navigator;
use parking_lot::Mutex;
use tracing::info;

/// Logs each redirect and remembers the latest target for the host to act on.
#[derive(Debug, Default)]
pub struct TracingNavigator {
    last_target: Mutex<Option<String>>,
}

impl TracingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_target(&self) -> Option<String> {
        self.last_target.lock().clone()
    }

    /// Return and clear the pending target.
    pub fn take_target(&self) -> Option<String> {
        self.last_target.lock().take()
    }
}

impl Navigator for TracingNavigator {
    fn navigate(&self, path: &str) {
        info!(target_path = %path, "navigation requested");
        *self.last_target.lock() = Some(path.to_string());
    }
}
