//! Application constants
//!
//! Centralized location for the storage keys, defaults and header values shared
//! by every layer of the workspace.

// Persisted-state keys
pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const FINOPS_TOKEN_KEY: &str = "finopsToken";
pub const USER_DATA_KEY: &str = "userData";
pub const SERVICE_NOW_AUTH_KEY: &str = "serviceNowAuth";

/// Value written to `authToken` after a successful ServiceNow credential check.
pub const SERVICE_NOW_SESSION_SENTINEL: &str = "servicenow-authenticated";
pub const DEFAULT_USER_ROLE: &str = "User";

// Client defaults
pub const PRIMARY_TIMEOUT_MS: u64 = 900_000;
pub const SECONDARY_TIMEOUT_MS: u64 = 30_000;
pub const BARE_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_LOGIN_PATH: &str = "/login";

// Content types
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// Scheme prefix of the static API-key authorization header.
pub const API_KEY_SCHEME: &str = "key";
