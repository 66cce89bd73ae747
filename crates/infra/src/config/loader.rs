//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment if one exists
//! 2. Attempts to load from environment variables
//! 3. If `OPSASSIST_API_URL` is unset, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `OPSASSIST_API_URL`: Primary backend base URL (required)
//! - `OPSASSIST_FINOPS_URL`: Secondary (FinOps) backend base URL
//! - `OPSASSIST_PRIMARY_TIMEOUT_MS`: Primary client timeout in milliseconds
//! - `OPSASSIST_SECONDARY_TIMEOUT_MS`: Secondary client timeout in milliseconds
//! - `OPSASSIST_API_KEY`: Static key sent by `get_call_auth`
//! - `OPSASSIST_LOGIN_PATH`: Where a primary 401 redirects to
//! - `OPSASSIST_SERVICENOW_VERIFY_URL`: Credential check used at sign-in
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./opsassist.json` or `./opsassist.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use opsassist_domain::{ApiError, AppConfig, Result, UnauthorizedPolicy};

use super::raw::{RawClient, RawConfig, RawServiceNow};
use crate::errors::InfraError;

pub const ENV_API_URL: &str = "OPSASSIST_API_URL";
pub const ENV_FINOPS_URL: &str = "OPSASSIST_FINOPS_URL";
pub const ENV_PRIMARY_TIMEOUT_MS: &str = "OPSASSIST_PRIMARY_TIMEOUT_MS";
pub const ENV_SECONDARY_TIMEOUT_MS: &str = "OPSASSIST_SECONDARY_TIMEOUT_MS";
pub const ENV_API_KEY: &str = "OPSASSIST_API_KEY";
pub const ENV_LOGIN_PATH: &str = "OPSASSIST_LOGIN_PATH";
pub const ENV_SERVICENOW_VERIFY_URL: &str = "OPSASSIST_SERVICENOW_VERIFY_URL";

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables (after reading `.env`).
/// If the required variable is missing, falls back to a config file.
///
/// # Errors
/// Returns `ApiError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A value is out of range
pub fn load() -> Result<AppConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!(error = %e, "Could not load .env file"),
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) if is_missing_required(&e) => {
            tracing::debug!(error = %e, "Environment incomplete, trying file");
            load_from_file(None)
        }
        Err(e) => Err(e),
    }
}

/// Load configuration from environment variables
///
/// `OPSASSIST_API_URL` must be present; everything else falls back to the
/// client defaults.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `ApiError::Config` if the required variable is missing or a
/// timeout is not a positive integer.
pub fn load_from_env() -> Result<AppConfig> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// [`load_from_env`] over an arbitrary variable source.
///
/// Empty values count as unset.
///
/// # Errors
/// As [`load_from_env`].
pub fn load_from_lookup<F>(lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let api_url = var(ENV_API_URL).ok_or_else(|| {
        ApiError::Config(format!("Missing required environment variable: {ENV_API_URL}"))
    })?;

    let primary = RawClient {
        base_url: Some(api_url),
        timeout_ms: var(ENV_PRIMARY_TIMEOUT_MS)
            .map(|raw| parse_millis(ENV_PRIMARY_TIMEOUT_MS, &raw))
            .transpose()?,
        api_key: var(ENV_API_KEY),
        on_unauthorized: var(ENV_LOGIN_PATH)
            .map(|login_path| UnauthorizedPolicy::ClearTokenAndRedirect { login_path }),
        ..RawClient::default()
    };

    let secondary = RawClient {
        base_url: var(ENV_FINOPS_URL),
        timeout_ms: var(ENV_SECONDARY_TIMEOUT_MS)
            .map(|raw| parse_millis(ENV_SECONDARY_TIMEOUT_MS, &raw))
            .transpose()?,
        ..RawClient::default()
    };

    let service_now =
        RawServiceNow { verify_url: var(ENV_SERVICENOW_VERIFY_URL), ..RawServiceNow::default() };

    RawConfig { primary, secondary, service_now }.into_app_config()
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `ApiError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ApiError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ApiError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ApiError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`); files without
/// an extension are read as JSON.
///
/// # Errors
/// Returns `ApiError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let raw: RawConfig = match extension {
        "toml" => toml::from_str(contents).map_err(|e| ApiError::from(InfraError::from(e)))?,
        "json" => serde_json::from_str(contents)
            .map_err(|e| ApiError::Config(format!("Invalid JSON format: {e}")))?,
        _ => return Err(ApiError::Config(format!("Unsupported config format: {extension}"))),
    };

    raw.into_app_config()
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./config.{json,toml}`,
///    `./opsassist.{json,toml}`)
/// 2. Parent directories (up to 2 levels)
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("opsassist.json"),
        dir.join("opsassist.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

fn parse_millis(key: &str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ApiError::Config(format!("{key} must be greater than zero"))),
        Ok(ms) => Ok(ms),
        Err(e) => Err(ApiError::Config(format!("Invalid value for {key}: {e}"))),
    }
}

fn is_missing_required(err: &ApiError) -> bool {
    matches!(err, ApiError::Config(msg) if msg.starts_with("Missing required environment variable"))
}
