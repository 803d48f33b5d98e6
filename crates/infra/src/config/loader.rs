//! Configuration loader
//!
//! Loads dispatcher configuration from files and environment variables.
//!
//! ## Loading Strategy
//! 1. Probes a few well-known paths for a config file
//! 2. Parses it when found (JSON or TOML), otherwise starts from defaults
//! 3. Overlays environment variables on top
//!
//! ## Environment Variables
//! - `CLOUDAPI_CA_BUNDLE`: Path to a PEM bundle of additional trusted CAs
//! - `CLOUDAPI_TIMEOUT_SECS`: Request timeout in seconds
//! - `CLOUDAPI_REDIRECT`: Default maximum number of redirects
//! - `CLOUDAPI_NO_VERIFY_PEER`: Disable TLS peer verification (true/false)
//! - `CLOUDAPI_INCLUDE_HEADER`: Keep raw response headers (true/false)
//! - `CLOUDAPI_DISPLAY`: Print results to standard output (true/false)
//! - `CLOUDAPI_USER_AGENT`: User agent sent with every request
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./cloudapi.toml` or `./cloudapi.json` (current working directory)
//! 2. `../cloudapi.toml` or `../cloudapi.json` (parent directory)
//! 3. `../../cloudapi.toml` or `../../cloudapi.json` (grandparent directory)

use std::path::{Path, PathBuf};
use std::str::FromStr;

use cloudapi_domain::{CloudApiError, Result};

use super::DispatcherConfig;

/// Load configuration from the first config file found, then overlay the
/// environment
///
/// # Errors
/// Returns `CloudApiError::Config` if a config file exists but cannot be
/// parsed, or an environment variable holds an invalid value.
pub fn load() -> Result<DispatcherConfig> {
    let base = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            DispatcherConfig::default()
        }
    };
    load_from_env(base)
}

/// Overlay environment variables on `base`
///
/// Unset variables leave the corresponding field untouched.
///
/// # Errors
/// Returns `CloudApiError::Config` if a variable holds an invalid value.
pub fn load_from_env(base: DispatcherConfig) -> Result<DispatcherConfig> {
    let config = apply_env(base, |key| std::env::var(key).ok())?;
    tracing::debug!("Environment overrides applied");
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CloudApiError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<DispatcherConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CloudApiError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CloudApiError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CloudApiError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<DispatcherConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CloudApiError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CloudApiError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(CloudApiError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;

    ["", "..", "../.."]
        .iter()
        .map(|dir| cwd.join(dir))
        .flat_map(|dir| [dir.join("cloudapi.toml"), dir.join("cloudapi.json")])
        .find(|path| path.exists())
}

fn apply_env<F>(mut config: DispatcherConfig, lookup: F) -> Result<DispatcherConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("CLOUDAPI_CA_BUNDLE") {
        config.ca_bundle = Some(PathBuf::from(path));
    }
    if let Some(secs) = parse_var(&lookup, "CLOUDAPI_TIMEOUT_SECS")? {
        config.timeout_secs = Some(secs);
    }
    if let Some(max) = parse_var(&lookup, "CLOUDAPI_REDIRECT")? {
        config.defaults.redirect = Some(max);
    }
    if let Some(enabled) = bool_var(&lookup, "CLOUDAPI_NO_VERIFY_PEER")? {
        config.defaults.no_verify_peer = Some(enabled);
    }
    if let Some(enabled) = bool_var(&lookup, "CLOUDAPI_INCLUDE_HEADER")? {
        config.defaults.include_header = Some(enabled);
    }
    if let Some(enabled) = bool_var(&lookup, "CLOUDAPI_DISPLAY")? {
        config.defaults.display = Some(enabled);
    }
    if let Some(agent) = lookup("CLOUDAPI_USER_AGENT") {
        config.user_agent = Some(agent);
    }
    Ok(config)
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| CloudApiError::Config(format!("Invalid {}: {}", key, e)))
        })
        .transpose()
}

/// Parse a boolean variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn bool_var<F>(lookup: &F, key: &str) -> Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(CloudApiError::Config(format!("Invalid {}: {:?}", key, other))),
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_every_field() {
        let lookup = lookup_from(&[
            ("CLOUDAPI_CA_BUNDLE", "/etc/ssl/cloudapi.pem"),
            ("CLOUDAPI_TIMEOUT_SECS", "45"),
            ("CLOUDAPI_REDIRECT", "3"),
            ("CLOUDAPI_NO_VERIFY_PEER", "yes"),
            ("CLOUDAPI_INCLUDE_HEADER", "0"),
            ("CLOUDAPI_DISPLAY", "TRUE"),
            ("CLOUDAPI_USER_AGENT", "ops-bot/1.0"),
        ]);

        let config = apply_env(DispatcherConfig::default(), lookup).unwrap();
        assert_eq!(config.ca_bundle, Some(PathBuf::from("/etc/ssl/cloudapi.pem")));
        assert_eq!(config.timeout_secs, Some(45));
        assert_eq!(config.defaults.redirect, Some(3));
        assert_eq!(config.defaults.no_verify_peer, Some(true));
        assert_eq!(config.defaults.include_header, Some(false));
        assert_eq!(config.defaults.display, Some(true));
        assert_eq!(config.user_agent.as_deref(), Some("ops-bot/1.0"));
    }

    #[test]
    fn unset_variables_keep_base_values() {
        let mut base = DispatcherConfig::default();
        base.timeout_secs = Some(10);
        base.defaults.redirect = Some(1);

        let config = apply_env(base.clone(), lookup_from(&[])).unwrap();
        assert_eq!(config, base);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let result = apply_env(
            DispatcherConfig::default(),
            lookup_from(&[("CLOUDAPI_TIMEOUT_SECS", "soon")]),
        );
        assert!(
            matches!(result, Err(CloudApiError::Config(msg)) if msg.contains("CLOUDAPI_TIMEOUT_SECS"))
        );

        let result = apply_env(
            DispatcherConfig::default(),
            lookup_from(&[("CLOUDAPI_NO_VERIFY_PEER", "maybe")]),
        );
        assert!(matches!(result, Err(CloudApiError::Config(_))));
    }

    #[test]
    fn load_from_env_reads_process_environment() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("CLOUDAPI_REDIRECT", "2");
        let config = load_from_env(DispatcherConfig::default());
        std::env::remove_var("CLOUDAPI_REDIRECT");

        assert_eq!(config.unwrap().defaults.redirect, Some(2));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let result = parse_config("defaults = {}", Path::new("cloudapi.yaml"));
        assert!(matches!(result, Err(CloudApiError::Config(msg)) if msg.contains("yaml")));
    }
}
