//! Shared configuration for the stockroom CLI and TUI.
//!
//! TOML profiles with environment overrides, and translation to
//! `stockroom_core::CatalogConfig`. Both binaries depend on this crate;
//! the CLI layers its global flags on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockroom_core::{CatalogConfig, DEFAULT_API_URL, FavoritesPolicy, TlsVerification};

/// Profile used when nothing else selects one.
pub const DEFAULT_PROFILE: &str = "default";

/// Prefix for environment overrides (`STOCKROOM_DEFAULTS__TIMEOUT=60`).
pub const ENV_PREFIX: &str = "STOCKROOM_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub favorites_policy: FavoritesPolicy,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            favorites_policy: FavoritesPolicy::default(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

/// A named catalog API profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// API root (e.g., "http://localhost:5000").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Path to custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Where the session token and favorites cache are kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// Override favorites reconciliation policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorites_policy: Option<FavoritesPolicy>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            ca_cert: None,
            insecure: None,
            timeout: None,
            store_path: None,
            favorites_policy: None,
        }
    }
}

impl Config {
    /// Pick the profile name: explicit override, then `default_profile`,
    /// then [`DEFAULT_PROFILE`].
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.into())
    }

    /// Look up a profile. The default profile exists implicitly so a fresh
    /// install talks to the default API URL without any config file.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(p) => Ok(p.clone()),
            None if name == DEFAULT_PROFILE => Ok(Profile::default()),
            None => Err(ConfigError::ProfileNotFound { name: name.into() }),
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "stockroom", "stockroom")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory for local state (key-value store, logs).
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(dirs_fallback, |dirs| dirs.data_dir().to_path_buf())
}

/// Default key-value store location for a profile. The default profile
/// uses `store.json`; others get `store-<name>.json` so sessions stay apart.
pub fn default_store_path(profile_name: &str) -> PathBuf {
    if profile_name == DEFAULT_PROFILE {
        data_dir().join("store.json")
    } else {
        data_dir().join(format!("store-{profile_name}.json"))
    }
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("stockroom");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file, then apply `STOCKROOM_` environment overrides.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to core ─────────────────────────────────────────────

/// Build a `CatalogConfig` from a profile and the global defaults.
pub fn profile_to_catalog_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<CatalogConfig, ConfigError> {
    let api_url: url::Url = profile
        .api_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", profile.api_url),
        })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(CatalogConfig {
        api_url,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        favorites_policy: profile
            .favorites_policy
            .unwrap_or(defaults.favorites_policy),
    })
}

/// Store path for a profile: its explicit `store_path`, else the default.
pub fn resolve_store_path(profile: &Profile, profile_name: &str) -> PathBuf {
    profile
        .store_path
        .clone()
        .unwrap_or_else(|| default_store_path(profile_name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
default_profile = "staging"

[defaults]
output = "json"
timeout = 10
favorites_policy = "optimistic"

[profiles.staging]
api_url = "https://staging.example.com"
timeout = 45
store_path = "/tmp/stockroom-staging.json"

[profiles.local]
api_url = "http://localhost:5000"
insecure = true
favorites_policy = "confirmed"
"#;

    fn load_sample() -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        load_config_from(&path).unwrap()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some(DEFAULT_PROFILE));
        assert_eq!(cfg.defaults.output, "table");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn parses_profiles_and_defaults() {
        let cfg = load_sample();
        assert_eq!(cfg.active_profile_name(None), "staging");
        assert_eq!(cfg.active_profile_name(Some("local")), "local");
        assert_eq!(cfg.defaults.favorites_policy, FavoritesPolicy::Optimistic);
        assert_eq!(cfg.profiles.len(), 2);
    }

    #[test]
    fn profile_overrides_defaults() {
        let cfg = load_sample();

        let staging = cfg.profile("staging").unwrap();
        let catalog = profile_to_catalog_config(&staging, &cfg.defaults).unwrap();
        assert_eq!(catalog.timeout, Duration::from_secs(45));
        assert_eq!(catalog.favorites_policy, FavoritesPolicy::Optimistic);
        assert_eq!(catalog.tls, TlsVerification::SystemDefaults);
        assert_eq!(
            resolve_store_path(&staging, "staging"),
            PathBuf::from("/tmp/stockroom-staging.json")
        );

        let local = cfg.profile("local").unwrap();
        let catalog = profile_to_catalog_config(&local, &cfg.defaults).unwrap();
        assert_eq!(catalog.timeout, Duration::from_secs(10));
        assert_eq!(catalog.favorites_policy, FavoritesPolicy::Confirmed);
        assert_eq!(catalog.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn default_profile_is_implicit() {
        let cfg = Config::default();
        let profile = cfg.profile(DEFAULT_PROFILE).unwrap();
        assert_eq!(profile.api_url, DEFAULT_API_URL);
        assert!(matches!(
            cfg.profile("nope"),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn invalid_url_is_validation_error() {
        let profile = Profile {
            api_url: "not a url".into(),
            ..Profile::default()
        };
        let err = profile_to_catalog_config(&profile, &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "prod".into(),
            Profile {
                api_url: "https://shop.example.com".into(),
                timeout: Some(5),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn store_paths_are_per_profile() {
        assert!(default_store_path(DEFAULT_PROFILE).ends_with("store.json"));
        assert!(default_store_path("staging").ends_with("store-staging.json"));
    }
}
