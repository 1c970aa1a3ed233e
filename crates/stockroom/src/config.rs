//! CLI configuration: thin layer over `stockroom_config` that applies
//! `GlobalOpts` flag overrides (--api-url, --timeout, --store, --insecure).

use std::path::PathBuf;
use std::time::Duration;

use stockroom_core::{CatalogConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use stockroom_config::{
    Config, Profile, config_path, load_config_or_default, resolve_store_path, save_config,
};

/// Everything needed to open a `Catalog`.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub catalog: CatalogConfig,
    pub store_path: PathBuf,
}

pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Translate the active profile plus global flags into core configuration.
///
/// Flags take priority over profile values, which take priority over
/// `[defaults]`.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, config);
    let mut profile = config.profile(&profile_name)?;

    if let Some(url) = &global.api_url {
        profile.api_url.clone_from(url);
    }
    if let Some(secs) = global.timeout {
        profile.timeout = Some(secs);
    }

    let mut catalog = stockroom_config::profile_to_catalog_config(&profile, &config.defaults)?;
    if global.insecure {
        catalog.tls = TlsVerification::DangerAcceptInvalid;
    }

    let store_path = global
        .store
        .clone()
        .unwrap_or_else(|| resolve_store_path(&profile, &profile_name));

    tracing::debug!(
        profile = %profile_name,
        api_url = %catalog.api_url,
        timeout = ?catalog.timeout,
        store = %store_path.display(),
        "resolved configuration"
    );

    Ok(Resolved {
        profile_name,
        catalog,
        store_path,
    })
}

/// Parse a `--timeout`-style value for `config set`.
pub fn parse_timeout(value: &str) -> Result<Duration, CliError> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| CliError::Validation {
            field: "timeout".into(),
            reason: "must be a number (seconds)".into(),
        })
}
