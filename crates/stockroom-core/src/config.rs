// ── Runtime catalog configuration ──
//
// Describes how to reach the catalog API and how favorites are synced.
// The CLI/TUI builds a `CatalogConfig` and hands it in; core never
// reads config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

/// Default API root used by the original admin client.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed development servers).
    DangerAcceptInvalid,
}

/// How a favorites toggle is reconciled with the server.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FavoritesPolicy {
    /// Apply locally and keep it whatever the server says.
    #[default]
    Optimistic,
    /// Apply locally as pending; roll back if the server rejects it.
    Confirmed,
}

/// Configuration for one catalog API endpoint.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// API root (e.g., `http://localhost:5000`).
    pub api_url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Favorites reconciliation policy.
    pub favorites_policy: FavoritesPolicy,
}

impl CatalogConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            favorites_policy: FavoritesPolicy::default(),
        }
    }

    pub(crate) fn transport(&self) -> stockroom_api::TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => stockroom_api::TlsMode::System,
            TlsVerification::CustomCa(path) => stockroom_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => stockroom_api::TlsMode::DangerAcceptInvalid,
        };
        stockroom_api::TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!(
            "Optimistic".parse::<FavoritesPolicy>().unwrap(),
            FavoritesPolicy::Optimistic
        );
        assert_eq!(FavoritesPolicy::Confirmed.to_string(), "confirmed");
        assert!("eventual".parse::<FavoritesPolicy>().is_err());
    }

    #[test]
    fn new_config_uses_defaults() {
        let config = CatalogConfig::new(DEFAULT_API_URL.parse().unwrap());
        assert_eq!(config.favorites_policy, FavoritesPolicy::Optimistic);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
    }
}
