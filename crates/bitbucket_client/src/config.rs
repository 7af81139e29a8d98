//! Bitbucket integration configuration.
//!
//! This module contains the configuration for a single Bitbucket provider
//! instance and the reader that turns the raw form found in configuration
//! files into a validated configuration with defaults applied.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::Error;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Host name of the hosted Bitbucket Cloud service.
pub const BITBUCKET_HOST: &str = "bitbucket.org";

/// REST API base URL of the hosted Bitbucket Cloud service.
pub const BITBUCKET_API_BASE_URL: &str = "https://api.bitbucket.org/2.0";

/// Validated configuration for a single Bitbucket provider instance.
///
/// Covers both Bitbucket Cloud and self-hosted Bitbucket Server. The
/// deployment flavor is decided by [`BitbucketConfig::is_cloud`], which
/// compares the configured host against [`BITBUCKET_HOST`].
///
/// # Examples
///
/// ```rust
/// use bitbucket_client::BitbucketConfig;
///
/// let config = BitbucketConfig {
///     host: "bitbucket.org".to_string(),
///     api_base_url: "https://api.bitbucket.org/2.0".to_string(),
///     token: None,
///     username: None,
///     app_password: None,
/// };
///
/// assert!(config.is_cloud());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitbucketConfig {
    /// Host name of the provider instance (e.g. "bitbucket.org" or
    /// "bitbucket.mycompany.net")
    pub host: String,

    /// Base URL of the provider's REST API, without a trailing slash
    /// (e.g. "https://bitbucket.mycompany.net/rest/api/1.0")
    pub api_base_url: String,

    /// Personal access token; takes precedence over the username and
    /// app password pair
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// User name for basic authorization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// App password for basic authorization, paired with `username`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_password: Option<String>,
}

/// Raw integration configuration as it appears in a configuration file.
///
/// Every field except `host` is optional; [`BitbucketConfig::from_settings`]
/// applies defaults and validates the combination.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitbucketSettings {
    /// Host name of the provider instance; defaults to [`BITBUCKET_HOST`]
    #[serde(default = "default_host")]
    pub host: String,

    /// Base URL of the provider's REST API; required for self-hosted
    /// installations, defaulted for Bitbucket Cloud
    pub api_base_url: Option<String>,

    /// Personal access token
    pub token: Option<String>,

    /// User name for basic authorization
    pub username: Option<String>,

    /// App password for basic authorization
    pub app_password: Option<String>,
}

fn default_host() -> String {
    BITBUCKET_HOST.to_string()
}

impl BitbucketConfig {
    /// Builds a validated configuration from raw settings.
    ///
    /// For the hosted service the API base URL may be omitted and defaults
    /// to [`BITBUCKET_API_BASE_URL`]; self-hosted installations must
    /// configure it explicitly because the REST API path prefix differs
    /// per installation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if:
    /// - The settings name a self-hosted installation without an API base URL
    /// - Only one half of a username/appPassword pair is provided
    pub fn from_settings(settings: BitbucketSettings) -> Result<Self, Error> {
        let host = settings.host;

        let api_base_url = match settings.api_base_url {
            Some(api_base_url) => api_base_url,
            None if host == BITBUCKET_HOST => BITBUCKET_API_BASE_URL.to_string(),
            None => {
                return Err(Error::InvalidConfig(format!(
                    "no apiBaseUrl provided for {}",
                    host
                )));
            }
        };

        if settings.username.is_some() != settings.app_password.is_some() {
            return Err(Error::InvalidConfig(
                "username and appPassword must be configured together".to_string(),
            ));
        }

        if settings.token.is_some() && settings.username.is_some() {
            warn!(
                host = %host,
                "Both a token and a username/appPassword pair are configured, the token takes precedence"
            );
        }

        Ok(Self {
            host,
            api_base_url,
            token: settings.token,
            username: settings.username,
            app_password: settings.app_password,
        })
    }

    /// Returns true when this configuration points at the hosted Bitbucket
    /// Cloud service.
    ///
    /// The decision is an exact match of the configured host against
    /// [`BITBUCKET_HOST`]; the host of an incoming URL is never consulted.
    pub fn is_cloud(&self) -> bool {
        self.host == BITBUCKET_HOST
    }
}
