use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::error::Error as DatasourceError;

mod defaults;
mod env;
mod raw;
mod serde;

pub(crate) use self::serde::HumantimeDuration;

const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub opsgenie: OpsGenieSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone)]
pub struct OpsGenieSettings {
    pub base_url: Url,
    pub api_key: SecretString,
    pub page_size: usize,
    pub concurrency: usize,
    pub http_connect_timeout: Duration,
    pub http_request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub listen: SocketAddr,
    pub credentials: Option<BasicCredentials>,
}

/// Fixed shared credentials for the inbound HTTP surface.
#[derive(Debug, Clone)]
pub struct BasicCredentials {
    pub user: String,
    pub password: SecretString,
}

impl Config {
    /// Load configuration from an optional file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be parsed, when
    /// environment overrides are invalid, or when the resulting values fail
    /// validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut raw = raw::load(path).map_err(DatasourceError::from)?;
        raw.apply_env_overrides().map_err(DatasourceError::from)?;
        raw.validate_and_build()
    }
}
