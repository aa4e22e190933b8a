use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;
use url::Url;

use crate::Result;
use crate::error::ConfigError;

use super::defaults::{
    default_base_url, default_concurrency, default_connect_timeout, default_http_timeout,
    default_listen, default_page_size,
};
use super::env::{env_duration, env_parse, env_string};
use super::{
    BasicCredentials, Config, HumantimeDuration, MAX_PAGE_SIZE, OpsGenieSettings, ServerSettings,
};

pub(super) fn load(path: impl AsRef<Path>) -> std::result::Result<RawConfig, ConfigError> {
    let mut builder = ::config::Config::builder();
    let path = path.as_ref();
    builder = builder.add_source(::config::File::from(path).required(false));
    builder = builder.add_source(
        ::config::Environment::with_prefix("GENIE")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) opsgenie: RawOpsGenie,
    #[serde(default)]
    pub(super) server: RawServer,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawOpsGenie {
    #[serde(default = "default_base_url")]
    pub(super) url: String,
    pub(super) api_key: Option<String>,
    #[serde(default = "default_page_size")]
    pub(super) page_size: usize,
    #[serde(default = "default_concurrency")]
    pub(super) concurrency: usize,
    #[serde(default = "default_http_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) timeout: Duration,
    #[serde(default = "default_connect_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) connect_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawServer {
    #[serde(default = "default_listen")]
    pub(super) listen: String,
    #[serde(default)]
    pub(super) user: Option<String>,
    #[serde(default)]
    pub(super) password: Option<String>,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(key) = env_string("OPSGENIE_API_KEY")? {
            self.opsgenie.api_key = Some(key);
        }
        if let Some(url) = env_string("OPSGENIE_URL")? {
            self.opsgenie.url = url;
        }
        if let Some(page_size) = env_parse::<usize>("PAGE_SIZE")? {
            self.opsgenie.page_size = page_size;
        }
        if let Some(concurrency) = env_parse::<usize>("CONCURRENCY")? {
            self.opsgenie.concurrency = concurrency;
        }
        if let Some(timeout) = env_duration("HTTP_TIMEOUT")? {
            self.opsgenie.timeout = timeout;
        }
        if let Some(timeout) = env_duration("HTTP_CONNECT_TIMEOUT")? {
            self.opsgenie.connect_timeout = timeout;
        }
        if let Some(listen) = env_string("LISTEN_ADDR")? {
            self.server.listen = listen;
        }
        if let Some(user) = env_string("HTTP_USER")? {
            self.server.user = Some(user);
        }
        if let Some(password) = env_string("HTTP_PASS")? {
            self.server.password = Some(password);
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        let api_key = self.opsgenie.api_key.ok_or(ConfigError::MissingField {
            field: "opsgenie.api_key",
        })?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "opsgenie.api_key",
                message: "API key cannot be empty".to_string(),
            }
            .into());
        }
        let base_url = Url::parse(&self.opsgenie.url).map_err(|err| ConfigError::InvalidField {
            field: "opsgenie.url",
            message: err.to_string(),
        })?;

        if !(1..=MAX_PAGE_SIZE).contains(&self.opsgenie.page_size) {
            return Err(ConfigError::InvalidField {
                field: "opsgenie.page_size",
                message: format!(
                    "expected between 1 and {MAX_PAGE_SIZE}, got {}",
                    self.opsgenie.page_size
                ),
            }
            .into());
        }
        if self.opsgenie.timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "opsgenie.timeout",
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }
        if self.opsgenie.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "opsgenie.connect_timeout",
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        let listen = self
            .server
            .listen
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::InvalidField {
                field: "server.listen",
                message: err.to_string(),
            })?;

        let credentials = match (self.server.user, self.server.password) {
            (None, None) => None,
            (Some(user), Some(password)) if !user.is_empty() => Some(BasicCredentials {
                user,
                password: password.into(),
            }),
            _ => {
                return Err(ConfigError::InvalidField {
                    field: "server.user",
                    message: "HTTP user and password must be set together".to_string(),
                }
                .into());
            }
        };

        Ok(Config {
            opsgenie: OpsGenieSettings {
                base_url,
                api_key: api_key.into(),
                page_size: self.opsgenie.page_size,
                concurrency: self.opsgenie.concurrency.max(1),
                http_connect_timeout: self.opsgenie.connect_timeout,
                http_request_timeout: self.opsgenie.timeout,
            },
            server: ServerSettings {
                listen,
                credentials,
            },
        })
    }
}

impl Default for RawOpsGenie {
    fn default() -> Self {
        Self {
            url: default_base_url(),
            api_key: None,
            page_size: default_page_size(),
            concurrency: default_concurrency(),
            timeout: default_http_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for RawServer {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            user: None,
            password: None,
        }
    }
}
