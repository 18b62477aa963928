//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! Credentials are loaded from NCE_USERNAME / NCE_PASSWORD env vars or a
//! password_file, never stored in the TOML directly to avoid leaking
//! secrets.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nce_client::credentials::{PASSWORD_ENV, USERNAME_ENV};
use nce_client::{ClientConfig, Credentials};
use serde::Deserialize;

/// Largest page size the upstream accepts
const MAX_PAGE_SIZE: usize = 500;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// Upstream API settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub token_url: String,
    pub base_url: String,
    pub token_timeout_secs: u64,
    pub data_timeout_secs: u64,
    /// Items per page for full-fleet walks
    pub page_size: usize,
    /// Page cap for full-fleet walks
    pub max_pages: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            token_url: nce_client::DEFAULT_TOKEN_URL.into(),
            base_url: nce_client::DEFAULT_BASE_URL.into(),
            token_timeout_secs: nce_client::DEFAULT_TOKEN_TIMEOUT.as_secs(),
            data_timeout_secs: nce_client::DEFAULT_DATA_TIMEOUT.as_secs(),
            page_size: nce_client::DEFAULT_PAGE_SIZE,
            max_pages: nce_client::DEFAULT_MAX_PAGES,
        }
    }
}

/// Credential settings
#[derive(Debug, Default, Deserialize)]
pub struct AuthConfig {
    /// Fixed organisation id. When absent, the id resolved from the token
    /// response is used.
    #[serde(default)]
    pub organisation_id: Option<String>,
    /// Path to a file containing the API password (alternative to the
    /// NCE_PASSWORD env var)
    #[serde(default)]
    pub password_file: Option<PathBuf>,
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

fn default_max_connections() -> usize {
    1000
}

impl Config {
    /// Load configuration from a TOML file, then resolve credentials from
    /// the environment.
    ///
    /// Password resolution order:
    /// 1. NCE_PASSWORD env var
    /// 2. password_file path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        for (name, url) in [
            ("token_url", &config.upstream.token_url),
            ("base_url", &config.upstream.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(common::Error::Config(format!(
                    "{name} must start with http:// or https://, got: {url}"
                )));
            }
        }

        if config.upstream.token_timeout_secs == 0 || config.upstream.data_timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeouts must be greater than 0".into(),
            ));
        }

        if config.upstream.page_size == 0 || config.upstream.page_size > MAX_PAGE_SIZE {
            return Err(common::Error::Config(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got: {}",
                config.upstream.page_size
            )));
        }

        if config.upstream.max_pages == 0 {
            return Err(common::Error::Config(
                "max_pages must be greater than 0".into(),
            ));
        }

        if config.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        let username = std::env::var(USERNAME_ENV)
            .map_err(|_| common::Error::Config(format!("{USERNAME_ENV} is not set")))?;

        let password = match std::env::var(PASSWORD_ENV) {
            Ok(p) => p,
            Err(_) => match &config.auth.password_file {
                Some(file) => {
                    let contents = std::fs::read_to_string(file).map_err(|e| {
                        common::Error::Config(format!(
                            "failed to read password_file {}: {e}",
                            file.display()
                        ))
                    })?;
                    let trimmed = contents.trim().to_owned();
                    if trimmed.is_empty() {
                        return Err(common::Error::Config(format!(
                            "password_file {} is empty",
                            file.display()
                        )));
                    }
                    trimmed
                }
                None => {
                    return Err(common::Error::Config(format!(
                        "{PASSWORD_ENV} is not set and no password_file configured"
                    )));
                }
            },
        };

        config.auth.credentials = Some(Credentials::new(username, password));
        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("sim-gateway.toml")
    }

    /// Build the API client configuration from the loaded settings.
    pub fn client_config(&self) -> common::Result<ClientConfig> {
        let credentials = self
            .auth
            .credentials
            .clone()
            .ok_or_else(|| common::Error::Config("credentials were not resolved".into()))?;

        let mut client = ClientConfig::new(credentials);
        client.token_url = self.upstream.token_url.clone();
        client.base_url = self.upstream.base_url.clone();
        client.organisation_id = self.auth.organisation_id.clone();
        client.token_timeout = Duration::from_secs(self.upstream.token_timeout_secs);
        client.data_timeout = Duration::from_secs(self.upstream.data_timeout_secs);
        client.page_size = self.upstream.page_size;
        client.max_pages = self.upstream.max_pages;
        Ok(client)
    }
}
