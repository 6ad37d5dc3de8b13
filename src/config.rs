use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::opts;

/// File name looked up in the working directory when `--config` isn't given.
pub const DEFAULT_CONFIG_FILE: &str = "configs.json";
/// GoDaddy rejects TTLs below 600 seconds.
const DEFAULT_TTL: u32 = 600;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Please verify that {} file exists", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Please verify that {} is a valid json file: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct GoDaddyConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub secret: String,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct IpinfoConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub url: String,
}

/// Everything a run needs, read once at startup and never written back.
///
/// Missing fields become empty strings. Nothing is validated here, so an
/// empty key or URL surfaces later as an error from the remote service.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub godaddy: GoDaddyConfig,
    #[serde(default)]
    pub ipinfo: IpinfoConfig,
    /// The last public IP the operator recorded.
    #[serde(default)]
    pub myip: String,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

impl Config {
    pub fn fqdn(&self) -> String {
        if self.host.is_empty() || self.host == "@" {
            self.domain.clone()
        } else {
            format!("{}.{}", self.host, self.domain)
        }
    }
}

pub fn config_path(opts: &opts::Opts) -> PathBuf {
    opts.config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

pub fn load_config(file: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(file).map_err(|source| ConfigError::NotFound {
        path: file.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Invalid {
        path: file.to_path_buf(),
        source,
    })
}
