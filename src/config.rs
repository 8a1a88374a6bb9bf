use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:42069";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Config {
    /// Loads from the YAML file named by `RAWHTTP_CONFIG`, else the `LISTEN`
    /// variable, else the default address.
    pub fn load() -> Self {
        let file = std::env::var("RAWHTTP_CONFIG").ok();
        let listen = std::env::var("LISTEN").ok();

        match Self::from_sources(file.as_deref(), listen) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Ignoring config file: {:#}", e);
                Self::from_sources(None, std::env::var("LISTEN").ok()).unwrap_or_default()
            }
        }
    }

    pub fn from_sources(file: Option<&str>, listen: Option<String>) -> anyhow::Result<Self> {
        if let Some(path) = file {
            return Self::from_file(path);
        }

        Ok(listen
            .map(|listen_addr| Self { listen_addr })
            .unwrap_or_default())
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        serde_yaml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }
}
