// Configuration module entry point
// Loads launcher settings and the per-process section of the JSON document

mod types;

use std::net::SocketAddr;
use std::path::Path;

use serde_json::Value;

use crate::error::ConfigError;

// Re-export public types
pub use types::{
    Actions, LoggingConfig, RawResourceConfig, ResourceConfig, ResourceKind, ScalarValue,
    ServerConfig, Settings, MAX_BODY_LEN,
};

impl Settings {
    /// Load settings from the given file (without extension, optional),
    /// `ORIGIN_*` environment variables and command-line overrides.
    pub fn load_from(
        settings_path: &str,
        process: Option<String>,
        config_path: Option<String>,
    ) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(settings_path).required(false))
            .add_source(
                ::config::Environment::with_prefix("ORIGIN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("config_path", "config.json")?
            .set_default("process", "origin")?
            .set_default("host", "0.0.0.0")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_override_option("process", process)?
            .set_override_option("config_path", config_path)?
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::InvalidAddress(format!("{}:{}: {e}", self.host, self.port)))
    }
}

/// One process's section of the configuration document
#[derive(Debug, Clone)]
pub struct OriginConfig {
    pub server: ServerConfig,
    pub actions: Actions,
}

impl OriginConfig {
    /// Read the document at `path` and select `process`
    pub fn load(path: impl AsRef<Path>, process: &str, host: &str) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_document(&text, process, host)
    }

    /// Parse a configuration document of the form
    /// `{"processes": {"<process>": {"interfaces": {"http": {"port": N}}, "actions": {...}}}}`
    pub fn from_document(text: &str, process: &str, host: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_json::from_str(text)?;

        let processes = document
            .get("processes")
            .ok_or_else(|| ConfigError::MissingSection("processes".to_string()))?;
        let conf = processes
            .get(process)
            .ok_or_else(|| ConfigError::MissingProcess(process.to_string()))?;

        let port = conf
            .pointer("/interfaces/http/port")
            .ok_or_else(|| ConfigError::MissingPort(process.to_string()))?;
        let port: u16 = serde_json::from_value(port.clone())?;

        let actions = conf
            .get("actions")
            .ok_or_else(|| ConfigError::MissingActions(process.to_string()))?;
        let actions: Actions = serde_json::from_value(actions.clone())?;

        Ok(Self {
            server: ServerConfig {
                host: host.to_string(),
                port,
            },
            actions,
        })
    }
}
