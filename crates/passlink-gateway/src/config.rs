//! Gateway configuration.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use passlink_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};

/// Main gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Credential store settings.
    #[serde(default)]
    pub store: StoreSettings,

    /// View-count gate settings.
    #[serde(default)]
    pub gate: GateSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LogConfig,
}

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if `bind` is not an IP address.
    pub fn socket_addr(&self) -> GatewayResult<SocketAddr> {
        let ip: IpAddr = self
            .bind
            .parse()
            .map_err(|e| GatewayError::Config(format!("invalid bind address {:?}: {e}", self.bind)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Which credential store backs the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// A JSON document on disk.
    #[default]
    Json,
    /// Process memory; lost on restart.
    Memory,
}

/// Credential store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Store backend.
    #[serde(default)]
    pub backend: StoreBackend,

    /// File for the JSON backend.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

/// View-count gate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSettings {
    /// Evict counters idle this long. `0` keeps them for the process lifetime.
    #[serde(default)]
    pub retention_secs: u64,

    /// How often the eviction sweep runs when retention is enabled.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            retention_secs: 0,
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl GateSettings {
    /// Idle retention, if eviction is enabled.
    #[must_use]
    pub fn retention(&self) -> Option<Duration> {
        (self.retention_secs > 0).then(|| Duration::from_secs(self.retention_secs))
    }

    /// Interval between sweeps.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3003
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/db.json")
}

fn default_sweep_interval() -> u64 {
    60
}

impl GatewayConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> GatewayResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a given file cannot be read or parsed.
    pub fn load_or_default(path: Option<&Path>) -> GatewayResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check settings that would only fail later at startup.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] describing the first problem found.
    pub fn validate(&self) -> GatewayResult<()> {
        if self.server.port == 0 {
            return Err(GatewayError::Config("server.port must not be 0".into()));
        }
        self.server.socket_addr()?;
        if self.store.backend == StoreBackend::Json && self.store.path.as_os_str().is_empty() {
            return Err(GatewayError::Config(
                "store.path is required for the json backend".into(),
            ));
        }
        if self.gate.retention_secs > 0 && self.gate.sweep_interval_secs == 0 {
            return Err(GatewayError::Config(
                "gate.sweep_interval_secs must be positive when retention is enabled".into(),
            ));
        }
        Ok(())
    }
}
