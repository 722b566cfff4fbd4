use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Runtime settings for [`SideDiffServer`](crate::SideDiffServer).
///
/// Every key is optional in a TOML file; missing keys take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding one file per staged part.
    pub staging_dir: PathBuf,
    /// How long a comparison lives after its last submission.
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
    /// Upper bound on the cleanup of staged parts at shutdown.
    pub shutdown_grace_secs: u64,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            staging_dir: std::env::temp_dir().join("sidediff"),
            ttl_secs: 300,
            sweep_interval_secs: 30,
            shutdown_grace_secs: 10,
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(source: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.ttl_secs == 0 {
            return Err(ServerError::Config("ttl_secs must be greater than zero".into()));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ServerError::Config(
                "sweep_interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
