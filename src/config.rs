use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::probe::{ProbeTarget, DEFAULT_HOST, REDIS_PORT};

#[derive(Debug, Deserialize)]
struct ConfigurationFile {
    host: Option<String>,
    port: Option<u16>,
}

/// Where an opt-in configured gate probes for Redis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: REDIS_PORT,
        }
    }
}

impl From<ConfigurationFile> for GateConfig {
    fn from(value: ConfigurationFile) -> Self {
        Self {
            host: value.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: value.port.unwrap_or(REDIS_PORT),
        }
    }
}

impl GateConfig {
    pub fn target(&self) -> ProbeTarget {
        ProbeTarget::new(self.host.clone(), self.port)
    }

    pub fn from_config(config: Config) -> Result<Self, anyhow::Error> {
        let file = config.try_deserialize::<ConfigurationFile>()?;
        Ok(file.into())
    }
}

/// Reads `config/redis_gate.toml` if present, then `REDIS_GATE_HOST` / `REDIS_GATE_PORT`.
pub fn load_config() -> Result<GateConfig, anyhow::Error> {
    dotenvy::dotenv().ok();
    let config = Config::builder()
        .add_source(File::new("config/redis_gate", FileFormat::Toml).required(false))
        .add_source(Environment::with_prefix("REDIS_GATE").try_parsing(true))
        .build()?;

    GateConfig::from_config(config)
}
