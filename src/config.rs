use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_port: u16,
    pub root_dir: String,
    pub passwd_file: String,
    pub max_clients: usize,
    pub max_cmd_size: usize,
    pub timeout_ms: u64,
    pub allow_anonymous: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: 2121,
            root_dir: String::from("/srv/mftp"),
            passwd_file: String::from("/srv/mftp/mftp.passwd"),
            max_clients: 10,
            max_cmd_size: 256,
            timeout_ms: 5000,
            allow_anonymous: true,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;
        Ok(config)
    }
}
