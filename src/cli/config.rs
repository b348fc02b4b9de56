use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Client-side settings for the `padm` CLI. Env vars win over the config
/// file so scripts can point at another server without touching state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server_url: String,
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".to_string(),
            token: None,
        }
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("PADM_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("padm")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load() -> anyhow::Result<ClientConfig> {
    let mut config = read_file().unwrap_or_default();

    if let Ok(url) = std::env::var("PADM_SERVER") {
        config.server_url = url;
    }
    if let Ok(token) = std::env::var("PADM_TOKEN") {
        config.token = Some(token);
    }

    Ok(config)
}

fn read_file() -> Option<ClientConfig> {
    let config_file = get_config_dir().ok()?.join("config.json");
    let content = fs::read_to_string(config_file).ok()?;
    serde_json::from_str(&content).ok()
}

/// Merge the given overrides into the config file and persist it. Env vars
/// still win over the file at load time.
pub fn set(server_url: Option<String>, token: Option<String>) -> anyhow::Result<ClientConfig> {
    let mut config = read_file().unwrap_or_default();
    if let Some(url) = server_url {
        config.server_url = url;
    }
    if let Some(token) = token {
        config.token = Some(token);
    }
    save(&config)?;
    Ok(config)
}

pub fn save(config: &ClientConfig) -> anyhow::Result<()> {
    let config_file = get_config_dir()?.join("config.json");
    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_file, content)?;
    Ok(())
}
