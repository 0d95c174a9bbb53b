//! CLI configuration file handling.
//!
//! Reads `peerpass/config.json` from the user config directory. Every
//! field is optional; a missing or unreadable file falls back to defaults
//! so the CLI always starts.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Relay server base URL.
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from the user config directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to parse config, using defaults");
                Ok(Self::default())
            }
        }
    }
}

fn config_path() -> anyhow::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("no config directory on this platform"))?;
    Ok(base.join("peerpass").join("config.json"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
