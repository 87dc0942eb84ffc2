//! Configuration types for eoslog.
//!
//! [`Config::load`] reads `~/.config/eoslog/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::defaults`] returns
//! the same defaults without touching the filesystem (useful in tests).
//!
//! [`LastConnection`] remembers the most recent successful connection in
//! `~/.config/eoslog/last_connection.json` so the next start can prefill it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ingest::transport::{ConnectionParams, Credentials};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[connection]
server = "localhost"
port   = 8300
tag    = ""
realm  = ""
secret = ""

[ui]
show_timestamps      = true
timestamp_format     = "%H:%M:%S%.3f"
group_pane_width_pct = 25
theme                = "default"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/eoslog/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// `[connection]` section of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub secret: String,
}

fn default_server() -> String { "localhost".to_string() }
fn default_port() -> u16 { 8300 }

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            port: default_port(),
            tag: String::new(),
            realm: String::new(),
            secret: String::new(),
        }
    }
}

impl ConnectionConfig {
    /// Credentials are attached only when at least one of them is set.
    pub fn to_params(&self) -> ConnectionParams {
        let params = ConnectionParams::new(self.server.clone(), self.port);
        if self.tag.is_empty() && self.realm.is_empty() && self.secret.is_empty() {
            return params;
        }
        params.with_credentials(Credentials {
            tag: self.tag.clone(),
            realm: self.realm.clone(),
            secret: self.secret.clone(),
        })
    }
}

/// `[ui]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_show_timestamps")]
    pub show_timestamps: bool,
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default = "default_group_pane_width_pct")]
    pub group_pane_width_pct: u16,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_show_timestamps() -> bool { true }
fn default_timestamp_format() -> String { "%H:%M:%S%.3f".to_string() }
fn default_group_pane_width_pct() -> u16 { 25 }
fn default_theme() -> String { "default".to_string() }

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: default_show_timestamps(),
            timestamp_format: default_timestamp_format(),
            group_pane_width_pct: default_group_pane_width_pct(),
            theme: default_theme(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/eoslog/config.toml`, layered on top of the built-in
    /// defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load `path` layered on top of the built-in defaults. A missing file
    /// yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Last connection
// ---------------------------------------------------------------------------

/// The most recent connection that reached `Connected`. The secret is never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastConnection {
    pub server: String,
    pub port: u16,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub realm: String,
}

impl LastConnection {
    pub fn from_params(params: &ConnectionParams) -> Self {
        let (tag, realm) = params
            .credentials
            .as_ref()
            .map(|c| (c.tag.clone(), c.realm.clone()))
            .unwrap_or_default();
        Self {
            server: params.server.clone(),
            port: params.port,
            tag,
            realm,
        }
    }

    /// Read the remembered connection, if any.
    pub fn load() -> anyhow::Result<Option<Self>> {
        Self::load_from(&last_connection_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&last_connection_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Overlay onto a `[connection]` section. The configured secret is kept.
    pub fn apply(&self, connection: &mut ConnectionConfig) {
        connection.server = self.server.clone();
        connection.port = self.port;
        connection.tag = self.tag.clone();
        connection.realm = self.realm.clone();
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("eoslog")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn last_connection_path() -> PathBuf {
    config_dir().join("last_connection.json")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn defaults_load() {
        let cfg = Config::defaults();
        assert!(cfg.ui.show_timestamps);
        assert_eq!(cfg.ui.group_pane_width_pct, 25);
        assert_eq!(cfg.ui.theme, "default");
        assert_eq!(cfg.connection.server, "localhost");
        assert_eq!(cfg.connection.port, 8300);
    }

    #[test]
    fn user_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[connection]\nserver = \"logs.internal\"\n\n[ui]\ntheme = \"gruvbox_dark\"\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.connection.server, "logs.internal");
        assert_eq!(cfg.connection.port, 8300);
        assert_eq!(cfg.ui.theme, "gruvbox_dark");
        assert!(cfg.ui.show_timestamps);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.connection, ConnectionConfig::default());
    }

    #[test]
    fn empty_credentials_are_not_attached() {
        let params = ConnectionConfig::default().to_params();
        assert!(params.credentials.is_none());

        let with_tag = ConnectionConfig {
            tag: "dev".into(),
            ..ConnectionConfig::default()
        };
        let credentials = with_tag.to_params().credentials.unwrap();
        assert_eq!(credentials.tag, "dev");
        assert_eq!(credentials.secret, "");
    }

    #[test]
    fn last_connection_round_trips_without_secret() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("last_connection.json");
        assert_eq!(LastConnection::load_from(&path).unwrap(), None);

        let params = ConnectionParams::new("logs.internal", 9000).with_credentials(Credentials {
            tag: "dev".into(),
            realm: "eu".into(),
            secret: "hunter2".into(),
        });
        LastConnection::from_params(&params).save_to(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("hunter2"));

        let loaded = LastConnection::load_from(&path).unwrap().unwrap();
        let mut connection = ConnectionConfig {
            secret: "kept".into(),
            ..ConnectionConfig::default()
        };
        loaded.apply(&mut connection);
        assert_eq!(connection.server, "logs.internal");
        assert_eq!(connection.port, 9000);
        assert_eq!(connection.realm, "eu");
        assert_eq!(connection.secret, "kept");
    }

    #[test]
    fn corrupt_last_connection_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_connection.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(LastConnection::load_from(&path).is_err());
    }
}
