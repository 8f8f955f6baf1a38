use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Locations probed in order when HERCULES_CONFIG is unset.
const CONFIG_SEARCH_PATHS: &[&str] = &[
    "hercules-server.toml",
    "config/hercules-server.toml",
    "/etc/hercules/server.toml",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite file; parent directories are created at boot.
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiry_hours: u64,
}

/// Outbound mail settings. Defaults to the local sendmail binary so a
/// fresh checkout can send activation and verification codes without an
/// SMTP account.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub use_sendmail: bool,
    /// Relay settings, ignored while use_sendmail is true.
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

fn default_true() -> bool {
    true
}

fn default_smtp_port() -> u16 {
    587
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            use_sendmail: true,
            host: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from_email: "noreply@herculespro.fit".to_string(),
            from_name: "Hercules Pro".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
            },
            database: DatabaseConfig {
                path: "./data/hercules.db".to_string(),
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production".to_string(),
                token_expiry_hours: 24,
            },
            smtp: SmtpConfig::default(),
        }
    }
}

impl Config {
    /// HERCULES_CONFIG wins; otherwise the first existing search path.
    /// With no file at all the defaults above apply.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("HERCULES_CONFIG") {
            return Self::load_from_path(Path::new(&path));
        }

        if let Some(path) = CONFIG_SEARCH_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
        {
            return Self::load_from_path(&path);
        }

        tracing::warn!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
