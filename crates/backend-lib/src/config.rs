// ============================
// backend-lib/src/config.rs
// ============================
//! Configuration management.
use crate::auth::CredentialHasher;
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix; nested keys use `__`, e.g. `BLOG_STORAGE__BACKEND`.
pub const ENV_PREFIX: &str = "BLOG_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Session TTL in seconds, renewed on every authenticated request
    pub session_ttl_secs: u64,
    /// Document store
    pub storage: StorageSettings,
    /// scrypt cost parameters for new password hashes
    pub password_hashing: HashingSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    FlatFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// Data directory for the flat-file backend
    pub path: PathBuf,
    /// How often expired documents are swept
    pub purge_interval_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingSettings {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 3000)),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            session_ttl_secs: 60 * 60,
            storage: StorageSettings::default(),
            password_hashing: HashingSettings::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: PathBuf::from("data"),
            purge_interval_secs: 60,
        }
    }
}

impl Default for HashingSettings {
    fn default() -> Self {
        // scrypt's recommended parameters
        Self { log_n: 17, r: 8, p: 1 }
    }
}

impl Settings {
    /// Load settings from `config.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load settings from a specific TOML file and the environment.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            bail!("invalid log level: {}", self.log_level);
        }
        if self.session_ttl_secs == 0 {
            bail!("session_ttl_secs must be greater than zero");
        }
        if self.storage.purge_interval_secs == 0 {
            bail!("storage.purge_interval_secs must be greater than zero");
        }
        self.hasher()?;
        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.storage.purge_interval_secs)
    }

    /// Password hasher configured with these settings' cost parameters
    pub fn hasher(&self) -> Result<CredentialHasher> {
        let HashingSettings { log_n, r, p } = self.password_hashing;
        Ok(CredentialHasher::new(log_n, r, p)?)
    }
}
