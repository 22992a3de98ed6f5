//! Configuration for the gate panel.
//!
//! Read from `~/.gate/config.toml`. Every section is optional; accessors on
//! [`GateConfig`] resolve defaults so callers never see a missing value.
//!
//! ```toml
//! [app]
//! ascii_only = false
//! high_contrast = false
//! reduced_motion = false
//!
//! [access]
//! short_key = "${GATE_SHORT_KEY}"
//! long_key = "${GATE_LONG_KEY}"
//! activation_delay_ms = 900
//!
//! [relay]
//! destination = "000888..."
//!
//! [storage]
//! dir = "~/.local/share/gate"
//!
//! [log]
//! capacity = 200
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fmt, fs};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SHORT_KEY: &str = "davidgomadza";
pub const DEFAULT_LONG_KEY: &str =
    "ajuttttttttttttttttttttttttttttttttttttttttttttttttttttttttttttttttjuer.start";
pub const DEFAULT_RELAY_DESTINATION: &str = "000888888888888888886789028678902867890286789028678888888777666555444333222111000867810236782345678901";
pub const DEFAULT_ACTIVATION_DELAY_MS: u64 = 900;
pub const DEFAULT_LOG_CAPACITY: usize = 200;

#[derive(Debug, Default, Deserialize)]
pub struct GateConfig {
    pub app: Option<AppConfig>,
    pub access: Option<AccessConfig>,
    pub relay: Option<RelayConfig>,
    pub storage: Option<StorageConfig>,
    pub log: Option<LogConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for icons and spinners.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Freeze the ring spinner.
    #[serde(default)]
    pub reduced_motion: bool,
}

/// Accepted keys and spin-up delay.
///
/// Keys support `${ENV_VAR}` expansion. A key that expands to an empty string
/// never matches.
#[derive(Default, Deserialize)]
pub struct AccessConfig {
    pub short_key: Option<String>,
    pub long_key: Option<String>,
    pub activation_delay_ms: Option<u64>,
}

// Manual Debug impl to prevent leaking keys in logs.
impl fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(opt: Option<&String>) -> &'static str {
            if opt.is_some() { "[REDACTED]" } else { "None" }
        }
        f.debug_struct("AccessConfig")
            .field("short_key", &mask(self.short_key.as_ref()))
            .field("long_key", &mask(self.long_key.as_ref()))
            .field("activation_delay_ms", &self.activation_delay_ms)
            .finish()
    }
}

/// Simulated relay. Payloads are only written to local storage.
#[derive(Debug, Default, Deserialize)]
pub struct RelayConfig {
    pub destination: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    /// Data directory; `~` and `${ENV_VAR}` are expanded.
    pub dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogConfig {
    pub capacity: Option<usize>,
}

/// Replace `${VAR}` with the variable's value (empty when unset).
///
/// An unclosed `${` is kept verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn expand_home(value: &str) -> PathBuf {
    match value.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(value),
        },
        None => PathBuf::from(value),
    }
}

impl GateConfig {
    /// Load from the default location. `Ok(None)` when there is no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn short_key(&self) -> String {
        self.access
            .as_ref()
            .and_then(|a| a.short_key.as_deref())
            .map_or_else(|| DEFAULT_SHORT_KEY.to_string(), expand_env_vars)
    }

    #[must_use]
    pub fn long_key(&self) -> String {
        self.access
            .as_ref()
            .and_then(|a| a.long_key.as_deref())
            .map_or_else(|| DEFAULT_LONG_KEY.to_string(), expand_env_vars)
    }

    #[must_use]
    pub fn activation_delay(&self) -> Duration {
        let ms = self
            .access
            .as_ref()
            .and_then(|a| a.activation_delay_ms)
            .unwrap_or(DEFAULT_ACTIVATION_DELAY_MS);
        Duration::from_millis(ms)
    }

    /// Relay destination; blank values fall back to the default.
    #[must_use]
    pub fn relay_destination(&self) -> String {
        self.relay
            .as_ref()
            .and_then(|r| r.destination.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_RELAY_DESTINATION)
            .to_string()
    }

    #[must_use]
    pub fn storage_dir(&self) -> Option<PathBuf> {
        self.storage
            .as_ref()
            .and_then(|s| s.dir.as_deref())
            .map(expand_env_vars)
            .filter(|d| !d.trim().is_empty())
            .map(|d| expand_home(&d))
    }

    #[must_use]
    pub fn log_capacity(&self) -> usize {
        self.log
            .as_ref()
            .and_then(|l| l.capacity)
            .unwrap_or(DEFAULT_LOG_CAPACITY)
            .max(1)
    }

    #[must_use]
    pub fn ascii_only(&self) -> bool {
        self.app.as_ref().is_some_and(|a| a.ascii_only)
    }

    #[must_use]
    pub fn high_contrast(&self) -> bool {
        self.app.as_ref().is_some_and(|a| a.high_contrast)
    }

    #[must_use]
    pub fn reduced_motion(&self) -> bool {
        self.app.as_ref().is_some_and(|a| a.reduced_motion)
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".gate").join("config.toml"))
}
