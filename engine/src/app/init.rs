use std::path::PathBuf;

use anyhow::Context;

use gate_config::GateConfig;
use gate_core::{AccessController, AccessPolicy, EventLog, Orientation};
use gate_types::ui::UiOptions;
use gate_types::{Credential, ShareToken};

use super::{App, UiState};
use crate::contacts::ContactBook;
use crate::relay::Relay;
use crate::storage::{FileStore, KvStore, SHARE_TOKEN_KEY, load_json, save_json};
use crate::timers::PendingActivations;
use crate::util::random_base36;

const DATA_DIR_ENV: &str = "GATE_DATA_DIR";
const SHARE_TOKEN_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDirSource {
    /// `GATE_DATA_DIR`
    Env,
    /// `[storage] dir`
    Config,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    pub path: PathBuf,
    pub source: DataDirSource,
}

impl DataDir {
    pub fn resolve(config: &GateConfig) -> anyhow::Result<Self> {
        if let Some(custom) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self {
                path: PathBuf::from(custom),
                source: DataDirSource::Env,
            });
        }
        if let Some(path) = config.storage_dir() {
            return Ok(Self {
                path,
                source: DataDirSource::Config,
            });
        }
        if let Some(path) = dirs::data_local_dir() {
            Ok(Self {
                path: path.join("gate"),
                source: DataDirSource::System,
            })
        } else {
            anyhow::bail!(
                "System data directory unavailable. Set {DATA_DIR_ENV} to specify a data directory."
            )
        }
    }
}

impl App {
    /// Build from configuration over an already-open store.
    ///
    /// Unreadable stored collections start empty; a missing share token is
    /// generated and written back.
    pub fn new(config: &GateConfig, mut store: Box<dyn KvStore>) -> Self {
        let policy = AccessPolicy::new(
            Credential::new(config.short_key()),
            Credential::new(config.long_key()),
            config.activation_delay(),
        );
        let contacts = ContactBook::load_or_default(store.as_ref());
        let share_token = load_or_create_share_token(store.as_mut());
        let options = UiOptions {
            ascii_only: config.ascii_only(),
            high_contrast: config.high_contrast(),
            reduced_motion: config.reduced_motion(),
        };

        Self {
            access: AccessController::new(policy),
            log: EventLog::with_capacity(config.log_capacity()),
            orientation: Orientation::default(),
            contacts,
            relay: Relay::new(config.relay_destination()),
            store,
            share_token,
            pending: PendingActivations::default(),
            ui: UiState::new(options),
        }
    }

    /// Resolve the data directory and open a file-backed app there.
    pub fn open(config: &GateConfig) -> anyhow::Result<Self> {
        let data_dir = DataDir::resolve(config)?;
        let store = FileStore::open(&data_dir.path).with_context(|| {
            format!("failed to open data directory {}", data_dir.path.display())
        })?;
        tracing::info!(
            path = %data_dir.path.display(),
            source = ?data_dir.source,
            "Opened data directory"
        );
        Ok(Self::new(config, Box::new(store)))
    }
}

fn load_or_create_share_token(store: &mut dyn KvStore) -> ShareToken {
    match load_json::<ShareToken>(store, SHARE_TOKEN_KEY) {
        Ok(Some(token)) if !token.as_str().is_empty() => return token,
        Ok(_) => {}
        Err(e) => tracing::warn!("Replacing unreadable share token: {e}"),
    }

    let token = ShareToken::new(format!(
        "SHARE-{}",
        random_base36(SHARE_TOKEN_LEN).to_ascii_uppercase()
    ));
    if let Err(e) = save_json(store, SHARE_TOKEN_KEY, &token) {
        tracing::warn!("Failed to persist share token: {e}");
    }
    token
}
