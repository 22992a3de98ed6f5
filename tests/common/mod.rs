//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use gate_config::{AccessConfig, GateConfig, StorageConfig};
use gate_engine::{App, FileStore, MemoryStore};

pub const SHORT_KEY: &str = gate_config::DEFAULT_SHORT_KEY;
pub const LONG_KEY: &str = gate_config::DEFAULT_LONG_KEY;
pub const ACTIVATION_DELAY: Duration = Duration::from_millis(900);

/// App over an in-memory store with default configuration.
pub fn memory_app() -> App {
    App::new(&GateConfig::default(), Box::new(MemoryStore::new()))
}

/// App over a file store rooted at `dir`.
pub fn file_app(dir: &Path) -> App {
    let store = FileStore::open(dir).expect("open file store");
    App::new(&GateConfig::default(), Box::new(store))
}

pub fn config_with_storage(dir: &Path) -> GateConfig {
    GateConfig {
        storage: Some(StorageConfig {
            dir: Some(dir.display().to_string()),
        }),
        ..Default::default()
    }
}

pub fn config_with_delay(delay_ms: u64) -> GateConfig {
    GateConfig {
        access: Some(AccessConfig {
            activation_delay_ms: Some(delay_ms),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Log messages, oldest first.
pub fn log_messages(app: &App) -> Vec<String> {
    app.log()
        .messages_chronological()
        .into_iter()
        .map(str::to_string)
        .collect()
}
