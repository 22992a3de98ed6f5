//! Key-value persistence behind a small injectable interface.
//!
//! Every persisted value is one JSON document under one string key. The engine
//! only ever talks to [`KvStore`], so tests run against [`MemoryStore`] and the
//! binary runs against [`FileStore`].

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use gate_utils::{
    AtomicWriteOptions, FileSyncPolicy, PersistMode, atomic_write_with_options, recover_bak_file,
};

pub const SHARE_TOKEN_KEY: &str = "share-token";
pub const CHAT_HISTORIES_KEY: &str = "chat-histories";
pub const CONTACT_LIST_KEY: &str = "contact-list";
pub const RELAY_INBOX_KEY_PREFIX: &str = "relay-inbox-";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode value for key `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("stored value for key `{key}` is not valid JSON for its type: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            StoreError::Io { key, .. }
            | StoreError::Encode { key, .. }
            | StoreError::Decode { key, .. } => key,
        }
    }
}

/// Synchronous, single-writer key-value storage.
pub trait KvStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

pub fn load_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// In-process store; contents vanish with the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Durable JSON state: synced file, synced parent directory, owner-only mode.
const FILE_STORE_WRITE: AtomicWriteOptions = AtomicWriteOptions {
    file_sync: FileSyncPolicy::SyncAll,
    sync_parent_dir: true,
    mode: PersistMode::OwnerOnly,
};

/// One `<key>.json` file per key inside a private directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create the directory if needed (owner-only on Unix).
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        ensure_secure_dir(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        recover_bak_file(&path);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        atomic_write_with_options(self.path_for(key), value.as_bytes(), FILE_STORE_WRITE)
            .map_err(|source| StoreError::Io {
                key: key.to_string(),
                source,
            })
    }
}

/// Map a key onto a file stem, one stem per key.
///
/// `[A-Za-z0-9-]` is kept, `_` becomes `__` and every other byte becomes `_xx`
/// (lowercase hex), so no two keys share a file.
fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' => stem.push(char::from(byte)),
            b'_' => stem.push_str("__"),
            other => {
                let _ = write!(stem, "_{other:02x}");
            }
        }
    }
    stem
}

pub(crate) fn ensure_secure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::{MetadataExt, PermissionsExt};
        let metadata = fs::metadata(path)?;

        // Only modify permissions if we own the directory
        let our_uid = unsafe { libc::getuid() };
        if metadata.uid() != our_uid {
            return Ok(());
        }

        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            tracing::warn!(
                "Data dir permissions are too open ({:o}); tightening to 0700",
                mode
            );
            fs::set_permissions(path, fs::Permissions::from_mode(0o700))?;
        }
    }
    Ok(())
}
