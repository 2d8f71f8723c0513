use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::error::Error;

/// String key/value persistence for small client-side state.
///
/// Two tiers ship with the crate: [`MemoryStore`] lives as long as the
/// visit, [`JsonFileStore`] survives restarts.
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), Error>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        (**self).remove(key)
    }
}

/// In-memory store, scoped to the process (one visit).
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.values.write().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// Store persisted as one JSON object on disk.
///
/// Every write rewrites the whole file through a temp file and a rename, so
/// a crash never leaves a half-written document behind. A file that is not
/// a JSON object of strings is treated as empty and overwritten on the next write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling temp file: the full file name plus `.tmp`, so stores that
    /// differ only by extension never share one.
    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn load(&self) -> Result<BTreeMap<String, String>, Error> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(Error::Storage(format!("{}: {e}", self.path.display()))),
        };
        match serde_json::from_str(&raw) {
            Ok(values) => Ok(values),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding unreadable store file");
                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), Error> {
        let storage_err = |e: std::io::Error| Error::Storage(format!("{}: {e}", self.path.display()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(storage_err)?;
        }
        let json = serde_json::to_vec_pretty(values)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(storage_err)?;
        std::fs::rename(&tmp, &self.path).map_err(storage_err)
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), Error> {
        let _guard = self.lock.lock();
        let mut values = self.load()?;
        f(&mut values);
        self.save(&values)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.update(|values| {
            values.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

const SIDEBAR_COLLAPSED_KEY: &str = "estatehub.sidebar_collapsed";

/// Dashboard UI preferences.
pub struct Preferences<S> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Defaults to expanded when never set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the store cannot be read.
    pub fn sidebar_collapsed(&self) -> Result<bool, Error> {
        Ok(self.store.get(SIDEBAR_COLLAPSED_KEY)?.as_deref() == Some("true"))
    }

    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the store cannot be written.
    pub fn set_sidebar_collapsed(&self, collapsed: bool) -> Result<(), Error> {
        self.store
            .set(SIDEBAR_COLLAPSED_KEY, if collapsed { "true" } else { "false" })
    }
}
