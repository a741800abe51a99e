//! Persistence contract for the catalog and the subscriber list.
//!
//! The pipeline only needs whole-document `load`/`save`; there are no
//! partial updates. [`JsonFileStore`] keeps a document as pretty-printed
//! JSON on disk and treats a missing file as an empty document.
//! [`MemoryStore`] backs the tests.
//!
//! Nothing here locks: a single writer is assumed.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::error::StoreError;
use crate::models::{Catalog, Subscribers};
use crate::utils::ensure_parent_dir;

/// Whole-document load/save over one persisted value.
pub trait SnapshotStore<T> {
    fn load(&self) -> Result<T, StoreError>;
    fn save(&self, value: &T) -> Result<(), StoreError>;
}

/// Store holding the event [`Catalog`].
pub trait CatalogStore: SnapshotStore<Catalog> {}
impl<S: SnapshotStore<Catalog>> CatalogStore for S {}

/// Store holding [`Subscribers`].
pub trait SubscriberStore: SnapshotStore<Subscribers> {}
impl<S: SnapshotStore<Subscribers>> SubscriberStore for S {}

/// A JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> SnapshotStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    fn load(&self) -> Result<T, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Document missing; starting empty");
                return Ok(T::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    fn save(&self, value: &T) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        ensure_parent_dir(&self.path).map_err(io_err)?;
        std::fs::write(&self.path, json).map_err(io_err)?;
        info!("Saved document");
        Ok(())
    }
}

/// An in-memory document that counts saves.
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    value: RefCell<T>,
    saves: RefCell<usize>,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            saves: RefCell::new(0),
        }
    }

    pub fn snapshot(&self) -> T {
        self.value.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl<T: Clone> SnapshotStore<T> for MemoryStore<T> {
    fn load(&self) -> Result<T, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, value: &T) -> Result<(), StoreError> {
        *self.value.borrow_mut() = value.clone();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}
