use std::cell::{Cell, RefCell};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, bail};

/// Opaque single-key blob persistence. The ledger treats the store as one
/// key-value slot holding the serialized snapshot; the blob has no lifecycle
/// of its own and is overwritten on every save.
pub trait BlobStore {
    /// Read the stored blob, or None when nothing has been saved yet.
    fn read(&self) -> Result<Option<String>>;

    /// Overwrite the stored blob.
    fn write(&self, blob: &str) -> Result<()>;
}

/// File-backed store: the blob is the file's entire contents.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlobStore for JsonFileStore {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", self.path.display())),
        }
    }

    fn write(&self, blob: &str) -> Result<()> {
        fs::write(&self.path, blob)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

/// In-memory store for tests and ephemeral sessions. Clones share the same
/// slot, so a test can hand one clone to the ledger and inspect the other.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    blob: RefCell<Option<String>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently stored blob, if any.
    pub fn blob(&self) -> Option<String> {
        self.inner.blob.borrow().clone()
    }

    /// Pre-seed the slot, e.g. with a hand-written snapshot.
    pub fn set_blob(&self, blob: impl Into<String>) {
        *self.inner.blob.borrow_mut() = Some(blob.into());
    }

    /// Make subsequent writes fail, simulating an unavailable store.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.set(fail);
    }
}

impl BlobStore for MemoryStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.inner.blob.borrow().clone())
    }

    fn write(&self, blob: &str) -> Result<()> {
        if self.inner.fail_writes.get() {
            bail!("store unavailable");
        }
        *self.inner.blob.borrow_mut() = Some(blob.to_string());
        Ok(())
    }
}
