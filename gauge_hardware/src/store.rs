//! Block stores for the calibration profile record.

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use gauge_traits::{BlockStore, StoreError};

/// One file on disk, replaced atomically on save.
///
/// The block is written to a sibling `*.tmp` file, synced, then renamed over
/// the target, so a power cut leaves either the old or the new block.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl BlockStore for FileStore {
    fn load_block(&mut self) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn save_block(&mut self, block: &[u8]) -> Result<(), StoreError> {
        let tmp = self.tmp_path();
        let write = || -> io::Result<()> {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(block)?;
            f.sync_all()?;
            fs::rename(&tmp, &self.path)
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::WriteFailed(format!(
                "{}: {e}",
                self.path.display()
            )));
        }
        // Persist the rename itself; not every platform lets us open a dir.
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Ok(d) = fs::File::open(dir) {
                let _ = d.sync_all();
            }
        }
        tracing::debug!(path = %self.path.display(), bytes = block.len(), "block saved");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    block: Option<Vec<u8>>,
    fail_writes: u32,
    fail_loads: bool,
    writes: u32,
}

/// In-memory store. Clones share contents, so dropping a gauge and building
/// a new one on a clone simulates a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(block: Vec<u8>) -> Self {
        let s = Self::new();
        s.inner.borrow_mut().block = Some(block);
        s
    }

    /// Make the next `n` saves fail without touching the stored block.
    pub fn fail_writes(&self, n: u32) {
        self.inner.borrow_mut().fail_writes = n;
    }

    pub fn fail_loads(&self, fail: bool) {
        self.inner.borrow_mut().fail_loads = fail;
    }

    pub fn block(&self) -> Option<Vec<u8>> {
        self.inner.borrow().block.clone()
    }

    /// Successful saves so far.
    pub fn writes(&self) -> u32 {
        self.inner.borrow().writes
    }
}

impl BlockStore for MemoryStore {
    fn load_block(&mut self) -> Result<Option<Vec<u8>>, StoreError> {
        let inner = self.inner.borrow();
        if inner.fail_loads {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(inner.block.clone())
    }

    fn save_block(&mut self, block: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes > 0 {
            inner.fail_writes -= 1;
            return Err(StoreError::WriteFailed("injected failure".into()));
        }
        inner.block = Some(block.to_vec());
        inner.writes += 1;
        Ok(())
    }
}
