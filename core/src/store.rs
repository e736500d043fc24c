//! JSON file persistence layer.
//!
//! RULE: Only store.rs touches the customer file.
//! The ledger calls store methods — it never does file I/O directly.
//! Every write replaces the whole file.

use crate::{
    error::{LedgerError, LedgerResult},
    snapshot::LedgerSnapshot,
};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole store. A missing file is `Ok(None)`; an unreadable
    /// or unparsable one is `StorageRead`.
    pub fn try_load(&self) -> LedgerResult<Option<LedgerSnapshot>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.read_error(e)),
        };
        LedgerSnapshot::from_json(&content)
            .map(Some)
            .map_err(|e| self.read_error(e))
    }

    /// Read the whole store, degrading to an empty ledger.
    /// The second value carries the error that was swallowed, if any.
    pub fn load(&self) -> (LedgerSnapshot, Option<LedgerError>) {
        match self.try_load() {
            Ok(Some(snapshot)) => {
                log::debug!(
                    "loaded {} customers from {}",
                    snapshot.customers.len(),
                    self.path.display()
                );
                (snapshot, None)
            }
            Ok(None) => {
                log::debug!("no store at {}, starting empty", self.path.display());
                (LedgerSnapshot::default(), None)
            }
            Err(e) => {
                log::warn!("{e}; starting with an empty ledger");
                (LedgerSnapshot::default(), Some(e))
            }
        }
    }

    /// Replace the store with `snapshot`. The file is written beside the
    /// target and renamed into place, so a failed write leaves the old file.
    pub fn persist(&self, snapshot: &LedgerSnapshot) -> LedgerResult<()> {
        let json = snapshot.to_json()?;
        write_atomically(&self.path, json.as_bytes()).map_err(|source| LedgerError::StorageWrite {
            path: self.path.clone(),
            source,
        })?;
        log::debug!(
            "persisted {} customers to {}",
            snapshot.customers.len(),
            self.path.display()
        );
        Ok(())
    }

    fn read_error(&self, e: impl std::fmt::Display) -> LedgerError {
        LedgerError::StorageRead {
            path:   self.path.clone(),
            reason: e.to_string(),
        }
    }
}

/// Write `bytes` to `path` via a temp file in the same directory.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
