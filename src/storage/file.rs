use super::DurableStore;
use crate::{ProseError, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const ENTRIES_DIR: &str = "entries";
const ENTRY_EXT: &str = "entry";
const TMP_EXT: &str = "tmp";

/// File name for a key: lowercase hex, safe on case-insensitive filesystems
fn file_stem(key: &str) -> String {
    key.bytes().map(|b| format!("{:02x}", b)).collect()
}

fn key_from_stem(stem: &str) -> Option<String> {
    if stem.len() % 2 != 0 {
        return None;
    }
    let bytes: Option<Vec<u8>> = (0..stem.len())
        .step_by(2)
        .map(|i| stem.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect();
    String::from_utf8(bytes?).ok()
}

/// Store keeping one file per key
///
/// A write replaces only that key's file, through a temporary file and a
/// rename, so a crash leaves either the old or the new value. Values are read
/// once at open and served from memory afterwards.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the store inside `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().join(ENTRIES_DIR);
        fs::create_dir_all(&dir).map_err(|e| {
            ProseError::StorageFailure(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let listing = fs::read_dir(&dir).map_err(|e| {
            ProseError::StorageFailure(format!("Failed to read {}: {}", dir.display(), e))
        })?;

        let mut entries = BTreeMap::new();
        for item in listing.flatten() {
            let path = item.path();
            let ext = path.extension().and_then(|e| e.to_str());

            // Leftovers from an interrupted write
            if ext == Some(TMP_EXT) {
                if let Err(e) = fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "Failed to remove stale temp file");
                }
                continue;
            }
            if ext != Some(ENTRY_EXT) {
                continue;
            }

            let Some(key) = path.file_stem().and_then(|s| s.to_str()).and_then(key_from_stem) else {
                debug!(path = %path.display(), "Ignoring file with unknown name");
                continue;
            };

            match fs::read_to_string(&path) {
                Ok(value) => {
                    entries.insert(key, value);
                }
                Err(e) => {
                    // Keep the unreadable file around instead of overwriting it
                    warn!(path = %path.display(), key = %key, error = %e, "Entry unreadable, skipping");
                    if let Err(e) = fs::rename(&path, path.with_extension("corrupt")) {
                        warn!(error = %e, "Failed to move unreadable entry aside");
                    }
                }
            }
        }

        info!(path = %dir.display(), keys = entries.len(), "Opened durable store");

        Ok(Self {
            dir,
            entries: RwLock::new(entries),
        })
    }

    /// Directory holding the entry files
    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(file_stem(key)).with_extension(ENTRY_EXT)
    }

    fn write_entry(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key);
        let tmp = path.with_extension(TMP_EXT);

        fs::write(&tmp, value.as_bytes()).map_err(|e| {
            ProseError::StorageFailure(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &path).map_err(|e| {
            ProseError::StorageFailure(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        debug!(key = %key, bytes = value.len(), "Entry written");
        Ok(())
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write();
        // Only adopt the value once it is on disk
        self.write_entry(key, value)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write();
        if !entries.contains_key(key) {
            return Ok(());
        }

        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ProseError::StorageFailure(format!(
                    "Failed to remove {}: {}",
                    path.display(),
                    e
                )))
            }
        }
        entries.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
