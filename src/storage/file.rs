use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use atomic_write_file::AtomicWriteFile;

use super::{EntryStore, StoredEntry};
use crate::constants::ENTRY_FILE_EXTENSION;
use crate::{AuthorityError, Result};

/// One JSON document per entry inside a directory.
///
/// Saves replace the file atomically, so a concurrent reader sees either the
/// previous or the new document.
#[derive(Debug)]
pub struct FileStore<T> {
    dir: PathBuf,
    _entry: PhantomData<fn() -> T>,
}

impl<T: StoredEntry> FileStore<T> {
    /// Opens the store, creating `dir` if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs_err::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            _entry: PhantomData,
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let reason = if name.is_empty() {
            Some("name is empty")
        } else if name.starts_with('.') {
            Some("name must not start with a dot")
        } else if name.contains(['/', '\\', '\0']) {
            Some("name contains a path separator")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(AuthorityError::InvalidName {
                kind: "entry name",
                value: name.to_string(),
                reason: reason.to_string(),
            });
        }
        Ok(self.dir.join(format!("{name}.{ENTRY_FILE_EXTENSION}")))
    }
}

impl<T: StoredEntry> EntryStore<T> for FileStore<T> {
    fn load(&self, name: &str) -> Result<Option<T>> {
        let path = self.path_for(name)?;
        match fs_err::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, entry: &T) -> Result<()> {
        let path = self.path_for(entry.entry_name())?;
        let bytes = serde_json::to_vec_pretty(entry)?;
        let mut file = AtomicWriteFile::options().open(&path)?;
        file.write_all(&bytes)?;
        file.commit()?;
        tracing::debug!(
            target = "authority::storage",
            path = %path.display(),
            bytes = bytes.len(),
            "saved entry"
        );
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        match fs_err::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn list_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs_err::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_FILE_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            // In-flight atomic writes live in hidden temporaries.
            if stem.starts_with('.') {
                continue;
            }
            names.push(stem.to_string());
        }
        names.sort();
        Ok(names)
    }
}
