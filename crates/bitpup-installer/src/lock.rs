use anyhow::{bail, Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Advisory lock: the marker file existing is the whole state. Checked once
/// per invocation, never held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockGate {
    path: PathBuf,
}

impl LockGate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_locked(&self) -> bool {
        self.path.exists()
    }

    pub fn lock(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, format!("{}\n", std::process::id()))
            .with_context(|| format!("failed to write lock: {}", self.path.display()))
    }

    /// Returns whether a lock was present.
    pub fn unlock(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => {
                Err(err).with_context(|| format!("failed to remove lock: {}", self.path.display()))
            }
        }
    }

    pub fn ensure_unlocked(&self) -> Result<()> {
        if self.is_locked() {
            bail!(
                "bitpup is locked ({}); run 'bitpup unlock' first",
                self.path.display()
            );
        }
        Ok(())
    }
}
