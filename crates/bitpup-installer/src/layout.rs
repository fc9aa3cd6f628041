use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_DIR: &str = "/bit";

/// Every path bitpup persists, rooted at one base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitLayout {
    base: PathBuf,
}

impl BitLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.base.join("packages")
    }

    pub fn package_dir(&self, id: &str) -> PathBuf {
        self.packages_dir().join(id)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base.join("data")
    }

    pub fn package_data_dir(&self, id: &str) -> PathBuf {
        self.data_dir().join(id)
    }

    pub fn remotes_dir(&self) -> PathBuf {
        self.base.join("remotes")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.base.join("state")
    }

    pub fn owners_dir(&self) -> PathBuf {
        self.state_dir().join("owners")
    }

    pub fn installed_state_dir(&self) -> PathBuf {
        self.state_dir().join("installed")
    }

    pub fn receipt_path(&self, id: &str) -> PathBuf {
        self.installed_state_dir().join(format!("{id}.receipt"))
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.base.join("tmp")
    }

    pub fn staging_dir(&self, id: &str) -> PathBuf {
        self.tmp_dir()
            .join(format!("extract-{id}-{}", std::process::id()))
    }

    /// Where `reinstall` parks the current install until the new one lands.
    pub fn previous_install_dir(&self, id: &str) -> PathBuf {
        self.tmp_dir()
            .join(format!("previous-{id}-{}", std::process::id()))
    }

    pub fn lock_path(&self) -> PathBuf {
        self.base.join("lock")
    }

    pub fn config_path(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    pub fn ensure_base_dirs(&self) -> Result<()> {
        for dir in [
            self.packages_dir(),
            self.data_dir(),
            self.remotes_dir(),
            self.owners_dir(),
            self.installed_state_dir(),
            self.tmp_dir(),
        ] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}
