use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

use crate::BitLayout;

pub const DEFAULT_PPA_BASE_URL: &str = "http://ppa.wheedev.org";

/// Optional `config.toml` under the base directory. Every key may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// A nonzero exit from the install commands fails the package.
    pub fail_on_install_command_error: bool,
    /// Removing a package also drops it from every other ownership record.
    pub prune_owner_records_on_remove: bool,
    pub ppa_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fail_on_install_command_error: true,
            prune_owner_records_on_remove: false,
            ppa_base_url: DEFAULT_PPA_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    pub fn load(layout: &BitLayout) -> Result<Self> {
        let path = layout.config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read settings: {}", path.display()));
            }
        };

        Self::from_toml_str(&raw)
            .with_context(|| format!("failed parsing settings: {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("settings must be valid TOML")
    }
}
