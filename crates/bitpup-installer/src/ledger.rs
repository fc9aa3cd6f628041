use anyhow::{Context, Result};
use bitpup_core::validate_package_id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

/// Persisted set of packages that declared a dependency on one package.
/// Fields other than `owners` are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRecord {
    #[serde(default)]
    pub owners: BTreeSet<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One pretty-printed JSON document per dependency id.
#[derive(Debug, Clone)]
pub struct OwnershipLedger {
    dir: PathBuf,
}

impl OwnershipLedger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn record_path(&self, package_id: &str) -> PathBuf {
        self.dir.join(format!("{package_id}.json"))
    }

    /// Records are keyed by file name, so ids that are not valid package ids
    /// are rejected before any path is built.
    pub fn read(&self, package_id: &str) -> Result<Option<OwnershipRecord>> {
        validate_package_id(package_id)?;
        let path = self.record_path(package_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read ownership record: {}", path.display())
                });
            }
        };

        let record = serde_json::from_str(&raw)
            .with_context(|| format!("failed parsing ownership record: {}", path.display()))?;
        Ok(Some(record))
    }

    /// Adds `owner` to the record for `package_id`, creating it if absent.
    /// Returns false when `owner` was already listed.
    pub fn record_owner(&self, package_id: &str, owner: &str) -> Result<bool> {
        let mut record = self.read(package_id)?.unwrap_or_default();
        if !record.owners.insert(owner.to_string()) {
            debug!(package = package_id, owner, "owner already recorded");
            return Ok(false);
        }

        self.write(package_id, &record)?;
        info!(package = package_id, owner, "recorded package owner");
        Ok(true)
    }

    /// Drops `owner` from every record. Returns the ids whose record changed.
    pub fn scrub_owner(&self, owner: &str) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read ownership records: {}", self.dir.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|v| v.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|v| v.to_str()) else {
                continue;
            };
            if validate_package_id(stem).is_err() {
                continue;
            }
            ids.push(stem.to_string());
        }
        ids.sort();

        let mut changed = Vec::new();
        for id in ids {
            let Some(mut record) = self.read(&id)? else {
                continue;
            };
            if record.owners.remove(owner) {
                self.write(&id, &record)?;
                info!(package = %id, owner, "scrubbed package owner");
                changed.push(id);
            }
        }
        Ok(changed)
    }

    fn write(&self, package_id: &str, record: &OwnershipRecord) -> Result<()> {
        validate_package_id(package_id)?;
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.record_path(package_id);
        let mut payload =
            serde_json::to_string_pretty(record).context("failed to serialize ownership record")?;
        payload.push('\n');
        fs::write(&path, payload)
            .with_context(|| format!("failed to write ownership record: {}", path.display()))
    }
}
