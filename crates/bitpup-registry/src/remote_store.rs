use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::remote::RemoteSource;

pub const REMOTE_LIST_FILE_NAME: &str = "remote.list";

/// Remote lists on disk: `<remotes_dir>/<name>/remote.list`, one remote per
/// line. Any `remote.list` below `remotes_dir` is read.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    remotes_dir: PathBuf,
}

impl RemoteStore {
    pub fn new(remotes_dir: impl Into<PathBuf>) -> Self {
        Self {
            remotes_dir: remotes_dir.into(),
        }
    }

    pub fn remotes_dir(&self) -> &Path {
        &self.remotes_dir
    }

    pub fn add_remote(&self, name: &str, source: &RemoteSource) -> Result<PathBuf> {
        validate_remote_name(name)?;
        if source.base_url.is_empty() || source.base_url.chars().any(char::is_whitespace) {
            anyhow::bail!("invalid remote url: '{}'", source.base_url);
        }

        let dir = self.remotes_dir.join(name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed creating remote directory: {}", dir.display()))?;

        let path = dir.join(REMOTE_LIST_FILE_NAME);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed opening remote list: {}", path.display()))?;
        writeln!(file, "{}", source.to_line())
            .with_context(|| format!("failed writing remote list: {}", path.display()))?;

        Ok(path)
    }

    pub fn list_remotes(&self) -> Result<Vec<RemoteSource>> {
        if !self.remotes_dir.exists() {
            return Ok(Vec::new());
        }

        let mut list_files = Vec::new();
        collect_remote_lists(&self.remotes_dir, &mut list_files)?;
        list_files.sort();

        let mut remotes = Vec::new();
        for path in list_files {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed reading remote list: {}", path.display()))?;
            let before = remotes.len();
            remotes.extend(content.lines().filter_map(RemoteSource::parse_line));
            debug!(
                path = %path.display(),
                remotes = remotes.len() - before,
                "read remote list"
            );
        }

        Ok(remotes)
    }

    /// Every `(remote, channel)` pair expanded for `arch`, in discovery order.
    /// Empty when nothing is configured.
    pub fn candidate_sources(&self, arch: &str) -> Result<Vec<String>> {
        Ok(self
            .list_remotes()?
            .iter()
            .flat_map(|remote| remote.candidate_urls(arch))
            .collect())
    }
}

fn collect_remote_lists(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_remote_lists(&path, out)?;
        } else if entry.file_name() == REMOTE_LIST_FILE_NAME {
            out.push(path);
        }
    }
    Ok(())
}

pub fn validate_remote_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 {
        anyhow::bail!("invalid remote name: must be 1 to 64 characters");
    }

    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        anyhow::bail!("invalid remote name: '{name}'");
    };

    let first_is_valid = first.is_ascii_alphanumeric();
    let rest_is_valid =
        chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.');
    if !first_is_valid || !rest_is_valid {
        anyhow::bail!("invalid remote name: '{name}'");
    }

    Ok(())
}
