use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{BitLayout, InstallReceipt};

pub fn write_install_receipt(layout: &BitLayout, receipt: &InstallReceipt) -> Result<PathBuf> {
    let mut payload = String::new();
    payload.push_str(&format!("id={}\n", receipt.id));
    payload.push_str(&format!("name={}\n", single_line(&receipt.name)));
    payload.push_str(&format!("version={}\n", single_line(&receipt.version)));
    if let Some(url) = &receipt.artifact_url {
        payload.push_str(&format!("artifact_url={}\n", single_line(url)));
    }
    for dependency in &receipt.dependencies {
        payload.push_str(&format!("dependency={}\n", dependency));
    }
    payload.push_str(&format!(
        "installed_at_unix={}\n",
        receipt.installed_at_unix
    ));

    let dir = layout.installed_state_dir();
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = layout.receipt_path(&receipt.id);
    fs::write(&path, payload.as_bytes())
        .with_context(|| format!("failed to write install receipt: {}", path.display()))?;
    Ok(path)
}

pub fn read_install_receipt(layout: &BitLayout, id: &str) -> Result<Option<InstallReceipt>> {
    let path = layout.receipt_path(id);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read install receipt: {}", path.display()));
        }
    };

    let receipt = parse_receipt(&raw)
        .with_context(|| format!("failed to parse install receipt: {}", path.display()))?;
    Ok(Some(receipt))
}

pub fn remove_install_receipt(layout: &BitLayout, id: &str) -> Result<bool> {
    let path = layout.receipt_path(id);
    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(&path)
        .with_context(|| format!("failed to remove install receipt: {}", path.display()))?;
    Ok(true)
}

pub fn current_unix_timestamp() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system time is before unix epoch")?
        .as_secs())
}

pub(crate) fn parse_receipt(raw: &str) -> Result<InstallReceipt> {
    let mut id = None;
    let mut name = None;
    let mut version = None;
    let mut artifact_url = None;
    let mut dependencies = Vec::new();
    let mut installed_at_unix = None;

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        match k {
            "id" => id = Some(v.to_string()),
            "name" => name = Some(v.to_string()),
            "version" => version = Some(v.to_string()),
            "artifact_url" => artifact_url = Some(v.to_string()),
            "dependency" => dependencies.push(v.to_string()),
            "installed_at_unix" => {
                installed_at_unix = Some(v.parse().context("installed_at_unix must be u64")?)
            }
            _ => {}
        }
    }

    Ok(InstallReceipt {
        id: id.context("missing id")?,
        name: name.unwrap_or_default(),
        version: version.unwrap_or_default(),
        artifact_url,
        dependencies,
        installed_at_unix: installed_at_unix.context("missing installed_at_unix")?,
    })
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
