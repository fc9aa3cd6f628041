use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Unpacks `archive` into `destination`, dropping `strip_components`
/// leading path segments from every entry.
pub trait Extractor {
    fn extract(&self, archive: &Path, destination: &Path, strip_components: u32) -> Result<()>;
}

/// Shells out to the system `tar`, which detects the compression itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarExtractor;

impl Extractor for TarExtractor {
    fn extract(&self, archive: &Path, destination: &Path, strip_components: u32) -> Result<()> {
        debug!(
            archive = %archive.display(),
            destination = %destination.display(),
            "extracting archive"
        );
        let mut command = build_tar_extract_command(archive, destination, strip_components);
        run_command(&mut command, "failed to extract archive")
    }
}

pub(crate) fn build_tar_extract_command(
    archive: &Path,
    destination: &Path,
    strip_components: u32,
) -> Command {
    let mut command = Command::new("tar");
    if strip_components > 0 {
        command.arg(format!("--strip-components={strip_components}"));
    }
    command.arg("-xf").arg(archive).arg("-C").arg(destination);
    command
}

fn run_command(command: &mut Command, context_message: &str) -> Result<()> {
    let output = command
        .output()
        .with_context(|| format!("{context_message}: command failed to start"))?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    Err(anyhow!(
        "{context_message}: status={} stdout='{}' stderr='{}'",
        output.status,
        stdout.trim(),
        stderr.trim()
    ))
}
