use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;

pub fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

pub fn remove_dir_all_if_exists(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    Ok(())
}

/// Moves a file or directory, replacing whatever sits at `dst`. Falls back to
/// copy-then-delete when `rename` crosses filesystems.
pub(crate) fn move_entry(src: &Path, dst: &Path) -> Result<()> {
    if let Ok(metadata) = fs::symlink_metadata(dst) {
        let removed = if metadata.is_dir() {
            fs::remove_dir_all(dst)
        } else {
            fs::remove_file(dst)
        };
        removed.with_context(|| format!("failed to replace {}", dst.display()))?;
    }

    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    let metadata = fs::symlink_metadata(src)
        .with_context(|| format!("failed to stat {}", src.display()))?;
    if metadata.is_dir() {
        copy_dir_recursive(src, dst)?;
        fs::remove_dir_all(src)
            .with_context(|| format!("failed to cleanup staged dir: {}", src.display()))?;
    } else {
        copy_entry(src, dst, &metadata)?;
        fs::remove_file(src)
            .with_context(|| format!("failed to cleanup staged file: {}", src.display()))?;
    }
    Ok(())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).with_context(|| format!("failed to create {}", dst.display()))?;
    for entry in fs::read_dir(src).with_context(|| format!("failed to read {}", src.display()))? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let metadata = fs::symlink_metadata(&src_path)
            .with_context(|| format!("failed to stat {}", src_path.display()))?;
        if metadata.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            copy_entry(&src_path, &dst_path, &metadata)?;
        }
    }
    Ok(())
}

fn copy_entry(src: &Path, dst: &Path, metadata: &fs::Metadata) -> Result<()> {
    #[cfg(unix)]
    if metadata.file_type().is_symlink() {
        let target = fs::read_link(src)
            .with_context(|| format!("failed to read symlink {}", src.display()))?;
        std::os::unix::fs::symlink(&target, dst).with_context(|| {
            format!(
                "failed to create symlink {} -> {}",
                dst.display(),
                target.display()
            )
        })?;
        return Ok(());
    }
    #[cfg(not(unix))]
    let _ = metadata;

    fs::copy(src, dst)
        .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
    Ok(())
}
