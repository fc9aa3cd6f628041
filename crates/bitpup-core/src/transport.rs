use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Blocking retrieval of remote documents and artifacts.
///
/// Implementations must return an error for transport failures and non-success
/// responses; an empty body is returned as-is and left for callers to judge.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Stores the body of `url` at `destination`, returning the byte count.
    fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        let body = self.fetch(url)?;
        fs::write(destination, &body)
            .with_context(|| format!("failed to write download: {}", destination.display()))?;
        Ok(body.len() as u64)
    }
}
