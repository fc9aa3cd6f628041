use std::fs::File;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use bitpup_core::Fetcher;
use reqwest::blocking::{Client, Response};
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// `Fetcher` over blocking HTTP(S). Non-success statuses are errors so a
/// remote's 404 page is never mistaken for a document.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// `accept_invalid_certs` skips TLS certificate validation, for
    /// self-signed package hosts.
    pub fn new(accept_invalid_certs: bool) -> Result<Self> {
        if accept_invalid_certs {
            warn!("TLS certificate validation is disabled");
        }
        let client = Client::builder()
            .user_agent(concat!("bitpup/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .context("failed to build http client")?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<Response> {
        debug!(url, "GET");
        self.client
            .get(url)
            .send()
            .with_context(|| format!("request failed: {url}"))?
            .error_for_status()
            .with_context(|| format!("unexpected response status: {url}"))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let body = self
            .get(url)?
            .bytes()
            .with_context(|| format!("failed reading response body: {url}"))?;
        Ok(body.to_vec())
    }

    fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        let mut response = self.get(url)?;
        let mut file = File::create(destination)
            .with_context(|| format!("failed to create {}", destination.display()))?;
        let written = response
            .copy_to(&mut file)
            .with_context(|| format!("failed downloading {url} to {}", destination.display()))?;
        debug!(url, bytes = written, "download complete");
        Ok(written)
    }
}
