use bitpup_core::{
    pointer_document_url, redirect_url, validate_package_id, Fetcher, LookupMiss,
    PackageManifest,
};
use tracing::debug;

/// Resolves package ids through a remote's pointer document to the thread
/// document that describes the package.
pub struct ManifestFetcher<'a> {
    fetcher: &'a dyn Fetcher,
}

impl<'a> ManifestFetcher<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self { fetcher }
    }

    /// Two fetches: `<remote>/<id>.choco.yml`, then whatever its `url` names.
    /// Only empty or failed fetches and a missing `url` are misses; the thread
    /// document itself is parsed permissively.
    pub fn fetch_manifest(
        &self,
        package_id: &str,
        remote_base_url: &str,
    ) -> Result<PackageManifest, LookupMiss> {
        check_id(package_id)?;

        let pointer_url = pointer_document_url(remote_base_url, package_id);
        let pointer = self
            .fetch_text(&pointer_url)
            .map_err(|reason| LookupMiss::PointerUnavailable {
                url: pointer_url.clone(),
                reason,
            })?;

        let Some(thread_url) = redirect_url(&pointer) else {
            return Err(LookupMiss::MissingRedirect { url: pointer_url });
        };

        let thread = self
            .fetch_text(&thread_url)
            .map_err(|reason| LookupMiss::ThreadUnavailable {
                url: thread_url.clone(),
                reason,
            })?;

        debug!(
            package = package_id,
            remote = remote_base_url,
            thread = %thread_url,
            "resolved manifest"
        );
        Ok(PackageManifest::from_thread_yaml(package_id, &thread))
    }

    /// Tries each source in order and stops at the first one that answers.
    /// On a miss everywhere, the last source's miss is returned.
    pub fn find_manifest(
        &self,
        package_id: &str,
        sources: &[String],
    ) -> Result<PackageManifest, LookupMiss> {
        check_id(package_id)?;

        let mut last_miss = LookupMiss::NoSources;
        for source in sources {
            match self.fetch_manifest(package_id, source) {
                Ok(manifest) => return Ok(manifest),
                Err(miss) => {
                    debug!(
                        package = package_id,
                        source = %source,
                        reason = miss.reason_code(),
                        "lookup missed"
                    );
                    last_miss = miss;
                }
            }
        }
        Err(last_miss)
    }

    fn fetch_text(&self, url: &str) -> Result<String, String> {
        let body = self.fetcher.fetch(url).map_err(|err| format!("{err:#}"))?;
        let text = String::from_utf8_lossy(&body).into_owned();
        if text.trim().is_empty() {
            return Err("empty response".to_string());
        }
        Ok(text)
    }
}

fn check_id(package_id: &str) -> Result<(), LookupMiss> {
    validate_package_id(package_id).map_err(|err| LookupMiss::InvalidId {
        id: package_id.to_string(),
        reason: err.to_string(),
    })
}
