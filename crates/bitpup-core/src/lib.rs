mod arch;
mod lookup;
mod manifest;
mod package_id;
mod pointer;
mod transport;

pub use arch::{host_arch, normalize_arch};
pub use lookup::LookupMiss;
pub use manifest::{PackageManifest, ThreadDocument};
pub use package_id::validate_package_id;
pub use pointer::{pointer_document_url, redirect_url, POINTER_EXTENSION};
pub use transport::Fetcher;

#[cfg(test)]
mod tests;
