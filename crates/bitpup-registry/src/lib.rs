mod http;
mod manifest_fetch;
mod remote;
mod remote_store;

pub use http::HttpFetcher;
pub use manifest_fetch::ManifestFetcher;
pub use remote::{expand_remote_url, RemoteSource};
pub use remote_store::{validate_remote_name, RemoteStore, REMOTE_LIST_FILE_NAME};
