use serde::Deserialize;
use serde_yaml::Value;

use crate::manifest::scalar_text;

/// Extension of pointer documents published by remotes.
pub const POINTER_EXTENSION: &str = "choco.yml";

#[derive(Debug, Default, Deserialize)]
struct PointerDocument {
    #[serde(default)]
    url: Option<Value>,
}

/// URL of the pointer document for `package_id` under a remote base URL.
pub fn pointer_document_url(remote_base_url: &str, package_id: &str) -> String {
    format!(
        "{}/{package_id}.{POINTER_EXTENSION}",
        remote_base_url.trim_end_matches('/')
    )
}

/// Extracts the redirect target of a pointer document, if it has one.
pub fn redirect_url(input: &str) -> Option<String> {
    let document: PointerDocument = serde_yaml::from_str(input).ok()?;
    document
        .url
        .as_ref()
        .and_then(scalar_text)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}
