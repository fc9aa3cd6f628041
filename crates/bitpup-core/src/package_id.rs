use anyhow::Result;

/// Package ids name directories under the install root, so anything that
/// could escape it or confuse a shell word split is rejected.
pub fn validate_package_id(id: &str) -> Result<()> {
    if id.is_empty() {
        anyhow::bail!("invalid package id: must not be empty");
    }
    if id == "." || id == ".." {
        anyhow::bail!("invalid package id: '{id}'");
    }
    if id.len() > 128 {
        anyhow::bail!("invalid package id: '{id}' is longer than 128 characters");
    }
    if let Some(ch) = id
        .chars()
        .find(|ch| matches!(ch, '/' | '\\' | '\0') || ch.is_whitespace() || ch.is_control())
    {
        anyhow::bail!("invalid package id: '{id}' contains {ch:?}");
    }

    Ok(())
}
