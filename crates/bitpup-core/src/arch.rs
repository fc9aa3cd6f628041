/// Maps a raw machine name (`uname -m` style) to the short tag remotes use in
/// their pool paths. Unknown machines pass through unchanged.
pub fn normalize_arch(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed {
        "x86_64" | "amd64" => "amd64".to_string(),
        "aarch64" | "arm64" => "arm64".to_string(),
        "armv7l" | "armv7" | "arm" | "armhf" => "armhf".to_string(),
        other => other.to_string(),
    }
}

pub fn host_arch() -> String {
    normalize_arch(std::env::consts::ARCH)
}
