/// Legacy type token some remote lists carry in front of each entry.
const LEGACY_REMOTE_TYPE: &str = "choco";

/// One configured remote: a base URL, the pool it publishes under and the
/// channels to search in that pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    pub base_url: String,
    pub pool: String,
    pub channels: Vec<String>,
}

impl RemoteSource {
    /// Parses `<baseURL> <poolName> [<channel> ...]`, optionally prefixed by
    /// the legacy `choco` token. Blank lines, comments and lines without a
    /// pool yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let mut tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() >= 3 && tokens[0] == LEGACY_REMOTE_TYPE {
            tokens.remove(0);
        }
        if tokens.len() < 2 {
            return None;
        }

        Some(Self {
            base_url: tokens[0].to_string(),
            pool: tokens[1].to_string(),
            channels: tokens[2..].iter().map(|channel| channel.to_string()).collect(),
        })
    }

    pub fn to_line(&self) -> String {
        let mut line = format!("{} {}", self.base_url, self.pool);
        for channel in &self.channels {
            line.push(' ');
            line.push_str(channel);
        }
        line
    }

    /// One candidate base URL per channel, in channel order.
    pub fn candidate_urls(&self, arch: &str) -> Vec<String> {
        let base = self.base_url.trim_end_matches('/');
        self.channels
            .iter()
            .map(|channel| format!("{base}/pool/{}/{arch}/{channel}", self.pool))
            .collect()
    }
}

/// Expands the `ppa:<profile>/<ppa>` shorthand; other URLs pass through.
pub fn expand_remote_url(arg: &str, ppa_base_url: &str) -> String {
    match arg.strip_prefix("ppa:") {
        Some(path) => format!(
            "{}/{}",
            ppa_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ),
        None => arg.to_string(),
    }
}
