use std::fmt;

/// Why a package id could not be turned into a manifest. Every variant is a
/// "not found" from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupMiss {
    InvalidId { id: String, reason: String },
    NoSources,
    PointerUnavailable { url: String, reason: String },
    MissingRedirect { url: String },
    ThreadUnavailable { url: String, reason: String },
}

impl LookupMiss {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::InvalidId { .. } => "invalid-id",
            Self::NoSources => "no-sources",
            Self::PointerUnavailable { .. } => "pointer-unavailable",
            Self::MissingRedirect { .. } => "missing-redirect",
            Self::ThreadUnavailable { .. } => "thread-unavailable",
        }
    }
}

impl fmt::Display for LookupMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId { id, reason } => write!(f, "invalid package id '{id}': {reason}"),
            Self::NoSources => write!(f, "no remote sources to search"),
            Self::PointerUnavailable { url, reason } => {
                write!(f, "pointer document unavailable at {url}: {reason}")
            }
            Self::MissingRedirect { url } => {
                write!(f, "pointer document at {url} has no 'url' field")
            }
            Self::ThreadUnavailable { url, reason } => {
                write!(f, "thread document unavailable at {url}: {reason}")
            }
        }
    }
}

impl std::error::Error for LookupMiss {}
