use std::path::PathBuf;

use crate::CommandStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    pub auto_confirm: bool,
    /// Value substituted for `$ROOT` in install commands.
    pub root_prefix: String,
}

impl InstallOptions {
    pub fn new(auto_confirm: bool, root_prefix: impl Into<String>) -> Self {
        Self {
            auto_confirm,
            root_prefix: root_prefix.into(),
        }
    }

    /// The filesystem root substitutes as the empty string so `$ROOT/usr`
    /// reads `/usr`.
    pub fn root_substitution(&self) -> &str {
        self.root_prefix.trim_end_matches('/')
    }
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self::new(false, "/")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(InstalledPackage),
    AlreadyInstalled,
    Aborted,
    Failed(InstallFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub id: String,
    pub version: String,
    pub install_dir: PathBuf,
    pub command_status: Option<CommandStatus>,
    /// Dependencies whose ownership record gained this package.
    pub recorded_owner_of: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallFailure {
    Download(String),
    Extract(String),
    /// The shell could not be started, so the commands never ran.
    CommandStart(String),
    Command(CommandStatus),
}

impl InstallFailure {
    /// A failed download leaves the install dir in place; every other
    /// failure discards it.
    pub fn keeps_install_dir(&self) -> bool {
        matches!(self, Self::Download(_))
    }
}

impl std::fmt::Display for InstallFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Download(detail) => write!(f, "download failed: {detail}"),
            Self::Extract(detail) => write!(f, "extraction failed: {detail}"),
            Self::CommandStart(detail) => {
                write!(f, "install commands could not be started: {detail}")
            }
            Self::Command(status) => write!(f, "install commands failed with {status}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoveOptions {
    pub auto_confirm: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed(RemovedPackage),
    NotInstalled,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedPackage {
    pub id: String,
    pub dependents: Dependents,
    /// Other records the id was scrubbed from, when pruning is enabled.
    pub scrubbed_from: Vec<String>,
}

/// What the ownership record says about a package being removed. Reported
/// only; never blocks removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependents {
    Unrecorded,
    NoneRemaining,
    RequiredBy(Vec<String>),
}

impl Dependents {
    pub fn note(&self) -> Option<String> {
        match self {
            Self::Unrecorded => None,
            Self::NoneRemaining => Some("no remaining dependents".to_string()),
            Self::RequiredBy(owners) => {
                Some(format!("declared as a dependency by: {}", owners.join(", ")))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReceipt {
    pub id: String,
    pub name: String,
    pub version: String,
    pub artifact_url: Option<String>,
    pub dependencies: Vec<String>,
    pub installed_at_unix: u64,
}
