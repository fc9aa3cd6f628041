mod extract;
mod fs_utils;
mod install;
mod layout;
mod ledger;
mod lock;
mod prompt;
mod receipts;
mod remove;
mod runner;
mod settings;
mod types;

pub use extract::{Extractor, TarExtractor};
pub use fs_utils::{remove_dir_all_if_exists, remove_file_if_exists};
pub use install::{list_installed, InstallServices, Installer};
pub use layout::{BitLayout, DEFAULT_BASE_DIR};
pub use ledger::{OwnershipLedger, OwnershipRecord};
pub use lock::LockGate;
pub use prompt::{
    is_refusal, read_confirmation, render_confirm_request, ConfirmRequest, Prompter,
    StdinPrompter,
};
pub use receipts::{
    current_unix_timestamp, read_install_receipt, remove_install_receipt, write_install_receipt,
};
pub use runner::{CommandRunner, CommandStatus, ShellRunner};
pub use settings::{Settings, DEFAULT_PPA_BASE_URL};
pub use types::{
    Dependents, InstallFailure, InstallOptions, InstallOutcome, InstallReceipt, InstalledPackage,
    RemovalOutcome, RemoveOptions, RemovedPackage,
};
