use anyhow::{Context, Result};
use bitpup_core::validate_package_id;
use std::fs;
use tracing::{info, warn};

use crate::fs_utils::remove_dir_all_if_exists;
use crate::receipts::remove_install_receipt;
use crate::{
    ConfirmRequest, Dependents, Installer, RemovalOutcome, RemoveOptions, RemovedPackage,
};

impl Installer<'_> {
    /// Deletes the install and data dirs of `id`. Dependencies are left in
    /// place and the ownership record is only reported.
    pub fn remove(&self, id: &str, options: &RemoveOptions) -> Result<RemovalOutcome> {
        validate_package_id(id)?;
        let install_dir = self.layout.package_dir(id);
        if !install_dir.exists() {
            return Ok(RemovalOutcome::NotInstalled);
        }

        let dependents = match self.ledger.read(id) {
            Ok(None) => Dependents::Unrecorded,
            Ok(Some(record)) if record.owners.is_empty() => Dependents::NoneRemaining,
            Ok(Some(record)) => Dependents::RequiredBy(record.owners.into_iter().collect()),
            Err(err) => {
                let detail = format!("{err:#}");
                warn!(package = id, error = %detail, "ignoring unreadable ownership record");
                Dependents::Unrecorded
            }
        };

        if !options.auto_confirm {
            let packages = [id.to_string()];
            let notes: Vec<String> = dependents.note().into_iter().collect();
            let request = ConfirmRequest {
                action: "Removing",
                packages: &packages,
                dependencies: &[],
                notes: &notes,
            };
            if !self.services.prompter.confirm(&request)? {
                return Ok(RemovalOutcome::Aborted);
            }
        }

        fs::remove_dir_all(&install_dir)
            .with_context(|| format!("failed to remove install dir: {}", install_dir.display()))?;
        let data_dir = self.layout.package_data_dir(id);
        remove_dir_all_if_exists(&data_dir)
            .with_context(|| format!("failed to remove data dir: {}", data_dir.display()))?;
        remove_install_receipt(self.layout, id)?;

        let scrubbed_from = if self.settings.prune_owner_records_on_remove {
            self.ledger.scrub_owner(id)?
        } else {
            Vec::new()
        };

        info!(package = id, "removed package");
        Ok(RemovalOutcome::Removed(RemovedPackage {
            id: id.to_string(),
            dependents,
            scrubbed_from,
        }))
    }
}
