use anyhow::{Context, Result};
use bitpup_core::{validate_package_id, Fetcher, PackageManifest};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::fs_utils::{move_entry, remove_dir_all_if_exists, remove_file_if_exists};
use crate::receipts::{
    current_unix_timestamp, read_install_receipt, remove_install_receipt, write_install_receipt,
};
use crate::{
    BitLayout, CommandRunner, ConfirmRequest, Extractor, InstallFailure, InstallOptions,
    InstallOutcome, InstallReceipt, InstalledPackage, OwnershipLedger, Prompter, Settings,
};

const ROOT_TOKEN: &str = "$ROOT";
const ARCHIVE_STRIP_COMPONENTS: u32 = 1;

/// Side-effecting capabilities the executor drives.
#[derive(Clone, Copy)]
pub struct InstallServices<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub extractor: &'a dyn Extractor,
    pub runner: &'a dyn CommandRunner,
    pub prompter: &'a dyn Prompter,
}

pub struct Installer<'a> {
    pub(crate) layout: &'a BitLayout,
    pub(crate) settings: &'a Settings,
    pub(crate) services: InstallServices<'a>,
    pub(crate) ledger: OwnershipLedger,
}

impl<'a> Installer<'a> {
    pub fn new(
        layout: &'a BitLayout,
        settings: &'a Settings,
        services: InstallServices<'a>,
    ) -> Self {
        Self {
            layout,
            settings,
            services,
            ledger: OwnershipLedger::new(layout.owners_dir()),
        }
    }

    pub fn is_installed(&self, id: &str) -> bool {
        self.layout.package_dir(id).exists()
    }

    pub fn installed_version(&self, id: &str) -> Result<Option<String>> {
        Ok(read_install_receipt(self.layout, id)?.map(|receipt| receipt.version))
    }

    /// Installs one resolved package. An existing install directory makes
    /// this a no-op.
    ///
    /// Any failure other than a failed download removes the install dir (and
    /// the data dir when this call created it) so a later run starts over.
    pub fn install(
        &self,
        manifest: &PackageManifest,
        options: &InstallOptions,
    ) -> Result<InstallOutcome> {
        validate_package_id(&manifest.id)?;
        let id = manifest.id.as_str();
        let install_dir = self.layout.package_dir(id);
        if install_dir.exists() {
            debug!(package = id, "install dir exists; skipping");
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        if !options.auto_confirm {
            let packages = [manifest.id.clone()];
            let request = ConfirmRequest {
                action: "Installing",
                packages: &packages,
                dependencies: &manifest.dependencies,
                notes: &[],
            };
            if !self.services.prompter.confirm(&request)? {
                return Ok(InstallOutcome::Aborted);
            }
        }

        let data_dir = self.layout.package_data_dir(id);
        let created_data_dir = !data_dir.exists();
        fs::create_dir_all(&install_dir)
            .with_context(|| format!("failed to create install dir: {}", install_dir.display()))?;
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data dir: {}", data_dir.display()))?;

        match self.populate(manifest, options, &install_dir) {
            Ok(InstallOutcome::Failed(failure)) if !failure.keeps_install_dir() => {
                self.discard_partial(id, created_data_dir)?;
                Ok(InstallOutcome::Failed(failure))
            }
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if let Err(cleanup) = self.discard_partial(id, created_data_dir) {
                    let detail = format!("{cleanup:#}");
                    warn!(package = id, error = %detail, "failed to clean up partial install");
                }
                Err(err)
            }
        }
    }

    /// Downloads, unpacks, runs the install commands and records ownership
    /// and the receipt. The install and data dirs already exist.
    fn populate(
        &self,
        manifest: &PackageManifest,
        options: &InstallOptions,
        install_dir: &Path,
    ) -> Result<InstallOutcome> {
        let id = manifest.id.as_str();
        if manifest.has_artifact() {
            let archive_path = install_dir.join(manifest.artifact_file_name());
            debug!(package = id, url = %manifest.artifact_url, "downloading artifact");
            if let Err(err) = self
                .services
                .fetcher
                .download(manifest.artifact_url.trim(), &archive_path)
            {
                let detail = format!("{err:#}");
                warn!(package = id, error = %detail, "artifact download failed");
                return Ok(InstallOutcome::Failed(InstallFailure::Download(detail)));
            }

            if let Some(failure) = self.unpack(id, &archive_path, install_dir)? {
                return Ok(InstallOutcome::Failed(failure));
            }
        } else {
            debug!(package = id, "no artifact; running install commands only");
        }

        let mut warnings = Vec::new();
        let script = substitute_root(&manifest.install_commands, options.root_substitution());
        let command_status = if script.trim().is_empty() {
            None
        } else {
            let status = match self.services.runner.run_script(&script) {
                Ok(status) => status,
                Err(err) => {
                    let detail = format!("{err:#}");
                    warn!(package = id, error = %detail, "install commands could not be started");
                    return Ok(InstallOutcome::Failed(InstallFailure::CommandStart(detail)));
                }
            };
            if !status.success() {
                if self.settings.fail_on_install_command_error {
                    warn!(package = id, %status, "install commands failed; removing install dir");
                    return Ok(InstallOutcome::Failed(InstallFailure::Command(status)));
                }
                warn!(package = id, %status, "install commands failed; keeping install");
                warnings.push(format!("install commands exited with {status}"));
            }
            Some(status)
        };

        let mut recorded_owner_of = Vec::new();
        for dependency in &manifest.dependencies {
            if let Err(err) = validate_package_id(dependency) {
                warn!(
                    package = id,
                    %dependency,
                    "not recording ownership for invalid dependency id"
                );
                warnings.push(format!("ownership not recorded: {err}"));
                continue;
            }
            if self.ledger.record_owner(dependency, id)? {
                recorded_owner_of.push(dependency.clone());
            }
        }

        write_install_receipt(
            self.layout,
            &InstallReceipt {
                id: manifest.id.clone(),
                name: manifest.display_name.clone(),
                version: manifest.version.clone(),
                artifact_url: manifest
                    .has_artifact()
                    .then(|| manifest.artifact_url.trim().to_string()),
                dependencies: manifest.dependencies.clone(),
                installed_at_unix: current_unix_timestamp()?,
            },
        )?;

        info!(package = id, version = %manifest.version, "installed package");
        Ok(InstallOutcome::Installed(InstalledPackage {
            id: manifest.id.clone(),
            version: manifest.version.clone(),
            install_dir: install_dir.to_path_buf(),
            command_status,
            recorded_owner_of,
            warnings,
        }))
    }

    fn discard_partial(&self, id: &str, created_data_dir: bool) -> Result<()> {
        let install_dir = self.layout.package_dir(id);
        debug!(package = id, "discarding partial install");
        remove_dir_all_if_exists(&install_dir)
            .with_context(|| format!("failed to remove install dir: {}", install_dir.display()))?;
        if created_data_dir {
            let data_dir = self.layout.package_data_dir(id);
            remove_dir_all_if_exists(&data_dir)
                .with_context(|| format!("failed to remove data dir: {}", data_dir.display()))?;
        }
        let staging = self.layout.staging_dir(id);
        remove_dir_all_if_exists(&staging)
            .with_context(|| format!("failed to remove staging dir: {}", staging.display()))
    }

    /// Installs `manifest` in place of the current install of the same id.
    /// The previous install dir and receipt are set aside first and put back
    /// unless the new version ends up `Installed`. The data dir is kept.
    pub fn reinstall(
        &self,
        manifest: &PackageManifest,
        options: &InstallOptions,
    ) -> Result<InstallOutcome> {
        validate_package_id(&manifest.id)?;
        let id = manifest.id.as_str();
        let install_dir = self.layout.package_dir(id);
        if !install_dir.exists() {
            return self.install(manifest, options);
        }

        let previous_dir = self.layout.previous_install_dir(id);
        remove_dir_all_if_exists(&previous_dir).with_context(|| {
            format!("failed to clear previous install: {}", previous_dir.display())
        })?;
        let tmp_dir = self.layout.tmp_dir();
        fs::create_dir_all(&tmp_dir)
            .with_context(|| format!("failed to create {}", tmp_dir.display()))?;
        let previous_receipt = read_install_receipt(self.layout, id)?;
        move_entry(&install_dir, &previous_dir)?;
        remove_install_receipt(self.layout, id)?;

        let result = self.install(manifest, options);
        if let Ok(InstallOutcome::Installed(_)) = &result {
            remove_dir_all_if_exists(&previous_dir).with_context(|| {
                format!("failed to remove previous install: {}", previous_dir.display())
            })?;
            return result;
        }

        warn!(package = id, "reinstall did not complete; restoring previous install");
        self.restore_previous(id, &previous_dir, previous_receipt.as_ref())?;
        result
    }

    fn restore_previous(
        &self,
        id: &str,
        previous_dir: &Path,
        receipt: Option<&InstallReceipt>,
    ) -> Result<()> {
        let install_dir = self.layout.package_dir(id);
        remove_dir_all_if_exists(&install_dir)
            .with_context(|| format!("failed to remove install dir: {}", install_dir.display()))?;
        move_entry(previous_dir, &install_dir)?;
        if let Some(receipt) = receipt {
            write_install_receipt(self.layout, receipt)?;
        }
        Ok(())
    }

    /// Extracts into a staging dir and moves the top-level entries into the
    /// install dir. Returns the failure when extraction itself fails. The
    /// staging dir is gone once this returns.
    fn unpack(
        &self,
        id: &str,
        archive_path: &Path,
        install_dir: &Path,
    ) -> Result<Option<InstallFailure>> {
        let staging = self.layout.staging_dir(id);
        remove_dir_all_if_exists(&staging)
            .with_context(|| format!("failed to clear staging dir: {}", staging.display()))?;
        fs::create_dir_all(&staging)
            .with_context(|| format!("failed to create staging dir: {}", staging.display()))?;

        if let Err(err) =
            self.services
                .extractor
                .extract(archive_path, &staging, ARCHIVE_STRIP_COMPONENTS)
        {
            let detail = format!("{err:#}");
            warn!(package = id, error = %detail, "artifact extraction failed");
            let _ = fs::remove_dir_all(&staging);
            let _ = remove_file_if_exists(archive_path);
            return Ok(Some(InstallFailure::Extract(detail)));
        }

        let moved = move_staged_entries(&staging, install_dir);
        let cleared = remove_dir_all_if_exists(&staging)
            .with_context(|| format!("failed to remove staging dir: {}", staging.display()));
        moved?;
        cleared?;
        remove_file_if_exists(archive_path)
            .with_context(|| format!("failed to remove archive: {}", archive_path.display()))?;
        Ok(None)
    }
}

fn move_staged_entries(staging: &Path, install_dir: &Path) -> Result<()> {
    for entry in fs::read_dir(staging)
        .with_context(|| format!("failed to read staging dir: {}", staging.display()))?
    {
        let entry = entry?;
        let destination = install_dir.join(entry.file_name());
        debug!(
            from = %entry.path().display(),
            to = %destination.display(),
            "moving staged entry"
        );
        move_entry(&entry.path(), &destination)?;
    }
    Ok(())
}

/// Installed package ids, read from the install root in sorted order.
pub fn list_installed(layout: &BitLayout) -> Result<Vec<String>> {
    let dir = layout.packages_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    for entry in fs::read_dir(&dir)
        .with_context(|| format!("failed to read install root: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            ids.push(name.to_string());
        }
    }
    ids.sort();
    Ok(ids)
}

pub(crate) fn substitute_root(commands: &str, root: &str) -> String {
    commands.replace(ROOT_TOKEN, root)
}
