use std::collections::HashSet;
use std::process::ExitCode;

use anyhow::Result;
use bitpup_core::PackageManifest;
use bitpup_installer::{
    list_installed, BitLayout, ConfirmRequest, InstallOptions, InstallOutcome, InstallServices,
    Installer, RemovalOutcome, RemoveOptions, Settings,
};
use bitpup_registry::{expand_remote_url, ManifestFetcher, RemoteSource, RemoteStore};
use bitpup_resolver::resolve_install_plan;
use tracing::{debug, warn};

use crate::render::TerminalRenderer;

pub(crate) const DEFAULT_REMOTE_NAME: &str = "default";

/// Everything a flow needs, read once per invocation.
#[derive(Debug, Clone)]
pub(crate) struct CliContext {
    pub(crate) layout: BitLayout,
    pub(crate) settings: Settings,
    pub(crate) auto_confirm: bool,
    pub(crate) root_prefix: String,
    pub(crate) arch: String,
}

impl CliContext {
    fn remote_store(&self) -> RemoteStore {
        RemoteStore::new(self.layout.remotes_dir())
    }

    fn unattended_install(&self) -> InstallOptions {
        InstallOptions::new(true, self.root_prefix.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReportLine {
    pub(crate) status: &'static str,
    pub(crate) message: String,
}

/// Per-package results of one command, printed after it finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FlowReport {
    pub(crate) lines: Vec<ReportLine>,
    pub(crate) failed: bool,
}

impl FlowReport {
    fn push(&mut self, status: &'static str, message: impl Into<String>) {
        self.lines.push(ReportLine {
            status,
            message: message.into(),
        });
    }

    pub(crate) fn ok(&mut self, message: impl Into<String>) {
        self.push("ok", message);
    }

    pub(crate) fn skip(&mut self, message: impl Into<String>) {
        self.push("skip", message);
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        self.push("warn", message);
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.failed = true;
        self.push("err", message);
    }

    pub(crate) fn exit_code(&self) -> ExitCode {
        if self.failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }

    #[cfg(test)]
    pub(crate) fn messages(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.message.as_str()).collect()
    }

    fn record_install(&mut self, manifest: &PackageManifest, outcome: InstallOutcome) {
        let id = &manifest.id;
        match outcome {
            InstallOutcome::Installed(package) => {
                self.ok(format!("installed {}", describe(id, &package.version)));
                for warning in package.warnings {
                    self.warn(format!("{id}: {warning}"));
                }
            }
            InstallOutcome::AlreadyInstalled => self.skip(format!("{id} is already installed")),
            InstallOutcome::Aborted => self.warn(format!("{id}: installation aborted")),
            InstallOutcome::Failed(failure) => self.fail(format!("{id}: {failure}")),
        }
    }
}

fn describe(id: &str, version: &str) -> String {
    if version.is_empty() {
        id.to_string()
    } else {
        format!("{id} {version}")
    }
}

fn candidate_sources_or_report(ctx: &CliContext, report: &mut FlowReport) -> Result<Vec<String>> {
    let sources = ctx.remote_store().candidate_sources(&ctx.arch)?;
    if sources.is_empty() {
        report.fail(
            "no remotes configured; add one with 'bitpup remote-add <url> [name] [channel...]'",
        );
    }
    Ok(sources)
}

/// Resolves every root into one dependency-first plan, asks once, then
/// installs the plan in order.
pub(crate) fn run_install_flow(
    ctx: &CliContext,
    services: InstallServices<'_>,
    packages: &[String],
    renderer: TerminalRenderer,
) -> Result<FlowReport> {
    let mut report = FlowReport::default();
    let sources = candidate_sources_or_report(ctx, &mut report)?;
    if sources.is_empty() {
        return Ok(report);
    }

    let manifests = ManifestFetcher::new(services.fetcher);
    let resolution = resolve_install_plan(packages, |id| manifests.find_manifest(id, &sources));
    for unresolved in &resolution.unresolved {
        report.fail(format!("{}: not found ({})", unresolved.id, unresolved.miss));
    }

    let installer = Installer::new(&ctx.layout, &ctx.settings, services);
    let plan = resolution.plan.into_packages();
    let pending: Vec<&PackageManifest> = plan
        .iter()
        .filter(|manifest| !installer.is_installed(&manifest.id))
        .collect();
    debug!(planned = plan.len(), pending = pending.len(), "install plan resolved");

    if pending.is_empty() {
        for manifest in &plan {
            report.skip(format!("{} is already installed", manifest.id));
        }
        return Ok(report);
    }

    if !ctx.auto_confirm {
        let roots: HashSet<&str> = packages.iter().map(String::as_str).collect();
        let (requested, dependencies): (Vec<String>, Vec<String>) = pending
            .iter()
            .map(|manifest| manifest.id.clone())
            .partition(|id| roots.contains(id.as_str()));
        let notes: Vec<String> = plan
            .iter()
            .filter(|manifest| installer.is_installed(&manifest.id))
            .map(|manifest| format!("already installed: {}", manifest.id))
            .collect();
        let request = ConfirmRequest {
            action: "Installing",
            packages: &requested,
            dependencies: &dependencies,
            notes: &notes,
        };
        if !services.prompter.confirm(&request)? {
            report.warn("installation aborted; nothing was installed");
            return Ok(report);
        }
    }

    let options = ctx.unattended_install();
    let mut progress = renderer.start_progress("install", plan.len() as u64);
    for (index, manifest) in plan.iter().enumerate() {
        match progress.suspend(|| installer.install(manifest, &options)) {
            Ok(outcome) => report.record_install(manifest, outcome),
            Err(err) => report.fail(format!("{}: {err:#}", manifest.id)),
        }
        progress.set(index as u64 + 1);
    }
    progress.finish_success();

    Ok(report)
}

pub(crate) fn run_remove_flow(
    ctx: &CliContext,
    services: InstallServices<'_>,
    packages: &[String],
) -> Result<FlowReport> {
    let mut report = FlowReport::default();
    let installer = Installer::new(&ctx.layout, &ctx.settings, services);
    let options = RemoveOptions {
        auto_confirm: ctx.auto_confirm,
    };

    for id in packages {
        match installer.remove(id, &options) {
            Ok(RemovalOutcome::Removed(removed)) => {
                report.ok(format!("removed {id}"));
                if let Some(note) = removed.dependents.note() {
                    report.skip(format!("{id}: {note}"));
                }
                if !removed.scrubbed_from.is_empty() {
                    report.skip(format!(
                        "{id}: dropped from ownership records of {}",
                        removed.scrubbed_from.join(", ")
                    ));
                }
            }
            Ok(RemovalOutcome::NotInstalled) => report.fail(format!("{id}: not installed")),
            Ok(RemovalOutcome::Aborted) => report.warn(format!("{id}: removal aborted")),
            Err(err) => report.fail(format!("{id}: {err:#}")),
        }
    }

    Ok(report)
}

/// Each selected installed id is resolved as its own single-root plan. A
/// root whose published version differs from its receipt is reinstalled in
/// place. An empty selection means every installed package.
pub(crate) fn run_update_flow(
    ctx: &CliContext,
    services: InstallServices<'_>,
    packages: &[String],
    renderer: TerminalRenderer,
) -> Result<FlowReport> {
    let mut report = FlowReport::default();
    let installed = list_installed(&ctx.layout)?;
    let installed = if packages.is_empty() {
        installed
    } else {
        let mut selected = Vec::new();
        for id in packages {
            if installed.contains(id) {
                if !selected.contains(id) {
                    selected.push(id.clone());
                }
            } else {
                report.fail(format!("{id}: not installed"));
            }
        }
        selected
    };
    if installed.is_empty() {
        if packages.is_empty() {
            report.skip("no packages installed");
        }
        return Ok(report);
    }

    let sources = candidate_sources_or_report(ctx, &mut report)?;
    if sources.is_empty() {
        return Ok(report);
    }

    let manifests = ManifestFetcher::new(services.fetcher);
    let installer = Installer::new(&ctx.layout, &ctx.settings, services);
    let options = ctx.unattended_install();
    let mut progress = renderer.start_progress("update", installed.len() as u64);

    for (index, id) in installed.iter().enumerate() {
        let resolution = resolve_install_plan(std::slice::from_ref(id), |dep| {
            manifests.find_manifest(dep, &sources)
        });
        progress.set(index as u64 + 1);

        if let Some(miss) = resolution.unresolved.iter().find(|u| &u.id == id) {
            warn!(package = %id, reason = miss.miss.reason_code(), "skipping update");
            report.warn(format!("{id}: skipped, {}", miss.miss));
            continue;
        }
        for unresolved in &resolution.unresolved {
            report.warn(format!(
                "{id}: dependency {} not found ({})",
                unresolved.id, unresolved.miss
            ));
        }

        for manifest in resolution.plan.packages() {
            if &manifest.id != id {
                match progress.suspend(|| installer.install(manifest, &options)) {
                    Ok(InstallOutcome::AlreadyInstalled) => {}
                    Ok(outcome) => report.record_install(manifest, outcome),
                    Err(err) => report.fail(format!("{}: {err:#}", manifest.id)),
                }
                continue;
            }

            let current = installer.installed_version(id).unwrap_or_else(|err| {
                let detail = format!("{err:#}");
                warn!(package = %id, error = %detail, "ignoring unreadable install receipt");
                None
            });
            match current {
                Some(current) if current != manifest.version => {
                    match progress.suspend(|| installer.reinstall(manifest, &options)) {
                        Ok(InstallOutcome::Installed(_)) => report.ok(format!(
                            "updated {id} {current} -> {}",
                            manifest.version
                        )),
                        Ok(outcome) => report.record_install(manifest, outcome),
                        Err(err) => report.fail(format!("{id}: {err:#}")),
                    }
                }
                _ => match progress.suspend(|| installer.install(manifest, &options)) {
                    Ok(InstallOutcome::AlreadyInstalled) => {
                        report.skip(format!("{id} is up to date"))
                    }
                    Ok(outcome) => report.record_install(manifest, outcome),
                    Err(err) => report.fail(format!("{id}: {err:#}")),
                },
            }
        }
    }
    progress.finish_success();

    Ok(report)
}

pub(crate) fn run_remote_add_flow(
    ctx: &CliContext,
    url: &str,
    name: Option<&str>,
    channels: &[String],
) -> Result<FlowReport> {
    let mut report = FlowReport::default();
    let name = name.unwrap_or(DEFAULT_REMOTE_NAME);
    let source = RemoteSource {
        base_url: expand_remote_url(url, &ctx.settings.ppa_base_url),
        pool: name.to_string(),
        channels: channels.to_vec(),
    };

    let path = ctx.remote_store().add_remote(name, &source)?;
    report.ok(format!("added remote {} to {}", source.base_url, path.display()));
    if channels.is_empty() {
        report.warn(format!(
            "remote '{name}' has no channels and will not be searched"
        ));
    }
    Ok(report)
}
