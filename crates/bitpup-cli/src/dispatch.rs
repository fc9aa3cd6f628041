use std::io;
use std::process::ExitCode;

use anyhow::Result;
use bitpup_core::host_arch;
use bitpup_installer::{
    BitLayout, InstallServices, LockGate, Settings, ShellRunner, StdinPrompter, TarExtractor,
};
use bitpup_registry::HttpFetcher;
use tracing::debug;

use crate::completion::write_completions_script;
use crate::flows::{
    run_install_flow, run_remote_add_flow, run_remove_flow, run_update_flow, CliContext,
    FlowReport,
};
use crate::render::TerminalRenderer;
use crate::{Cli, Commands};

pub(crate) fn run_cli(cli: Cli) -> Result<ExitCode> {
    let Cli {
        base_dir,
        yes,
        root,
        insecure,
        verbose: _,
        command,
    } = cli;
    let renderer = TerminalRenderer::current();
    let layout = BitLayout::new(base_dir);
    let gate = LockGate::new(layout.lock_path());

    if command != Commands::Unlock {
        if let Err(err) = gate.ensure_unlocked() {
            renderer.print_status("err", &format!("{err:#}"));
            return Ok(ExitCode::FAILURE);
        }
    }

    match command {
        Commands::Completions { shell } => {
            write_completions_script(shell, &mut io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Lock => {
            gate.lock()?;
            renderer.print_status("ok", "locked");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Unlock => {
            if gate.unlock()? {
                renderer.print_status("ok", "unlocked");
            } else {
                renderer.print_status("skip", "not locked");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::RemoteAdd {
            url,
            name,
            channels,
        } => {
            let ctx = load_context(layout, yes, root)?;
            let report = run_remote_add_flow(&ctx, &url, name.as_deref(), &channels)?;
            Ok(finish(renderer, &report))
        }
        Commands::Install { packages } => {
            let ctx = load_context(layout, yes, root)?;
            ctx.layout.ensure_base_dirs()?;
            let fetcher = HttpFetcher::new(insecure)?;
            let runner = ShellRunner::default();
            let services = system_services(&fetcher, &runner);
            let report = run_install_flow(&ctx, services, &packages, renderer)?;
            renderer.print_section("Install");
            Ok(finish(renderer, &report))
        }
        Commands::Remove { packages } => {
            let ctx = load_context(layout, yes, root)?;
            let fetcher = HttpFetcher::new(insecure)?;
            let runner = ShellRunner::default();
            let services = system_services(&fetcher, &runner);
            let report = run_remove_flow(&ctx, services, &packages)?;
            Ok(finish(renderer, &report))
        }
        Commands::Update { packages } => {
            let ctx = load_context(layout, yes, root)?;
            ctx.layout.ensure_base_dirs()?;
            let fetcher = HttpFetcher::new(insecure)?;
            let runner = ShellRunner::default();
            let services = system_services(&fetcher, &runner);
            let report = run_update_flow(&ctx, services, &packages, renderer)?;
            renderer.print_section("Update");
            Ok(finish(renderer, &report))
        }
    }
}

fn load_context(layout: BitLayout, auto_confirm: bool, root_prefix: String) -> Result<CliContext> {
    let settings = Settings::load(&layout)?;
    let arch = host_arch();
    debug!(base = %layout.base().display(), %arch, "loaded settings");
    Ok(CliContext {
        layout,
        settings,
        auto_confirm,
        root_prefix,
        arch,
    })
}

fn system_services<'a>(
    fetcher: &'a HttpFetcher,
    runner: &'a ShellRunner,
) -> InstallServices<'a> {
    InstallServices {
        fetcher,
        extractor: &TarExtractor,
        runner,
        prompter: &StdinPrompter,
    }
}

fn finish(renderer: TerminalRenderer, report: &FlowReport) -> ExitCode {
    renderer.print_report(report);
    report.exit_code()
}
