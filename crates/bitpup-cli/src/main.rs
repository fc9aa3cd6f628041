use std::path::PathBuf;
use std::process::ExitCode;

use bitpup_installer::DEFAULT_BASE_DIR;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod completion;
mod dispatch;
mod flows;
mod render;

use completion::CliCompletionShell;

const LOG_ENV_VAR: &str = "BITPUP_LOG";

#[derive(Parser, Debug)]
#[command(name = "bitpup", version)]
#[command(about = "Minimal package manager for remote package pools", long_about = None)]
pub(crate) struct Cli {
    /// Directory holding packages, remotes and state.
    #[arg(long, global = true, env = "BITPUP_HOME", default_value = DEFAULT_BASE_DIR)]
    pub(crate) base_dir: PathBuf,
    /// Answer yes to every confirmation.
    #[arg(short = 'y', long, global = true)]
    pub(crate) yes: bool,
    /// Prefix substituted for $ROOT in install commands.
    #[arg(long, global = true, default_value = "/")]
    pub(crate) root: String,
    /// Accept invalid TLS certificates from remotes and artifact hosts.
    #[arg(long, global = true)]
    pub(crate) insecure: bool,
    /// Log at debug level unless BITPUP_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum Commands {
    /// Install packages along with their dependencies.
    Install {
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Remove installed packages. Dependencies are kept.
    Remove {
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Re-resolve installed packages and reinstall changed versions.
    Update {
        /// Packages to update. Defaults to every installed package.
        packages: Vec<String>,
    },
    /// Append a remote to remotes/<name>/remote.list.
    RemoteAdd {
        /// Base URL, or ppa:<profile>/<ppa>.
        url: String,
        name: Option<String>,
        channels: Vec<String>,
    },
    /// Block every command except unlock.
    Lock,
    Unlock,
    /// Print a shell completion script.
    Completions { shell: CliCompletionShell },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch::run_cli(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
