use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

mod completion;
mod dispatch;
mod render;
mod terminal;

#[derive(Parser, Debug)]
#[command(name = "usupack")]
#[command(about = "Installer for the userland su payload", long_about = None)]
struct Cli {
    /// Application-private storage root (defaults to the per-user prefix)
    #[arg(long, global = true)]
    app_root: Option<PathBuf>,
    /// Config file path (defaults to config.toml under the app root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the host ABI list; repeat the flag, highest priority first
    #[arg(long, global = true)]
    abi: Vec<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install the bundled payload tree for the detected architecture
    Init {
        /// Payload tree holding one subtree per architecture (defaults to
        /// the config's assets_dir, then ./assets)
        #[arg(long)]
        assets: Option<PathBuf>,
    },
    /// Install a payload tarball (.tar or .tar.gz)
    Install { tarball: PathBuf },
    /// Re-extract a payload tarball over the current install
    Update { tarball: PathBuf },
    /// Remove everything under bin/, lib/ and rootfs/
    Uninstall {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show detected architecture, layout paths and install state
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Hand the installed helper off to a terminal session
    Shell,
    /// Generate shell completions
    Completions { shell: Shell },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    dispatch::run_cli(cli)
}
