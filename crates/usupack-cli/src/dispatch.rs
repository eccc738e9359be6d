use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::info;

use usupack_core::{resolve, ArchTag, CancelToken, InstallError, ManagerConfig};
use usupack_installer::{
    default_app_root, extract, uninstall, DirTree, ExtractionReport, InstallLayout, TarballSource,
    TreeSource,
};

use crate::render;
use crate::terminal::{build_shell_request, ProcessSpawner, TerminalSpawner};
use crate::{Cli, Commands};

pub struct Settings {
    pub layout: InstallLayout,
    pub arch: ArchTag,
    pub assets_dir: Option<PathBuf>,
}

pub fn run_cli(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        return crate::completion::write_completions(*shell, &mut io::stdout());
    }

    let settings = resolve_settings(&cli)?;
    match cli.command {
        Commands::Init { assets } => run_init(&settings, assets.as_ref()),
        Commands::Install { tarball } => run_install(&settings, &tarball),
        Commands::Update { tarball } => run_update(&settings, &tarball),
        Commands::Uninstall { yes } => run_uninstall(&settings, yes),
        Commands::Status { json } => run_status(&settings, json),
        Commands::Shell => run_shell(&settings),
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}

pub fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let base_root = match &cli.app_root {
        Some(root) => root.clone(),
        None => default_app_root()?,
    };
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| InstallLayout::new(&base_root).config_path());
    let config = ManagerConfig::load(&config_path)?.unwrap_or_default();

    // Flags win over config, config wins over defaults.
    let app_root = cli
        .app_root
        .clone()
        .or(config.app_root)
        .map(Ok)
        .unwrap_or_else(default_app_root)?;
    let abi_list = if !cli.abi.is_empty() {
        cli.abi.clone()
    } else if let Some(abi) = config.abi {
        vec![abi]
    } else {
        host_abi_list()
    };

    Ok(Settings {
        layout: InstallLayout::new(app_root),
        arch: resolve(&abi_list, ""),
        assets_dir: config.assets_dir,
    })
}

pub fn host_abi_list() -> Vec<String> {
    match std::env::consts::ARCH {
        "aarch64" => vec!["arm64-v8a".to_string()],
        "arm" => vec!["armeabi-v7a".to_string()],
        other => vec![other.to_string()],
    }
}

fn run_init(settings: &Settings, assets: Option<&PathBuf>) -> Result<()> {
    let subtree = settings
        .arch
        .payload_subtree()
        .ok_or_else(|| InstallError::UnsupportedArchitecture(settings.arch.as_str().to_string()))?;
    let assets_dir = assets
        .cloned()
        .or_else(|| settings.assets_dir.clone())
        .unwrap_or_else(|| PathBuf::from("assets"));

    info!(arch = settings.arch.as_str(), assets = %assets_dir.display(), "installing bundled payload");
    settings.layout.ensure_rootfs()?;

    let tree = DirTree::new(&assets_dir);
    let mut source = TreeSource::new(&tree, subtree);
    let report = run_extraction(&mut source, settings, "init")?;
    finish_extraction(settings, &report, "Installation")
}

fn run_install(settings: &Settings, tarball: &PathBuf) -> Result<()> {
    if settings.layout.is_installed() {
        return Err(anyhow!(
            "already installed at {}; run 'usupack update' to replace it",
            settings.layout.app_root().display()
        ));
    }

    let mut source = TarballSource::open(tarball);
    let report = run_extraction(&mut source, settings, "install")?;
    finish_extraction(settings, &report, "Installation")
}

fn run_update(settings: &Settings, tarball: &PathBuf) -> Result<()> {
    if !settings.layout.is_installed() {
        return Err(anyhow!(
            "nothing installed at {}; run 'usupack install' first",
            settings.layout.app_root().display()
        ));
    }

    let mut source = TarballSource::open(tarball);
    let report = run_extraction(&mut source, settings, "update")?;
    finish_extraction(settings, &report, "Update")
}

fn run_extraction(
    source: &mut dyn usupack_installer::PayloadSource,
    settings: &Settings,
    label: &str,
) -> Result<ExtractionReport> {
    let spinner = render::extraction_spinner(label);
    let result = extract(source, &settings.layout, &CancelToken::new());
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    result.with_context(|| format!("{label} failed"))
}

fn finish_extraction(settings: &Settings, report: &ExtractionReport, verb: &str) -> Result<()> {
    for line in render::format_extraction_summary(report, settings.layout.app_root()) {
        println!("{line}");
    }
    if report.files_written == 0 && !report.cancelled {
        return Err(anyhow!(
            "no files were written; the payload carried no bin/, lib/ or fs/ entries"
        ));
    }
    render::print_status("ok", &format!("{verb} complete"));
    Ok(())
}

fn run_uninstall(settings: &Settings, yes: bool) -> Result<()> {
    if !yes {
        let stdin = io::stdin();
        let confirmed = confirm_uninstall(&mut stdin.lock(), &mut io::stdout())?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let report = uninstall(&settings.layout);
    for line in render::format_deletion_summary(&report) {
        println!("{line}");
    }
    render::print_status("ok", "Uninstall complete");
    Ok(())
}

pub fn confirm_uninstall<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<bool> {
    write!(
        output,
        "This removes everything under bin/, lib/ and rootfs/. Continue? [y/N] "
    )
    .context("failed to write prompt")?;
    output.flush().context("failed to flush prompt")?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[derive(Debug, Serialize)]
struct StatusReport {
    arch: ArchTag,
    app_root: PathBuf,
    bin: PathBuf,
    lib: PathBuf,
    rootfs: PathBuf,
    installed: bool,
}

fn run_status(settings: &Settings, json: bool) -> Result<()> {
    let report = StatusReport {
        arch: settings.arch,
        app_root: settings.layout.app_root().to_path_buf(),
        bin: settings.layout.bin_dir(),
        lib: settings.layout.lib_dir(),
        rootfs: settings.layout.rootfs_dir(),
        installed: settings.layout.is_installed(),
    };

    if json {
        let rendered =
            serde_json::to_string_pretty(&report).context("failed to serialize status")?;
        println!("{rendered}");
        return Ok(());
    }

    for line in render::format_status_lines(
        report.arch,
        &report.app_root,
        report.installed,
    ) {
        println!("{line}");
    }
    Ok(())
}

fn run_shell(settings: &Settings) -> Result<()> {
    if !settings.layout.is_installed() {
        return Err(anyhow!(
            "nothing installed at {}; run 'usupack install' first",
            settings.layout.app_root().display()
        ));
    }

    let request = build_shell_request(&settings.layout);
    info!(executable = %request.executable.display(), "handing off to terminal session");
    let code = ProcessSpawner.spawn(&request)?;
    if code != 0 {
        return Err(anyhow!("session exited with status {code}"));
    }
    Ok(())
}
