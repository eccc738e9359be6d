use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

use usupack_core::{
    route, CancelToken, DestRoot, EntryKind, InstallError, WalkControl, PRIMARY_BINARY,
};

mod source;
pub use source::{
    DirTree, PayloadSource, ResourceTree, TarballSource, TreeSource, PLACEHOLDER_NAME,
};

const COPY_BUFFER_LEN: usize = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    app_root: PathBuf,
}

impl InstallLayout {
    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
        }
    }

    pub fn app_root(&self) -> &Path {
        &self.app_root
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.app_root.join("bin")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.app_root.join("lib")
    }

    pub fn rootfs_dir(&self) -> PathBuf {
        self.app_root.join("rootfs")
    }

    pub fn dest_root(&self, root: DestRoot) -> PathBuf {
        self.app_root.join(root.dir_name())
    }

    pub fn primary_binary_path(&self) -> PathBuf {
        self.bin_dir().join(PRIMARY_BINARY)
    }

    pub fn config_path(&self) -> PathBuf {
        self.app_root.join("config.toml")
    }

    // Presence of the helper binary is the whole install state; there is no
    // manifest behind it.
    pub fn is_installed(&self) -> bool {
        self.primary_binary_path().exists()
    }

    pub fn ensure_rootfs(&self) -> Result<()> {
        let dir = self.rootfs_dir();
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
        Ok(())
    }
}

pub fn default_app_root() -> Result<PathBuf> {
    if cfg!(windows) {
        let app_data = env::var("LOCALAPPDATA")
            .context("LOCALAPPDATA is not set; cannot resolve Windows app root")?;
        return Ok(PathBuf::from(app_data).join("Usupack"));
    }

    let home = env::var("HOME").context("HOME is not set; cannot resolve app root")?;
    Ok(PathBuf::from(home).join(".usupack"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub files_written: u64,
    pub bytes_copied: u64,
    pub skipped: u64,
    pub failed: u64,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub files_deleted: u64,
    pub failed: u64,
}

// Entries are processed in source order. A write failure skips that entry
// and continues; only source-level failures abort the walk.
pub fn extract(
    source: &mut dyn PayloadSource,
    layout: &InstallLayout,
    cancel: &CancelToken,
) -> Result<ExtractionReport, InstallError> {
    let kind = source.kind();
    let mut report = ExtractionReport::default();

    source.for_each_entry(&mut |entry| {
        if cancel.is_cancelled() {
            report.cancelled = true;
            return WalkControl::Stop;
        }
        if entry.kind == EntryKind::Directory {
            return WalkControl::Continue;
        }

        let Some(decision) = route(&entry.path, kind) else {
            debug!(path = %entry.path, "skipped unrecognized payload entry");
            report.skipped += 1;
            return WalkControl::Continue;
        };

        let dest = layout.dest_root(decision.root).join(&decision.rel_path);
        match write_entry(entry.reader, &dest, decision.executable) {
            Ok(bytes) => {
                debug!(path = %entry.path, dest = %dest.display(), "extracted");
                report.files_written += 1;
                report.bytes_copied += bytes;
            }
            Err(err) => {
                warn!(
                    path = %entry.path,
                    dest = %dest.display(),
                    error = %err,
                    "failed to write payload entry"
                );
                report.failed += 1;
            }
        }
        WalkControl::Continue
    })?;

    Ok(report)
}

fn write_entry(reader: &mut dyn Read, dest: &Path, executable: bool) -> io::Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    // Truncate-create: an existing file is silently overwritten, which is
    // what makes update-in-place work.
    let mut out = fs::File::create(dest)?;
    let mut buffer = [0u8; COPY_BUFFER_LEN];
    let mut copied = 0u64;
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        out.write_all(&buffer[..read])?;
        copied += read as u64;
    }

    if executable {
        set_executable(dest)?;
    }
    Ok(copied)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path)?.permissions();
    // owner and group only, never world
    permissions.set_mode(permissions.mode() | 0o110);
    fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

// Removes bin/, lib/ and rootfs/ in that order, counting regular files.
// Per-file failures are skipped; a directory left non-empty by one stays in
// place. Running with nothing installed reports zero deletions.
pub fn uninstall(layout: &InstallLayout) -> DeletionReport {
    let mut report = DeletionReport::default();
    for root in [DestRoot::Bin, DestRoot::Lib, DestRoot::Rootfs] {
        delete_tree(&layout.dest_root(root), &mut report);
    }
    report
}

fn delete_tree(dir: &Path, report: &mut DeletionReport) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "failed to list directory during uninstall");
            report.failed += 1;
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "failed to read directory entry");
                report.failed += 1;
                continue;
            }
        };
        let path = entry.path();
        let is_dir = entry
            .file_type()
            .map(|file_type| file_type.is_dir())
            .unwrap_or(false);
        if is_dir {
            delete_tree(&path, report);
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "deleted");
                report.files_deleted += 1;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to delete file");
                report.failed += 1;
            }
        }
    }

    if let Err(err) = fs::remove_dir(dir) {
        debug!(dir = %dir.display(), error = %err, "directory left in place");
    }
}
