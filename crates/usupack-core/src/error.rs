use std::io;

use thiserror::Error;

// Fatal failures only. Per-entry write failures and per-file deletion
// failures are tallied in the operation reports, not raised.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("unsupported architecture: {0}")]
    UnsupportedArchitecture(String),

    #[error("payload source could not be opened")]
    SourceUnreadable(#[source] io::Error),

    #[error("payload archive is corrupt")]
    CorruptArchive(#[source] io::Error),
}
