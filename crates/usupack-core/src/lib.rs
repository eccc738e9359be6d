mod arch;
mod config;
mod entry;
mod error;
mod route;

pub use arch::{classify, resolve, ArchTag, PRIMARY_BINARY};
pub use config::ManagerConfig;
pub use entry::{CancelToken, EntryKind, PayloadEntry, SourceKind, WalkControl};
pub use error::InstallError;
pub use route::{route, DestRoot, RouteDecision};

#[cfg(test)]
mod tests;
