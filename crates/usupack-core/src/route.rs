use crate::entry::SourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestRoot {
    Bin,
    Lib,
    Rootfs,
}

impl DestRoot {
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Bin => "bin",
            Self::Lib => "lib",
            Self::Rootfs => "rootfs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub root: DestRoot,
    pub rel_path: String,
    pub executable: bool,
}

// None means skip: silent, counted separately from extracted entries.
pub fn route(entry_path: &str, source: SourceKind) -> Option<RouteDecision> {
    match source {
        SourceKind::Tar => route_tar(entry_path),
        SourceKind::Tree => route_tree(entry_path),
    }
}

fn route_tar(path: &str) -> Option<RouteDecision> {
    if let Some(rest) = path.strip_prefix("bin/") {
        return Some(RouteDecision {
            root: DestRoot::Bin,
            rel_path: base_name(rest)?.to_string(),
            executable: true,
        });
    }
    if let Some(rest) = path.strip_prefix("lib/") {
        return Some(RouteDecision {
            root: DestRoot::Lib,
            rel_path: base_name(rest)?.to_string(),
            executable: false,
        });
    }
    if let Some(rest) = path.strip_prefix("fs/") {
        if rest.is_empty() {
            return None;
        }
        return Some(RouteDecision {
            root: DestRoot::Rootfs,
            rel_path: rest.to_string(),
            executable: false,
        });
    }
    None
}

// Tree paths arrive with the architecture tag as their top directory.
// Executability is a substring check over the whole source path, so a
// bin-named file nested arbitrarily deep still gets the bit.
fn route_tree(path: &str) -> Option<RouteDecision> {
    let (_, rel) = path.split_once('/')?;
    let executable = path.contains("/bin/");
    if let Some(rest) = rel.strip_prefix("bin/") {
        return Some(RouteDecision {
            root: DestRoot::Bin,
            rel_path: base_name(rest)?.to_string(),
            executable,
        });
    }
    if let Some(rest) = rel.strip_prefix("lib/") {
        return Some(RouteDecision {
            root: DestRoot::Lib,
            rel_path: base_name(rest)?.to_string(),
            executable,
        });
    }
    if let Some(rest) = rel.strip_prefix("rootfs/") {
        if rest.is_empty() {
            return None;
        }
        return Some(RouteDecision {
            root: DestRoot::Rootfs,
            rel_path: rest.to_string(),
            executable,
        });
    }
    None
}

fn base_name(rest: &str) -> Option<&str> {
    let name = rest.rsplit('/').next().unwrap_or(rest);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
