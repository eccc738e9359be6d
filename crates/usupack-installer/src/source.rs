use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use flate2::read::GzDecoder;
use tracing::debug;

use usupack_core::{EntryKind, InstallError, PayloadEntry, SourceKind, WalkControl};

// Packaging convention: a leaf with this name keeps an otherwise-empty
// directory present in the bundled tree and is never written out.
pub const PLACEHOLDER_NAME: &str = "placeholder";

pub trait PayloadSource {
    fn kind(&self) -> SourceKind;

    // Entries are delivered in source order; the visitor may stop the walk
    // early, which is not an error.
    fn for_each_entry(
        &mut self,
        visit: &mut dyn FnMut(PayloadEntry<'_>) -> WalkControl,
    ) -> Result<(), InstallError>;
}

pub struct TarballSource {
    path: PathBuf,
}

impl TarballSource {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open_reader(&self) -> Result<Box<dyn Read>, InstallError> {
        let file = fs::File::open(&self.path).map_err(InstallError::SourceUnreadable)?;
        // Compression is signalled by the source name, not sniffed.
        if self.path.to_string_lossy().ends_with(".gz") {
            Ok(Box::new(GzDecoder::new(file)))
        } else {
            Ok(Box::new(file))
        }
    }
}

impl PayloadSource for TarballSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Tar
    }

    fn for_each_entry(
        &mut self,
        visit: &mut dyn FnMut(PayloadEntry<'_>) -> WalkControl,
    ) -> Result<(), InstallError> {
        let reader = self.open_reader()?;
        let mut archive = tar::Archive::new(reader);
        let entries = archive.entries().map_err(InstallError::CorruptArchive)?;
        for entry in entries {
            let mut entry = entry.map_err(InstallError::CorruptArchive)?;
            let path = entry
                .path()
                .map_err(InstallError::CorruptArchive)?
                .to_string_lossy()
                .into_owned();
            let kind = if entry.header().entry_type().is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            if visit(PayloadEntry {
                path,
                kind,
                reader: &mut entry,
            }) == WalkControl::Stop
            {
                return Ok(());
            }
        }
        Ok(())
    }
}

pub trait ResourceTree {
    fn list(&self, path: &str) -> io::Result<Vec<String>>;
    fn open(&self, path: &str) -> io::Result<Box<dyn Read>>;
    // None sends the walk to the empty-listing heuristic.
    fn kind_hint(&self, path: &str) -> Option<EntryKind>;
}

pub struct DirTree {
    root: PathBuf,
}

impl DirTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut full = self.root.clone();
        for part in path.split('/').filter(|part| !part.is_empty()) {
            full.push(part);
        }
        full
    }
}

impl ResourceTree for DirTree {
    fn list(&self, path: &str) -> io::Result<Vec<String>> {
        let full = self.resolve(path);
        if !full.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&full)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(fs::File::open(self.resolve(path))?))
    }

    fn kind_hint(&self, path: &str) -> Option<EntryKind> {
        let metadata = fs::metadata(self.resolve(path)).ok()?;
        Some(if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        })
    }
}

pub struct TreeSource<'a> {
    tree: &'a dyn ResourceTree,
    root: String,
}

impl<'a> TreeSource<'a> {
    pub fn new(tree: &'a dyn ResourceTree, root: impl Into<String>) -> Self {
        Self {
            tree,
            root: root.into(),
        }
    }
}

impl PayloadSource for TreeSource<'_> {
    fn kind(&self) -> SourceKind {
        SourceKind::Tree
    }

    fn for_each_entry(
        &mut self,
        visit: &mut dyn FnMut(PayloadEntry<'_>) -> WalkControl,
    ) -> Result<(), InstallError> {
        walk(self.tree, &self.root, visit)?;
        Ok(())
    }
}

fn walk(
    tree: &dyn ResourceTree,
    path: &str,
    visit: &mut dyn FnMut(PayloadEntry<'_>) -> WalkControl,
) -> Result<WalkControl, InstallError> {
    let hint = tree.kind_hint(path);
    let children = if hint == Some(EntryKind::File) {
        Vec::new()
    } else {
        tree.list(path).map_err(InstallError::SourceUnreadable)?
    };
    // Without a hint, an empty listing is the only signal that a path is a
    // file leaf. Zero-byte files and empty directories are indistinguishable
    // here; stores that know the difference answer through kind_hint.
    let is_file = match hint {
        Some(kind) => kind == EntryKind::File,
        None => children.is_empty(),
    };

    if is_file {
        let name = path.rsplit('/').next().unwrap_or(path);
        if name == PLACEHOLDER_NAME {
            debug!(path, "filtered placeholder entry");
            return Ok(WalkControl::Continue);
        }
        let mut reader = tree.open(path).map_err(InstallError::SourceUnreadable)?;
        return Ok(visit(PayloadEntry {
            path: path.to_string(),
            kind: EntryKind::File,
            reader: &mut reader,
        }));
    }

    for child in children {
        let child_path = format!("{path}/{child}");
        if walk(tree, &child_path, visit)? == WalkControl::Stop {
            return Ok(WalkControl::Stop);
        }
    }
    Ok(WalkControl::Continue)
}
