//! Lookup of SPICE models and subcircuits in a library directory.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::deps::arcstr::ArcStr;
use crate::error::{ErrorSource, Result};
use crate::io;
use crate::log::{debug, info, warn};

/// File extensions that are scanned for definitions.
pub const EXTENSIONS: [&str; 5] = ["lib", "mod", "spice", "sp", "cir"];

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum EntryKind {
    Subckt { ports: Vec<ArcStr> },
    Model { kind: ArcStr },
}

/// A named definition and the file it lives in.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub name: ArcStr,
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl LibraryEntry {
    #[inline]
    pub fn is_subckt(&self) -> bool {
        matches!(self.kind, EntryKind::Subckt { .. })
    }

    /// The subcircuit ports, or `None` for a `.model` card.
    pub fn ports(&self) -> Option<&[ArcStr]> {
        match &self.kind {
            EntryKind::Subckt { ports } => Some(ports),
            EntryKind::Model { .. } => None,
        }
    }
}

/// An index of the `.subckt` and `.model` definitions found under a directory.
///
/// Names are matched case insensitively. When a name is defined by more
/// than one file, the first file in path order wins.
#[derive(Debug, Clone, Default)]
pub struct SpiceLibrary {
    root: PathBuf,
    entries: HashMap<String, LibraryEntry>,
}

impl SpiceLibrary {
    /// Scans `root` recursively and indexes every definition found.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let mut files = Vec::new();
        collect_files(&root, &mut files)?;

        let mut library = Self {
            root,
            entries: HashMap::new(),
        };
        for path in files {
            library.index_file(&path)?;
        }
        info!(
            "indexed {} SPICE definitions under {:?}",
            library.len(),
            library.root
        );
        Ok(library)
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&LibraryEntry> {
        self.entries.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the entry with the given name, or a [`ErrorSource::ModelNotFound`] error.
    pub fn entry(&self, name: &str) -> Result<&LibraryEntry> {
        self.get(name)
            .ok_or_else(|| ErrorSource::ModelNotFound(name.to_string()).into())
    }

    /// Returns the path of the file defining `name`.
    pub fn path(&self, name: &str) -> Result<&Path> {
        Ok(&self.entry(name)?.path)
    }

    /// All indexed names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &ArcStr> {
        self.entries.values().map(|e| &e.name).sorted()
    }

    fn index_file(&mut self, path: &Path) -> Result<()> {
        let data = io::read(path)?;
        let data = String::from_utf8_lossy(&data);
        let parsed = match subspice::parse(&*data) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("skipping {path:?}: {e}");
                return Ok(());
            }
        };

        for ckt in parsed.subcircuits() {
            self.insert(LibraryEntry {
                name: ckt.name.into(),
                path: path.to_path_buf(),
                kind: EntryKind::Subckt {
                    ports: ckt.ports.iter().map(|&p| ArcStr::from(p)).collect(),
                },
            });
        }
        for model in parsed.models() {
            self.insert(LibraryEntry {
                name: model.name.into(),
                path: path.to_path_buf(),
                kind: EntryKind::Model {
                    kind: model.kind.into(),
                },
            });
        }
        Ok(())
    }

    fn insert(&mut self, entry: LibraryEntry) {
        match self.entries.entry(entry.name.to_lowercase()) {
            Entry::Occupied(existing) => {
                if existing.get().path != entry.path {
                    warn!(
                        "{} is defined in {:?} and {:?}; using the former",
                        entry.name,
                        existing.get().path,
                        entry.path
                    );
                }
            }
            Entry::Vacant(slot) => {
                debug!("found {} in {:?}", entry.name, entry.path);
                slot.insert(entry);
            }
        }
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for path in io::read_dir_sorted(dir)? {
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if has_library_extension(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn has_library_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
