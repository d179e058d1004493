//! File identifiers and the per-run file registry.

use std::fmt;
use std::path::{Path, PathBuf};

/// Handle of a source file within one conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(u32);

impl FileId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// Registry mapping [`FileId`]s to the paths they were loaded from.
///
/// Ids are handed out in insertion order, so the registry also fixes the
/// batch order used by every pass.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    paths: Vec<PathBuf>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path and return its handle.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> FileId {
        let id = FileId::new(self.paths.len() as u32);
        self.paths.push(path.into());
        id
    }

    pub fn path(&self, file: FileId) -> Option<&Path> {
        self.paths.get(file.index()).map(PathBuf::as_path)
    }

    /// The file name used when rendering diagnostics.
    ///
    /// Falls back to the raw handle when the file is unknown to this set.
    pub fn display_name(&self, file: FileId) -> String {
        match self.path(file) {
            Some(path) => path.display().to_string(),
            None => file.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, &Path)> {
        self.paths
            .iter()
            .enumerate()
            .map(|(idx, path)| (FileId::new(idx as u32), path.as_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_insertion_order() {
        let mut files = FileSet::new();
        let a = files.add("A.dj0");
        let b = files.add("B.dj0");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(files.display_name(b), "B.dj0");
    }

    #[test]
    fn test_unknown_file_display() {
        let files = FileSet::new();
        assert_eq!(files.display_name(FileId::new(7)), "file#7");
    }
}
