use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// One probed input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: PathBuf,

    /// Size observed while probing; reading stops here
    pub len: u64,
}

/// Input that could not be opened or sized, excluded from the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Ordered, immutable list of readable inputs; the position is the file index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    entries: Vec<FileEntry>,
}

impl FileSet {
    /// Open and size every path, keeping the readable ones in their given order
    pub fn probe<I, P>(paths: I) -> (Self, Vec<SkippedFile>)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut entries = Vec::new();
        let mut skipped = Vec::new();

        for path in paths {
            let path = path.as_ref();
            match probe_one(path) {
                Ok(len) => entries.push(FileEntry {
                    path: path.to_path_buf(),
                    len,
                }),
                Err(reason) => {
                    log::warn!("Skipping {}: {reason}", path.display());
                    skipped.push(SkippedFile {
                        path: path.to_path_buf(),
                        reason,
                    });
                }
            }
        }

        (Self { entries }, skipped)
    }

    pub fn from_entries(entries: Vec<FileEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FileEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.len).sum()
    }
}

fn probe_one(path: &Path) -> Result<u64, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let meta = file.metadata().map_err(|e| e.to_string())?;
    if !meta.is_file() {
        return Err("not a regular file".to_string());
    }
    Ok(meta.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn probe_keeps_order_and_skips_unreadable() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "one two").unwrap();
        fs::write(&b, "").unwrap();
        let missing = dir.path().join("missing.txt");

        let (files, skipped) = FileSet::probe([&b, &missing, &a]);

        assert_eq!(files.len(), 2);
        assert_eq!(files.get(0).unwrap().path, b);
        assert_eq!(files.get(0).unwrap().len, 0);
        assert_eq!(files.get(1).unwrap().path, a);
        assert_eq!(files.get(1).unwrap().len, 7);
        assert_eq!(files.total_bytes(), 7);

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].path, missing);
    }

    #[test]
    fn directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        let (files, skipped) = FileSet::probe([dir.path()]);

        assert!(files.is_empty());
        assert_eq!(skipped.len(), 1);
    }
}
