use crate::file_set::FileSet;
use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::Path;

/// Read position across the file set.
///
/// Holds at most one open handle. The offset only grows within a file and
/// resets to zero when the cursor moves to the next one.
#[derive(Debug, Default)]
pub struct FileCursor {
    active: usize,
    offset: u64,
    handle: Option<File>,
}

impl FileCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the file being read
    pub fn active(&self) -> usize {
        self.active
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_exhausted(&self, files: &FileSet) -> bool {
        self.active >= files.len()
    }

    /// Handle of the active file, opened and positioned on first use
    pub(crate) fn handle(&mut self, path: &Path) -> io::Result<&mut File> {
        let file = match self.handle.take() {
            Some(file) => file,
            None => {
                let mut file = File::open(path)?;
                file.seek(SeekFrom::Start(self.offset))?;
                log::debug!("Opened {} at offset {}", path.display(), self.offset);
                file
            }
        };
        Ok(self.handle.insert(file))
    }

    pub(crate) fn advance(&mut self, kept: u64) {
        self.offset += kept;
    }

    /// Close the active file and move to the start of the next one
    pub(crate) fn next_file(&mut self) {
        self.handle = None;
        self.active += 1;
        self.offset = 0;
    }
}
