use std::io::{Cursor, Read};

use thiserror::Error;

/// Maximum number of file entries unpacked from one archive.
pub const MAX_ARCHIVE_ENTRIES: usize = 200;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("invalid ZIP archive: {0}")]
    Invalid(String),

    #[error("archive contains more than {MAX_ARCHIVE_ENTRIES} files")]
    TooManyEntries,
}

/// One file entry unpacked from a ZIP archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Full path inside the archive, e.g. `Winter Anthology/front.png`.
    pub path: String,
    pub bytes: Vec<u8>,
}

impl ArchiveEntry {
    /// Group key for the batch importer: the top-level folder name, or the
    /// file stem for entries at the archive root.
    pub fn group_name(&self) -> &str {
        match self.path.split_once('/') {
            Some((folder, _)) => folder,
            None => self.path.rsplit_once('.').map_or(&self.path, |(stem, _)| stem),
        }
    }

    /// The entry's file name without any directory components.
    pub fn file_name(&self) -> &str {
        self.path.rsplit_once('/').map_or(&self.path, |(_, name)| name)
    }
}

/// Unpack a ZIP archive into its file entries. Directories and hidden
/// files (dot-prefixed components, e.g. `__MACOSX` metadata is excluded by
/// the dot/underscore check) are skipped silently; everything else is
/// returned for the importer to validate.
pub fn unpack(archive_bytes: &[u8]) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive_bytes))
        .map_err(|e| ArchiveError::Invalid(e.to_string()))?;

    let mut entries = Vec::new();

    for index in 0..zip.len() {
        let mut file = zip
            .by_index(index)
            .map_err(|e| ArchiveError::Invalid(e.to_string()))?;

        if file.is_dir() {
            continue;
        }

        // enclosed_name rejects absolute paths and `..` traversal
        let Some(path) = file.enclosed_name() else {
            continue;
        };
        let path = path.to_string_lossy().replace('\\', "/");

        if is_hidden(&path) {
            continue;
        }

        if entries.len() >= MAX_ARCHIVE_ENTRIES {
            return Err(ArchiveError::TooManyEntries);
        }

        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)
            .map_err(|e| ArchiveError::Invalid(e.to_string()))?;

        entries.push(ArchiveEntry { path, bytes });
    }

    Ok(entries)
}

fn is_hidden(path: &str) -> bool {
    path.split('/')
        .any(|component| component.starts_with('.') || component.starts_with("__"))
}
