use std::fs::{self, DirEntry, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use fm_platform::error::{FmError, Result};
use fm_platform::filesystem::{
    ContentLines, ContentReader, DirectoryInfo, EntryKind, FileInfo, Inspector,
};

pub struct LinuxInspector;

impl LinuxInspector {
    pub fn new() -> Self {
        Self
    }

    fn absolute(path: &Path) -> PathBuf {
        std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    }

    fn display_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string())
    }

    fn to_file_info(path: &Path) -> Result<FileInfo> {
        let meta = fs::metadata(path).map_err(|e| FmError::from_io(path, e))?;

        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else if meta.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        Ok(FileInfo {
            name: Self::display_name(path),
            path: Self::absolute(path),
            kind,
            size: meta.len(),
            modified: meta.modified().ok(),
            created: meta.created().ok(),
        })
    }

    /// Require `path` to be an existing directory
    fn require_dir(path: &Path) -> Result<fs::Metadata> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(meta),
            _ => Err(FmError::NotADirectory {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl Default for LinuxInspector {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursive sum of regular-file lengths below `dir`.
///
/// Best effort: an entry that cannot be read contributes zero and the walk
/// carries on with its siblings. Symlinks are followed; a cycle ends when the
/// kernel refuses the path with ELOOP.
pub fn aggregate_size(dir: &Path) -> u64 {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("size: skipping unreadable {}: {}", dir.display(), e);
            return 0;
        }
    };

    let mut total: u64 = 0;
    for entry in entries {
        let size = entry_size(entry).unwrap_or_else(|e| {
            debug!("size: skipping entry in {}: {}", dir.display(), e);
            0
        });
        total = total.saturating_add(size);
    }
    total
}

fn entry_size(entry: io::Result<DirEntry>) -> io::Result<u64> {
    let path = entry?.path();
    let meta = fs::metadata(&path)?;

    if meta.is_file() {
        Ok(meta.len())
    } else if meta.is_dir() {
        Ok(aggregate_size(&path))
    } else {
        Ok(0)
    }
}

impl Inspector for LinuxInspector {
    fn list(&self, path: &str) -> Result<Vec<FileInfo>> {
        let dir = Path::new(path);
        Self::require_dir(dir)?;

        let entries = fs::read_dir(dir).map_err(|e| FmError::from_io(dir, e))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("skipping dir entry: {}", e);
                    continue;
                }
            };

            match Self::to_file_info(&entry.path()) {
                Ok(info) => result.push(info),
                Err(e) => {
                    warn!("skipping {}: {}", entry.path().display(), e);
                }
            }
        }

        Ok(result)
    }

    fn directory_info(&self, path: &str) -> Result<DirectoryInfo> {
        let dir = Path::new(path);
        let meta = Self::require_dir(dir)?;

        Ok(DirectoryInfo {
            name: Self::display_name(dir),
            path: Self::absolute(dir),
            total_size: aggregate_size(dir),
            modified: meta.modified().ok(),
            created: meta.created().ok(),
        })
    }

    fn file_info(&self, path: &str) -> Result<FileInfo> {
        Self::to_file_info(Path::new(path))
    }

    fn read_content(&self, path: &str) -> Result<ContentLines<ContentReader>> {
        let file_path = Path::new(path);
        let file = File::open(file_path).map_err(|e| FmError::io_failure(file_path, e))?;

        let reader: ContentReader = Box::new(BufReader::new(file));
        Ok(ContentLines::new(reader, file_path))
    }
}
