use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::{FmError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
    /// Sockets, fifos, devices: anything neither a regular file nor a directory
    Other,
}

/// Point-in-time metadata for a single file or directory entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Raw entry length, never aggregated
    pub size: u64,
    pub modified: Option<SystemTime>,
    /// Absent when the platform or filesystem does not record birth time
    pub created: Option<SystemTime>,
}

impl FileInfo {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Point-in-time metadata for a directory, with the recursive size of its
/// regular files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryInfo {
    pub name: String,
    pub path: PathBuf,
    pub total_size: u64,
    pub modified: Option<SystemTime>,
    pub created: Option<SystemTime>,
}

pub type ContentReader = Box<dyn BufRead + Send>;

/// Read-only introspection against the host filesystem.
///
/// Never goes through a control channel.
pub trait Inspector: Send + Sync {
    /// Non-recursive entries, in whatever order the host yields them
    fn list(&self, path: &str) -> Result<Vec<FileInfo>>;

    fn directory_info(&self, path: &str) -> Result<DirectoryInfo>;

    fn file_info(&self, path: &str) -> Result<FileInfo>;

    /// Lazily stream the lines of a file
    fn read_content(&self, path: &str) -> Result<ContentLines<ContentReader>>;
}

/// Lazy line view over a byte stream.
///
/// Lines are split on `b'\n'` only and keep every other byte, so joining the
/// yielded lines with `"\n"` reproduces the stream exactly. A stream ending in
/// a newline yields a final empty line. Not restartable.
pub struct ContentLines<R> {
    reader: R,
    path: PathBuf,
    ended_with_newline: bool,
    done: bool,
}

impl<R: BufRead> ContentLines<R> {
    pub fn new(reader: R, path: &Path) -> Self {
        Self {
            reader,
            path: path.to_path_buf(),
            ended_with_newline: false,
            done: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain the remaining lines and rejoin them
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let lines = self.collect::<Result<Vec<_>>>()?;
        Ok(join_lines(&lines))
    }

    /// Drain the remaining lines as UTF-8 text
    pub fn into_string(self) -> Result<String> {
        let path = self.path.clone();
        let bytes = self.into_bytes()?;
        String::from_utf8(bytes)
            .map_err(|e| FmError::io_failure(&path, io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

impl<R: BufRead> Iterator for ContentLines<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut line = Vec::new();
        match self.reader.read_until(b'\n', &mut line) {
            Ok(0) => {
                self.done = true;
                if self.ended_with_newline {
                    Some(Ok(Vec::new()))
                } else {
                    None
                }
            }
            Ok(_) => {
                self.ended_with_newline = line.last() == Some(&b'\n');
                if self.ended_with_newline {
                    line.pop();
                }
                Some(Ok(line))
            }
            Err(e) => {
                self.done = true;
                Some(Err(FmError::io_failure(&self.path, e)))
            }
        }
    }
}

pub fn join_lines<L: AsRef<[u8]>>(lines: &[L]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        out.extend_from_slice(line.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_of(data: &[u8]) -> Vec<Vec<u8>> {
        ContentLines::new(data, Path::new("mem"))
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_lines_split_and_rejoin() {
        let lines = lines_of(b"a\nb\nc");
        assert_eq!(lines, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(join_lines(&lines), b"a\nb\nc");
    }

    #[test]
    fn test_trailing_newline_preserved() {
        let lines = lines_of(b"one\ntwo\n");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].is_empty());
        assert_eq!(join_lines(&lines), b"one\ntwo\n");
    }

    #[test]
    fn test_empty_stream_yields_nothing() {
        assert!(lines_of(b"").is_empty());
    }

    #[test]
    fn test_carriage_returns_and_binary_pass_through() {
        let data = b"x\r\n\xff\x00y";
        let lines = lines_of(data);
        assert_eq!(lines[0], b"x\r");
        assert_eq!(join_lines(&lines), data);
    }

    #[test]
    fn test_into_string_rejects_invalid_utf8() {
        let lines = ContentLines::new(&b"ok\n\xff"[..], Path::new("mem"));
        let err = lines.into_string().unwrap_err();
        assert!(matches!(err, FmError::IoFailure { .. }));
    }

    #[test]
    fn test_read_error_surfaces_as_io_failure() {
        struct Broken;
        impl io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "device gone"))
            }
        }

        let mut lines = ContentLines::new(io::BufReader::new(Broken), Path::new("dev"));
        assert!(matches!(lines.next(), Some(Err(FmError::IoFailure { .. }))));
        assert!(lines.next().is_none());
    }
}
