use fm_platform::error::Result;
use fm_platform::filesystem::{ContentLines, ContentReader, DirectoryInfo, FileInfo, Inspector};

use crate::dispatch::Dispatcher;
use crate::protocol::Request;

/// Entry point for front ends: mutations go through the dispatcher,
/// introspection goes straight to the inspector.
pub struct FileManager {
    dispatcher: Dispatcher,
    inspector: Box<dyn Inspector>,
}

impl FileManager {
    pub fn new(dispatcher: Dispatcher, inspector: Box<dyn Inspector>) -> Self {
        Self {
            dispatcher,
            inspector,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Hand a prepared request to the dispatcher
    pub fn submit(&self, request: Request) -> Result<()> {
        self.dispatcher.dispatch(request)
    }

    pub fn create_folder(&self, path: &str) -> Result<()> {
        self.submit(Request::CreateFolder {
            path: path.to_string(),
        })
    }

    pub fn rename_folder(&self, old_path: &str, new_name: &str) -> Result<()> {
        self.submit(Request::RenameFolder {
            old_path: old_path.to_string(),
            new_name: new_name.to_string(),
        })
    }

    pub fn delete_folder(&self, path: &str) -> Result<()> {
        self.submit(Request::DeleteFolder {
            path: path.to_string(),
        })
    }

    pub fn create_file(&self, path: &str, content: &str) -> Result<()> {
        self.submit(Request::CreateFile {
            path: path.to_string(),
            content: content.to_string(),
        })
    }

    pub fn rename_file(&self, old_path: &str, new_name: &str) -> Result<()> {
        self.submit(Request::RenameFile {
            old_path: old_path.to_string(),
            new_name: new_name.to_string(),
        })
    }

    /// Append `data`, or replace the file contents when `overwrite` is set
    pub fn update_file(&self, path: &str, data: &str, overwrite: bool) -> Result<()> {
        self.submit(Request::UpdateFile {
            path: path.to_string(),
            data: data.to_string(),
            overwrite,
        })
    }

    pub fn delete_file(&self, path: &str) -> Result<()> {
        self.submit(Request::DeleteFile {
            path: path.to_string(),
        })
    }

    pub fn list(&self, path: &str) -> Result<Vec<FileInfo>> {
        self.inspector.list(path)
    }

    pub fn directory_info(&self, path: &str) -> Result<DirectoryInfo> {
        self.inspector.directory_info(path)
    }

    pub fn file_info(&self, path: &str) -> Result<FileInfo> {
        self.inspector.file_info(path)
    }

    pub fn read_content(&self, path: &str) -> Result<ContentLines<ContentReader>> {
        self.inspector.read_content(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use fm_platform::error::FmError;
    use fm_platform::filesystem::EntryKind;

    use crate::config::ChannelTable;
    use crate::dispatch::tests::RecordingChannel;

    /// Serves a single fixed file and nothing else
    struct FixedInspector;

    impl Inspector for FixedInspector {
        fn list(&self, path: &str) -> Result<Vec<FileInfo>> {
            Err(FmError::NotADirectory { path: path.into() })
        }

        fn directory_info(&self, path: &str) -> Result<DirectoryInfo> {
            Err(FmError::NotADirectory { path: path.into() })
        }

        fn file_info(&self, path: &str) -> Result<FileInfo> {
            if path != "/fixed" {
                return Err(FmError::NotFound { path: path.into() });
            }
            Ok(FileInfo {
                name: "fixed".to_string(),
                path: PathBuf::from("/fixed"),
                kind: EntryKind::File,
                size: 5,
                modified: None,
                created: None,
            })
        }

        fn read_content(&self, path: &str) -> Result<ContentLines<ContentReader>> {
            let reader: ContentReader = Box::new(&b"hello"[..]);
            Ok(ContentLines::new(reader, Path::new(path)))
        }
    }

    fn manager(recorder: RecordingChannel) -> FileManager {
        let dispatcher = Dispatcher::new(ChannelTable::under("/proc"), Box::new(recorder));
        FileManager::new(dispatcher, Box::new(FixedInspector))
    }

    #[test]
    fn test_mutations_are_dispatched() {
        let recorder = RecordingChannel::default();
        let fm = manager(recorder.clone());

        fm.create_folder("/home/u/new").unwrap();
        fm.rename_file("/home/u/a.txt", "b.txt").unwrap();
        fm.update_file("/home/u/b.txt", "tail", false).unwrap();

        let writes = recorder.writes.lock().unwrap();
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0].0, PathBuf::from("/proc/create_folder"));
        assert_eq!(writes[0].1, b"/home/u/new");
        assert_eq!(writes[1].0, PathBuf::from("/proc/rename_file"));
        assert_eq!(writes[1].1, b"/home/u/a.txt\nb.txt\n");
        assert_eq!(writes[2].1, b"/home/u/b.txt|tail|0");
    }

    #[test]
    fn test_introspection_bypasses_channels() {
        let recorder = RecordingChannel::default();
        let fm = manager(recorder.clone());

        assert_eq!(fm.file_info("/fixed").unwrap().size, 5);
        assert!(matches!(
            fm.file_info("/other"),
            Err(FmError::NotFound { .. })
        ));
        assert_eq!(
            fm.read_content("/fixed").unwrap().into_string().unwrap(),
            "hello"
        );
        assert!(recorder.writes.lock().unwrap().is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_delivered_is_not_applied() {
        use fm_linux::filesystem::LinuxInspector;
        use fm_linux::procfs::ProcChannel;

        // stand-in control entries are plain files, so nothing acts on the requests
        let proc_dir = tempfile::tempdir().unwrap();
        let table = ChannelTable::under(proc_dir.path());
        for kind in crate::protocol::OpKind::ALL {
            std::fs::write(table.address(kind), b"").unwrap();
        }

        let work = tempfile::tempdir().unwrap();
        let target = work.path().join("made-by-receiver");
        let fm = FileManager::new(
            Dispatcher::new(table.clone(), Box::new(ProcChannel::new())),
            Box::new(LinuxInspector::new()),
        );

        fm.create_folder(target.to_str().unwrap()).unwrap();

        assert_eq!(
            std::fs::read(table.address(crate::protocol::OpKind::CreateFolder)).unwrap(),
            target.to_str().unwrap().as_bytes()
        );
        assert!(matches!(
            fm.file_info(target.to_str().unwrap()),
            Err(FmError::NotFound { .. })
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_missing_receiver_is_channel_unavailable() {
        use fm_linux::filesystem::LinuxInspector;
        use fm_linux::procfs::ProcChannel;

        let proc_dir = tempfile::tempdir().unwrap();
        let fm = FileManager::new(
            Dispatcher::new(
                ChannelTable::under(proc_dir.path()),
                Box::new(ProcChannel::new()),
            ),
            Box::new(LinuxInspector::new()),
        );

        for result in [
            fm.create_folder("/tmp/a"),
            fm.rename_folder("/tmp/a", "b"),
            fm.delete_folder("/tmp/b"),
            fm.create_file("/tmp/f", "x"),
            fm.rename_file("/tmp/f", "g"),
            fm.update_file("/tmp/g", "y", true),
            fm.delete_file("/tmp/g"),
        ] {
            assert!(matches!(result, Err(FmError::ChannelUnavailable { .. })));
        }
    }
}
