//! Control channels exposed by the receiver module as `/proc` entries.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use fm_platform::channel::ControlChannel;
use fm_platform::error::{FmError, Result};

/// Delivers payloads by writing them to procfs entries
pub struct ProcChannel;

impl ProcChannel {
    pub fn new() -> Self {
        Self
    }

    fn classify_open(address: &Path, err: io::Error) -> FmError {
        let missing = err.kind() == io::ErrorKind::NotFound
            || matches!(
                err.raw_os_error(),
                Some(libc::ENODEV) | Some(libc::ENXIO) | Some(libc::ENOTDIR)
            );

        if missing {
            FmError::ChannelUnavailable {
                address: address.to_path_buf(),
                source: err,
            }
        } else if err.kind() == io::ErrorKind::PermissionDenied {
            FmError::PermissionDenied {
                path: address.to_path_buf(),
                source: err,
            }
        } else {
            FmError::io_failure(address, err)
        }
    }

    // Errors raised by the receiver's write handler (EINVAL, ENOENT, ...) land
    // here too; they are reported as I/O failures on the channel.
    fn classify_write(address: &Path, err: io::Error) -> FmError {
        if err.kind() == io::ErrorKind::PermissionDenied {
            FmError::PermissionDenied {
                path: address.to_path_buf(),
                source: err,
            }
        } else {
            FmError::io_failure(address, err)
        }
    }
}

impl Default for ProcChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlChannel for ProcChannel {
    fn deliver(&self, address: &Path, payload: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .open(address)
            .map_err(|e| Self::classify_open(address, e))?;

        let written = file
            .write(payload)
            .map_err(|e| Self::classify_write(address, e))?;

        if written != payload.len() {
            return Err(FmError::io_failure(
                address,
                io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("short write: {} of {} bytes", written, payload.len()),
                ),
            ));
        }

        debug!("wrote {} bytes to {}", written, address.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_writes_exact_payload() {
        let dir = tempfile::tempdir().unwrap();
        let address = dir.path().join("rename_file");
        std::fs::write(&address, b"").unwrap();

        ProcChannel::new()
            .deliver(&address, b"/tmp/a.txt\nb.txt\n")
            .unwrap();

        assert_eq!(std::fs::read(&address).unwrap(), b"/tmp/a.txt\nb.txt\n");
    }

    #[test]
    fn test_missing_address_is_channel_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let address = dir.path().join("create_folder");

        let err = ProcChannel::new().deliver(&address, b"/tmp/x").unwrap_err();
        assert!(matches!(err, FmError::ChannelUnavailable { .. }));
        // never created as a side effect
        assert!(!address.exists());
    }

    #[test]
    fn test_address_under_a_file_is_channel_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("proc");
        std::fs::write(&not_a_dir, b"").unwrap();

        let err = ProcChannel::new()
            .deliver(&not_a_dir.join("delete_file"), b"/tmp/x")
            .unwrap_err();
        assert!(matches!(err, FmError::ChannelUnavailable { .. }));
    }

    #[test]
    fn test_open_errno_classification() {
        let address = Path::new("/proc/create_folder");
        let open = |errno| ProcChannel::classify_open(address, io::Error::from_raw_os_error(errno));

        assert!(matches!(open(libc::ENOENT), FmError::ChannelUnavailable { .. }));
        assert!(matches!(open(libc::ENODEV), FmError::ChannelUnavailable { .. }));
        assert!(matches!(open(libc::ENXIO), FmError::ChannelUnavailable { .. }));
        assert!(matches!(open(libc::ENOTDIR), FmError::ChannelUnavailable { .. }));
        assert!(matches!(open(libc::EACCES), FmError::PermissionDenied { .. }));
        assert!(matches!(open(libc::EPERM), FmError::PermissionDenied { .. }));
        assert!(matches!(open(libc::EIO), FmError::IoFailure { .. }));
    }

    #[test]
    fn test_write_errno_classification() {
        let address = Path::new("/proc/update_file");
        let write =
            |errno| ProcChannel::classify_write(address, io::Error::from_raw_os_error(errno));

        assert!(matches!(write(libc::EACCES), FmError::PermissionDenied { .. }));
        assert!(matches!(write(libc::EPERM), FmError::PermissionDenied { .. }));
        // receiver-side rejections
        assert!(matches!(write(libc::EINVAL), FmError::IoFailure { .. }));
        assert!(matches!(write(libc::ENOENT), FmError::IoFailure { .. }));
        assert!(matches!(write(libc::ENOSPC), FmError::IoFailure { .. }));
    }

    #[test]
    fn test_rejected_write_is_io_failure() {
        // /dev/full fails every write with ENOSPC
        let address = Path::new("/dev/full");
        if !address.exists() {
            return;
        }

        let err = ProcChannel::new().deliver(address, b"payload").unwrap_err();
        assert!(matches!(err, FmError::IoFailure { .. }));
    }

    #[test]
    fn test_channel_is_reusable_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let channel = ProcChannel::new();

        assert!(channel.deliver(&dir.path().join("missing"), b"x").is_err());

        let address = dir.path().join("delete_file");
        std::fs::write(&address, b"").unwrap();
        channel.deliver(&address, b"/tmp/x").unwrap();
        assert!(channel.is_present(&address));
    }
}
