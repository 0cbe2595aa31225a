use std::fmt;

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use fm_platform::error::{FmError, Result};

/// Separator between fields of the folder/file create and rename payloads
pub const FIELD_SEPARATOR: u8 = b'\n';

/// Separator between fields of the update payload
pub const UPDATE_SEPARATOR: u8 = b'|';

pub const FLAG_APPEND: u8 = b'0';
pub const FLAG_OVERWRITE: u8 = b'1';

/// The seven mutating operations, one control channel each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    CreateFolder,
    RenameFolder,
    DeleteFolder,
    CreateFile,
    RenameFile,
    UpdateFile,
    DeleteFile,
}

impl OpKind {
    pub const ALL: [OpKind; 7] = [
        OpKind::CreateFolder,
        OpKind::RenameFolder,
        OpKind::DeleteFolder,
        OpKind::CreateFile,
        OpKind::RenameFile,
        OpKind::UpdateFile,
        OpKind::DeleteFile,
    ];

    /// File name of the control entry the receiver registers for this kind
    pub fn channel_name(self) -> &'static str {
        match self {
            OpKind::CreateFolder => "create_folder",
            OpKind::RenameFolder => "rename_folder",
            OpKind::DeleteFolder => "delete_folder",
            OpKind::CreateFile => "create_file",
            OpKind::RenameFile => "rename_file",
            OpKind::UpdateFile => "update_file",
            OpKind::DeleteFile => "delete_file",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.channel_name())
    }
}

/// A single mutation request. Consumed by one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CreateFolder { path: String },
    RenameFolder { old_path: String, new_name: String },
    DeleteFolder { path: String },
    CreateFile { path: String, content: String },
    RenameFile { old_path: String, new_name: String },
    UpdateFile {
        path: String,
        data: String,
        overwrite: bool,
    },
    DeleteFile { path: String },
}

impl Request {
    pub fn kind(&self) -> OpKind {
        match self {
            Request::CreateFolder { .. } => OpKind::CreateFolder,
            Request::RenameFolder { .. } => OpKind::RenameFolder,
            Request::DeleteFolder { .. } => OpKind::DeleteFolder,
            Request::CreateFile { .. } => OpKind::CreateFile,
            Request::RenameFile { .. } => OpKind::RenameFile,
            Request::UpdateFile { .. } => OpKind::UpdateFile,
            Request::DeleteFile { .. } => OpKind::DeleteFile,
        }
    }

    /// The path the request acts on
    pub fn target(&self) -> &str {
        match self {
            Request::CreateFolder { path }
            | Request::DeleteFolder { path }
            | Request::CreateFile { path, .. }
            | Request::UpdateFile { path, .. }
            | Request::DeleteFile { path } => path,
            Request::RenameFolder { old_path, .. } | Request::RenameFile { old_path, .. } => {
                old_path
            }
        }
    }

    /// Encode into the exact bytes the receiver expects. Separators inside
    /// fields are not escaped.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len_hint());
        match self {
            Request::CreateFolder { path }
            | Request::DeleteFolder { path }
            | Request::DeleteFile { path } => {
                buf.put_slice(path.as_bytes());
            }
            Request::RenameFolder { old_path, new_name }
            | Request::RenameFile { old_path, new_name } => {
                buf.put_slice(old_path.as_bytes());
                buf.put_u8(FIELD_SEPARATOR);
                buf.put_slice(new_name.as_bytes());
                buf.put_u8(FIELD_SEPARATOR);
            }
            Request::CreateFile { path, content } => {
                buf.put_slice(path.as_bytes());
                buf.put_u8(FIELD_SEPARATOR);
                buf.put_slice(content.as_bytes());
            }
            Request::UpdateFile {
                path,
                data,
                overwrite,
            } => {
                buf.put_slice(path.as_bytes());
                buf.put_u8(UPDATE_SEPARATOR);
                buf.put_slice(data.as_bytes());
                buf.put_u8(UPDATE_SEPARATOR);
                buf.put_u8(if *overwrite { FLAG_OVERWRITE } else { FLAG_APPEND });
            }
        }
        buf
    }

    fn encoded_len_hint(&self) -> usize {
        match self {
            Request::CreateFolder { path }
            | Request::DeleteFolder { path }
            | Request::DeleteFile { path } => path.len(),
            Request::RenameFolder { old_path, new_name }
            | Request::RenameFile { old_path, new_name } => old_path.len() + new_name.len() + 2,
            Request::CreateFile { path, content } => path.len() + content.len() + 1,
            Request::UpdateFile { path, data, .. } => path.len() + data.len() + 3,
        }
    }

    /// Reject fields that contain their own payload's separator.
    ///
    /// The receiver splits on the first separator it finds, so such a request
    /// would be decoded differently from what was meant. `CreateFile` content
    /// may hold newlines since it is the last field.
    pub fn check_delimiters(&self) -> Result<()> {
        let newline = FIELD_SEPARATOR as char;
        let pipe = UPDATE_SEPARATOR as char;

        match self {
            Request::CreateFolder { path }
            | Request::DeleteFolder { path }
            | Request::DeleteFile { path }
            | Request::CreateFile { path, .. } => reject(path, "path", newline),
            Request::RenameFolder { old_path, new_name }
            | Request::RenameFile { old_path, new_name } => {
                reject(old_path, "old_path", newline)?;
                reject(new_name, "new_name", newline)
            }
            Request::UpdateFile { path, data, .. } => {
                reject(path, "path", pipe)?;
                reject(data, "data", pipe)
            }
        }
    }
}

fn reject(value: &str, field: &'static str, ch: char) -> Result<()> {
    if value.contains(ch) {
        Err(FmError::ReservedCharacter { field, ch })
    } else {
        Ok(())
    }
}
