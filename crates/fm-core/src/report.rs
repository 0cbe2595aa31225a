//! Plain-text rendering of snapshots for front ends.

use std::fmt::Write;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use fm_platform::filesystem::{DirectoryInfo, EntryKind, FileInfo};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NO_CREATION_DATE: &str = "Could not retrieve creation date.";

pub fn format_timestamp(t: SystemTime) -> String {
    DateTime::<Local>::from(t).format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let units = ["B", "KB", "MB", "GB", "TB"];
    let i = (bytes as f64).log(1024.0).floor() as usize;
    let i = i.min(units.len() - 1);
    let val = bytes as f64 / 1024f64.powi(i as i32);
    if i == 0 {
        format!("{} {}", val as u64, units[i])
    } else {
        format!("{:.1} {}", val, units[i])
    }
}

fn format_size(bytes: u64, human: bool) -> String {
    if human {
        format_bytes(bytes)
    } else {
        format!("{} bytes", bytes)
    }
}

fn kind_label(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::File => "File",
        EntryKind::Directory => "Directory",
        EntryKind::Other => "Other",
    }
}

// Writing into a String cannot fail, so the fmt::Results below are discarded.

fn push_modified(out: &mut String, modified: Option<SystemTime>) {
    match modified {
        Some(t) => {
            let _ = writeln!(out, "Date Modified: {}", format_timestamp(t));
        }
        None => {
            let _ = writeln!(out, "Date Modified: unknown");
        }
    }
}

fn push_created(out: &mut String, created: Option<SystemTime>) {
    match created {
        Some(t) => {
            let _ = writeln!(out, "Date Created: {}", format_timestamp(t));
        }
        None => {
            let _ = writeln!(out, "{}", NO_CREATION_DATE);
        }
    }
}

pub fn directory_report(info: &DirectoryInfo, human: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Directory Name: {}", info.name);
    let _ = writeln!(out, "Total Size: {}", format_size(info.total_size, human));
    push_modified(&mut out, info.modified);
    let _ = writeln!(out, "Directory Path: {}", info.path.display());
    push_created(&mut out, info.created);
    out
}

pub fn file_report(info: &FileInfo, human: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "File Name: {}", info.name);
    let _ = writeln!(out, "File Type: {}", kind_label(info.kind));
    let _ = writeln!(out, "File Size: {}", format_size(info.size, human));
    push_modified(&mut out, info.modified);
    let _ = writeln!(out, "File Path: {}", info.path.display());
    push_created(&mut out, info.created);
    out
}

/// One `File: name` or `Directory: name` line per entry; other kinds are left out
pub fn listing(entries: &[FileInfo]) -> String {
    let mut out = String::new();
    for entry in entries {
        if entry.kind == EntryKind::Other {
            continue;
        }
        let _ = writeln!(out, "{}: {}", kind_label(entry.kind), entry.name);
    }
    out
}
