// Linux platform implementations

#[cfg(target_os = "linux")]
pub mod procfs;

#[cfg(target_os = "linux")]
pub mod filesystem;
