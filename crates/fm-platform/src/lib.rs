// Platform seams shared by the core and the per-OS crates

pub mod channel;
pub mod error;
pub mod filesystem;
