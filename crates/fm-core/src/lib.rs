pub mod config;
pub mod dispatch;
pub mod files;
pub mod protocol;
pub mod report;
