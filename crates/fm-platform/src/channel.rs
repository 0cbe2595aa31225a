use std::path::Path;

use crate::error::Result;

/// A write-only endpoint through which a mutation is requested from the
/// privileged receiver.
///
/// Implementations perform one open-write-close cycle per call and never read
/// the address back. `Ok(())` means the payload was delivered, not that the
/// receiver applied it.
pub trait ControlChannel: Send + Sync {
    /// Write the entire payload to `address` in a single write
    fn deliver(&self, address: &Path, payload: &[u8]) -> Result<()>;

    /// Whether `address` currently exists. Does not open it.
    fn is_present(&self, address: &Path) -> bool {
        address.exists()
    }
}
