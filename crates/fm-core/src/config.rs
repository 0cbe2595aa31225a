use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::protocol::OpKind;

/// Directory the receiver module registers its control entries under
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Mapping from operation kind to control-channel address.
///
/// Built once at start-up and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelTable {
    pub create_folder: PathBuf,
    pub rename_folder: PathBuf,
    pub delete_folder: PathBuf,
    pub create_file: PathBuf,
    pub rename_file: PathBuf,
    pub update_file: PathBuf,
    pub delete_file: PathBuf,
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self::under(DEFAULT_PROC_ROOT)
    }
}

impl ChannelTable {
    /// Bind all seven channels under one directory, using the receiver's entry names
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let at = |kind: OpKind| root.join(kind.channel_name());
        Self {
            create_folder: at(OpKind::CreateFolder),
            rename_folder: at(OpKind::RenameFolder),
            delete_folder: at(OpKind::DeleteFolder),
            create_file: at(OpKind::CreateFile),
            rename_file: at(OpKind::RenameFile),
            update_file: at(OpKind::UpdateFile),
            delete_file: at(OpKind::DeleteFile),
        }
    }

    pub fn address(&self, kind: OpKind) -> &Path {
        match kind {
            OpKind::CreateFolder => &self.create_folder,
            OpKind::RenameFolder => &self.rename_folder,
            OpKind::DeleteFolder => &self.delete_folder,
            OpKind::CreateFile => &self.create_file,
            OpKind::RenameFile => &self.rename_file,
            OpKind::UpdateFile => &self.update_file,
            OpKind::DeleteFile => &self.delete_file,
        }
    }

    /// Every kind must be bound to its own address
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for kind in OpKind::ALL {
            let address = self.address(kind);
            if address.as_os_str().is_empty() {
                anyhow::bail!("no control channel configured for {}", kind);
            }
            if !seen.insert(address) {
                anyhow::bail!(
                    "control channel {} is bound to more than one operation",
                    address.display()
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Control-channel addresses, one per mutating operation
    #[serde(default)]
    pub channels: ChannelTable,

    /// Show sizes as "1.5 KB" instead of raw byte counts
    #[serde(default)]
    pub human_sizes: bool,
}

impl ClientConfig {
    /// Default config file path for this platform
    pub fn default_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("org", "fm-kernel", "fmctl") {
            dirs.config_dir().join("config.json")
        } else {
            PathBuf::from("fmctl-config.json")
        }
    }

    /// Load config from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let config: Self =
            serde_json::from_str(&data).with_context(|| "failed to parse config JSON")?;
        config
            .channels
            .validate()
            .with_context(|| format!("invalid channel table in {}", path.display()))?;
        Ok(config)
    }

    /// Save config to a file path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(())
    }
}
