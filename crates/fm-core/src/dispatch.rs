use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use fm_platform::channel::ControlChannel;
use fm_platform::error::Result;

use crate::config::ChannelTable;
use crate::protocol::{OpKind, Request};

/// Presence of one control channel, as reported by [`Dispatcher::probe`]
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStatus {
    pub kind: OpKind,
    pub address: PathBuf,
    pub present: bool,
}

/// Encodes requests and delivers them to the channel bound to their kind.
///
/// A successful dispatch means the receiver was handed the bytes. It says
/// nothing about whether the mutation was applied; callers that need that
/// must re-inspect the filesystem themselves.
pub struct Dispatcher {
    channels: ChannelTable,
    channel: Box<dyn ControlChannel>,
}

impl Dispatcher {
    pub fn new(channels: ChannelTable, channel: Box<dyn ControlChannel>) -> Self {
        Self { channels, channel }
    }

    pub fn channels(&self) -> &ChannelTable {
        &self.channels
    }

    /// Deliver one request in a single write. Never retries.
    pub fn dispatch(&self, request: Request) -> Result<()> {
        let kind = request.kind();
        let address = self.channels.address(kind);
        let payload = request.encode();

        match self.channel.deliver(address, &payload) {
            Ok(()) => {
                info!(
                    "requested {} for {} via {} ({} bytes)",
                    kind,
                    request.target(),
                    address.display(),
                    payload.len()
                );
                Ok(())
            }
            Err(e) => {
                warn!("{} request for {} failed: {:#}", kind, request.target(), e);
                Err(e)
            }
        }
    }

    /// Report which control channels currently exist, without writing to any
    pub fn probe(&self) -> Vec<ChannelStatus> {
        OpKind::ALL
            .iter()
            .map(|&kind| {
                let address = self.channels.address(kind);
                ChannelStatus {
                    kind,
                    address: address.to_path_buf(),
                    present: self.channel.is_present(address),
                }
            })
            .collect()
    }
}
