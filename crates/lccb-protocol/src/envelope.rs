//! Network-server downlink request body.

use serde::{Deserialize, Serialize};

use crate::commands::Command;
use crate::constants::*;

/// One queued downlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downlink {
    /// LoRaWAN application port.
    pub f_port: u8,
    /// Base64 message.
    pub frm_payload: String,
    /// Network-server queue priority.
    pub priority: String,
}

/// The JSON body handed to the network server's downlink queue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DownlinkEnvelope {
    /// Downlinks to queue, in order.
    pub downlinks: Vec<Downlink>,
}

impl DownlinkEnvelope {
    /// Wrap a single command on the default port and priority.
    pub fn single(command: &Command) -> Self {
        let mut envelope = DownlinkEnvelope::default();
        envelope.push(command, DEFAULT_F_PORT, DEFAULT_PRIORITY);
        envelope
    }

    pub fn push(&mut self, command: &Command, f_port: u8, priority: &str) {
        self.downlinks.push(Downlink {
            f_port,
            frm_payload: command.to_base64(),
            priority: priority.to_string(),
        });
    }
}
