//! Optional YAML configuration.
//!
//! ```yaml
//! decode:
//!   day_names: english
//! downlink:
//!   f_port: 8
//!   priority: NORMAL
//! ```

use std::path::Path;

use lccb_protocol::{DecodeOptions, DEFAULT_F_PORT, DEFAULT_PRIORITY};
use serde::Deserialize;
use tracing::debug;

use crate::error::CliResult;

/// Top-level config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub decode: DecodeOptions,
    pub downlink: DownlinkConfig,
}

/// Settings for the network-server envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownlinkConfig {
    pub f_port: u8,
    pub priority: String,
}

impl Default for DownlinkConfig {
    fn default() -> Self {
        DownlinkConfig {
            f_port: DEFAULT_F_PORT,
            priority: DEFAULT_PRIORITY.to_string(),
        }
    }
}

impl Config {
    /// Load from a file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&text)?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}
