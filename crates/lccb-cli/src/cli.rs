//! Command-line interface definition using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

// =============================================================================
// CLI Definition
// =============================================================================

/// Encode downlinks for and decode uplinks from LCCB lighting controllers
#[derive(Parser, Debug)]
#[command(name = "lccb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// YAML config file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug)]
pub enum Action {
    /// Encode a downlink command and print it as base64
    Encode {
        /// Print the network-server JSON body instead of bare base64
        #[arg(long)]
        envelope: bool,

        #[command(subcommand)]
        target: EncodeTarget,
    },

    /// Decode a base64 uplink and print it as JSON
    Decode {
        /// Base64 payload as received from the network server
        payload: String,

        /// Channel ids of the active Device Setup, to split Sensor Data
        #[arg(long, value_delimiter = ',', value_name = "IDS")]
        channels: Vec<u32>,
    },

    /// Print the telemetry channel catalog
    Channels,
}

#[derive(Subcommand, Debug)]
pub enum EncodeTarget {
    /// Software reset
    Reset,

    /// Clear tasks and location
    Clear,

    /// Force a network rejoin
    Rejoin,

    /// Set the dim level now
    Live {
        #[arg(long)]
        dim: u32,
    },

    /// Select the telemetry channels
    Setup {
        #[arg(long, value_delimiter = ',', required = true, value_name = "IDS")]
        channels: Vec<u32>,
    },

    /// Set latitude, longitude and UTC offset
    Location {
        #[arg(long, allow_negative_numbers = true)]
        lat: f32,
        #[arg(long, allow_negative_numbers = true)]
        lon: f32,
        #[arg(long, allow_negative_numbers = true)]
        tz: f32,
    },

    /// Send a task record read from a JSON or YAML file
    Task {
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Ask for the task stored at an index
    TaskRequest {
        #[arg(long)]
        index: u8,
    },

    /// Ask for hardware/software versions
    InfoRequest {
        #[arg(long, default_value_t = 1)]
        id: u8,
    },

    /// Write the uplink settings group
    UplinkSettings {
        /// Reporting interval
        #[arg(long)]
        uplink_time: u8,
        #[arg(long)]
        confirmed: bool,
        #[arg(long)]
        force_rejoin: bool,
    },

    /// Set the device clock (defaults to local time now)
    DateTime {
        /// RFC 3339 timestamp; its wall-clock time is sent as-is
        #[arg(long, value_name = "RFC3339")]
        at: Option<String>,
    },

    /// Write a settings group by id with default values
    Settings {
        #[arg(long)]
        group: u8,
    },

    /// Ask for a settings group
    SettingsRequest {
        #[arg(long)]
        group: u8,
    },
}

// =============================================================================
// Tests
// =============================================================================
