//! CLI argument definitions for Sortline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::protocol::RelayAction;

/// Sortline - operator console for a conveyor sorting line.
///
/// Run without a subcommand to open the interactive console, or use one of
/// the subcommands for one-shot operations against the backend.
#[derive(Parser, Debug)]
#[command(name = "sortline")]
#[command(author, version, long_version = LONG_VERSION, about = "Operator console for a conveyor sorting line", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Backend host (overrides SORTLINE_HOST and the settings file)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Backend port (overrides SORTLINE_PORT and the settings file)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Settings file to read instead of the default location.
    /// Can also be set via SORTLINE_CONFIG environment variable.
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Version string with build metadata for `--version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("SORTLINE_GIT_COMMIT"),
    "\nbuilt:  ",
    env!("SORTLINE_BUILD_TIMESTAMP"),
);

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive terminal console (default)
    Console,

    /// Connect, wait for the first state snapshot and summarise it
    Status {
        /// Seconds to wait for the first snapshot
        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,
    },

    /// Backend configuration and local console settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Maintenance mode commands
    Maintenance {
        #[command(subcommand)]
        command: MaintenanceCommands,
    },

    /// Sorting queue commands
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },

    /// Simulate a lane sensor (mock GPIO mode only)
    Mock {
        /// Lane number, 1-based
        lane: usize,

        /// Level to simulate
        #[arg(long, value_enum)]
        state: SensorLevel,
    },

    /// Relay test commands
    Relay {
        #[command(subcommand)]
        command: RelayCommands,
    },

    /// Lane counter commands
    Count {
        #[command(subcommand)]
        command: CountCommands,
    },

    /// Turn sensor-to-relay auto test on or off
    Autotest {
        #[arg(value_enum)]
        mode: Toggle,
    },

    /// Per-lane sort totals for recent days
    SortLog {
        /// Number of most recent days to include
        #[arg(long, default_value_t = 7)]
        days: usize,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the configuration currently loaded by the backend
    Get,

    /// Validate a JSON file locally, submit it and print the reloaded configuration
    Push {
        /// Path to the configuration JSON
        file: PathBuf,
    },

    /// Show the resolved console settings and where each value came from
    Settings,
}

/// Maintenance subcommands
#[derive(Subcommand, Debug)]
pub enum MaintenanceCommands {
    /// Clear maintenance mode on the backend
    Reset,
}

/// Queue subcommands
#[derive(Subcommand, Debug)]
pub enum QueueCommands {
    /// Empty the sorting queue
    Reset,
}

/// Relay subcommands
#[derive(Subcommand, Debug)]
pub enum RelayCommands {
    /// Pulse one relay of one lane
    Test {
        /// Lane number, 1-based
        lane: usize,

        #[arg(value_enum)]
        action: RelayArg,
    },

    /// Pulse every lane that has relays, in sequence
    TestAll,
}

/// Count subcommands
#[derive(Subcommand, Debug)]
pub enum CountCommands {
    /// Reset one lane's counter
    Reset {
        /// Lane number, 1-based
        lane: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SensorLevel {
    /// Sensor triggered (LOW)
    Active,
    /// Sensor released (HIGH)
    Idle,
}

impl SensorLevel {
    pub fn is_active(self) -> bool {
        self == SensorLevel::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RelayArg {
    Grab,
    Push,
}

impl From<RelayArg> for RelayAction {
    fn from(arg: RelayArg) -> Self {
        match arg {
            RelayArg::Grab => RelayAction::Grab,
            RelayArg::Push => RelayAction::Push,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}
