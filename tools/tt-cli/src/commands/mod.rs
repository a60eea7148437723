//! CLI command implementations.

pub mod browse;
pub mod config;
pub mod search;
pub mod show;

use clap::{Args, Subcommand};
use tt_catalog::{EquipmentId, EquipmentType};

/// Arguments for the browse command.
#[derive(Args)]
pub struct BrowseArgs {
    /// Category: rubbers or blades.
    pub equipment: EquipmentType,

    /// Only items whose name matches.
    #[arg(short, long)]
    pub query: Option<String>,

    /// Load pages 1 through this one.
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Offer to load further pages one at a time.
    #[arg(long)]
    pub more: bool,

    /// Maximum width of the name column.
    #[arg(long, default_value_t = 48)]
    pub width: usize,
}

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Category: rubbers or blades.
    pub equipment: EquipmentType,

    /// Search term.
    pub term: String,

    /// Offer to load further pages one at a time.
    #[arg(long)]
    pub more: bool,

    /// Maximum width of the name column.
    #[arg(long, default_value_t = 48)]
    pub width: usize,
}

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Category: rubbers or blades.
    pub equipment: EquipmentType,

    /// Item id.
    pub id: EquipmentId,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
