//! Equipment categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CatalogError;

/// One of the catalogs partitioning the item space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentType {
    /// Rubber sheets.
    Rubbers,
    /// Blades.
    Blades,
}

impl EquipmentType {
    /// All categories, in display order.
    pub const ALL: [EquipmentType; 2] = [EquipmentType::Rubbers, EquipmentType::Blades];

    /// Path segment used by the listing API (`/rubbers`, `/blades`).
    pub fn as_path(&self) -> &'static str {
        match self {
            EquipmentType::Rubbers => "rubbers",
            EquipmentType::Blades => "blades",
        }
    }

    /// Singular name, as used in user-facing messages.
    pub fn singular(&self) -> &'static str {
        match self {
            EquipmentType::Rubbers => "rubber",
            EquipmentType::Blades => "blade",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EquipmentType::Rubbers => "Table Tennis Rubbers",
            EquipmentType::Blades => "Table Tennis Blades",
        }
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

impl FromStr for EquipmentType {
    type Err = CatalogError;

    /// Accepts singular or plural names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rubber" | "rubbers" => Ok(EquipmentType::Rubbers),
            "blade" | "blades" => Ok(EquipmentType::Blades),
            _ => Err(CatalogError::UnknownEquipmentType(s.to_string())),
        }
    }
}
