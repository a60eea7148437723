//! Catalog error types.

use thiserror::Error;

/// Errors that can occur when interpreting catalog data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Equipment category name not recognised.
    #[error("Unknown equipment type: {0} (expected one of: rubbers, blades)")]
    UnknownEquipmentType(String),

    /// Equipment ID was empty.
    #[error("Equipment ID must not be empty")]
    EmptyId,
}
