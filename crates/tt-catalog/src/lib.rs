//! Domain types for the table-tennis equipment catalog.
//!
//! This crate provides the types shared by every layer of the catalog browser:
//!
//! - **Equipment**: the two catalogs (`rubbers`, `blades`) partitioning the item space
//! - **Items**: equipment items with their ordered price-comparison entries
//! - **Pages**: the raw shape of one page returned by the listing API
//!
//! # Example
//!
//! ```rust,ignore
//! use tt_catalog::prelude::*;
//!
//! let kind: EquipmentType = "rubber".parse()?;
//! assert_eq!(kind.as_path(), "rubbers");
//!
//! let page: PageResult = serde_json::from_str(body)?;
//! for item in &page.items {
//!     println!("{} from {}", item.display_name(50), item.best_price().unwrap_or("-"));
//! }
//! ```

pub mod equipment;
pub mod error;
pub mod ids;
pub mod item;
pub mod page;

pub use equipment::EquipmentType;
pub use error::CatalogError;
pub use ids::EquipmentId;
pub use item::{EquipmentItem, PriceEntry};
pub use page::{NextPage, PageResult};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::equipment::EquipmentType;
    pub use crate::error::CatalogError;
    pub use crate::ids::EquipmentId;
    pub use crate::item::{EquipmentItem, PriceEntry};
    pub use crate::page::{NextPage, PageResult};
}
