//! Paginated listing state kept in step with the address bar.
//!
//! The URL's `page` and `query` parameters decide what a listing shows. The
//! [`PaginationController`] reads them through a [`Location`], replays pages
//! `1..=page` one at a time, and offers `load_more` for the next page,
//! writing the new page number back into the URL.
//!
//! # Example
//!
//! ```ignore
//! use tt_listing::prelude::*;
//!
//! let location = MemoryLocation::new("/rubbers", "page=2&query=tenergy");
//! let controller = PaginationController::new(EquipmentType::Rubbers, client, location);
//!
//! controller.mount().await?;
//! controller.load_more().await?;
//! assert_eq!(controller.location().query_string(), "page=3&query=tenergy");
//! ```

pub mod codec;
pub mod controller;
pub mod location;
pub mod state;

pub use codec::{decode, encode, ListingParams, MalformedPageParam, ParamsPatch, QueryUpdate};
pub use controller::{LoadMore, PaginationController, Replay, ReplayOutcome};
pub use location::{HistoryAction, HistoryEntry, Location, MemoryLocation};
pub use state::{ListingState, Phase};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::codec::{decode, encode, ListingParams, ParamsPatch};
    pub use crate::controller::{LoadMore, PaginationController, Replay, ReplayOutcome};
    pub use crate::location::{Location, MemoryLocation};
    pub use crate::state::{ListingState, Phase};
    pub use tt_catalog::EquipmentType;
}
