//! Listing state.

use std::fmt;

use serde::Serialize;
use tt_catalog::{EquipmentItem, EquipmentType};

/// Where a listing is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing loaded yet.
    Idle,
    /// Fetching pages `1..=N` after a reset.
    Replaying,
    /// Loaded, more pages may exist.
    Ready,
    /// One extra page in flight.
    LoadingMore,
    /// No further pages for this query.
    Exhausted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Replaying => write!(f, "replaying"),
            Self::Ready => write!(f, "ready"),
            Self::LoadingMore => write!(f, "loading more"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// What a listing view renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingState {
    pub equipment: EquipmentType,
    /// Items of every page loaded since the last reset, in fetch order.
    pub items: Vec<EquipmentItem>,
    /// Highest page loaded; 0 before the first page lands.
    pub current_page: u32,
    pub active_query: Option<String>,
    pub has_more: bool,
    pub loading: bool,
    /// Message of the last failed fetch, cleared by the next success.
    pub last_error: Option<String>,
}

impl ListingState {
    /// State of a listing that has not loaded anything.
    pub fn new(equipment: EquipmentType) -> Self {
        Self {
            equipment,
            items: Vec::new(),
            current_page: 0,
            active_query: None,
            has_more: true,
            loading: false,
            last_error: None,
        }
    }

    /// Start over for a new query.
    pub(crate) fn reset(&mut self, query: Option<String>) {
        self.items.clear();
        self.current_page = 0;
        self.active_query = query;
        self.has_more = true;
        self.loading = true;
        self.last_error = None;
    }

    /// Phase to settle in once nothing is in flight.
    pub(crate) fn settled_phase(&self) -> Phase {
        if self.has_more {
            Phase::Ready
        } else {
            Phase::Exhausted
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
