//! One page of listing results, as returned by the API.

use serde::{Deserialize, Serialize};

use crate::item::EquipmentItem;

/// The `next` marker of a page.
///
/// The API encodes "no further pages" as the literal string `"null"`; a JSON
/// `null` is read the same way. A missing field carries no signal at all, so
/// pagination continues until the backend answers 404.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum NextPage {
    /// Field was absent.
    #[default]
    Unspecified,
    /// Exhaustion signal.
    End,
    /// Opaque pointer to the following page.
    Cursor(String),
}

impl NextPage {
    pub fn is_end(&self) -> bool {
        matches!(self, NextPage::End)
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, NextPage::Unspecified)
    }
}

impl From<Option<String>> for NextPage {
    fn from(value: Option<String>) -> Self {
        match value {
            None => NextPage::End,
            Some(s) if s == "null" => NextPage::End,
            Some(s) => NextPage::Cursor(s),
        }
    }
}

impl From<NextPage> for Option<String> {
    fn from(value: NextPage) -> Self {
        match value {
            NextPage::Unspecified => None,
            NextPage::End => Some("null".to_string()),
            NextPage::Cursor(s) => Some(s),
        }
    }
}

/// One page of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Items in API order.
    #[serde(default)]
    pub items: Vec<EquipmentItem>,
    /// Continuation marker.
    #[serde(default, skip_serializing_if = "NextPage::is_unspecified")]
    pub next: NextPage,
}

impl PageResult {
    /// Create a page with a continuation cursor.
    pub fn new(items: Vec<EquipmentItem>, next: impl Into<String>) -> Self {
        Self {
            items,
            next: NextPage::from(Some(next.into())),
        }
    }

    /// Create the final page of a listing.
    pub fn last(items: Vec<EquipmentItem>) -> Self {
        Self {
            items,
            next: NextPage::End,
        }
    }

    /// Whether this page carries the exhaustion signal.
    ///
    /// Exhaustion wins over a non-empty page: the items are still kept.
    pub fn is_last(&self) -> bool {
        self.next.is_end()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
