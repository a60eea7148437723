//! The page-fetching seam used by the listing controller.

use std::sync::Arc;

use async_trait::async_trait;
use tt_catalog::{EquipmentType, PageResult};

use crate::client::FetchClient;
use crate::error::FetchError;

/// Result of fetching one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The backend returned a page.
    Page(PageResult),
    /// The backend answered 404: there is no such page.
    EndOfPagination,
}

impl PageOutcome {
    pub fn is_end(&self) -> bool {
        matches!(self, PageOutcome::EndOfPagination)
    }

    /// The page, if one was returned.
    pub fn into_page(self) -> Option<PageResult> {
        match self {
            PageOutcome::Page(page) => Some(page),
            PageOutcome::EndOfPagination => None,
        }
    }
}

/// Something that can produce listing pages.
///
/// Pages are 1-based. `query` is `None` for an unfiltered listing and is never
/// an empty string.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(
        &self,
        equipment: EquipmentType,
        page: u32,
        query: Option<&str>,
    ) -> Result<PageOutcome, FetchError>;
}

#[async_trait]
impl PageSource for FetchClient {
    async fn fetch_page(
        &self,
        equipment: EquipmentType,
        page: u32,
        query: Option<&str>,
    ) -> Result<PageOutcome, FetchError> {
        FetchClient::fetch_page(self, equipment, page, query).await
    }
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for Arc<S> {
    async fn fetch_page(
        &self,
        equipment: EquipmentType,
        page: u32,
        query: Option<&str>,
    ) -> Result<PageOutcome, FetchError> {
        (**self).fetch_page(equipment, page, query).await
    }
}
