//! Reading and writing the listing parameters of a query string.
//!
//! Two parameters matter: `page` (positive integer, default 1) and `query`
//! (optional search term). Everything else in the query string belongs to
//! someone else and is carried through untouched.

use serde::Serialize;
use url::form_urlencoded;

/// Name of the page parameter.
pub const PAGE_PARAM: &str = "page";

/// Name of the search term parameter.
pub const QUERY_PARAM: &str = "query";

/// The listing parameters carried in a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingParams {
    /// Target page, always at least 1.
    pub page: u32,
    /// Search term, never empty.
    pub query: Option<String>,
}

impl ListingParams {
    pub fn new(page: u32, query: Option<&str>) -> Self {
        Self {
            page: page.max(1),
            query: normalize_query(query),
        }
    }

    /// Serialize on their own, as `page=N[&query=Q]`.
    pub fn to_query_string(&self) -> String {
        let patch = ParamsPatch {
            page: Some(self.page),
            query: match &self.query {
                Some(q) => QueryUpdate::Set(q.clone()),
                None => QueryUpdate::Clear,
            },
        };
        encode("", &patch)
    }
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            page: 1,
            query: None,
        }
    }
}

/// A `page` value that could not be used as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedPageParam {
    #[error("page parameter is missing")]
    Missing,

    #[error("page parameter {0:?} is not a number")]
    NotANumber(String),

    #[error("page parameter {0:?} is below 1")]
    BelowOne(String),
}

/// What a patch does to the `query` parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueryUpdate {
    /// Leave it as it is.
    #[default]
    Keep,
    /// Set it. A blank term removes the parameter.
    Set(String),
    /// Remove it.
    Clear,
}

/// A partial update of the listing parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamsPatch {
    pub page: Option<u32>,
    pub query: QueryUpdate,
}

impl ParamsPatch {
    /// Move to another page, keeping the search term.
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            query: QueryUpdate::Keep,
        }
    }

    /// Submit a search: set the term and go back to page 1.
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            page: Some(1),
            query: QueryUpdate::Set(term.into()),
        }
    }

    /// Drop the search term.
    pub fn clear_query() -> Self {
        Self {
            page: None,
            query: QueryUpdate::Clear,
        }
    }
}

fn strip_question_mark(query_string: &str) -> &str {
    query_string.strip_prefix('?').unwrap_or(query_string)
}

fn normalize_query(query: Option<&str>) -> Option<String> {
    query
        .filter(|q| !q.trim().is_empty())
        .map(str::to_string)
}

/// First value of `name`, percent-decoded.
fn first_value(query_string: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(strip_question_mark(query_string).as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Parse a raw `page` value.
pub fn parse_page(raw: Option<&str>) -> Result<u32, MalformedPageParam> {
    let raw = raw.ok_or(MalformedPageParam::Missing)?;
    let trimmed = raw.trim();

    match trimmed.parse::<u32>() {
        Ok(0) => Err(MalformedPageParam::BelowOne(raw.to_string())),
        Ok(page) => Ok(page),
        Err(_) if trimmed.parse::<i64>().is_ok_and(|n| n < 1) => {
            Err(MalformedPageParam::BelowOne(raw.to_string()))
        }
        Err(_) => Err(MalformedPageParam::NotANumber(raw.to_string())),
    }
}

/// Read `{page, query}` from a query string (with or without a leading `?`).
///
/// An unusable `page` is clamped to 1.
pub fn decode(query_string: &str) -> ListingParams {
    let page = match parse_page(first_value(query_string, PAGE_PARAM).as_deref()) {
        Ok(page) => page,
        Err(MalformedPageParam::Missing) => 1,
        Err(e) => {
            tracing::debug!(error = %e, "clamping page parameter to 1");
            1
        }
    };
    let query = first_value(query_string, QUERY_PARAM);

    ListingParams {
        page,
        query: normalize_query(query.as_deref()),
    }
}

/// Apply `patch` to `current` and return the new query string, without a
/// leading `?`.
///
/// Unrelated parameters keep their order. `page` and `query` are rewritten
/// where they first appear (later duplicates are dropped) or appended when
/// absent. `page` is always written.
pub fn encode(current: &str, patch: &ParamsPatch) -> String {
    let params = decode(current);
    let page = patch.page.unwrap_or(params.page).max(1).to_string();
    let query = match &patch.query {
        QueryUpdate::Keep => params.query,
        QueryUpdate::Set(term) => normalize_query(Some(term)),
        QueryUpdate::Clear => None,
    };

    let mut out = form_urlencoded::Serializer::new(String::new());
    let mut wrote_page = false;
    let mut wrote_query = false;

    for (key, value) in form_urlencoded::parse(strip_question_mark(current).as_bytes()) {
        match key.as_ref() {
            PAGE_PARAM => {
                if !wrote_page {
                    out.append_pair(PAGE_PARAM, &page);
                    wrote_page = true;
                }
            }
            QUERY_PARAM => {
                if !wrote_query {
                    if let Some(query) = &query {
                        out.append_pair(QUERY_PARAM, query);
                    }
                    wrote_query = true;
                }
            }
            _ => {
                out.append_pair(&key, &value);
            }
        }
    }

    if !wrote_page {
        out.append_pair(PAGE_PARAM, &page);
    }
    if let (false, Some(query)) = (wrote_query, &query) {
        out.append_pair(QUERY_PARAM, query);
    }

    out.finish()
}
