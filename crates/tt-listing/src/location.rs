//! The address bar, as seen by a listing.

use std::sync::{Arc, Mutex, PoisonError};

/// Read and write access to the current URL's path and query string.
///
/// Query strings are exchanged without the leading `?`.
pub trait Location: Send + Sync {
    /// Current path, e.g. `/rubbers`.
    fn path(&self) -> String;

    /// Current query string.
    fn query_string(&self) -> String;

    /// Replace the current history entry. No navigation, no scroll reset.
    fn replace(&self, query: &str);

    /// Add a history entry, as a navigation would.
    fn push(&self, query: &str);

    /// Path and query string together.
    fn href(&self) -> String {
        let query = self.query_string();
        if query.is_empty() {
            self.path()
        } else {
            format!("{}?{}", self.path(), query)
        }
    }
}

impl<L: Location + ?Sized> Location for Arc<L> {
    fn path(&self) -> String {
        (**self).path()
    }

    fn query_string(&self) -> String {
        (**self).query_string()
    }

    fn replace(&self, query: &str) {
        (**self).replace(query)
    }

    fn push(&self, query: &str) {
        (**self).push(query)
    }
}

/// Kind of write recorded by `MemoryLocation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Initial,
    Push,
    Replace,
}

/// One recorded write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub action: HistoryAction,
    pub query: String,
}

#[derive(Debug)]
struct History {
    stack: Vec<String>,
    log: Vec<HistoryEntry>,
}

/// In-memory location with a history stack.
#[derive(Debug)]
pub struct MemoryLocation {
    path: String,
    history: Mutex<History>,
}

impl MemoryLocation {
    pub fn new(path: impl Into<String>, query: &str) -> Self {
        let query = strip(query).to_string();
        Self {
            path: path.into(),
            history: Mutex::new(History {
                stack: vec![query.clone()],
                log: vec![HistoryEntry {
                    action: HistoryAction::Initial,
                    query,
                }],
            }),
        }
    }

    /// Build from `path?query`.
    pub fn from_href(href: &str) -> Self {
        match href.split_once('?') {
            Some((path, query)) => Self::new(path, query),
            None => Self::new(href, ""),
        }
    }

    /// Every write so far, oldest first, starting with the initial URL.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().log.clone()
    }

    /// Number of history entries that `back` can walk through.
    pub fn depth(&self) -> usize {
        self.lock().stack.len()
    }

    /// Go back one history entry. Returns false at the first entry.
    pub fn back(&self) -> bool {
        let mut history = self.lock();
        if history.stack.len() > 1 {
            history.stack.pop();
            true
        } else {
            false
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, action: HistoryAction, query: &str) {
        let query = strip(query).to_string();
        let mut history = self.lock();
        match action {
            HistoryAction::Push => history.stack.push(query.clone()),
            _ => {
                if let Some(top) = history.stack.last_mut() {
                    *top = query.clone();
                }
            }
        }
        history.log.push(HistoryEntry { action, query });
    }
}

impl Location for MemoryLocation {
    fn path(&self) -> String {
        self.path.clone()
    }

    fn query_string(&self) -> String {
        self.lock().stack.last().cloned().unwrap_or_default()
    }

    fn replace(&self, query: &str) {
        self.record(HistoryAction::Replace, query);
    }

    fn push(&self, query: &str) {
        self.record(HistoryAction::Push, query);
    }
}

fn strip(query: &str) -> &str {
    query.strip_prefix('?').unwrap_or(query)
}
