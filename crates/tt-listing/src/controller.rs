//! The pagination controller.
//!
//! A controller owns one listing. It re-reads `{page, query}` from its
//! [`Location`] whenever a replay starts, fetches pages `1..=page` strictly one
//! after another, and commits the collected items in one step once the
//! sequence ends.
//!
//! Every reset bumps a generation counter. Replays and `load_more` calls
//! remember the generation they started under; if it has moved on by the
//! time their fetch returns, they report `Superseded` and leave the state
//! alone. A superseded replay issues no further requests.
//!
//! State sits behind a `std::sync::Mutex` that is never held across an
//! `.await`, so overlapping calls on one controller are fine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tt_cache::{PageCache, PageKey};
use tt_catalog::EquipmentType;
use tt_data::{FetchError, PageOutcome, PageSource};

use crate::codec::{decode, encode, ParamsPatch};
use crate::location::Location;
use crate::state::{ListingState, Phase};

/// Summary of a completed replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Highest page loaded.
    pub pages_loaded: u32,
    /// Items committed.
    pub items: usize,
    /// Whether the sequence ended on an exhaustion signal.
    pub exhausted: bool,
}

/// Result of a replay request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replay {
    Completed(ReplayOutcome),
    /// A newer reset started while this replay was in flight.
    Superseded,
    /// The location changed without changing the search term.
    Unchanged,
}

/// Result of `load_more`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// Nothing fetched: no more pages, or a load is already running.
    Skipped,
    /// A page was appended.
    Appended { page: u32, count: usize },
    /// The next page does not exist.
    Exhausted,
    /// A newer reset started while the page was in flight.
    Superseded,
}

#[derive(Debug)]
struct Inner {
    state: ListingState,
    phase: Phase,
    generation: u64,
    mounted: bool,
}

/// Keeps a listing in step with the URL.
pub struct PaginationController<S, L> {
    source: S,
    location: L,
    cache: Option<Arc<dyn PageCache>>,
    inner: Mutex<Inner>,
}

impl<S: PageSource, L: Location> PaginationController<S, L> {
    pub fn new(equipment: EquipmentType, source: S, location: L) -> Self {
        Self {
            source,
            location,
            cache: None,
            inner: Mutex::new(Inner {
                state: ListingState::new(equipment),
                phase: Phase::Idle,
                generation: 0,
                mounted: false,
            }),
        }
    }

    /// Serve pages from `cache` when it has them.
    pub fn with_cache(mut self, cache: Arc<dyn PageCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ListingState {
        self.lock().state.clone()
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// First load of the view.
    pub async fn mount(&self) -> Result<Replay, FetchError> {
        self.replay(None).await
    }

    /// React to a URL change. Only a new search term triggers a replay.
    pub async fn location_changed(&self) -> Result<Replay, FetchError> {
        let params = decode(&self.location.query_string());
        let unchanged = {
            let inner = self.lock();
            inner.mounted && inner.state.active_query == params.query
        };
        if unchanged {
            tracing::debug!(page = params.page, "location changed without a new query");
            return Ok(Replay::Unchanged);
        }
        self.replay(None).await
    }

    /// Switch category and start over.
    pub async fn set_equipment(&self, equipment: EquipmentType) -> Result<Replay, FetchError> {
        self.replay(Some(equipment)).await
    }

    /// Fetch `current_page + 1` and append it.
    ///
    /// The URL's `page` parameter is rewritten to the new page as the fetch
    /// starts. If the page turns out not to exist or the fetch fails, it is
    /// put back, unless something else has rewritten the URL meanwhile.
    pub async fn load_more(&self) -> Result<LoadMore, FetchError> {
        let (generation, equipment, query, page) = {
            let mut inner = self.lock();
            if matches!(inner.phase, Phase::Idle | Phase::Replaying)
                || !inner.state.has_more
                || inner.state.loading
            {
                tracing::debug!(phase = %inner.phase, has_more = inner.state.has_more, "load more skipped");
                return Ok(LoadMore::Skipped);
            }
            inner.state.loading = true;
            inner.phase = Phase::LoadingMore;
            (
                inner.generation,
                inner.state.equipment,
                inner.state.active_query.clone(),
                inner.state.current_page + 1,
            )
        };

        let written = encode(&self.location.query_string(), &ParamsPatch::page(page));
        self.location.replace(&written);

        let result = self.load_page(equipment, page, query.as_deref()).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::warn!(generation, current = inner.generation, page, "discarding superseded page");
            return Ok(LoadMore::Superseded);
        }
        inner.state.loading = false;

        match result {
            Ok(PageOutcome::Page(result)) => {
                let count = result.len();
                let exhausted = result.is_last();
                inner.state.items.extend(result.items);
                inner.state.current_page = page;
                inner.state.last_error = None;
                if exhausted {
                    inner.state.has_more = false;
                }
                inner.phase = inner.state.settled_phase();
                tracing::info!(
                    equipment = %equipment,
                    page,
                    count,
                    total = inner.state.items.len(),
                    has_more = inner.state.has_more,
                    "page appended"
                );
                Ok(LoadMore::Appended { page, count })
            }
            Ok(PageOutcome::EndOfPagination) => {
                inner.state.has_more = false;
                inner.phase = Phase::Exhausted;
                let loaded = inner.state.current_page;
                drop(inner);
                tracing::info!(equipment = %equipment, page, "no more pages");
                self.restore_page(&written, loaded);
                Ok(LoadMore::Exhausted)
            }
            Err(e) => {
                inner.state.last_error = Some(e.to_string());
                inner.phase = inner.state.settled_phase();
                let loaded = inner.state.current_page;
                drop(inner);
                tracing::warn!(equipment = %equipment, page, error = %e, "load more failed");
                self.restore_page(&written, loaded);
                Err(e)
            }
        }
    }

    /// Reset and fetch pages `1..=page` from the URL, one at a time.
    async fn replay(&self, equipment: Option<EquipmentType>) -> Result<Replay, FetchError> {
        let params = decode(&self.location.query_string());
        let (generation, equipment) = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.mounted = true;
            if let Some(equipment) = equipment {
                inner.state.equipment = equipment;
            }
            inner.state.reset(params.query.clone());
            inner.phase = Phase::Replaying;
            (inner.generation, inner.state.equipment)
        };
        let query = params.query.as_deref();
        tracing::debug!(
            equipment = %equipment,
            target = params.page,
            query = query.unwrap_or(""),
            generation,
            "replay started"
        );

        let mut buffer = Vec::new();
        let mut pages_loaded = 0;
        let mut exhausted = false;
        let mut failure = None;

        for page in 1..=params.page {
            if !self.is_current(generation) {
                tracing::warn!(generation, page, "replay superseded before fetch");
                return Ok(Replay::Superseded);
            }
            match self.load_page(equipment, page, query).await {
                Ok(PageOutcome::Page(result)) => {
                    pages_loaded = page;
                    let last = result.is_last();
                    buffer.extend(result.items);
                    if last {
                        exhausted = true;
                        break;
                    }
                }
                Ok(PageOutcome::EndOfPagination) => {
                    exhausted = true;
                    break;
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::warn!(generation, current = inner.generation, "discarding superseded replay");
            return Ok(Replay::Superseded);
        }

        let items = buffer.len();
        inner.state.items = buffer;
        inner.state.current_page = pages_loaded;
        inner.state.loading = false;
        if exhausted {
            inner.state.has_more = false;
        }

        match failure {
            Some(e) => {
                inner.state.last_error = Some(e.to_string());
                inner.phase = inner.state.settled_phase();
                tracing::warn!(
                    equipment = %equipment,
                    page = pages_loaded + 1,
                    kept = items,
                    error = %e,
                    "replay failed"
                );
                Err(e)
            }
            None => {
                inner.phase = inner.state.settled_phase();
                tracing::info!(
                    equipment = %equipment,
                    pages = pages_loaded,
                    items,
                    exhausted,
                    generation,
                    "replay completed"
                );
                Ok(Replay::Completed(ReplayOutcome {
                    pages_loaded,
                    items,
                    exhausted,
                }))
            }
        }
    }

    /// One page, through the cache when there is one.
    async fn load_page(
        &self,
        equipment: EquipmentType,
        page: u32,
        query: Option<&str>,
    ) -> Result<PageOutcome, FetchError> {
        let key = PageKey::new(equipment, query, page);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).await {
                return Ok(PageOutcome::Page(hit));
            }
        }

        let outcome = self.source.fetch_page(equipment, page, query).await?;
        if let (Some(cache), PageOutcome::Page(result)) = (&self.cache, &outcome) {
            cache.put(key, result.clone()).await;
        }
        Ok(outcome)
    }

    /// Put `page` back to the last loaded page if the URL still shows what
    /// `load_more` wrote.
    fn restore_page(&self, written: &str, loaded: u32) {
        if self.location.query_string() == written {
            let restored = encode(written, &ParamsPatch::page(loaded.max(1)));
            self.location.replace(&restored);
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use tokio::sync::Notify;
    use tt_cache::{InMemoryPageCache, PageCachePolicy};
    use tt_catalog::{EquipmentItem, PageResult};

    use super::*;
    use crate::location::{HistoryAction, MemoryLocation};

    #[derive(Debug, Clone)]
    enum Reply {
        Page(PageResult),
        Fail(u16),
    }

    #[derive(Default)]
    struct Gate {
        entered: Notify,
        release: Notify,
    }

    type Key = (Option<String>, u32);

    /// Pages by `(query, page)`. Unscripted pages answer end-of-pagination.
    #[derive(Default)]
    struct ScriptedSource {
        replies: Mutex<HashMap<Key, Reply>>,
        gates: Mutex<HashMap<Key, Arc<Gate>>>,
        calls: Mutex<Vec<(EquipmentType, Option<String>, u32)>>,
    }

    impl ScriptedSource {
        fn with(self, query: Option<&str>, page: u32, reply: Reply) -> Self {
            self.reply(query, page, reply);
            self
        }

        fn reply(&self, query: Option<&str>, page: u32, reply: Reply) {
            self.replies
                .lock()
                .unwrap()
                .insert((query.map(str::to_string), page), reply);
        }

        /// Hold the fetch of `(query, page)` until the gate is released.
        fn gate(&self, query: Option<&str>, page: u32) -> Arc<Gate> {
            let gate = Arc::new(Gate::default());
            self.gates
                .lock()
                .unwrap()
                .insert((query.map(str::to_string), page), gate.clone());
            gate
        }

        fn pages_requested(&self) -> Vec<u32> {
            self.calls.lock().unwrap().iter().map(|c| c.2).collect()
        }

        fn calls(&self) -> Vec<(EquipmentType, Option<String>, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch_page(
            &self,
            equipment: EquipmentType,
            page: u32,
            query: Option<&str>,
        ) -> Result<PageOutcome, FetchError> {
            let key = (query.map(str::to_string), page);
            self.calls.lock().unwrap().push((equipment, key.0.clone(), page));

            let gate = self.gates.lock().unwrap().get(&key).cloned();
            if let Some(gate) = gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }

            let reply = self.replies.lock().unwrap().get(&key).cloned();
            match reply {
                Some(Reply::Page(result)) => Ok(PageOutcome::Page(result)),
                Some(Reply::Fail(status)) => Err(FetchError::Http {
                    status,
                    url: format!("/{}?page={}", equipment, page),
                    message: None,
                }),
                None => Ok(PageOutcome::EndOfPagination),
            }
        }
    }

    fn items(prefix: &str, count: usize) -> Vec<EquipmentItem> {
        (0..count)
            .map(|i| EquipmentItem::new(format!("{prefix}-{i}"), format!("{prefix} {i}"), "10"))
            .collect()
    }

    fn page(prefix: &str, count: usize, next: &str) -> Reply {
        Reply::Page(PageResult::new(items(prefix, count), next))
    }

    fn ids(state: &ListingState) -> Vec<String> {
        state.items.iter().map(|i| i.id.to_string()).collect()
    }

    fn controller(
        source: Arc<ScriptedSource>,
        query: &str,
    ) -> PaginationController<Arc<ScriptedSource>, MemoryLocation> {
        PaginationController::new(
            EquipmentType::Rubbers,
            source,
            MemoryLocation::new("/rubbers", query),
        )
    }

    #[tokio::test]
    async fn test_idle_before_mount() {
        let source = Arc::new(ScriptedSource::default().with(None, 1, page("p1", 3, "2")));
        let controller = controller(source.clone(), "");

        let state = controller.snapshot();
        assert_eq!(controller.phase(), Phase::Idle);
        assert!(!state.loading);
        assert!(state.has_more);
        assert_eq!(controller.load_more().await.unwrap(), LoadMore::Skipped);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_replay_concatenates_pages_in_order() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(None, 1, page("p1", 2, "2"))
                .with(None, 2, page("p2", 2, "3"))
                .with(None, 3, page("p3", 1, "4")),
        );
        let controller = controller(source.clone(), "page=3");

        let outcome = controller.mount().await.unwrap();
        assert_eq!(
            outcome,
            Replay::Completed(ReplayOutcome {
                pages_loaded: 3,
                items: 5,
                exhausted: false
            })
        );

        let state = controller.snapshot();
        assert_eq!(ids(&state), vec!["p1-0", "p1-1", "p2-0", "p2-1", "p3-0"]);
        assert_eq!(state.current_page, 3);
        assert!(state.has_more);
        assert!(!state.loading);
        assert_eq!(controller.phase(), Phase::Ready);
        assert_eq!(source.pages_requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_deep_link_past_last_page() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(None, 1, page("p1", 10, "2"))
                .with(None, 2, page("p2", 10, "3")),
        );
        let controller = controller(source.clone(), "?page=3");

        controller.mount().await.unwrap();

        let state = controller.snapshot();
        assert_eq!(state.len(), 20);
        assert!(!state.has_more);
        assert_eq!(state.current_page, 2);
        assert_eq!(controller.phase(), Phase::Exhausted);
    }

    #[tokio::test]
    async fn test_404_halts_replay() {
        let source = Arc::new(ScriptedSource::default().with(None, 1, page("p1", 4, "2")));
        let controller = controller(source.clone(), "page=5");

        let outcome = controller.mount().await.unwrap();

        assert_eq!(source.pages_requested(), vec![1, 2]);
        assert!(matches!(outcome, Replay::Completed(o) if o.exhausted && o.pages_loaded == 1));
        let state = controller.snapshot();
        assert_eq!(ids(&state), vec!["p1-0", "p1-1", "p1-2", "p1-3"]);
        assert!(!state.has_more);
    }

    #[tokio::test]
    async fn test_null_next_exhausts_even_with_items() {
        let source = Arc::new(ScriptedSource::default().with(None, 1, page("p1", 3, "null")));
        let controller = controller(source.clone(), "page=3");

        controller.mount().await.unwrap();

        let state = controller.snapshot();
        assert_eq!(state.len(), 3);
        assert_eq!(state.current_page, 1);
        assert!(!state.has_more);
        assert_eq!(source.pages_requested(), vec![1]);
    }

    #[tokio::test]
    async fn test_missing_next_is_not_exhaustion() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(None, 1, Reply::Page(serde_json::from_str(r#"{"items": []}"#).unwrap())),
        );
        let controller = controller(source, "");

        controller.mount().await.unwrap();
        assert!(controller.snapshot().has_more);
    }

    #[tokio::test]
    async fn test_replay_failure_keeps_buffered_pages() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(None, 1, page("p1", 2, "2"))
                .with(None, 2, Reply::Fail(500)),
        );
        let controller = controller(source.clone(), "page=3");

        let err = controller.mount().await.unwrap_err();
        assert_eq!(err.status(), Some(500));

        let state = controller.snapshot();
        assert_eq!(ids(&state), vec!["p1-0", "p1-1"]);
        assert_eq!(state.current_page, 1);
        assert!(state.has_more);
        assert!(!state.loading);
        assert!(state.last_error.is_some());
        assert_eq!(controller.phase(), Phase::Ready);
        assert_eq!(source.pages_requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_load_more_appends_next_page() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(None, 1, page("p1", 10, "2"))
                .with(None, 2, page("p2", 10, "3"))
                .with(None, 3, page("p3", 10, "4")),
        );
        let controller = controller(source.clone(), "page=2");
        controller.mount().await.unwrap();
        assert_eq!(controller.snapshot().current_page, 2);

        let outcome = controller.load_more().await.unwrap();

        assert_eq!(outcome, LoadMore::Appended { page: 3, count: 10 });
        let state = controller.snapshot();
        assert_eq!(state.len(), 30);
        assert_eq!(state.current_page, 3);
        assert!(state.has_more);
        assert_eq!(controller.location().query_string(), "page=3");

        let last = controller.location().entries().pop().unwrap();
        assert_eq!(last.action, HistoryAction::Replace);
        assert_eq!(controller.location().depth(), 1);
    }

    #[tokio::test]
    async fn test_load_more_keeps_other_params() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(Some("dhs"), 1, page("p1", 1, "2"))
                .with(Some("dhs"), 2, page("p2", 1, "3")),
        );
        let controller = controller(source, "sort=price&query=dhs");
        controller.mount().await.unwrap();

        controller.load_more().await.unwrap();
        assert_eq!(controller.location().query_string(), "sort=price&query=dhs&page=2");
    }

    #[tokio::test]
    async fn test_load_more_is_noop_when_exhausted() {
        let source = Arc::new(ScriptedSource::default().with(None, 1, page("p1", 2, "null")));
        let controller = controller(source.clone(), "");
        controller.mount().await.unwrap();

        assert_eq!(controller.load_more().await.unwrap(), LoadMore::Skipped);
        assert_eq!(source.pages_requested(), vec![1]);
    }

    #[tokio::test]
    async fn test_load_more_end_of_pagination() {
        let source = Arc::new(ScriptedSource::default().with(None, 1, page("p1", 5, "2")));
        let controller = controller(source.clone(), "page=1");
        controller.mount().await.unwrap();

        assert_eq!(controller.load_more().await.unwrap(), LoadMore::Exhausted);

        let state = controller.snapshot();
        assert_eq!(state.len(), 5);
        assert_eq!(state.current_page, 1);
        assert!(!state.has_more);
        assert_eq!(controller.phase(), Phase::Exhausted);
        assert_eq!(controller.location().query_string(), "page=1");
    }

    #[tokio::test]
    async fn test_load_more_failure_is_retryable() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(None, 1, page("p1", 2, "2"))
                .with(None, 2, Reply::Fail(503)),
        );
        let controller = controller(source.clone(), "");
        controller.mount().await.unwrap();

        assert!(controller.load_more().await.is_err());
        let state = controller.snapshot();
        assert_eq!(state.len(), 2);
        assert_eq!(state.current_page, 1);
        assert!(!state.loading);
        assert!(state.has_more);
        assert!(state.last_error.is_some());
        assert_eq!(controller.location().query_string(), "page=1");

        source.reply(None, 2, page("p2", 2, "3"));
        assert_eq!(
            controller.load_more().await.unwrap(),
            LoadMore::Appended { page: 2, count: 2 }
        );
        let state = controller.snapshot();
        assert_eq!(state.len(), 4);
        assert!(state.last_error.is_none());
    }

    #[tokio::test]
    async fn test_replay_failure_then_load_more_resumes() {
        let source = Arc::new(ScriptedSource::default().with(None, 1, Reply::Fail(502)));
        let controller = controller(source.clone(), "");
        assert!(controller.mount().await.is_err());
        assert_eq!(controller.snapshot().current_page, 0);

        source.reply(None, 1, page("p1", 3, "2"));
        assert_eq!(
            controller.load_more().await.unwrap(),
            LoadMore::Appended { page: 1, count: 3 }
        );
    }

    #[tokio::test]
    async fn test_concurrent_load_more_is_skipped() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(None, 1, page("p1", 2, "2"))
                .with(None, 2, page("p2", 2, "3")),
        );
        let gate = source.gate(None, 2);
        let controller = controller(source.clone(), "");
        controller.mount().await.unwrap();

        let (first, second) = tokio::join!(controller.load_more(), async {
            gate.entered.notified().await;
            assert!(controller.snapshot().loading);
            assert_eq!(controller.phase(), Phase::LoadingMore);
            let second = controller.load_more().await;
            gate.release.notify_one();
            second
        });

        assert_eq!(first.unwrap(), LoadMore::Appended { page: 2, count: 2 });
        assert_eq!(second.unwrap(), LoadMore::Skipped);
        assert_eq!(source.pages_requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_query_change_resets_items() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(Some("old"), 1, page("old", 3, "2"))
                .with(Some("new"), 1, page("new", 2, "2")),
        );
        let controller = controller(source.clone(), "query=old");
        controller.mount().await.unwrap();

        controller
            .location()
            .push(&encode(&controller.location().query_string(), &ParamsPatch::search("new")));
        let outcome = controller.location_changed().await.unwrap();

        assert!(matches!(outcome, Replay::Completed(_)));
        let state = controller.snapshot();
        assert_eq!(ids(&state), vec!["new-0", "new-1"]);
        assert_eq!(state.active_query.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_query_change_clears_items_before_first_new_page() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(Some("old"), 1, page("old", 3, "2"))
                .with(Some("new"), 1, page("new", 2, "2")),
        );
        let gate = source.gate(Some("new"), 1);
        let controller = controller(source.clone(), "query=old");
        controller.mount().await.unwrap();
        assert_eq!(controller.snapshot().len(), 3);

        controller.location().push("query=new");
        let (outcome, _) = tokio::join!(controller.location_changed(), async {
            gate.entered.notified().await;

            let state = controller.snapshot();
            assert!(state.items.is_empty());
            assert!(state.loading);
            assert!(state.has_more);
            assert_eq!(state.active_query.as_deref(), Some("new"));
            assert_eq!(controller.phase(), Phase::Replaying);

            gate.release.notify_one();
        });

        assert!(matches!(outcome.unwrap(), Replay::Completed(_)));
        let state = controller.snapshot();
        assert_eq!(ids(&state), vec!["new-0", "new-1"]);
        assert!(!state.loading);
        assert_eq!(controller.phase(), Phase::Ready);
    }

    #[tokio::test]
    async fn test_page_only_change_does_not_replay() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(None, 1, page("p1", 1, "2"))
                .with(None, 2, page("p2", 1, "3")),
        );
        let controller = controller(source.clone(), "page=1");
        controller.mount().await.unwrap();

        controller.location().replace("page=2");
        assert_eq!(controller.location_changed().await.unwrap(), Replay::Unchanged);
        assert_eq!(source.pages_requested(), vec![1]);
    }

    #[tokio::test]
    async fn test_back_navigation_replays_previous_query() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(Some("a"), 1, page("a", 1, "2"))
                .with(Some("b"), 1, page("b", 1, "2")),
        );
        let controller = controller(source.clone(), "query=a");
        controller.mount().await.unwrap();
        controller.location().push("query=b");
        controller.location_changed().await.unwrap();

        assert!(controller.location().back());
        controller.location_changed().await.unwrap();

        assert_eq!(ids(&controller.snapshot()), vec!["a-0"]);
    }

    #[tokio::test]
    async fn test_location_changed_before_mount_replays() {
        let source = Arc::new(ScriptedSource::default().with(None, 1, page("p1", 1, "2")));
        let controller = controller(source.clone(), "");

        let outcome = controller.location_changed().await.unwrap();
        assert!(matches!(outcome, Replay::Completed(_)));
        assert_eq!(source.pages_requested(), vec![1]);
    }

    #[tokio::test]
    async fn test_superseded_replay_is_discarded() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(Some("old"), 1, page("old", 5, "2"))
                .with(Some("old"), 2, page("old2", 5, "3"))
                .with(Some("new"), 1, page("new", 2, "null")),
        );
        let gate = source.gate(Some("old"), 1);
        let controller = controller(source.clone(), "page=2&query=old");

        let (first, second) = tokio::join!(controller.mount(), async {
            gate.entered.notified().await;
            controller.location().push("query=new");
            let second = controller.location_changed().await;
            gate.release.notify_one();
            second
        });

        assert_eq!(first.unwrap(), Replay::Superseded);
        assert!(matches!(second.unwrap(), Replay::Completed(_)));

        let state = controller.snapshot();
        assert_eq!(ids(&state), vec!["new-0", "new-1"]);
        assert_eq!(state.active_query.as_deref(), Some("new"));
        assert!(!state.has_more);
        assert_eq!(controller.generation(), 2);
        assert!(!source
            .calls()
            .iter()
            .any(|(_, query, page)| query.as_deref() == Some("old") && *page == 2));
    }

    #[tokio::test]
    async fn test_superseded_load_more_is_discarded() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(Some("old"), 1, page("old", 2, "2"))
                .with(Some("old"), 2, page("old2", 2, "3"))
                .with(Some("new"), 1, page("new", 1, "2")),
        );
        let gate = source.gate(Some("old"), 2);
        let controller = controller(source.clone(), "query=old");
        controller.mount().await.unwrap();

        let (first, second) = tokio::join!(controller.load_more(), async {
            gate.entered.notified().await;
            controller.location().push("query=new");
            let second = controller.location_changed().await;
            gate.release.notify_one();
            second
        });

        assert_eq!(first.unwrap(), LoadMore::Superseded);
        assert!(matches!(second.unwrap(), Replay::Completed(_)));
        let state = controller.snapshot();
        assert_eq!(ids(&state), vec!["new-0"]);
        assert_eq!(state.current_page, 1);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_set_equipment_replays_new_category() {
        let source = Arc::new(ScriptedSource::default().with(None, 1, page("p1", 2, "2")));
        let controller = controller(source.clone(), "");
        controller.mount().await.unwrap();

        controller.set_equipment(EquipmentType::Blades).await.unwrap();

        let state = controller.snapshot();
        assert_eq!(state.equipment, EquipmentType::Blades);
        assert_eq!(controller.generation(), 2);
        let calls = source.calls();
        assert_eq!(calls.last().unwrap().0, EquipmentType::Blades);
    }

    #[tokio::test]
    async fn test_cache_short_circuits_replay() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(None, 1, page("p1", 2, "2"))
                .with(None, 2, page("p2", 2, "3")),
        );
        let cache = Arc::new(InMemoryPageCache::new(PageCachePolicy::default()));
        let controller = controller(source.clone(), "page=2").with_cache(cache.clone());

        controller.mount().await.unwrap();
        let first = controller.snapshot();
        controller.mount().await.unwrap();
        let second = controller.snapshot();

        assert_eq!(first, second);
        assert_eq!(source.pages_requested(), vec![1, 2]);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_end_of_pagination_is_not_cached() {
        let source = Arc::new(ScriptedSource::default().with(None, 1, page("p1", 2, "2")));
        let cache = Arc::new(InMemoryPageCache::default());
        let controller = controller(source.clone(), "page=2").with_cache(cache.clone());

        controller.mount().await.unwrap();
        controller.mount().await.unwrap();

        assert_eq!(source.pages_requested(), vec![1, 2, 2]);
        assert_eq!(cache.len(), 1);
    }
}
