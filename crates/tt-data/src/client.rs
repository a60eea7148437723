//! HTTP fetch client for the equipment API.

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tt_catalog::{EquipmentId, EquipmentItem, EquipmentType, PageResult};
use tt_observability::FetchTimer;
use url::Url;

use crate::error::FetchError;
use crate::retry::FetchPolicy;
use crate::source::PageOutcome;

/// Backend address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Body the API sends alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Fetch client for listing pages and single items.
///
/// Every request is timed and reported through `FetchMetrics`. Timeouts and
/// retries only apply when the policy asks for them.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    base_url: Url,
    policy: FetchPolicy,
}

impl FetchClient {
    /// Create a client for the API at `base_url` with the default policy.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_policy(base_url, FetchPolicy::default())
    }

    /// Create a client with an explicit policy.
    pub fn with_policy(base_url: &str, policy: FetchPolicy) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(connect) = policy.timeout.connect {
            builder = builder.connect_timeout(connect);
        }
        let http = builder.build().map_err(|source| FetchError::Transport {
            url: base_url.to_string(),
            source,
        })?;

        Ok(Self {
            http,
            base_url,
            policy,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// URL of one listing page: `{base}/{type}?page={n}[&name={query}]`.
    pub fn page_url(
        &self,
        equipment: EquipmentType,
        page: u32,
        query: Option<&str>,
    ) -> Result<Url, FetchError> {
        if page == 0 {
            return Err(FetchError::InvalidPage(page));
        }

        let mut url = self.endpoint(&[equipment.as_path()])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &page.to_string());
            if let Some(query) = query.filter(|q| !q.is_empty()) {
                pairs.append_pair("name", query);
            }
        }
        Ok(url)
    }

    /// URL of one item: `{base}/{type}/{id}`.
    pub fn item_url(&self, equipment: EquipmentType, id: &EquipmentId) -> Result<Url, FetchError> {
        self.endpoint(&[equipment.as_path(), id.as_str()])
    }

    /// Fetch one listing page. A 404 is the end of pagination, not an error.
    pub async fn fetch_page(
        &self,
        equipment: EquipmentType,
        page: u32,
        query: Option<&str>,
    ) -> Result<PageOutcome, FetchError> {
        let url = self.page_url(equipment, page, query)?;
        tracing::debug!(equipment = %equipment, page, query = query.unwrap_or(""), "fetching page");

        Ok(match self.get_json::<PageResult>("page", url).await? {
            Some(page) => PageOutcome::Page(page),
            None => PageOutcome::EndOfPagination,
        })
    }

    /// Fetch one item by id. Returns `None` when the API answers 404.
    pub async fn fetch_item(
        &self,
        equipment: EquipmentType,
        id: &EquipmentId,
    ) -> Result<Option<EquipmentItem>, FetchError> {
        let url = self.item_url(equipment, id)?;
        self.get_json("item", url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON document, retrying per policy. `None` means 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        tag: &str,
        url: Url,
    ) -> Result<Option<T>, FetchError> {
        let mut timer = FetchTimer::start(tag, url.as_str());
        let mut attempt = 0;

        loop {
            timer.attempt();
            match self.send_once(&url).await {
                Ok((status, value)) => {
                    timer.succeed(status).emit();
                    return Ok(value);
                }
                Err(e) if self.policy.retry.should_retry(&e, attempt) => {
                    let delay = self.policy.retry.backoff.delay_for_attempt(attempt);
                    tracing::debug!(url = %url, attempt, ?delay, error = %e, "retrying fetch");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    timer.fail(e.status(), &e).emit();
                    return Err(e);
                }
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(&self, url: &Url) -> Result<(u16, Option<T>), FetchError> {
        let mut request = self.http.get(url.clone()).header(ACCEPT, "application/json");
        if let Some(total) = self.policy.timeout.total {
            request = request.timeout(total);
        }

        let response = request.send().await.map_err(|e| self.transport_error(url, e))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok((status.as_u16(), None));
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(url, e))?;
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
                message: error_message(&body),
            });
        }

        let value = serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })?;
        Ok((status.as_u16(), Some(value)))
    }

    fn transport_error(&self, url: &Url, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                after: self.policy.timeout.total.unwrap_or_default(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}

fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::retry::{BackoffStrategy, RetryPolicy};
    use crate::timeout::TimeoutConfig;

    type Routes = Arc<Mutex<Vec<(String, u16, String)>>>;

    /// Minimal HTTP/1.1 responder. Each route is `(request target, status,
    /// body)`; a route is consumed when a later route has the same target,
    /// so queued responses play back in order. Unknown targets get 404.
    pub(crate) async fn serve(routes: Vec<(&str, u16, &str)>) -> (String, Arc<Mutex<Vec<String>>>) {
        let routes: Routes = Arc::new(Mutex::new(
            routes
                .into_iter()
                .map(|(t, s, b)| (t.to_string(), s, b.to_string()))
                .collect(),
        ));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let seen_by_server = seen.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let routes = routes.clone();
                let seen = seen_by_server.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    loop {
                        let n = socket.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    let request = String::from_utf8_lossy(&buf).to_string();
                    let target = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                    seen.lock().unwrap().push(target.clone());

                    let (status, body) = {
                        let mut routes = routes.lock().unwrap();
                        let matching: Vec<usize> = routes
                            .iter()
                            .enumerate()
                            .filter(|(_, r)| r.0 == target)
                            .map(|(i, _)| i)
                            .collect();
                        match matching.as_slice() {
                            [] => (404, String::new()),
                            [only] => (routes[*only].1, routes[*only].2.clone()),
                            [first, ..] => {
                                let (_, status, body) = routes.remove(*first);
                                (status, body)
                            }
                        }
                    };

                    let response = format!(
                        "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{}", addr), seen)
    }

    const PAGE_ONE: &str = r#"{
        "items": [
            {"_id": "r1", "name": "Tenergy 05", "all_time_low_price": "45.99",
             "entries": [{"url": "https://shop.example/t05", "price": "$49.99", "last_updated": "2024-03-01T10:00:00Z"}]},
            {"_id": "r2", "name": "Dignics 09C", "all_time_low_price": "59.90"}
        ],
        "next": "2"
    }"#;

    #[test]
    fn test_page_url() {
        let client = FetchClient::new("http://localhost:5000").unwrap();
        let url = client.page_url(EquipmentType::Rubbers, 2, None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/rubbers?page=2");

        let url = client
            .page_url(EquipmentType::Blades, 1, Some("viscaria & co"))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/blades?page=1&name=viscaria+%26+co");
    }

    #[test]
    fn test_page_url_keeps_base_path() {
        let client = FetchClient::new("http://localhost:5000/api/").unwrap();
        let url = client.page_url(EquipmentType::Rubbers, 3, Some("")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/rubbers?page=3");
    }

    #[test]
    fn test_item_url_escapes_id() {
        let client = FetchClient::new("http://localhost:5000").unwrap();
        let url = client
            .item_url(EquipmentType::Blades, &EquipmentId::new("a/b"))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/blades/a%2Fb");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            FetchClient::new("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            FetchClient::new("mailto:someone@example.com"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_page_success() {
        let (base, seen) = serve(vec![("/rubbers?page=1&name=tenergy", 200, PAGE_ONE)]).await;
        let client = FetchClient::new(&base).unwrap();

        let outcome = client
            .fetch_page(EquipmentType::Rubbers, 1, Some("tenergy"))
            .await
            .unwrap();

        let PageOutcome::Page(page) = outcome else {
            panic!("expected a page");
        };
        assert_eq!(page.len(), 2);
        assert_eq!(page.items[0].name, "Tenergy 05");
        assert!(!page.is_last());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_page_404_is_end_of_pagination() {
        let (base, _) = serve(vec![]).await;
        let client = FetchClient::new(&base).unwrap();

        let outcome = client.fetch_page(EquipmentType::Blades, 7, None).await.unwrap();
        assert_eq!(outcome, PageOutcome::EndOfPagination);
    }

    #[tokio::test]
    async fn test_page_zero_is_rejected_before_any_request() {
        let (base, seen) = serve(vec![]).await;
        let client = FetchClient::new(&base).unwrap();

        let err = client.fetch_page(EquipmentType::Rubbers, 0, None).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidPage(0)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_carries_message() {
        let (base, _) = serve(vec![("/rubbers?page=1", 500, r#"{"error": "database offline"}"#)]).await;
        let client = FetchClient::new(&base).unwrap();

        let err = client.fetch_page(EquipmentType::Rubbers, 1, None).await.unwrap_err();
        match err {
            FetchError::Http { status, message, .. } => {
                assert_eq!(status, 500);
                assert_eq!(message.as_deref(), Some("database offline"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let (base, _) = serve(vec![("/rubbers?page=1", 200, "<html>")]).await;
        let client = FetchClient::new(&base).unwrap();

        let err = client.fetch_page(EquipmentType::Rubbers, 1, None).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let (base, seen) = serve(vec![
            ("/rubbers?page=1", 503, ""),
            ("/rubbers?page=1", 200, PAGE_ONE),
        ])
        .await;
        let client = FetchClient::new(&base).unwrap();

        let err = client.fetch_page(EquipmentType::Rubbers, 1, None).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_policy_recovers_from_server_error() {
        let (base, seen) = serve(vec![
            ("/rubbers?page=1", 503, ""),
            ("/rubbers?page=1", 200, PAGE_ONE),
        ])
        .await;
        let policy = FetchPolicy::default()
            .with_retry(RetryPolicy::new(2).with_backoff(BackoffStrategy::None))
            .with_timeout(TimeoutConfig::from_total(Duration::from_secs(5)));
        let client = FetchClient::with_policy(&base, policy).unwrap();

        let outcome = client.fetch_page(EquipmentType::Rubbers, 1, None).await.unwrap();
        assert!(matches!(outcome, PageOutcome::Page(_)));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_item() {
        let (base, _) = serve(vec![(
            "/blades/b1",
            200,
            r#"{"_id": "b1", "name": "Viscaria", "all_time_low_price": "120", "entries": []}"#,
        )])
        .await;
        let client = FetchClient::new(&base).unwrap();

        let item = client
            .fetch_item(EquipmentType::Blades, &EquipmentId::new("b1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.name, "Viscaria");

        let missing = client
            .fetch_item(EquipmentType::Blades, &EquipmentId::new("nope"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = FetchClient::new(&format!("http://{}", addr)).unwrap();
        let err = client.fetch_page(EquipmentType::Rubbers, 1, None).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(err.is_retryable());
    }
}
