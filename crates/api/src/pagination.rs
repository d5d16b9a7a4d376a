use crate::envelope::Envelope;
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt, TryStreamExt};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::pin::Pin;
use tracing::debug;

/// One page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page: Option<String>,
    pub previous_page: Option<String>,
    pub count: Option<u64>,
}

impl<T: DeserializeOwned> Page<T> {
    pub fn from_envelope(envelope: &Envelope, key: &str) -> Result<Self> {
        Ok(Self {
            items: envelope.collection(key)?,
            next_page: envelope.next_page().map(str::to_string),
            previous_page: envelope.previous_page().map(str::to_string),
            count: envelope.count(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageTarget {
    /// First page: path plus encoded list options.
    Start { path: String, query: String },
    /// A `next_page` cursor exactly as the server returned it.
    Cursor(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub method: Method,
    /// Envelope key holding the page items.
    pub key: &'static str,
    pub target: PageTarget,
}

#[async_trait]
pub trait PageSource<T>: Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<T>>;
}

/// Lazy walk over a list endpoint.
///
/// Nothing is fetched until the stream returned by [`Paginator::pages`] or
/// [`Paginator::items`] is polled, and each further page is requested only
/// once the previous one has been handed out. The walk ends after a page
/// without `next_page` (or without items) and stops at the first error.
/// Every call to `pages`/`items` starts over from the first page.
pub struct Paginator<'a, T, S: ?Sized = crate::ApiClient> {
    source: &'a S,
    start: PageRequest,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T, S: ?Sized> Paginator<'a, T, S> {
    pub fn new(source: &'a S, start: PageRequest) -> Self {
        Self {
            source,
            start,
            _marker: PhantomData,
        }
    }

    pub fn start(&self) -> &PageRequest {
        &self.start
    }
}

impl<'a, T, S> Paginator<'a, T, S>
where
    T: Send + 'a,
    S: PageSource<T> + ?Sized,
{
    pub fn pages(&self) -> Pin<Box<dyn Stream<Item = Result<Page<T>>> + Send + 'a>> {
        let source = self.source;
        let mut request = self.start.clone();

        Box::pin(async_stream::stream! {
            let mut fetched = 0usize;
            loop {
                fetched += 1;
                debug!(page = fetched, key = request.key, "Fetching page");

                let page = match source.fetch_page(&request).await {
                    Ok(page) => page,
                    Err(err) => {
                        yield Err(err);
                        break;
                    }
                };

                let next = match page.next_page.as_deref() {
                    Some(_) if page.items.is_empty() => None,
                    Some(cursor) if matches!(&request.target, PageTarget::Cursor(current) if current == cursor) => {
                        Some(Err(ApiError::Protocol(format!(
                            "next_page `{cursor}` repeats the page just fetched"
                        ))))
                    }
                    Some(cursor) => Some(Ok(cursor.to_string())),
                    None => None,
                };

                yield Ok(page);

                match next {
                    Some(Ok(cursor)) => request.target = PageTarget::Cursor(cursor),
                    Some(Err(err)) => {
                        yield Err(err);
                        break;
                    }
                    None => {
                        debug!(pages = fetched, "Finished pagination");
                        break;
                    }
                }
            }
        })
    }

    /// Items of every page, flattened, in server order.
    pub fn items(&self) -> Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>> {
        let mut pages = self.pages();

        Box::pin(async_stream::stream! {
            while let Some(page) = pages.next().await {
                match page {
                    Ok(page) => {
                        for item in page.items {
                            yield Ok(item);
                        }
                    }
                    Err(err) => {
                        yield Err(err);
                        break;
                    }
                }
            }
        })
    }

    pub async fn first_page(&self) -> Result<Page<T>> {
        self.pages()
            .next()
            .await
            .unwrap_or_else(|| Err(ApiError::Protocol("list returned no page".into())))
    }

    pub async fn collect_all(&self) -> Result<Vec<T>> {
        self.items().try_collect().await
    }

    /// At most `limit` items; pages past the one holding the last item are not fetched.
    pub async fn collect_limit(&self, limit: usize) -> Result<Vec<T>> {
        self.items().take(limit).try_collect().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves `pages` in order; `None` answers with a 503.
    struct FakeSource {
        pages: Vec<Option<Page<u32>>>,
        requests: Mutex<Vec<PageTarget>>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(pages: Vec<Option<Page<u32>>>) -> Self {
            Self {
                pages,
                requests: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageSource<u32> for FakeSource {
        async fn fetch_page(&self, request: &PageRequest) -> Result<Page<u32>> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.target.clone());
            match self.pages.get(index) {
                Some(Some(page)) => Ok(page.clone()),
                Some(None) => Err(ApiError::Server {
                    status: 503,
                    message: "unavailable".into(),
                }),
                None => panic!("requested page {} that does not exist", index + 1),
            }
        }
    }

    fn page(range: std::ops::Range<u32>, next: Option<&str>) -> Option<Page<u32>> {
        Some(Page {
            items: range.collect(),
            next_page: next.map(str::to_string),
            previous_page: None,
            count: None,
        })
    }

    fn start() -> PageRequest {
        PageRequest {
            method: Method::GET,
            key: "numbers",
            target: PageTarget::Start {
                path: "/api/v2/numbers.json".into(),
                query: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn test_walks_all_pages_in_order() {
        let source = FakeSource::new(vec![page(0..25, Some("X")), page(25..35, None)]);
        let paginator: Paginator<'_, u32, FakeSource> = Paginator::new(&source, start());

        let items = paginator.collect_all().await.unwrap();

        assert_eq!(items, (0..35).collect::<Vec<_>>());
        assert_eq!(source.calls(), 2);
        let requests = source.requests.lock().unwrap();
        assert_eq!(requests[1], PageTarget::Cursor("X".into()));
    }

    #[tokio::test]
    async fn test_nothing_fetched_until_polled() {
        let source = FakeSource::new(vec![page(0..3, Some("X")), page(3..6, None)]);
        let paginator: Paginator<'_, u32, FakeSource> = Paginator::new(&source, start());

        let mut items = paginator.items();
        assert_eq!(source.calls(), 0);

        assert_eq!(items.next().await.unwrap().unwrap(), 0);
        drop(items);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_collect_limit_stops_early() {
        let source = FakeSource::new(vec![
            page(0..5, Some("X")),
            page(5..10, Some("Y")),
            page(10..15, None),
        ]);
        let paginator: Paginator<'_, u32, FakeSource> = Paginator::new(&source, start());

        let items = paginator.collect_limit(7).await.unwrap();

        assert_eq!(items, (0..7).collect::<Vec<_>>());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_error_is_surfaced_after_earlier_items() {
        let source = FakeSource::new(vec![page(0..2, Some("X")), None]);
        let paginator: Paginator<'_, u32, FakeSource> = Paginator::new(&source, start());

        let results: Vec<Result<u32>> = paginator.items().collect().await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), &0);
        assert_eq!(results[1].as_ref().unwrap(), &1);
        assert!(matches!(results[2], Err(ApiError::Server { status: 503, .. })));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_page_ends_walk_even_with_cursor() {
        let source = FakeSource::new(vec![page(0..0, Some("X"))]);
        let paginator: Paginator<'_, u32, FakeSource> = Paginator::new(&source, start());

        assert!(paginator.collect_all().await.unwrap().is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_repeated_cursor_is_protocol_error() {
        let source = FakeSource::new(vec![page(0..1, Some("X")), page(1..2, Some("X"))]);
        let paginator: Paginator<'_, u32, FakeSource> = Paginator::new(&source, start());

        let err = paginator.collect_all().await.unwrap_err();

        assert!(matches!(err, ApiError::Protocol(msg) if msg.contains("repeats")));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_restart_begins_at_first_page() {
        let source = FakeSource::new(vec![page(0..2, None), page(0..2, None)]);
        let paginator: Paginator<'_, u32, FakeSource> = Paginator::new(&source, start());

        assert_eq!(paginator.first_page().await.unwrap().items, vec![0, 1]);
        assert_eq!(paginator.collect_all().await.unwrap(), vec![0, 1]);

        let requests = source.requests.lock().unwrap();
        assert!(requests
            .iter()
            .all(|target| matches!(target, PageTarget::Start { .. })));
    }

    #[test]
    fn test_page_from_envelope() {
        let envelope = Envelope::from_slice(
            br#"{"numbers": [1, 2], "next_page": "https://acme.zendesk.com/api/v2/numbers.json?page=2", "count": 4}"#,
        )
        .unwrap();
        let page: Page<u32> = Page::from_envelope(&envelope, "numbers").unwrap();
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.count, Some(4));
        assert!(page.next_page.is_some());

        let missing: Result<Page<u32>> = Page::from_envelope(&envelope, "tickets");
        assert!(matches!(missing, Err(ApiError::Protocol(_))));
    }
}
