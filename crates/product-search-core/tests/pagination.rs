//! End-to-end paging behaviour of `PagingSearchService` over the in-memory
//! backend, plus failure handling with misbehaving backends.

use async_trait::async_trait;
use product_search_core::backend::memory::InMemoryBackend;
use product_search_core::backend::{
    BulkItem, BulkOutcome, Hit, SearchBackend, SearchHits, SearchQuery,
};
use product_search_core::models::Product;
use product_search_core::{Error, Page, PagingSearchService, Result, SearchOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const INDEX: &str = "my_index";

fn create_products(count: usize) -> Vec<Product> {
    (0..count).map(Product::sample).collect()
}

async fn service_with(
    count: usize,
    page_size: usize,
) -> PagingSearchService<Arc<InMemoryBackend>, Product> {
    let backend = Arc::new(InMemoryBackend::new());
    let service = PagingSearchService::new(
        backend,
        SearchOptions::new(INDEX).with_page_size(page_size),
    );
    service.save_all(create_products(count)).await.unwrap();
    service.refresh().await.unwrap();
    service
}

fn ids(page: &Page<Product>) -> Vec<String> {
    page.iter().map(|p| p.id.clone().unwrap()).collect()
}

fn id_range(range: std::ops::Range<usize>) -> Vec<String> {
    range.map(|i| i.to_string()).collect()
}

/// Walk `query` to exhaustion, returning every page including the final
/// empty one.
async fn walk(
    service: &PagingSearchService<Arc<InMemoryBackend>, Product>,
    query: &str,
) -> Vec<Page<Product>> {
    let mut pages = vec![service.search(query).await.unwrap()];
    while !pages.last().unwrap().is_empty() {
        let next = service.next(pages.last().unwrap()).await.unwrap();
        pages.push(next);
    }
    pages
}

// ─── Scenarios ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_pagination_over_21_products() {
    let service = service_with(21, 10).await;

    let first = service.search("name").await.unwrap();
    assert_eq!(ids(&first), id_range(0..10));

    let second = service.next(&first).await.unwrap();
    assert_eq!(ids(&second), id_range(10..20));

    let third = service.next(&second).await.unwrap();
    assert_eq!(ids(&third), vec!["20"]);

    let fourth = service.next(&third).await.unwrap();
    assert!(fourth.is_empty());
    assert_eq!(fourth, Page::empty());
}

#[tokio::test]
async fn test_no_match_returns_empty_page() {
    let service = service_with(5, 10).await;
    let page = service.search("nonexistent").await.unwrap();
    assert_eq!(page, Page::empty());
    assert_eq!(page.query(), None);
}

#[tokio::test]
async fn test_empty_index_returns_empty_page() {
    let service = service_with(0, 10).await;
    assert!(service.search("name").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_without_id_assigns_one() {
    let service = service_with(0, 10).await;
    let mut product = Product::sample(0);
    product.id = None;

    let saved = service.save(product).await.unwrap();
    let id = saved.id.clone().expect("id assigned");

    let found = service.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(found, saved);
}

#[tokio::test]
async fn test_save_with_id_keeps_it() {
    let service = service_with(0, 10).await;
    let saved = service.save(Product::sample(0)).await.unwrap();
    assert_eq!(saved.id.as_deref(), Some("0"));

    let found = service.find_by_id("0").await.unwrap().unwrap();
    assert_eq!(found.id.as_deref(), Some("0"));
}

#[tokio::test]
async fn test_find_by_id_after_batch() {
    let service = service_with(3, 10).await;
    for id in ["0", "1", "2"] {
        let product = service.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(product.id.as_deref(), Some(id));
    }
}

// ─── Properties ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_offset_advances_by_limit() {
    let service = service_with(23, 4).await;
    let pages = walk(&service, "product").await;
    for pair in pages.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.is_empty() {
            continue;
        }
        assert_eq!(
            next.offset().unwrap(),
            prev.offset().unwrap() + prev.limit().unwrap()
        );
        assert_eq!(next.limit(), prev.limit());
    }
}

#[tokio::test]
async fn test_page_counts_and_short_last_page() {
    for (n, s) in [(21usize, 10usize), (20, 10), (1, 10), (7, 3), (9, 3), (5, 1)] {
        let service = service_with(n, s).await;
        let pages = walk(&service, "name").await;

        let non_empty: Vec<&Page<Product>> = pages.iter().filter(|p| !p.is_empty()).collect();
        assert_eq!(non_empty.len(), n.div_ceil(s), "n={} s={}", n, s);
        assert!(pages.last().unwrap().is_empty());

        let expected_last = if n % s == 0 { s } else { n % s };
        let (last, rest) = non_empty.split_last().unwrap();
        assert_eq!(last.len(), expected_last, "n={} s={}", n, s);
        assert!(rest.iter().all(|p| p.len() == s));
    }
}

#[tokio::test]
async fn test_batch_ids_are_positional() {
    let service = service_with(0, 10).await;
    let batch: Vec<Product> = (0..5)
        .map(|i| {
            let mut p = Product::sample(i);
            if i % 2 == 0 {
                p.id = None;
            }
            p
        })
        .collect();

    let saved = service.save_all(batch).await.unwrap();
    for (i, product) in saved.iter().enumerate() {
        let id = product.id.as_deref().unwrap();
        if i % 2 == 1 {
            assert_eq!(id, i.to_string());
        }
        let stored = service.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.name, format!("Name of {} product", i));
    }
}

#[tokio::test]
async fn test_next_on_empty_page_fails() {
    let service = service_with(3, 10).await;
    let exhausted = service.search("nothing").await.unwrap();
    match service.next(&exhausted).await {
        Err(Error::InvalidState(_)) => {}
        other => panic!("expected InvalidState, got {:?}", other.map(|p| p.len())),
    }
}

#[tokio::test]
async fn test_next_near_usize_max_fails() {
    let service = service_with(3, 10).await;
    let page = Page::new(vec![Product::sample(1)], "name", usize::MAX - 1, 10);
    match service.next(&page).await {
        Err(Error::InvalidState(msg)) => assert!(msg.contains("overflows")),
        other => panic!("expected InvalidState, got {:?}", other.map(|p| p.len())),
    }
}

#[tokio::test]
async fn test_independent_walks_run_concurrently() {
    let service = Arc::new(service_with(30, 7).await);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let mut seen = Vec::new();
                let mut walk = service.pages("product");
                while let Some(page) = walk.next_page().await.unwrap() {
                    seen.extend(ids(page));
                }
                seen
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), id_range(0..30));
    }
}

// ─── Misbehaving backends ───────────────────────────────────────────

/// Fails every call as if the engine were unreachable.
struct DownBackend {
    calls: AtomicUsize,
}

impl DownBackend {
    fn fail(&self) -> Error {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Error::BackendUnavailable {
            message: "connection refused".to_string(),
            source: None,
        }
    }
}

#[async_trait]
impl SearchBackend for DownBackend {
    async fn get_by_id(&self, _index: &str, _id: &str) -> Result<Option<Hit>> {
        Err(self.fail())
    }

    async fn search(&self, _index: &str, _query: &SearchQuery<'_>) -> Result<SearchHits> {
        Err(self.fail())
    }

    async fn bulk_upsert(&self, _index: &str, _items: &[BulkItem]) -> Result<Vec<BulkOutcome>> {
        Err(self.fail())
    }
}

#[tokio::test]
async fn test_backend_failure_propagates_without_retry() {
    let backend = Arc::new(DownBackend {
        calls: AtomicUsize::new(0),
    });
    let service: PagingSearchService<_, Product> =
        PagingSearchService::new(Arc::clone(&backend), SearchOptions::new(INDEX));

    assert!(matches!(
        service.search("name").await,
        Err(Error::BackendUnavailable { .. })
    ));
    assert!(matches!(
        service.find_by_id("1").await,
        Err(Error::BackendUnavailable { .. })
    ));
    assert!(matches!(
        service.save(Product::sample(1)).await,
        Err(Error::BackendUnavailable { .. })
    ));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
}

/// Returns canned bulk outcomes regardless of input.
struct CannedBulk {
    outcomes: Vec<BulkOutcome>,
}

#[async_trait]
impl SearchBackend for CannedBulk {
    async fn get_by_id(&self, _index: &str, _id: &str) -> Result<Option<Hit>> {
        Ok(None)
    }

    async fn search(&self, _index: &str, _query: &SearchQuery<'_>) -> Result<SearchHits> {
        Ok(SearchHits::default())
    }

    async fn bulk_upsert(&self, _index: &str, _items: &[BulkItem]) -> Result<Vec<BulkOutcome>> {
        Ok(self.outcomes.clone())
    }
}

fn outcome(position: usize, id: &str, error: Option<&str>) -> BulkOutcome {
    BulkOutcome {
        position,
        id: id.to_string(),
        error: error.map(str::to_string),
    }
}

fn canned(outcomes: Vec<BulkOutcome>) -> PagingSearchService<CannedBulk, Product> {
    PagingSearchService::new(CannedBulk { outcomes }, SearchOptions::new(INDEX))
}

#[tokio::test]
async fn test_bulk_short_response_is_rejected() {
    let service = canned(vec![outcome(0, "a", None)]);
    let err = service.save_all(create_products(2)).await.unwrap_err();
    assert!(matches!(
        err,
        Error::BulkMismatch {
            expected: 2,
            actual: 1
        }
    ));
}

#[tokio::test]
async fn test_bulk_reordered_response_is_rejected() {
    let service = canned(vec![outcome(1, "b", None), outcome(0, "a", None)]);
    let err = service.save_all(create_products(2)).await.unwrap_err();
    assert!(matches!(
        err,
        Error::BulkOutOfOrder {
            position: 0,
            reported: 1
        }
    ));
}

#[tokio::test]
async fn test_bulk_swapped_ids_are_rejected() {
    // Positions line up but the echoed ids belong to the other slot.
    let service = canned(vec![outcome(0, "1", None), outcome(1, "0", None)]);
    let err = service.save_all(create_products(2)).await.unwrap_err();
    match err {
        Error::BulkIdMismatch {
            position,
            expected,
            reported,
        } => {
            assert_eq!(position, 0);
            assert_eq!(expected, "0");
            assert_eq!(reported, "1");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_bulk_generated_ids_are_accepted() {
    let service = canned(vec![outcome(0, "Xy12", None)]);
    let mut product = Product::sample(0);
    product.id = None;
    let saved = service.save(product).await.unwrap();
    assert_eq!(saved.id.as_deref(), Some("Xy12"));
}

#[tokio::test]
async fn test_bulk_item_failure_is_reported() {
    let service = canned(vec![
        outcome(0, "0", None),
        outcome(1, "1", Some("mapper_parsing_exception")),
    ]);
    let err = service.save_all(create_products(2)).await.unwrap_err();
    match err {
        Error::BulkItemFailed { position, reason } => {
            assert_eq!(position, 1);
            assert_eq!(reason, "mapper_parsing_exception");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_zero_total_hits_yields_empty_page() {
    let service = canned(Vec::new());
    assert_eq!(service.search("anything").await.unwrap(), Page::empty());
}
