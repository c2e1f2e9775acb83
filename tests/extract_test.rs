mod common;

use std::sync::Arc;

use common::{APP_ID, BASE_URL, FakeTransport, document, page, url_for};
use playbadge::extract::{extract_payload, store_url};
use playbadge::{BadgeError, Caches, DocumentExtractor, PageFetcher};

fn extractor(transport: Arc<FakeTransport>) -> (DocumentExtractor, Arc<Caches>) {
    let caches = Arc::new(Caches::default());
    let fetcher = PageFetcher::new(Arc::clone(&caches), transport);
    (
        DocumentExtractor::new(Arc::clone(&caches), fetcher, BASE_URL),
        caches,
    )
}

#[tokio::test]
async fn parses_and_caches_document_by_app_id() {
    let doc = document(APP_ID);
    let transport = Arc::new(FakeTransport::new().page(url_for(APP_ID), page(&doc)));
    let (extractor, caches) = extractor(Arc::clone(&transport));

    let first = extractor.fetch_parsed(APP_ID).await.unwrap();
    let second = extractor.fetch_parsed(APP_ID).await.unwrap();

    assert_eq!(*first, doc);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(transport.calls(), 1);
    assert_eq!(caches.documents.keys(), vec![APP_ID.to_string()]);
}

#[tokio::test]
async fn document_hit_skips_page_tier() {
    let doc = document(APP_ID);
    let transport = Arc::new(FakeTransport::new().page(url_for(APP_ID), page(&doc)));
    let (extractor, caches) = extractor(Arc::clone(&transport));

    extractor.fetch_parsed(APP_ID).await.unwrap();
    let pages_before = caches.pages.keys();
    extractor.fetch_parsed(APP_ID).await.unwrap();

    assert_eq!(caches.pages.keys(), pages_before);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn missing_blob_is_not_cached() {
    let transport = Arc::new(
        FakeTransport::new().page(url_for(APP_ID), "<head></head><body>redesigned</body>"),
    );
    let (extractor, caches) = extractor(Arc::clone(&transport));

    for _ in 0..2 {
        let err = extractor.fetch_parsed(APP_ID).await.unwrap_err();
        assert!(matches!(err, BadgeError::Parse(_)));
    }
    assert!(caches.documents.is_empty());
    // The page itself is cached, so the retry parses without refetching.
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn fetch_failure_propagates_unavailable() {
    let transport = Arc::new(FakeTransport::new());
    let (extractor, caches) = extractor(Arc::clone(&transport));

    let err = extractor.fetch_parsed("no.such.app").await.unwrap_err();
    assert_eq!(err.to_string(), "app unavailable: 404 Not Found");
    assert!(caches.documents.is_empty());
    assert_eq!(caches.pages.len(), 1);
}

#[test]
fn last_matching_blob_wins() {
    let body = format!(
        "AF_initDataCallback({{data:[[\"{APP_ID}\"],1], sideChannel: {{}}}});</script>\
         AF_initDataCallback({{data:[[\"{APP_ID}\"],2], sideChannel: {{}}}});</script>"
    );
    let payload = extract_payload(&body, APP_ID).unwrap();
    assert_eq!(payload, format!("[[\"{APP_ID}\"],2]"));
}

#[test]
fn blob_without_data_key_is_skipped() {
    let body = format!(
        "AF_initDataCallback({{data:[[\"{APP_ID}\"],1], sideChannel: {{}}}});</script>\
         AF_initDataCallback({{key: [[\"{APP_ID}\"],2]}});</script>"
    );
    let payload = extract_payload(&body, APP_ID).unwrap();
    assert_eq!(payload, format!("[[\"{APP_ID}\"],1]"));
}

#[test]
fn store_url_appends_encoded_id() {
    assert_eq!(
        store_url(BASE_URL, APP_ID),
        "https://store.test/details?id=org.example.app"
    );
    assert_eq!(store_url(BASE_URL, "a&b"), "https://store.test/details?id=a%26b");
}
