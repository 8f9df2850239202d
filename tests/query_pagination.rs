// tests/query_pagination.rs
//
// Read-path slicing over the cache: limit is a hard cap, a far offset is an
// empty list (not an error), corrupt entries are skipped, and a store
// outage surfaces as an error distinct from "no results".

use std::time::Duration;

use news_aggregator::cache::{article_key, CacheError, CacheStore, MemoryStore};
use news_aggregator::ingest::types::Article;
use news_aggregator::query::list_articles;

fn article(n: usize) -> Article {
    Article {
        id: format!("story-{n:04}"),
        title: format!("Story {n}"),
        source: "Seeded".to_string(),
        published_at: "Mon, 03 Aug 2026 00:00:00 GMT".to_string(),
        url: format!("https://news.example/story/{n}"),
        summary: None,
    }
}

async fn seed(store: &MemoryStore, count: usize) {
    let ttl = Duration::from_secs(3600);
    let entries: Vec<(String, String, Duration)> = (0..count)
        .map(|n| {
            let a = article(n);
            (article_key(&a.id), serde_json::to_string(&a).unwrap(), ttl)
        })
        .collect();
    store.put_many(&entries).await.unwrap();
}

#[tokio::test]
async fn limit_is_never_exceeded() {
    let store = MemoryStore::new();
    seed(&store, 1000).await;

    let page = list_articles(&store, 10, 0).await.unwrap();
    assert_eq!(page.len(), 10);
}

#[tokio::test]
async fn offset_beyond_the_dataset_is_empty_not_an_error() {
    let store = MemoryStore::new();
    seed(&store, 5).await;

    let page = list_articles(&store, 10, 1000).await.unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn full_window_when_enough_entries_exist() {
    let store = MemoryStore::new();
    seed(&store, 25).await;

    assert_eq!(list_articles(&store, 50, 0).await.unwrap().len(), 25);
    assert_eq!(list_articles(&store, 10, 20).await.unwrap().len(), 5);
}

#[tokio::test]
async fn corrupt_entries_are_skipped_silently() {
    let store = MemoryStore::new();
    seed(&store, 3).await;
    store
        .put(&article_key("corrupt"), "{not json", Duration::from_secs(3600))
        .await
        .unwrap();

    let page = list_articles(&store, 50, 0).await.unwrap();
    assert_eq!(page.len(), 3);
    assert!(page.iter().all(|a| a.source == "Seeded"));
}

#[tokio::test]
async fn store_outage_is_an_error_not_an_empty_list() {
    let store = MemoryStore::new();
    seed(&store, 3).await;
    store.set_online(false);

    assert!(matches!(
        list_articles(&store, 50, 0).await,
        Err(CacheError::Unavailable(_))
    ));
}
