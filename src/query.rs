// src/query.rs
//! Read path: offset/limit pagination over the live `article:` keyspace.

use tracing::debug;

use crate::cache::{CacheError, CacheStore, ARTICLE_PREFIX};
use crate::ingest::types::Article;

pub const DEFAULT_LIMIT: usize = 50;

/// List cached articles. Enumeration order is store-defined; the window is
/// a client-side slice over the enumerated key set. Entries that expire
/// between enumeration and read are skipped without shifting the window,
/// so fewer than `limit` results does not by itself mean exhaustion.
pub async fn list_articles(
    store: &dyn CacheStore,
    limit: usize,
    offset: usize,
) -> Result<Vec<Article>, CacheError> {
    let keys = store.list_keys(ARTICLE_PREFIX).await?;
    let window: Vec<String> = keys.into_iter().skip(offset).take(limit).collect();
    if window.is_empty() {
        return Ok(Vec::new());
    }

    let values = store.get_many(&window).await?;
    let mut out = Vec::with_capacity(window.len());
    for (key, value) in window.iter().zip(values) {
        let Some(raw) = value else {
            // Expired between enumeration and read.
            continue;
        };
        match serde_json::from_str::<Article>(&raw) {
            Ok(article) => out.push(article),
            Err(e) => {
                debug!(key = %key, error = %e, "skipping malformed cache entry");
            }
        }
    }
    Ok(out)
}
