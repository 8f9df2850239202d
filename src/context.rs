// src/context.rs
//! The one context object built at startup and handed to every component.
//! Nothing in the pipeline reaches for process-wide state.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheStore;
use crate::config::AppConfig;
use crate::ingest::fetch::{FeedClient, HttpFeedClient};
use crate::ingest::types::FeedSource;

#[derive(Clone)]
pub struct AppContext {
    pub sources: Arc<Vec<FeedSource>>,
    pub store: Arc<dyn CacheStore>,
    pub feeds: Arc<dyn FeedClient>,
    pub article_ttl: Duration,
}

impl AppContext {
    /// Wire the production context: HTTP feed client with the configured
    /// timeout, the given store, and the configured registry and TTL.
    pub fn new(cfg: &AppConfig, store: Arc<dyn CacheStore>) -> anyhow::Result<Self> {
        let feeds = HttpFeedClient::new(Duration::from_secs(cfg.fetch_timeout_secs))?;
        Ok(Self {
            sources: Arc::new(cfg.sources.clone()),
            store,
            feeds: Arc::new(feeds),
            article_ttl: Duration::from_secs(cfg.article_ttl_secs),
        })
    }

    /// Assemble a context from parts; the seam tests use to substitute
    /// stores and feed clients.
    pub fn with_parts(
        sources: Vec<FeedSource>,
        store: Arc<dyn CacheStore>,
        feeds: Arc<dyn FeedClient>,
        article_ttl: Duration,
    ) -> Self {
        Self {
            sources: Arc::new(sources),
            store,
            feeds,
            article_ttl,
        }
    }
}
