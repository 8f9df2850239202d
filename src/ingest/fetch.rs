// src/ingest/fetch.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ingest::types::FeedSource;

/// Retrieval seam for a source's raw feed document. The production client
/// talks HTTP; tests substitute canned documents or failures.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self, source: &FeedSource) -> Result<String>;
}

/// reqwest-backed client shared across all sources. Every request carries
/// the same bounded timeout; redirects are followed up to a fixed hop limit.
pub struct HttpFeedClient {
    client: reqwest::Client,
}

impl HttpFeedClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(concat!("news-aggregator/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch(&self, source: &FeedSource) -> Result<String> {
        let resp = self
            .client
            .get(&source.url)
            .send()
            .await
            .with_context(|| format!("feed http get() for {}", source.name))?;
        let resp = resp
            .error_for_status()
            .with_context(|| format!("feed http status for {}", source.name))?;
        resp.text()
            .await
            .with_context(|| format!("feed http .text() for {}", source.name))
    }
}
