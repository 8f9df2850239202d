// src/ingest/types.rs
use serde::{Deserialize, Serialize};

/// Canonical article record, immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub id: String,           // native feed-entry id, else canonical link
    pub title: String,        // "Untitled" when absent upstream
    pub source: String,       // configured source name, not the URI
    pub published_at: String, // opaque, stored as received
    pub url: String,
    pub summary: Option<String>,
}

/// A configured syndication endpoint. Loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// What a single source contributed to one cycle.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub source: String,
    pub articles: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one complete ingestion cycle. A cycle always yields a report;
/// per-source failures land here and in logs, never as an error to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub ingested: usize,
    pub sources: Vec<SourceOutcome>,
}
