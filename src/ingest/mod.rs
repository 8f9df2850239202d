// src/ingest/mod.rs
pub mod feed;
pub mod fetch;
pub mod types;

use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::cache::article_key;
use crate::context::AppContext;
use crate::ingest::types::{Article, IngestReport, SourceOutcome};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_runs_total", "Completed ingestion cycles.");
        describe_counter!(
            "ingest_articles_total",
            "Articles written to the cache across all cycles."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Source fetch/parse failures."
        );
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!(
            "ingest_last_run_ts",
            "Unix ts when an ingestion cycle last completed."
        );
    });
}

/// Run one ingestion cycle over every registered source: fetch -> parse
/// concurrently per source, then one batched write with the fixed TTL.
///
/// A cycle never fails as a whole. A dead feed contributes zero articles
/// and a warning; a failed cache write drops the whole batch for this
/// cycle (entries are re-derived from source data on the next one).
pub async fn run_cycle(ctx: &AppContext) -> IngestReport {
    ensure_metrics_described();

    let mut set = JoinSet::new();
    for source in ctx.sources.iter().cloned() {
        let feeds = ctx.feeds.clone();
        set.spawn(async move {
            let name = source.name.clone();
            let result = feeds
                .fetch(&source)
                .await
                .map(|body| feed::parse_or_empty(&body, &source.name));
            (name, result)
        });
    }

    let mut articles: Vec<Article> = Vec::new();
    let mut outcomes: Vec<SourceOutcome> = Vec::with_capacity(ctx.sources.len());
    while let Some(joined) = set.join_next().await {
        let (name, result) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = ?e, "ingest task aborted");
                counter!("ingest_source_errors_total").increment(1);
                continue;
            }
        };
        match result {
            Ok(batch) => {
                outcomes.push(SourceOutcome {
                    source: name,
                    articles: batch.len(),
                    error: None,
                });
                articles.extend(batch);
            }
            Err(e) => {
                warn!(error = ?e, source = %name, "source fetch failed");
                counter!("ingest_source_errors_total").increment(1);
                outcomes.push(SourceOutcome {
                    source: name,
                    articles: 0,
                    error: Some(format!("{e:#}")),
                });
            }
        }
    }

    let entries: Vec<(String, String, Duration)> = articles
        .iter()
        .filter_map(|a| {
            serde_json::to_string(a)
                .ok()
                .map(|value| (article_key(&a.id), value, ctx.article_ttl))
        })
        .collect();

    let ingested = match ctx.store.put_many(&entries).await {
        Ok(()) => entries.len(),
        Err(e) => {
            warn!(error = %e, "cache write failed, dropping this cycle's batch");
            0
        }
    };

    counter!("ingest_runs_total").increment(1);
    counter!("ingest_articles_total").increment(ingested as u64);
    gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
    info!(ingested, sources = outcomes.len(), "ingest cycle complete");

    IngestReport {
        ingested,
        sources: outcomes,
    }
}
