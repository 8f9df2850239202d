//! News Aggregator Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the cache store, the feed registry,
//! and the startup ingestion cycle.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_aggregator::cache::{CacheStore, MemoryStore, RedisStore};
use news_aggregator::config::AppConfig;
use news_aggregator::context::AppContext;
use news_aggregator::metrics::Metrics;
use news_aggregator::{api, ingest};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_aggregator=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env()?;
    info!(
        sources = cfg.sources.len(),
        ttl_secs = cfg.article_ttl_secs,
        "starting news aggregator"
    );

    let metrics = Metrics::init(cfg.article_ttl_secs);

    let store: Arc<dyn CacheStore> = match &cfg.redis_url {
        Some(url) => Arc::new(RedisStore::connect(url).await?),
        None => {
            warn!("REDIS_URL not set, falling back to in-process cache");
            Arc::new(MemoryStore::new())
        }
    };

    let ctx = AppContext::new(&cfg, store)?;

    // Startup ingestion cycle; later cycles run on demand via the API.
    let boot_ctx = ctx.clone();
    tokio::spawn(async move {
        let report = ingest::run_cycle(&boot_ctx).await;
        info!(ingested = report.ingested, "startup ingestion finished");
    });

    let app = api::router(ctx).merge(metrics.router());

    let addr = format!("{}:{}", cfg.host, cfg.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
