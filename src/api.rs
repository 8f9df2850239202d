use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::context::AppContext;
use crate::health::{self, HealthReport};
use crate::ingest::{
    self,
    types::{Article, SourceOutcome},
};
use crate::query::{self, DEFAULT_LIMIT};

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/news/articles", get(list_articles))
        .route("/api/v1/news/ingest", post(trigger_ingest))
        .layer(CorsLayer::very_permissive())
        .with_state(ctx)
}

#[derive(serde::Deserialize)]
struct ListParams {
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    offset: Option<usize>,
}

/// Read endpoint: a point-in-time slice of the cached articles. A store
/// outage is a 503, distinct from an empty result set.
async fn list_articles(
    State(ctx): State<AppContext>,
    Query(p): Query<ListParams>,
) -> Result<Json<Vec<Article>>, (StatusCode, Json<serde_json::Value>)> {
    let limit = p.limit.unwrap_or(DEFAULT_LIMIT);
    let offset = p.offset.unwrap_or(0);
    match query::list_articles(ctx.store.as_ref(), limit, offset).await {
        Ok(items) => Ok(Json(items)),
        Err(e) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": e.to_string() })),
        )),
    }
}

#[derive(serde::Serialize)]
struct IngestResponse {
    status: &'static str,
    ingested: usize,
    sources: Vec<SourceOutcome>,
}

/// Runs one full ingestion cycle synchronously and acknowledges with the
/// ingested count plus per-source outcomes.
async fn trigger_ingest(State(ctx): State<AppContext>) -> Json<IngestResponse> {
    let report = ingest::run_cycle(&ctx).await;
    Json(IngestResponse {
        status: "completed",
        ingested: report.ingested,
        sources: report.sources,
    })
}

async fn health_check(State(ctx): State<AppContext>) -> (StatusCode, Json<HealthReport>) {
    let report = health::check(ctx.store.as_ref()).await;
    let code = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(report))
}
