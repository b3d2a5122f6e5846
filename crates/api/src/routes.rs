use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use stockboard_core::domain::contract::SnapshotReport;
use stockboard_core::domain::model::Snapshot;
use stockboard_core::domain::recommendation::RecommendationScore;
use stockboard_core::engine::{RecommendOptions, RecommendationEngine, TrendingOptions};
use stockboard_core::error::EngineError;
use stockboard_core::source::SnapshotSource;

type ApiError = (StatusCode, String);
type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Clone)]
pub struct AppState {
    engine: Arc<RecommendationEngine>,
    source: Option<Arc<dyn SnapshotSource>>,
    // Swapped wholesale on reload; handlers clone the inner Arc and never
    // hold the lock while scoring.
    snapshot: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl AppState {
    pub fn new(
        engine: RecommendationEngine,
        source: Option<Arc<dyn SnapshotSource>>,
        snapshot: Option<Snapshot>,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            source,
            snapshot: Arc::new(RwLock::new(snapshot.map(Arc::new))),
        }
    }

    async fn current_snapshot(&self) -> Result<Arc<Snapshot>, ApiError> {
        self.snapshot.read().await.clone().ok_or((
            StatusCode::SERVICE_UNAVAILABLE,
            "snapshot not loaded".to_string(),
        ))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/users/:user_id/recommendations", get(get_recommendations))
        .route("/users/:user_id/instruments", get(get_instruments))
        .route("/items/:item_id/similar", get(get_similar_items))
        .route("/trending", get(get_trending))
        .route("/snapshot/reload", post(reload_snapshot))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

fn bad_request(err: EngineError) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn not_found(what: &str, id: &str) -> ApiError {
    (StatusCode::NOT_FOUND, format!("{what} not found: {id}"))
}

#[derive(Debug, Default, Deserialize)]
struct RecommendQuery {
    limit: Option<usize>,
    content_weight: Option<f64>,
    collaborative_weight: Option<f64>,
    normalize: Option<bool>,
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(q): Query<RecommendQuery>,
) -> ApiResult<Vec<RecommendationScore>> {
    let snapshot = state.current_snapshot().await?;
    let user = snapshot
        .user(&user_id)
        .ok_or_else(|| not_found("user", &user_id))?;

    let defaults = state.engine.recommend_options();
    let opts = RecommendOptions {
        content_weight: q.content_weight.unwrap_or(defaults.content_weight),
        collaborative_weight: q
            .collaborative_weight
            .unwrap_or(defaults.collaborative_weight),
        limit: q.limit.unwrap_or(defaults.limit),
        normalize_by_present_weight: q
            .normalize
            .unwrap_or(defaults.normalize_by_present_weight),
    };

    let recs = state
        .engine
        .recommend(user, &snapshot.users, &snapshot.items, &opts)
        .map_err(bad_request)?;
    Ok(Json(recs))
}

#[derive(Debug, Default, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

async fn get_similar_items(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Query(q): Query<LimitQuery>,
) -> ApiResult<Vec<RecommendationScore>> {
    let snapshot = state.current_snapshot().await?;
    let target = snapshot
        .item(&item_id)
        .ok_or_else(|| not_found("item", &item_id))?;

    let limit = q.limit.unwrap_or(state.engine.config().default_limit);
    Ok(Json(state.engine.recommend_similar_items(
        target,
        &snapshot.items,
        limit,
    )))
}

#[derive(Debug, Default, Deserialize)]
struct TrendingQuery {
    time_window_hours: Option<f64>,
    limit: Option<usize>,
}

async fn get_trending(
    State(state): State<AppState>,
    Query(q): Query<TrendingQuery>,
) -> ApiResult<Vec<RecommendationScore>> {
    let snapshot = state.current_snapshot().await?;
    let defaults = state.engine.trending_options();
    let opts = TrendingOptions {
        time_window_hours: q.time_window_hours.unwrap_or(defaults.time_window_hours),
        limit: q.limit.unwrap_or(defaults.limit),
    };

    let recs = state
        .engine
        .recommend_trending(&snapshot.items, &opts)
        .map_err(bad_request)?;
    Ok(Json(recs))
}

async fn get_instruments(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(q): Query<LimitQuery>,
) -> ApiResult<Vec<RecommendationScore>> {
    let snapshot = state.current_snapshot().await?;
    let user = snapshot
        .user(&user_id)
        .ok_or_else(|| not_found("user", &user_id))?;

    let limit = q.limit.unwrap_or(state.engine.config().default_limit);
    Ok(Json(state.engine.recommend_instruments(
        user,
        &snapshot.instruments,
        limit,
    )))
}

#[derive(Debug, Serialize)]
struct ReloadResponse {
    source: &'static str,
    users: usize,
    items: usize,
    instruments: usize,
    report: SnapshotReport,
}

async fn reload_snapshot(State(state): State<AppState>) -> ApiResult<ReloadResponse> {
    let Some(source) = &state.source else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "no snapshot source configured".to_string(),
        ));
    };

    let (snapshot, report) = source.load().await.map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %e, "snapshot reload failed; keeping previous snapshot");
        (StatusCode::BAD_GATEWAY, format!("{e:#}"))
    })?;

    let response = ReloadResponse {
        source: source.name(),
        users: snapshot.users.len(),
        items: snapshot.items.len(),
        instruments: snapshot.instruments.len(),
        report,
    };
    *state.snapshot.write().await = Some(Arc::new(snapshot));

    Ok(Json(response))
}
