//! HTTP routes.
//!
//! - `GET|POST /feed`: next feed page as a [`FeedEnvelope`], always HTTP 200
//! - `GET /feed/schema`: JSON Schema of the envelope
//! - `GET /{taxonomy}/{slug}`: archive host page
//! - `GET /health`

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use feedline_core::cache::cache_key;
use feedline_core::feed::FEED_ACTION;
use feedline_core::{AppConfig, FeedEnvelope, FeedParams, FeedQuery};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::archive::{self, ArchivePage};
use crate::error::ServerError;
use crate::nonce::NonceVerifier;
use crate::provider::FeedProvider;

/// Header a client may use instead of the `_nonce` parameter.
pub const NONCE_HEADER: &str = "x-feed-nonce";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub provider: Arc<FeedProvider>,
    pub nonces: Arc<dyn NonceVerifier>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/feed", get(feed_get).post(feed_post))
        .route("/feed/schema", get(feed_schema))
        .route("/health", get(health))
        .route("/{taxonomy}/{slug}", get(archive_page))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn feed_get(
    State(state): State<AppState>, headers: HeaderMap, params: Result<Query<FeedParams>, QueryRejection>,
) -> Json<FeedEnvelope> {
    match params {
        Ok(Query(params)) => serve_feed(&state, &headers, &params).await,
        Err(e) => invalid_request(&e),
    }
}

async fn feed_post(
    State(state): State<AppState>, headers: HeaderMap, params: Result<Json<FeedParams>, JsonRejection>,
) -> Json<FeedEnvelope> {
    match params {
        Ok(Json(params)) => serve_feed(&state, &headers, &params).await,
        Err(e) => invalid_request(&e),
    }
}

/// Undecodable requests still get the envelope shape with HTTP 200.
fn invalid_request(rejection: &dyn std::fmt::Display) -> Json<FeedEnvelope> {
    tracing::warn!(error = %rejection, "rejected undecodable feed request");
    Json(FeedEnvelope::rejected(1, "invalid request"))
}

async fn serve_feed(state: &AppState, headers: &HeaderMap, params: &FeedParams) -> Json<FeedEnvelope> {
    let query = params.normalize(state.config.posts_per_page);

    if let Some(action) = params.action.as_deref()
        && action != FEED_ACTION
    {
        tracing::warn!(action, "unknown feed action");
        return Json(FeedEnvelope::rejected(query.page, "unknown action"));
    }

    let token = params
        .nonce
        .as_deref()
        .or_else(|| headers.get(NONCE_HEADER).and_then(|v| v.to_str().ok()))
        .unwrap_or_default();
    if !state.nonces.verify(FEED_ACTION, token) {
        tracing::warn!(page = query.page, "rejected feed request: invalid nonce");
        return Json(FeedEnvelope::rejected(query.page, "invalid nonce"));
    }

    match state.provider.page(&query).await {
        Ok(page) => Json(page),
        Err(e) => {
            tracing::error!(error = %e, code = e.code(), "feed page failed");
            Json(FeedEnvelope::rejected(query.page, e.code()))
        }
    }
}

async fn archive_page(
    State(state): State<AppState>, Path((taxonomy, slug)): Path<(String, String)>,
) -> Result<Html<String>, ServerError> {
    let store = state.provider.store();
    if !store.taxonomy_exists(&taxonomy).await? {
        return Err(ServerError::NotFound(format!("taxonomy {taxonomy}")));
    }
    let term = store
        .term_by_slug(&taxonomy, &slug)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("{taxonomy}/{slug}")))?;

    let query =
        FeedQuery { taxonomy: taxonomy.clone(), term_ids: vec![term.id], page: 1, per_page: state.config.posts_per_page };
    let first = state.provider.page(&query).await?;
    let signature = state.provider.signature(&term).await?;
    let key = cache_key(&taxonomy, term.id);
    let nonce = state.nonces.create(FEED_ACTION);

    let html = archive::render(&ArchivePage {
        term: &term,
        cards: &first.cards,
        next: first.next.as_deref(),
        signature: &signature,
        cache_key: &key,
        cache_ttl_ms: state.config.cache_ttl_ms,
        cache_limit: state.config.cache_limit,
        nonce: &nonce,
    });
    Ok(Html(html))
}

async fn feed_schema() -> Json<schemars::Schema> {
    Json(schemars::schema_for!(FeedEnvelope))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
