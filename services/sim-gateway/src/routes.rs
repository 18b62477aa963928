//! HTTP endpoints for the dashboard frontend
//!
//! Thin handlers over the shared `ApiClient`: every endpoint authenticates
//! through the client's token cache, and list endpoints answer with rows
//! normalized into the canonical `SimRecord` shape so the dashboard never
//! sees the upstream's heterogeneous payloads.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::{Days, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use nce_client::{SimRecord, status_summary};

use crate::AppState;
use crate::error::ApiError;

/// Default page size for single-page list endpoints, matching the
/// dashboard's table size
const DEFAULT_LIST_PAGE_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(rename = "pageSize", default = "default_list_page_size")]
    pub page_size: usize,
}

fn default_page() -> u32 {
    1
}

fn default_list_page_size() -> usize {
    DEFAULT_LIST_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

/// Health check that verifies authentication. Answers 200 with the cached
/// token's remaining lifetime when a token can be acquired, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.client.acquire_token().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "authenticated": true,
                "token_expires_in": state.client.token_expires_in().await,
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "authenticated": false,
                "token_expires_in": Value::Null,
                "error": e.to_string(),
            })),
        ),
    }
}

/// One page of the SIM fleet, normalized.
pub async fn list_sims(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    let payload = state.client.list_sims(query.page, query.page_size).await?;
    let rows: Vec<SimRecord> = payload.items().iter().map(SimRecord::from_item).collect();
    let total = payload.total_items().unwrap_or(rows.len() as u64);
    Ok(Json(json!({
        "items": rows,
        "totalItems": total,
        "page": query.page,
        "pageSize": query.page_size,
    })))
}

/// The whole fleet via full pagination. `truncated` is set when the walk
/// stopped at the page cap, so callers can see an incomplete view for what
/// it is.
pub async fn list_all_sims(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let fetched = state.client.list_all_sims().await?;
    let rows: Vec<SimRecord> = fetched.items.iter().map(SimRecord::from_item).collect();
    Ok(Json(json!({
        "totalItems": rows.len(),
        "items": rows,
        "pagesFetched": fetched.pages_fetched,
        "truncated": fetched.truncated,
    })))
}

pub async fn sim_details(
    State(state): State<AppState>,
    Path(iccid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.client.sim_details(&iccid).await?))
}

/// Quota is best-effort upstream: a SIM without quota data answers with a
/// null quota, not an error.
pub async fn sim_quota(
    State(state): State<AppState>,
    Path(iccid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let quota = state.client.sim_quota(&iccid).await?;
    Ok(Json(json!({
        "available": quota.is_some(),
        "quota": quota,
    })))
}

/// Usage records over a date window; defaults to the last 30 days.
pub async fn sim_usage(
    State(state): State<AppState>,
    Path(iccid): Path<String>,
    Query(query): Query<UsageQuery>,
) -> Result<Json<Value>, ApiError> {
    let today = Utc::now().date_naive();
    let end = query
        .end_date
        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());
    let start = query
        .start_date
        .unwrap_or_else(|| (today - Days::new(30)).format("%Y-%m-%d").to_string());
    Ok(Json(state.client.sim_usage(&iccid, &start, &end).await?))
}

pub async fn sim_sms(
    State(state): State<AppState>,
    Path(iccid): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    let payload = state.client.sim_sms(&iccid, query.page, query.page_size).await?;
    let total = payload.total_items().unwrap_or(payload.items().len() as u64);
    Ok(Json(json!({
        "items": payload.items(),
        "totalItems": total,
    })))
}

pub async fn sim_events(
    State(state): State<AppState>,
    Path(iccid): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    let payload = state
        .client
        .sim_events(&iccid, query.page, query.page_size)
        .await?;
    let total = payload.total_items().unwrap_or(payload.items().len() as u64);
    Ok(Json(json!({
        "items": payload.items(),
        "totalItems": total,
    })))
}

/// Fleet-wide status counts, aggregated over a full pagination walk.
pub async fn sims_status_summary(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let fetched = state.client.list_all_sims().await?;
    let breakdown = status_summary(fetched.items.iter());
    Ok(Json(json!({
        "total_sims": fetched.items.len(),
        "status_breakdown": breakdown,
        "truncated": fetched.truncated,
    })))
}

/// Prometheus metrics in text exposition format.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}
