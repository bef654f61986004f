use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::{
    domain::{greeting, visitor_name},
    state::AppState,
};

pub const EMPTY_NAME_MESSAGE: &str = "👋 Please enter your name!";
const WAVE_FAILED_MESSAGE: &str = "⚠️ Internal server error";
const COUNT_FAILED_MESSAGE: &str = "Failed to get count";
const MAX_VISITS_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct WaveRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WaveResponse {
    pub message: String,
    pub visit_time: String,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct VisitsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VisitEntry {
    pub id: u64,
    pub visitor_name: String,
    pub visit_time: String,
}

/// POST /wave
///
/// Body rejections (missing content type, malformed JSON, oversized body) are
/// mapped into [`ApiError`] so every failure carries the same JSON shape.
pub async fn wave(
    State(st): State<AppState>,
    payload: Result<Json<WaveRequest>, JsonRejection>,
) -> Result<Json<WaveResponse>, ApiError> {
    let Json(req) = payload?;
    let name = visitor_name(req.name.as_deref())
        .ok_or_else(|| ApiError::BadRequest(EMPTY_NAME_MESSAGE.to_string()))?;

    let (count, visit) = st
        .store
        .record_wave(&name)
        .await
        .map_err(|e| ApiError::store(WAVE_FAILED_MESSAGE, e))?;

    tracing::debug!(visitor = %name, count, "wave recorded");
    Ok(Json(WaveResponse {
        message: greeting(&name),
        visit_time: visit.formatted_time(),
        count,
    }))
}

/// GET /get_count
pub async fn get_count(State(st): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let count = st
        .store
        .count()
        .await
        .map_err(|e| ApiError::store(COUNT_FAILED_MESSAGE, e))?;
    Ok(Json(CountResponse { count }))
}

/// GET /visits?limit=N, newest first
pub async fn recent_visits(
    State(st): State<AppState>,
    Query(q): Query<VisitsQuery>,
) -> Result<Json<Vec<VisitEntry>>, ApiError> {
    let limit = q.limit.unwrap_or(20).min(MAX_VISITS_PAGE);
    let visits = st
        .store
        .recent_visits(limit)
        .await
        .map_err(|e| ApiError::store(WAVE_FAILED_MESSAGE, e))?;
    Ok(Json(
        visits
            .into_iter()
            .map(|v| VisitEntry {
                visit_time: v.formatted_time(),
                id: v.id,
                visitor_name: v.visitor_name,
            })
            .collect(),
    ))
}
