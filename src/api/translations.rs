use super::parse_kind;
use crate::error::{AppError, AppResult};
use crate::i18n::MetricsReport;
use crate::models::TranslationRecord;
use crate::state::AppState;
use crate::translation::BatchFailure;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct GenerateRequest {
    language_codes: Vec<String>,
}

#[derive(Deserialize)]
pub struct TranslationEdit {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    success: bool,
    translations: Vec<TranslationRecord>,
    errors: Vec<String>,
}

#[derive(Serialize)]
pub struct BatchResponse {
    success: bool,
    total_generated: usize,
    total_skipped: usize,
    total_errors: usize,
    results: Vec<BatchFailure>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Path((kind, parent_id)): Path<(String, i64)>,
) -> AppResult<Json<Vec<TranslationRecord>>> {
    let kind = parse_kind(&kind)?;

    if state.db.get_entity(kind, parent_id).await?.is_none() {
        return Err(AppError::NotFound(format!("{} {}", kind, parent_id)));
    }

    Ok(Json(state.db.list_translations(kind, parent_id).await?))
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    Path((kind, parent_id)): Path<(String, i64)>,
    Json(request): Json<GenerateRequest>,
) -> AppResult<Json<GenerateResponse>> {
    let kind = parse_kind(&kind)?;

    let outcome = state
        .generator
        .generate_for(kind, parent_id, &request.language_codes)
        .await?;

    Ok(Json(GenerateResponse {
        success: !outcome.created.is_empty(),
        translations: outcome.created,
        errors: outcome.errors,
    }))
}

pub async fn generate_all(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(request): Json<GenerateRequest>,
) -> AppResult<Json<BatchResponse>> {
    let kind = parse_kind(&kind)?;

    let report = state
        .generator
        .generate_all(kind, &request.language_codes)
        .await?;

    Ok(Json(BatchResponse {
        success: true,
        total_generated: report.total_generated,
        total_skipped: report.total_skipped,
        total_errors: report.total_errors,
        results: report.results,
    }))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, i64)>,
    Json(edit): Json<TranslationEdit>,
) -> AppResult<Json<TranslationRecord>> {
    let kind = parse_kind(&kind)?;

    let record = state
        .db
        .update_translation(kind, id, edit.name.as_deref(), edit.description.as_deref())
        .await?;

    Ok(Json(record))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, i64)>,
) -> AppResult<Json<Value>> {
    let kind = parse_kind(&kind)?;
    state.db.delete_translation(kind, id).await?;
    Ok(Json(json!({ "deleted": id })))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsReport> {
    Json(state.generator.metrics().report())
}
