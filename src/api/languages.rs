use crate::error::AppResult;
use crate::models::LanguageEntry;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
pub struct LanguageList {
    languages: Vec<LanguageEntry>,
}

#[derive(Deserialize)]
pub struct NewLanguage {
    code: String,
    name: String,
}

#[derive(Serialize)]
pub struct RemovedLanguage {
    translations_deleted: u64,
}

pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<LanguageList>> {
    let languages = state.registry.list().await?;
    Ok(Json(LanguageList { languages }))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewLanguage>,
) -> AppResult<(StatusCode, Json<LanguageEntry>)> {
    let entry = state.registry.add(&payload.code, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> AppResult<Json<RemovedLanguage>> {
    let translations_deleted = state.registry.remove(&code).await?;
    Ok(Json(RemovedLanguage { translations_deleted }))
}
