use crate::error::{AppError, AppResult};
use crate::models::{Category, CategoryWithTranslations, EntityKind};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct NewCategory {
    name: String,
}

pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(state.db.list_categories().await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("category name must not be empty".to_string()));
    }

    let category = state.db.create_category(name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    state.db.delete_category(id).await?;
    Ok(Json(json!({ "deleted": id })))
}

pub async fn list_with_translations(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<CategoryWithTranslations>>> {
    let categories = state.db.list_categories().await?;

    let mut result = Vec::with_capacity(categories.len());
    for category in categories {
        let translations = state
            .db
            .list_translations(EntityKind::Category, category.id)
            .await?;
        result.push(CategoryWithTranslations { category, translations });
    }

    Ok(Json(result))
}
