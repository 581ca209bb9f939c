use crate::error::{AppError, AppResult};
use crate::models::{RestaurantInfo, RestaurantInfoInput};
use crate::state::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

pub async fn get_info(State(state): State<Arc<AppState>>) -> AppResult<Json<RestaurantInfo>> {
    let info = state.db.get_restaurant_info().await?.unwrap_or_default();
    Ok(Json(info))
}

pub async fn save_info(
    State(state): State<Arc<AppState>>,
    Json(input): Json<RestaurantInfoInput>,
) -> AppResult<Json<RestaurantInfo>> {
    if input.name.trim().is_empty() {
        return Err(AppError::InvalidInput("restaurant name must not be empty".to_string()));
    }
    Ok(Json(state.db.save_restaurant_info(&input).await?))
}
