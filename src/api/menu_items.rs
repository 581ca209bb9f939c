use crate::error::{AppError, AppResult};
use crate::models::{EntityKind, MenuItem, MenuItemUpdate, MenuItemWithTranslations, NewMenuItem};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

const UNCATEGORIZED: &str = "Uncategorized";

/// Dashboard counts over the whole menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuAnalytics {
    pub total_items: usize,
    pub available_items: usize,
    pub unavailable_items: usize,
    pub categories: BTreeMap<String, usize>,
    pub allergen_counts: BTreeMap<&'static str, usize>,
    pub total_categories: usize,
}

pub fn summarize_menu(items: &[MenuItem]) -> MenuAnalytics {
    let available_items = items.iter().filter(|i| i.is_available).count();

    let mut categories = BTreeMap::new();
    for item in items {
        let name = item
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED);
        *categories.entry(name.to_string()).or_insert(0) += 1;
    }

    let count = |flag: fn(&MenuItem) -> bool| items.iter().filter(|i| flag(i)).count();
    let allergen_counts = BTreeMap::from([
        ("vegetarian", count(|i| i.flags.is_vegetarian)),
        ("vegan", count(|i| i.flags.is_vegan)),
        ("gluten", count(|i| i.flags.contains_gluten)),
        ("dairy", count(|i| i.flags.contains_dairy)),
        ("nuts", count(|i| i.flags.contains_nuts)),
        ("fish", count(|i| i.flags.contains_fish)),
        ("shellfish", count(|i| i.flags.contains_shellfish)),
        ("eggs", count(|i| i.flags.contains_eggs)),
        ("spicy", count(|i| i.flags.is_spicy)),
    ]);

    MenuAnalytics {
        total_items: items.len(),
        available_items,
        unavailable_items: items.len() - available_items,
        total_categories: categories.len(),
        categories,
        allergen_counts,
    }
}

fn validate_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::InvalidInput(format!("invalid price: {}", price)));
    }
    Ok(())
}

pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<MenuItem>>> {
    Ok(Json(state.db.list_menu_items().await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(item): Json<NewMenuItem>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    if item.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name must not be empty".to_string()));
    }
    validate_price(item.price)?;

    let created = state.db.create_menu_item(&item).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    if let Some(price) = update.price {
        validate_price(price)?;
    }
    Ok(Json(state.db.update_menu_item(id, &update).await?))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    state.db.delete_menu_item(id).await?;
    Ok(Json(json!({ "deleted": id })))
}

pub async fn list_with_translations(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<MenuItemWithTranslations>>> {
    let items = state.db.list_menu_items().await?;

    let mut result = Vec::with_capacity(items.len());
    for item in items {
        let translations = state
            .db
            .list_translations(EntityKind::MenuItem, item.id)
            .await?;
        result.push(MenuItemWithTranslations { item, translations });
    }

    Ok(Json(result))
}

pub async fn analytics(State(state): State<Arc<AppState>>) -> AppResult<Json<MenuAnalytics>> {
    let items = state.db.list_menu_items().await?;
    Ok(Json(summarize_menu(&items)))
}
