//! HTTP API over the menu, the language registry and translation generation.
//!
//! Handlers are thin: they extract the request, call into `db`, `i18n` or
//! `translation`, and let `AppError` map failures to status codes.

mod categories;
mod languages;
mod menu_items;
mod restaurant;
mod translations;

use crate::error::{AppError, AppResult};
use crate::models::EntityKind;
use crate::security::{require_api_key, API_KEY_HEADER};
use crate::state::AppState;
use axum::{
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use menu_items::{summarize_menu, MenuAnalytics};

/// Build the application router with CORS, request tracing and the API key guard.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route(
            "/api/restaurant-info",
            get(restaurant::get_info).post(restaurant::save_info),
        )
        .route("/api/menu-items", get(menu_items::list).post(menu_items::create))
        .route(
            "/api/menu-items/:id",
            put(menu_items::update).delete(menu_items::remove),
        )
        .route(
            "/api/menu-items-with-translations",
            get(menu_items::list_with_translations),
        )
        .route("/api/analytics", get(menu_items::analytics))
        .route("/api/categories", get(categories::list).post(categories::create))
        .route("/api/categories/:id", delete(categories::remove))
        .route(
            "/api/categories-with-translations",
            get(categories::list_with_translations),
        )
        .route("/api/supported-languages", get(languages::list))
        .route("/api/languages", post(languages::add))
        .route("/api/languages/:code", delete(languages::remove))
        .route("/api/translations/metrics", get(translations::metrics))
        .route(
            "/api/translations/:kind/generate-all",
            post(translations::generate_all),
        )
        .route(
            "/api/translations/:kind/records/:id",
            put(translations::update).delete(translations::remove),
        )
        .route("/api/translations/:kind/:parent_id", get(translations::list))
        .route(
            "/api/translations/:kind/:parent_id/generate",
            post(translations::generate),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
        .max_age(Duration::from_secs(60 * 60))
}

/// `menu-items` / `categories` path segment
fn parse_kind(segment: &str) -> AppResult<EntityKind> {
    EntityKind::from_path(segment)
        .ok_or_else(|| AppError::NotFound(format!("Translation kind '{}'", segment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("menu-items").unwrap(), EntityKind::MenuItem);
        assert_eq!(parse_kind("categories").unwrap(), EntityKind::Category);
        assert!(matches!(parse_kind("dishes"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        // Must not panic on values that are not valid header values
        let _ = cors_layer(&["http://localhost:5173".to_string(), "bad\norigin".to_string()]);
    }
}
