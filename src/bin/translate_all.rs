//! Batch translation binary - translates the whole menu without running the server
//!
//! Usage:
//!   cargo run --bin translate-all -- en de it                # All menu items
//!   cargo run --bin translate-all -- --categories en de it   # All categories
//!
//! Required environment variables:
//! - OPENAI_API_KEY
//!
//! Optional:
//! - DATABASE_URL (defaults to sqlite://menu.db?mode=rwc)
//! - SOURCE_LANGUAGE (defaults to Croatian)
//! - TRANSLATION_CONCURRENCY (defaults to 1)

use anyhow::{bail, Result};
use restaurant_menu::{config::Config, models::EntityKind, state::AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("restaurant_menu=info".parse()?),
        )
        .init();

    // Load environment from .env file
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args: Vec<String> = std::env::args().skip(1).collect();
    let kind = if args.iter().any(|arg| arg == "--categories") {
        EntityKind::Category
    } else {
        EntityKind::MenuItem
    };
    let language_codes: Vec<String> = args.into_iter().filter(|arg| !arg.starts_with("--")).collect();

    if language_codes.is_empty() {
        bail!("Usage: translate-all [--categories] <language code>...");
    }

    info!("Loading configuration...");
    let config = Config::from_env()?;
    let state = AppState::from_config(config).await?;

    info!(
        "Translating every {} into: {}",
        kind.label().to_lowercase(),
        language_codes.join(", ")
    );
    let report = state.generator.generate_all(kind, &language_codes).await?;

    println!("\n========================================");
    println!("  BATCH TRANSLATION COMPLETE");
    println!("========================================");
    println!("  Generated: {}", report.total_generated);
    println!("  Skipped (already translated): {}", report.total_skipped);
    println!("  Errors: {}", report.total_errors);
    println!("========================================");

    for failure in &report.results {
        println!("  ✗ {} [{}]: {}", failure.entity, failure.language, failure.error);
    }

    let metrics = state.generator.metrics().report();
    info!(
        "{} service calls, {:.1}% successful",
        metrics.api_calls, metrics.api_success_rate
    );

    Ok(())
}
