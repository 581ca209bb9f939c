//! Internationalization (i18n) module for multi-language menus.
//!
//! # Architecture
//!
//! - `registry`: the database-backed set of languages translations may target
//! - `metrics`: counters for translation service usage
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::LanguageRegistry;
//!
//! let registry = LanguageRegistry::new(db.clone());
//! registry.add("nl", "Dutch").await?;
//! let languages = registry.list().await?;
//! ```

mod metrics;
mod registry;

pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::LanguageRegistry;
