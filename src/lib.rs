//! Restaurant menu backend with AI-assisted menu translation.
//!
//! Menu items and categories are written in a single source language and
//! translated into the languages of the [`i18n::LanguageRegistry`] by the
//! [`translation::TranslationGenerator`], which calls an OpenAI-compatible
//! chat completions service through the [`openai::MenuTranslator`] trait.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod i18n;
pub mod models;
pub mod openai;
pub mod retry;
pub mod security;
pub mod state;
pub mod translation;
