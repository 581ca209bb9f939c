use anyhow::{Context, Result};

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:5174,http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    // OpenAI
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,
    pub openai_temperature: f32,
    pub openai_timeout_secs: u64,

    // Translation
    pub source_language: String,
    pub translation_concurrency: usize,

    // Database
    pub database_url: String,

    // Server
    pub api_key: Option<String>,
    pub cors_origins: Vec<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // OpenAI
            openai_api_key: std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            openai_temperature: std::env::var("OPENAI_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.3),
            openai_timeout_secs: std::env::var("OPENAI_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),

            // Translation
            source_language: std::env::var("SOURCE_LANGUAGE")
                .unwrap_or_else(|_| "Croatian".to_string()),
            translation_concurrency: std::env::var("TRANSLATION_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(1)
                .max(1),

            // Database
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://menu.db?mode=rwc".to_string()),

            // Server
            api_key: std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
