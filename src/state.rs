use crate::config::Config;
use crate::db::Database;
use crate::i18n::LanguageRegistry;
use crate::openai::{MenuTranslator, OpenAiTranslator};
use crate::translation::TranslationGenerator;
use anyhow::Result;
use std::sync::Arc;

/// Shared state handed to every request handler.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub registry: LanguageRegistry,
    pub generator: TranslationGenerator,
}

impl AppState {
    pub fn new(config: Config, db: Database, translator: Arc<dyn MenuTranslator>) -> Arc<Self> {
        let generator = TranslationGenerator::new(db.clone(), translator, config.source_language.clone())
            .with_concurrency(config.translation_concurrency);

        Arc::new(Self {
            registry: LanguageRegistry::new(db.clone()),
            config,
            db,
            generator,
        })
    }

    /// Open the configured database and wire up the OpenAI client
    pub async fn from_config(config: Config) -> Result<Arc<Self>> {
        let db = Database::new(&config.database_url).await?;
        let translator = Arc::new(OpenAiTranslator::new(&config));
        Ok(Self::new(config, db, translator))
    }
}
