use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::i18n::{LanguageRegistry, TranslationMetrics};
use crate::models::{EntityKind, NewTranslation, TranslatableEntity, TranslationRecord};
use crate::openai::{MenuTranslator, ServiceError, TranslationJob};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a single (entity, language) pair produced no translation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PairError {
    UnsupportedLanguage(String),
    AlreadyExists(String),
    Service { language: String, reason: String },
}

impl fmt::Display for PairError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairError::UnsupportedLanguage(code) => write!(f, "unsupported language: {}", code),
            PairError::AlreadyExists(language) => {
                write!(f, "translation for {} already exists", language)
            }
            PairError::Service { language, reason } => {
                write!(f, "failed to generate {} translation: {}", language, reason)
            }
        }
    }
}

/// Result of generating translations for one entity.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub created: Vec<TranslationRecord>,
    pub errors: Vec<String>,
}

/// One failed pair in a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub entity: String,
    pub language: String,
    pub error: String,
}

/// Tally of a batch run over every entity of a kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total_generated: usize,
    pub total_skipped: usize,
    pub total_errors: usize,
    pub results: Vec<BatchFailure>,
}

/// How to treat pairs that already have a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExistingPolicy {
    /// Report the pair as an "already exists" error
    Report,
    /// Count the pair as skipped
    Skip,
}

/// Outcome of one entity's pass, before it is shaped for the caller
struct EntityRun {
    created: Vec<TranslationRecord>,
    skipped: usize,
    /// (language label, error), in request order
    failures: Vec<(String, PairError)>,
}

/// Drop repeated codes, keeping the first occurrence
fn dedupe_codes(codes: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    codes
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

/// Turns source-language menu text into translation records.
#[derive(Clone)]
pub struct TranslationGenerator {
    db: Database,
    registry: LanguageRegistry,
    translator: Arc<dyn MenuTranslator>,
    metrics: Arc<TranslationMetrics>,
    source_language: String,
    concurrency: usize,
}

impl TranslationGenerator {
    pub fn new(
        db: Database,
        translator: Arc<dyn MenuTranslator>,
        source_language: impl Into<String>,
    ) -> Self {
        Self {
            registry: LanguageRegistry::new(db.clone()),
            db,
            translator,
            metrics: Arc::new(TranslationMetrics::new()),
            source_language: source_language.into(),
            concurrency: 1,
        }
    }

    /// Allow up to `limit` concurrent service calls per entity (minimum 1)
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    /// Generate translations for one entity looked up by kind and id.
    pub async fn generate_for(
        &self,
        kind: EntityKind,
        entity_id: i64,
        language_codes: &[String],
    ) -> AppResult<GenerationOutcome> {
        let entity = self
            .db
            .get_entity(kind, entity_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", kind, entity_id)))?;

        self.generate(&entity, language_codes).await
    }

    /// Generate translations for one entity.
    ///
    /// Unsupported codes, existing translations and service failures are
    /// returned as error strings; only persistence failures abort the call.
    /// Everything created is committed together at the end.
    pub async fn generate(
        &self,
        entity: &TranslatableEntity,
        language_codes: &[String],
    ) -> AppResult<GenerationOutcome> {
        let run = self
            .run_entity(entity, language_codes, ExistingPolicy::Report)
            .await?;

        let errors: Vec<String> = run.failures.iter().map(|(_, e)| e.to_string()).collect();

        info!(
            "Generated {} translations for {} '{}' ({} errors)",
            run.created.len(),
            entity.kind,
            entity.name,
            errors.len()
        );

        Ok(GenerationOutcome {
            created: run.created,
            errors,
        })
    }

    /// Generate translations for every entity of a kind.
    ///
    /// Existing pairs are skipped. Each entity's records are committed once
    /// that entity is done.
    pub async fn generate_all(
        &self,
        kind: EntityKind,
        language_codes: &[String],
    ) -> AppResult<BatchReport> {
        let entities = self.db.list_entities(kind).await?;
        self.generate_all_entities(&entities, language_codes).await
    }

    pub async fn generate_all_entities(
        &self,
        entities: &[TranslatableEntity],
        language_codes: &[String],
    ) -> AppResult<BatchReport> {
        if entities.is_empty() {
            return Err(AppError::NoEntities);
        }

        let mut report = BatchReport::default();

        for entity in entities {
            let run = self
                .run_entity(entity, language_codes, ExistingPolicy::Skip)
                .await?;

            report.total_generated += run.created.len();
            report.total_skipped += run.skipped;
            report.total_errors += run.failures.len();
            report
                .results
                .extend(run.failures.into_iter().map(|(language, error)| BatchFailure {
                    entity: entity.name.clone(),
                    language,
                    error: error.to_string(),
                }));
        }

        info!(
            "Batch translation finished for {} entities: {} generated, {} skipped, {} errors",
            entities.len(),
            report.total_generated,
            report.total_skipped,
            report.total_errors
        );

        Ok(report)
    }

    async fn run_entity(
        &self,
        entity: &TranslatableEntity,
        language_codes: &[String],
        existing_policy: ExistingPolicy,
    ) -> AppResult<EntityRun> {
        let codes = dedupe_codes(language_codes);

        // Fresh registry and existence snapshots for this entity
        let languages: HashMap<String, String> = self
            .registry
            .list()
            .await?
            .into_iter()
            .map(|l| (l.code, l.name))
            .collect();
        let existing = self.db.translated_codes(entity.kind, entity.id).await?;

        let mut failures: Vec<(usize, String, PairError)> = Vec::new();
        let mut skipped = 0;
        let mut jobs = Vec::new();

        for (index, code) in codes.iter().enumerate() {
            let Some(language_name) = languages.get(code) else {
                self.metrics.record_unsupported_language();
                warn!("Skipping unsupported language '{}' for '{}'", code, entity.name);
                failures.push((index, code.clone(), PairError::UnsupportedLanguage(code.clone())));
                continue;
            };

            if existing.contains(code) {
                self.metrics.record_skipped_existing();
                match existing_policy {
                    ExistingPolicy::Report => failures.push((
                        index,
                        language_name.clone(),
                        PairError::AlreadyExists(language_name.clone()),
                    )),
                    ExistingPolicy::Skip => skipped += 1,
                }
                continue;
            }

            jobs.push((index, code.clone(), language_name.clone()));
        }

        let results: Vec<_> = stream::iter(jobs)
            .map(|(index, code, language_name)| async move {
                let job = TranslationJob {
                    kind: entity.kind,
                    source_language: self.source_language.clone(),
                    target_language: language_name.clone(),
                    name: entity.name.clone(),
                    description: entity.description.clone(),
                };
                self.metrics.record_api_call();
                let result = self.translator.translate(&job).await;
                (index, code, language_name, result)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut pending = Vec::new();
        let mut pending_index = HashMap::new();

        for (index, code, language_name, result) in results {
            match result {
                Ok(text) => {
                    pending_index.insert(code.clone(), index);
                    pending.push(NewTranslation {
                        parent_id: entity.id,
                        language_code: code,
                        language_name,
                        name: text.name,
                        description: text.description,
                        is_ai_generated: true,
                    });
                }
                Err(e) => {
                    self.metrics.record_api_failure();
                    warn!(
                        "Translation of '{}' to {} failed: {}",
                        entity.name, language_name, e
                    );
                    failures.push((index, language_name.clone(), service_failure(language_name, e)));
                }
            }
        }

        let (created, conflicts) = self.db.insert_translations(entity.kind, pending).await?;
        self.metrics.record_created(created.len());

        for record in &created {
            debug!(
                "Created {} translation {} for '{}'",
                record.language_name, record.id, entity.name
            );
        }

        // Written by someone else between the snapshot and the insert
        for conflict in conflicts {
            let index = pending_index
                .get(&conflict.language_code)
                .copied()
                .unwrap_or(usize::MAX);
            self.metrics.record_skipped_existing();
            match existing_policy {
                ExistingPolicy::Report => failures.push((
                    index,
                    conflict.language_name.clone(),
                    PairError::AlreadyExists(conflict.language_name),
                )),
                ExistingPolicy::Skip => skipped += 1,
            }
        }

        failures.sort_by_key(|(index, _, _)| *index);

        Ok(EntityRun {
            created,
            skipped,
            failures: failures
                .into_iter()
                .map(|(_, language, error)| (language, error))
                .collect(),
        })
    }
}

fn service_failure(language: String, error: ServiceError) -> PairError {
    PairError::Service {
        language,
        reason: error.to_string(),
    }
}
