//! Language registry: the durable set of languages translations may target.
//!
//! The registry lives in the `languages` table and is re-read on every call,
//! so edits made by other processes (or a second server instance) are picked
//! up without a restart. Nothing is cached between calls.

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{EntityKind, LanguageEntry};
use tracing::info;

/// Handle to the language registry stored in the database.
#[derive(Clone)]
pub struct LanguageRegistry {
    db: Database,
}

impl LanguageRegistry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get all registered languages, freshly loaded from storage.
    pub async fn list(&self) -> AppResult<Vec<LanguageEntry>> {
        let languages =
            sqlx::query_as::<_, LanguageEntry>("SELECT code, name FROM languages ORDER BY rowid")
                .fetch_all(self.db.pool())
                .await?;
        Ok(languages)
    }

    /// Register a new language.
    ///
    /// Fails with `DuplicateLanguage` if the code is already present.
    pub async fn add(&self, code: &str, name: &str) -> AppResult<LanguageEntry> {
        let code = code.trim();
        let name = name.trim();
        if code.is_empty() || name.is_empty() {
            return Err(AppError::InvalidInput(
                "Language code and name are required".to_string(),
            ));
        }

        let result = sqlx::query(
            "INSERT INTO languages (code, name) VALUES (?1, ?2) ON CONFLICT (code) DO NOTHING",
        )
        .bind(code)
        .bind(name)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::DuplicateLanguage(code.to_string()));
        }

        info!("Added language {} ({})", name, code);
        Ok(LanguageEntry {
            code: code.to_string(),
            name: name.to_string(),
        })
    }

    /// Remove a language and every translation record written for it.
    ///
    /// The translation deletes and the registry delete share one
    /// transaction. Returns the number of translation records deleted
    /// across both entity kinds.
    pub async fn remove(&self, code: &str) -> AppResult<u64> {
        let mut tx = self.db.pool().begin().await?;

        let existing: Option<(String,)> = sqlx::query_as("SELECT name FROM languages WHERE code = ?1")
            .bind(code)
            .fetch_optional(&mut *tx)
            .await?;

        let Some((name,)) = existing else {
            return Err(AppError::NotFound(format!("Language {}", code)));
        };

        let mut deleted = 0;
        for kind in [EntityKind::MenuItem, EntityKind::Category] {
            let sql = format!(
                "DELETE FROM {} WHERE language_code = ?1",
                kind.translation_table()
            );
            deleted += sqlx::query(&sql)
                .bind(code)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        sqlx::query("DELETE FROM languages WHERE code = ?1")
            .bind(code)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "Removed language {} ({}), deleted {} translations",
            name, code, deleted
        );
        Ok(deleted)
    }
}
