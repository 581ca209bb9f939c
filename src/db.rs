use crate::error::{AppError, AppResult};
use crate::models::{
    Category, EntityKind, MenuItem, MenuItemUpdate, NewMenuItem, NewTranslation, RestaurantInfo,
    RestaurantInfoInput, TranslatableEntity, TranslationRecord,
};
use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::info;

/// Languages seeded into an empty registry on first start
const DEFAULT_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("de", "German"),
    ("it", "Italian"),
    ("fr", "French"),
    ("es", "Spanish"),
    ("sl", "Slovenian"),
    ("cs", "Czech"),
    ("pl", "Polish"),
    ("hu", "Hungarian"),
];

const MENU_ITEM_COLUMNS: &str = "id, name, description, price, category, image_path, is_available, \
     is_vegetarian, is_vegan, contains_gluten, contains_dairy, contains_nuts, contains_fish, \
     contains_shellfish, contains_eggs, is_spicy";

#[derive(FromRow)]
struct TranslationRow {
    id: i64,
    parent_id: i64,
    language_code: String,
    language_name: String,
    name: String,
    description: Option<String>,
    is_ai_generated: bool,
}

impl TranslationRow {
    fn into_record(self, kind: EntityKind) -> TranslationRecord {
        TranslationRecord {
            id: self.id,
            kind,
            parent_id: self.parent_id,
            language_code: self.language_code,
            language_name: self.language_name,
            name: self.name,
            description: self.description,
            is_ai_generated: self.is_ai_generated,
        }
    }
}

/// Column list selecting a translation row of either kind
fn translation_select(kind: EntityKind) -> String {
    let description = if kind.has_description() {
        "description"
    } else {
        "NULL AS description"
    };
    format!(
        "SELECT id, {} AS parent_id, language_code, language_name, name, {}, is_ai_generated FROM {}",
        kind.parent_column(),
        description,
        kind.translation_table()
    )
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database and create tables
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context(format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context(format!("Failed to open database at {}", database_url))?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Private in-memory database, used by tests and dry runs
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Every pooled connection would otherwise get its own empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn run_migrations(&self) -> Result<()> {
        let statements = [
            "CREATE TABLE IF NOT EXISTS restaurant_info (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                address TEXT,
                phone TEXT,
                email TEXT
            )",
            "CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                sort_order INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE TABLE IF NOT EXISTS menu_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                price REAL NOT NULL,
                category TEXT,
                image_path TEXT,
                is_available INTEGER NOT NULL DEFAULT 1,
                is_vegetarian INTEGER NOT NULL DEFAULT 0,
                is_vegan INTEGER NOT NULL DEFAULT 0,
                contains_gluten INTEGER NOT NULL DEFAULT 0,
                contains_dairy INTEGER NOT NULL DEFAULT 0,
                contains_nuts INTEGER NOT NULL DEFAULT 0,
                contains_fish INTEGER NOT NULL DEFAULT 0,
                contains_shellfish INTEGER NOT NULL DEFAULT 0,
                contains_eggs INTEGER NOT NULL DEFAULT 0,
                is_spicy INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE TABLE IF NOT EXISTS menu_item_translations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                menu_item_id INTEGER NOT NULL REFERENCES menu_items(id) ON DELETE CASCADE,
                language_code TEXT NOT NULL,
                language_name TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                is_ai_generated INTEGER NOT NULL DEFAULT 1
            )",
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_menu_item_translations_pair
                ON menu_item_translations (menu_item_id, language_code)",
            "CREATE TABLE IF NOT EXISTS category_translations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                language_code TEXT NOT NULL,
                language_name TEXT NOT NULL,
                name TEXT NOT NULL,
                is_ai_generated INTEGER NOT NULL DEFAULT 1
            )",
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_category_translations_pair
                ON category_translations (category_id, language_code)",
            "CREATE TABLE IF NOT EXISTS languages (
                code TEXT PRIMARY KEY,
                name TEXT NOT NULL
            )",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to create database schema")?;
        }

        let (language_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM languages")
            .fetch_one(&self.pool)
            .await?;

        if language_count == 0 {
            for (code, name) in DEFAULT_LANGUAGES {
                sqlx::query("INSERT INTO languages (code, name) VALUES (?1, ?2)")
                    .bind(code)
                    .bind(name)
                    .execute(&self.pool)
                    .await
                    .context("Failed to seed languages")?;
            }
            info!("Seeded {} default languages", DEFAULT_LANGUAGES.len());
        }

        Ok(())
    }

    // ==================== Restaurant Info ====================

    pub async fn get_restaurant_info(&self) -> AppResult<Option<RestaurantInfo>> {
        let info = sqlx::query_as::<_, RestaurantInfo>(
            "SELECT id, name, description, address, phone, email FROM restaurant_info ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(info)
    }

    /// Insert the single restaurant info row, or overwrite it if present
    pub async fn save_restaurant_info(&self, input: &RestaurantInfoInput) -> AppResult<RestaurantInfo> {
        let existing = self.get_restaurant_info().await?;

        let id = match existing {
            Some(info) => {
                sqlx::query(
                    "UPDATE restaurant_info SET name = ?1, description = ?2, address = ?3, phone = ?4, email = ?5
                     WHERE id = ?6",
                )
                .bind(&input.name)
                .bind(&input.description)
                .bind(&input.address)
                .bind(&input.phone)
                .bind(&input.email)
                .bind(info.id)
                .execute(&self.pool)
                .await?;
                info.id
            }
            None => sqlx::query(
                "INSERT INTO restaurant_info (name, description, address, phone, email)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.address)
            .bind(&input.phone)
            .bind(&input.email)
            .execute(&self.pool)
            .await?
            .last_insert_rowid(),
        };

        Ok(RestaurantInfo {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            address: input.address.clone(),
            phone: input.phone.clone(),
            email: input.email.clone(),
        })
    }

    // ==================== Menu Items ====================

    pub async fn list_menu_items(&self) -> AppResult<Vec<MenuItem>> {
        let items = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {} FROM menu_items ORDER BY id",
            MENU_ITEM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn get_menu_item(&self, id: i64) -> AppResult<Option<MenuItem>> {
        let item = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {} FROM menu_items WHERE id = ?1",
            MENU_ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    pub async fn create_menu_item(&self, item: &NewMenuItem) -> AppResult<MenuItem> {
        let f = &item.flags;
        let id = sqlx::query(
            "INSERT INTO menu_items (name, description, price, category, image_path, is_available,
                is_vegetarian, is_vegan, contains_gluten, contains_dairy, contains_nuts, contains_fish,
                contains_shellfish, contains_eggs, is_spicy)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.category)
        .bind(&item.image_path)
        .bind(item.is_available)
        .bind(f.is_vegetarian)
        .bind(f.is_vegan)
        .bind(f.contains_gluten)
        .bind(f.contains_dairy)
        .bind(f.contains_nuts)
        .bind(f.contains_fish)
        .bind(f.contains_shellfish)
        .bind(f.contains_eggs)
        .bind(f.is_spicy)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_menu_item(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Menu item {}", id)))
    }

    /// Apply a partial update; fields left as `None` keep their value
    pub async fn update_menu_item(&self, id: i64, update: &MenuItemUpdate) -> AppResult<MenuItem> {
        let mut item = self
            .get_menu_item(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Menu item {}", id)))?;

        if let Some(name) = &update.name {
            item.name = name.clone();
        }
        if let Some(description) = &update.description {
            item.description = Some(description.clone());
        }
        if let Some(price) = update.price {
            item.price = price;
        }
        if let Some(category) = &update.category {
            item.category = Some(category.clone());
        }
        if let Some(image_path) = &update.image_path {
            item.image_path = Some(image_path.clone());
        }
        if let Some(v) = update.is_available {
            item.is_available = v;
        }

        let f = &mut item.flags;
        for (field, value) in [
            (&mut f.is_vegetarian, update.is_vegetarian),
            (&mut f.is_vegan, update.is_vegan),
            (&mut f.contains_gluten, update.contains_gluten),
            (&mut f.contains_dairy, update.contains_dairy),
            (&mut f.contains_nuts, update.contains_nuts),
            (&mut f.contains_fish, update.contains_fish),
            (&mut f.contains_shellfish, update.contains_shellfish),
            (&mut f.contains_eggs, update.contains_eggs),
            (&mut f.is_spicy, update.is_spicy),
        ] {
            if let Some(v) = value {
                *field = v;
            }
        }

        let f = &item.flags;
        sqlx::query(
            "UPDATE menu_items SET name = ?1, description = ?2, price = ?3, category = ?4, image_path = ?5,
                is_available = ?6, is_vegetarian = ?7, is_vegan = ?8, contains_gluten = ?9,
                contains_dairy = ?10, contains_nuts = ?11, contains_fish = ?12, contains_shellfish = ?13,
                contains_eggs = ?14, is_spicy = ?15
             WHERE id = ?16",
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.category)
        .bind(&item.image_path)
        .bind(item.is_available)
        .bind(f.is_vegetarian)
        .bind(f.is_vegan)
        .bind(f.contains_gluten)
        .bind(f.contains_dairy)
        .bind(f.contains_nuts)
        .bind(f.contains_fish)
        .bind(f.contains_shellfish)
        .bind(f.contains_eggs)
        .bind(f.is_spicy)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Delete a menu item; its translations go with it (ON DELETE CASCADE)
    pub async fn delete_menu_item(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Menu item {}", id)));
        }
        Ok(())
    }

    // ==================== Categories ====================

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, sort_order FROM categories ORDER BY sort_order, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn get_category(&self, id: i64) -> AppResult<Option<Category>> {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, name, sort_order FROM categories WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(category)
    }

    /// Create a category at the end of the current ordering
    pub async fn create_category(&self, name: &str) -> AppResult<Category> {
        let mut tx = self.pool.begin().await?;

        let (exists,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories WHERE name = ?1")
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;
        if exists > 0 {
            return Err(AppError::InvalidInput(format!("Category already exists: {}", name)));
        }

        let (max_order,): (Option<i64>,) = sqlx::query_as("SELECT MAX(sort_order) FROM categories")
            .fetch_one(&mut *tx)
            .await?;
        let sort_order = max_order.map(|o| o + 1).unwrap_or(0);

        let id = sqlx::query("INSERT INTO categories (name, sort_order) VALUES (?1, ?2)")
            .bind(name)
            .bind(sort_order)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        tx.commit().await?;

        Ok(Category {
            id,
            name: name.to_string(),
            sort_order,
        })
    }

    /// Delete a category, detach it from menu items and cascade its translations
    pub async fn delete_category(&self, id: i64) -> AppResult<()> {
        let category = self
            .get_category(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {}", id)))?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE menu_items SET category = NULL WHERE category = ?1")
            .bind(&category.name)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ==================== Translatable Entities ====================

    pub async fn get_entity(&self, kind: EntityKind, id: i64) -> AppResult<Option<TranslatableEntity>> {
        let entity = match kind {
            EntityKind::MenuItem => self
                .get_menu_item(id)
                .await?
                .map(|item| TranslatableEntity::from_menu_item(&item)),
            EntityKind::Category => self
                .get_category(id)
                .await?
                .map(|category| TranslatableEntity::from_category(&category)),
        };
        Ok(entity)
    }

    pub async fn list_entities(&self, kind: EntityKind) -> AppResult<Vec<TranslatableEntity>> {
        let entities = match kind {
            EntityKind::MenuItem => self
                .list_menu_items()
                .await?
                .iter()
                .map(TranslatableEntity::from_menu_item)
                .collect(),
            EntityKind::Category => self
                .list_categories()
                .await?
                .iter()
                .map(TranslatableEntity::from_category)
                .collect(),
        };
        Ok(entities)
    }

    // ==================== Translations ====================

    pub async fn list_translations(
        &self,
        kind: EntityKind,
        parent_id: i64,
    ) -> AppResult<Vec<TranslationRecord>> {
        let sql = format!(
            "{} WHERE {} = ?1 ORDER BY id",
            translation_select(kind),
            kind.parent_column()
        );
        let rows = sqlx::query_as::<_, TranslationRow>(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.into_record(kind)).collect())
    }

    pub async fn get_translation(&self, kind: EntityKind, id: i64) -> AppResult<Option<TranslationRecord>> {
        let sql = format!("{} WHERE id = ?1", translation_select(kind));
        let row = sqlx::query_as::<_, TranslationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.into_record(kind)))
    }

    /// Language codes that already have a translation for this entity
    pub async fn translated_codes(&self, kind: EntityKind, parent_id: i64) -> AppResult<HashSet<String>> {
        let sql = format!(
            "SELECT language_code FROM {} WHERE {} = ?1",
            kind.translation_table(),
            kind.parent_column()
        );
        let codes: Vec<(String,)> = sqlx::query_as(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(codes.into_iter().map(|(code,)| code).collect())
    }

    /// Write a set of translations in one transaction.
    ///
    /// A pair that already has a record (for example one written by a
    /// concurrent request since the caller's existence check) is not
    /// overwritten; it is returned in the second vector instead.
    pub async fn insert_translations(
        &self,
        kind: EntityKind,
        translations: Vec<NewTranslation>,
    ) -> AppResult<(Vec<TranslationRecord>, Vec<NewTranslation>)> {
        if translations.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        let sql = if kind.has_description() {
            format!(
                "INSERT INTO {} ({}, language_code, language_name, name, description, is_ai_generated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT ({}, language_code) DO NOTHING
                 RETURNING id",
                kind.translation_table(),
                kind.parent_column(),
                kind.parent_column()
            )
        } else {
            format!(
                "INSERT INTO {} ({}, language_code, language_name, name, is_ai_generated)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT ({}, language_code) DO NOTHING
                 RETURNING id",
                kind.translation_table(),
                kind.parent_column(),
                kind.parent_column()
            )
        };

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::new();
        let mut conflicts = Vec::new();

        for t in translations {
            let mut query = sqlx::query_as::<_, (i64,)>(&sql)
                .bind(t.parent_id)
                .bind(&t.language_code)
                .bind(&t.language_name)
                .bind(&t.name);
            if kind.has_description() {
                query = query.bind(&t.description);
            }
            let inserted = query
                .bind(t.is_ai_generated)
                .fetch_optional(&mut *tx)
                .await?;

            match inserted {
                Some((id,)) => created.push(TranslationRecord {
                    id,
                    kind,
                    parent_id: t.parent_id,
                    language_code: t.language_code,
                    language_name: t.language_name,
                    name: t.name,
                    description: if kind.has_description() { t.description } else { None },
                    is_ai_generated: t.is_ai_generated,
                }),
                None => conflicts.push(t),
            }
        }

        tx.commit().await?;
        Ok((created, conflicts))
    }

    /// Manually edit a translation. Any edit clears the AI provenance flag.
    pub async fn update_translation(
        &self,
        kind: EntityKind,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<TranslationRecord> {
        if name.is_none() && description.is_none() {
            return Err(AppError::InvalidInput("Nothing to update".to_string()));
        }
        if description.is_some() && !kind.has_description() {
            return Err(AppError::InvalidInput(format!(
                "{} translations have no description",
                kind.label()
            )));
        }

        let mut record = self
            .get_translation(kind, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Translation {}", id)))?;

        if let Some(name) = name {
            record.name = name.to_string();
        }
        if let Some(description) = description {
            record.description = Some(description.to_string());
        }
        record.is_ai_generated = false;

        let result = if kind.has_description() {
            let sql = format!(
                "UPDATE {} SET name = ?1, description = ?2, is_ai_generated = 0 WHERE id = ?3",
                kind.translation_table()
            );
            sqlx::query(&sql)
                .bind(&record.name)
                .bind(&record.description)
                .bind(id)
                .execute(&self.pool)
                .await?
        } else {
            let sql = format!(
                "UPDATE {} SET name = ?1, is_ai_generated = 0 WHERE id = ?2",
                kind.translation_table()
            );
            sqlx::query(&sql)
                .bind(&record.name)
                .bind(id)
                .execute(&self.pool)
                .await?
        };

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Translation {}", id)));
        }

        Ok(record)
    }

    pub async fn delete_translation(&self, kind: EntityKind, id: i64) -> AppResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", kind.translation_table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Translation {}", id)));
        }
        Ok(())
    }

    /// Number of translation records (both kinds) for a language code
    pub async fn count_translations_for_language(&self, code: &str) -> AppResult<i64> {
        let mut total = 0;
        for kind in [EntityKind::MenuItem, EntityKind::Category] {
            let sql = format!(
                "SELECT COUNT(*) FROM {} WHERE language_code = ?1",
                kind.translation_table()
            );
            let (count,): (i64,) = sqlx::query_as(&sql).bind(code).fetch_one(&self.pool).await?;
            total += count;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DietaryFlags;
    use tempfile::TempDir;

    async fn create_test_db() -> Database {
        Database::in_memory().await.expect("Failed to create test database")
    }

    fn new_item(name: &str) -> NewMenuItem {
        NewMenuItem {
            name: name.to_string(),
            description: Some(format!("{} opis", name)),
            price: 12.5,
            category: None,
            image_path: None,
            is_available: true,
            flags: DietaryFlags::default(),
        }
    }

    fn new_translation(parent_id: i64, code: &str, name: &str) -> NewTranslation {
        NewTranslation {
            parent_id,
            language_code: code.to_string(),
            language_name: code.to_uppercase(),
            name: name.to_string(),
            description: Some("desc".to_string()),
            is_ai_generated: true,
        }
    }

    // ==================== Schema Tests ====================

    #[tokio::test]
    async fn test_database_seeds_languages() {
        let db = create_test_db().await;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM languages")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count as usize, DEFAULT_LANGUAGES.len());
    }

    #[tokio::test]
    async fn test_database_reopening_keeps_data() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("menu.db");
        let url = format!("sqlite://{}?mode=rwc", path.display());

        {
            let db = Database::new(&url).await.expect("open");
            db.create_menu_item(&new_item("Pašticada")).await.unwrap();
            sqlx::query("DELETE FROM languages WHERE code = 'hu'")
                .execute(db.pool())
                .await
                .unwrap();
        }

        let db = Database::new(&url).await.expect("reopen");
        assert_eq!(db.list_menu_items().await.unwrap().len(), 1);

        // Seeding only happens on an empty registry
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM languages")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count as usize, DEFAULT_LANGUAGES.len() - 1);
    }

    #[tokio::test]
    async fn test_unreachable_database_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("menu.db");
        let result = Database::new(&format!("sqlite://{}", path.display())).await;
        assert!(result.is_err());
    }

    // ==================== Restaurant Info Tests ====================

    #[tokio::test]
    async fn test_restaurant_info_upsert() {
        let db = create_test_db().await;
        assert!(db.get_restaurant_info().await.unwrap().is_none());

        let mut input = RestaurantInfoInput {
            name: "Konoba Dalmacija".to_string(),
            description: Some("Tradicionalna kuhinja".to_string()),
            address: None,
            phone: Some("+385 21 123 456".to_string()),
            email: None,
        };
        let first = db.save_restaurant_info(&input).await.unwrap();

        input.name = "Konoba Mareta".to_string();
        let second = db.save_restaurant_info(&input).await.unwrap();

        assert_eq!(first.id, second.id);
        let stored = db.get_restaurant_info().await.unwrap().unwrap();
        assert_eq!(stored.name, "Konoba Mareta");
        assert_eq!(stored.phone.as_deref(), Some("+385 21 123 456"));
    }

    // ==================== Menu Item Tests ====================

    #[tokio::test]
    async fn test_create_and_get_menu_item() {
        let db = create_test_db().await;
        let mut item = new_item("Crni rižot");
        item.flags.contains_shellfish = true;
        let created = db.create_menu_item(&item).await.unwrap();

        let fetched = db.get_menu_item(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Crni rižot");
        assert!(fetched.is_available);
        assert!(fetched.flags.contains_shellfish);
        assert!(!fetched.flags.is_vegan);
    }

    #[tokio::test]
    async fn test_update_menu_item_partial() {
        let db = create_test_db().await;
        let created = db.create_menu_item(&new_item("Brudet")).await.unwrap();

        let update = MenuItemUpdate {
            price: Some(22.0),
            is_available: Some(false),
            contains_fish: Some(true),
            ..Default::default()
        };
        let updated = db.update_menu_item(created.id, &update).await.unwrap();

        assert_eq!(updated.name, "Brudet");
        assert!((updated.price - 22.0).abs() < f64::EPSILON);
        assert!(!updated.is_available);
        assert!(updated.flags.contains_fish);

        let fetched = db.get_menu_item(created.id).await.unwrap().unwrap();
        assert!(!fetched.is_available);
        assert!(fetched.flags.contains_fish);
    }

    #[tokio::test]
    async fn test_update_missing_menu_item() {
        let db = create_test_db().await;
        let err = db
            .update_menu_item(999, &MenuItemUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_menu_item_cascades_translations() {
        let db = create_test_db().await;
        let item = db.create_menu_item(&new_item("Pašticada")).await.unwrap();
        db.insert_translations(
            EntityKind::MenuItem,
            vec![
                new_translation(item.id, "en", "Dalmatian stew"),
                new_translation(item.id, "de", "Dalmatinischer Schmorbraten"),
            ],
        )
        .await
        .unwrap();

        db.delete_menu_item(item.id).await.unwrap();

        let remaining = db.list_translations(EntityKind::MenuItem, item.id).await.unwrap();
        assert!(remaining.is_empty());
        assert_eq!(db.count_translations_for_language("en").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_menu_item() {
        let db = create_test_db().await;
        let err = db.delete_menu_item(42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    // ==================== Category Tests ====================

    #[tokio::test]
    async fn test_create_category_appends_order() {
        let db = create_test_db().await;
        let first = db.create_category("HLADNA PREDJELA").await.unwrap();
        let second = db.create_category("TOPLA PREDJELA").await.unwrap();

        assert_eq!(first.sort_order, 0);
        assert_eq!(second.sort_order, 1);

        let names: Vec<_> = db
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["HLADNA PREDJELA", "TOPLA PREDJELA"]);
    }

    #[tokio::test]
    async fn test_create_duplicate_category() {
        let db = create_test_db().await;
        db.create_category("DESERT").await.unwrap();
        let err = db.create_category("DESERT").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_delete_category_cascades_and_detaches_items() {
        let db = create_test_db().await;
        let category = db.create_category("RIBLJA JELA").await.unwrap();
        let mut item = new_item("Brudet");
        item.category = Some("RIBLJA JELA".to_string());
        let item = db.create_menu_item(&item).await.unwrap();

        db.insert_translations(
            EntityKind::Category,
            vec![new_translation(category.id, "en", "Fish dishes")],
        )
        .await
        .unwrap();

        db.delete_category(category.id).await.unwrap();

        assert!(db
            .list_translations(EntityKind::Category, category.id)
            .await
            .unwrap()
            .is_empty());
        let item = db.get_menu_item(item.id).await.unwrap().unwrap();
        assert!(item.category.is_none());
    }

    // ==================== Translation Tests ====================

    #[tokio::test]
    async fn test_insert_translations_returns_records() {
        let db = create_test_db().await;
        let item = db.create_menu_item(&new_item("Fritule")).await.unwrap();

        let (created, conflicts) = db
            .insert_translations(
                EntityKind::MenuItem,
                vec![new_translation(item.id, "en", "Fritters")],
            )
            .await
            .unwrap();

        assert!(conflicts.is_empty());
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].kind, EntityKind::MenuItem);
        assert_eq!(created[0].parent_id, item.id);
        assert!(created[0].is_ai_generated);

        let stored = db.get_translation(EntityKind::MenuItem, created[0].id).await.unwrap();
        assert_eq!(stored, Some(created[0].clone()));
    }

    #[tokio::test]
    async fn test_insert_translations_never_duplicates_a_pair() {
        let db = create_test_db().await;
        let item = db.create_menu_item(&new_item("Fritule")).await.unwrap();

        db.insert_translations(
            EntityKind::MenuItem,
            vec![new_translation(item.id, "en", "Fritters")],
        )
        .await
        .unwrap();

        let (created, conflicts) = db
            .insert_translations(
                EntityKind::MenuItem,
                vec![
                    new_translation(item.id, "en", "Doughnuts"),
                    new_translation(item.id, "it", "Frittelle"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].language_code, "it");
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].language_code, "en");

        let records = db.list_translations(EntityKind::MenuItem, item.id).await.unwrap();
        assert_eq!(records.len(), 2);
        let en = records.iter().find(|r| r.language_code == "en").unwrap();
        assert_eq!(en.name, "Fritters");
    }

    #[tokio::test]
    async fn test_insert_translations_for_missing_parent_fails() {
        let db = create_test_db().await;
        let result = db
            .insert_translations(EntityKind::MenuItem, vec![new_translation(404, "en", "Ghost")])
            .await;
        assert!(matches!(result, Err(AppError::Persistence(_))));
        assert_eq!(db.count_translations_for_language("en").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_batch_insert_rolls_back() {
        let db = create_test_db().await;
        let item = db.create_menu_item(&new_item("Fritule")).await.unwrap();

        let result = db
            .insert_translations(
                EntityKind::MenuItem,
                vec![
                    new_translation(item.id, "en", "Fritters"),
                    new_translation(404, "de", "Geist"),
                ],
            )
            .await;

        assert!(result.is_err());
        assert!(db
            .list_translations(EntityKind::MenuItem, item.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_category_translations_drop_description() {
        let db = create_test_db().await;
        let category = db.create_category("DESERT").await.unwrap();

        let (created, _) = db
            .insert_translations(
                EntityKind::Category,
                vec![new_translation(category.id, "en", "Dessert")],
            )
            .await
            .unwrap();

        assert!(created[0].description.is_none());
        let stored = db
            .get_translation(EntityKind::Category, created[0].id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.description.is_none());
        assert_eq!(stored.name, "Dessert");
    }

    #[tokio::test]
    async fn test_translated_codes() {
        let db = create_test_db().await;
        let item = db.create_menu_item(&new_item("Štrukli")).await.unwrap();
        db.insert_translations(
            EntityKind::MenuItem,
            vec![
                new_translation(item.id, "en", "Strukli"),
                new_translation(item.id, "de", "Strukli"),
            ],
        )
        .await
        .unwrap();

        let codes = db.translated_codes(EntityKind::MenuItem, item.id).await.unwrap();
        assert_eq!(codes.len(), 2);
        assert!(codes.contains("en"));
        assert!(codes.contains("de"));
        assert!(!codes.contains("fr"));
    }

    #[tokio::test]
    async fn test_update_translation_clears_ai_flag() {
        let db = create_test_db().await;
        let item = db.create_menu_item(&new_item("Pašticada")).await.unwrap();
        let (created, _) = db
            .insert_translations(
                EntityKind::MenuItem,
                vec![new_translation(item.id, "en", "Stew")],
            )
            .await
            .unwrap();
        let id = created[0].id;

        let updated = db
            .update_translation(EntityKind::MenuItem, id, None, Some("Slow-cooked beef"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Stew");
        assert_eq!(updated.description.as_deref(), Some("Slow-cooked beef"));
        assert!(!updated.is_ai_generated);

        // A second edit never flips the flag back
        let updated = db
            .update_translation(EntityKind::MenuItem, id, Some("Pašticada stew"), None)
            .await
            .unwrap();
        assert!(!updated.is_ai_generated);

        let stored = db.get_translation(EntityKind::MenuItem, id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Pašticada stew");
        assert!(!stored.is_ai_generated);
    }

    #[tokio::test]
    async fn test_update_category_translation_name() {
        let db = create_test_db().await;
        let category = db.create_category("DESERT").await.unwrap();
        let (created, _) = db
            .insert_translations(
                EntityKind::Category,
                vec![new_translation(category.id, "en", "Dessert")],
            )
            .await
            .unwrap();
        assert!(created[0].description.is_none());

        let updated = db
            .update_translation(EntityKind::Category, created[0].id, Some("Sweets"), None)
            .await
            .unwrap();
        assert_eq!(updated.name, "Sweets");
        assert!(updated.description.is_none());
        assert!(!updated.is_ai_generated);

        let stored = db
            .get_translation(EntityKind::Category, created[0].id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_translation_errors() {
        let db = create_test_db().await;
        let category = db.create_category("DESERT").await.unwrap();
        let (created, _) = db
            .insert_translations(
                EntityKind::Category,
                vec![new_translation(category.id, "en", "Dessert")],
            )
            .await
            .unwrap();

        let err = db
            .update_translation(EntityKind::Category, created[0].id, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = db
            .update_translation(EntityKind::Category, created[0].id, None, Some("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = db
            .update_translation(EntityKind::Category, 999, Some("x"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_translation() {
        let db = create_test_db().await;
        let item = db.create_menu_item(&new_item("Pašticada")).await.unwrap();
        let (created, _) = db
            .insert_translations(
                EntityKind::MenuItem,
                vec![new_translation(item.id, "en", "Stew")],
            )
            .await
            .unwrap();

        db.delete_translation(EntityKind::MenuItem, created[0].id).await.unwrap();
        assert!(db
            .get_translation(EntityKind::MenuItem, created[0].id)
            .await
            .unwrap()
            .is_none());

        let err = db
            .delete_translation(EntityKind::MenuItem, created[0].id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_entities() {
        let db = create_test_db().await;
        db.create_menu_item(&new_item("Pašticada")).await.unwrap();
        db.create_menu_item(&new_item("Fritule")).await.unwrap();
        db.create_category("DESERT").await.unwrap();

        let items = db.list_entities(EntityKind::MenuItem).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|e| e.description.is_some()));

        let categories = db.list_entities(EntityKind::Category).await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "DESERT");
    }
}
