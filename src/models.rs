//! Domain records shared by the database layer, the translation workflow and the API.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// The kinds of entity that can carry translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    MenuItem,
    Category,
}

impl EntityKind {
    /// Table holding this kind's translation records
    pub(crate) fn translation_table(self) -> &'static str {
        match self {
            EntityKind::MenuItem => "menu_item_translations",
            EntityKind::Category => "category_translations",
        }
    }

    /// Foreign key column in the translation table
    pub(crate) fn parent_column(self) -> &'static str {
        match self {
            EntityKind::MenuItem => "menu_item_id",
            EntityKind::Category => "category_id",
        }
    }

    /// Menu items carry a description, categories only a name.
    pub fn has_description(self) -> bool {
        matches!(self, EntityKind::MenuItem)
    }

    /// Path segment used by the HTTP API (`menu-items` / `categories`).
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "menu-items" => Some(EntityKind::MenuItem),
            "categories" => Some(EntityKind::Category),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::MenuItem => "Menu item",
            EntityKind::Category => "Category",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LanguageEntry {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RestaurantInfo {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Default for RestaurantInfo {
    fn default() -> Self {
        Self {
            id: 0,
            name: "Restaurant Menu".to_string(),
            description: Some(String::new()),
            address: Some(String::new()),
            phone: Some(String::new()),
            email: Some(String::new()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantInfoInput {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Allergen and dietary flags of a menu item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct DietaryFlags {
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub contains_gluten: bool,
    pub contains_dairy: bool,
    pub contains_nuts: bool,
    pub contains_fish: bool,
    pub contains_shellfish: bool,
    pub contains_eggs: bool,
    pub is_spicy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MenuItem {
    pub id: i64,
    /// Name in the source language
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub image_path: Option<String>,
    pub is_available: bool,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub flags: DietaryFlags,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuItem {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub image_path: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(flatten)]
    pub flags: DietaryFlags,
}

/// Partial update of a menu item; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image_path: Option<String>,
    pub is_available: Option<bool>,
    pub is_vegetarian: Option<bool>,
    pub is_vegan: Option<bool>,
    pub contains_gluten: Option<bool>,
    pub contains_dairy: Option<bool>,
    pub contains_nuts: Option<bool>,
    pub contains_fish: Option<bool>,
    pub contains_shellfish: Option<bool>,
    pub contains_eggs: Option<bool>,
    pub is_spicy: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub sort_order: i64,
}

/// Source-language text of something that can be translated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatableEntity {
    pub kind: EntityKind,
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl TranslatableEntity {
    pub fn from_menu_item(item: &MenuItem) -> Self {
        Self {
            kind: EntityKind::MenuItem,
            id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
        }
    }

    pub fn from_category(category: &Category) -> Self {
        Self {
            kind: EntityKind::Category,
            id: category.id,
            name: category.name.clone(),
            description: None,
        }
    }
}

/// One persisted translation of one entity into one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationRecord {
    pub id: i64,
    pub kind: EntityKind,
    pub parent_id: i64,
    pub language_code: String,
    /// Registry display name at the time the record was created
    pub language_name: String,
    pub name: String,
    pub description: Option<String>,
    pub is_ai_generated: bool,
}

/// A translation that has been generated but not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTranslation {
    pub parent_id: i64,
    pub language_code: String,
    pub language_name: String,
    pub name: String,
    pub description: Option<String>,
    pub is_ai_generated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItemWithTranslations {
    #[serde(flatten)]
    pub item: MenuItem,
    pub translations: Vec<TranslationRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithTranslations {
    #[serde(flatten)]
    pub category: Category,
    pub translations: Vec<TranslationRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_tables() {
        assert_eq!(EntityKind::MenuItem.translation_table(), "menu_item_translations");
        assert_eq!(EntityKind::Category.translation_table(), "category_translations");
        assert_eq!(EntityKind::MenuItem.parent_column(), "menu_item_id");
        assert_eq!(EntityKind::Category.parent_column(), "category_id");
        assert!(EntityKind::MenuItem.has_description());
        assert!(!EntityKind::Category.has_description());
    }

    #[test]
    fn test_entity_kind_from_path() {
        assert_eq!(EntityKind::from_path("menu-items"), Some(EntityKind::MenuItem));
        assert_eq!(EntityKind::from_path("categories"), Some(EntityKind::Category));
        assert_eq!(EntityKind::from_path("menu_items"), None);
    }

    #[test]
    fn test_new_menu_item_defaults() {
        let item: NewMenuItem =
            serde_json::from_str(r#"{"name": "Pašticada", "price": 18.5}"#).expect("deserialize");
        assert!(item.is_available);
        assert_eq!(item.flags, DietaryFlags::default());
        assert!(item.description.is_none());
    }

    #[test]
    fn test_menu_item_flags_are_flattened() {
        let item = MenuItem {
            id: 1,
            name: "Crni rižot".to_string(),
            description: None,
            price: 14.0,
            category: Some("RIBLJA JELA".to_string()),
            image_path: None,
            is_available: true,
            flags: DietaryFlags {
                contains_shellfish: true,
                ..Default::default()
            },
        };

        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["contains_shellfish"], true);
        assert_eq!(json["is_vegan"], false);
        assert!(json.get("flags").is_none());
    }

    #[test]
    fn test_category_entity_has_no_description() {
        let category = Category {
            id: 3,
            name: "DESERT".to_string(),
            sort_order: 5,
        };
        let entity = TranslatableEntity::from_category(&category);
        assert_eq!(entity.kind, EntityKind::Category);
        assert!(entity.description.is_none());
    }
}
