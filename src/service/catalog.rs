//! Catalog read service
//!
//! Side-effect-free queries backing the browsing pages and the JSON
//! projection.

use std::sync::Arc;

use crate::data::{Category, Database, Item};
use crate::error::AppError;

/// One category together with its items
#[derive(Debug, Clone)]
pub struct CategoryWithItems {
    pub category: Category,
    pub items: Vec<Item>,
}

/// An item resolved together with its category and the category's
/// other items (for detail-page navigation)
#[derive(Debug, Clone)]
pub struct ItemWithSiblings {
    pub item: Item,
    pub category: Category,
    pub siblings: Vec<Item>,
}

/// Catalog read service
pub struct CatalogService {
    db: Arc<Database>,
}

impl CatalogService {
    /// Create new catalog service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All categories ordered by name
    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.db.get_categories().await
    }

    /// Items for the landing page, ordered by creation date
    ///
    /// The limit is configuration, not derived from other tables.
    pub async fn latest_items(&self, limit: u32) -> Result<Vec<Item>, AppError> {
        self.db.get_items_by_created_date(limit).await
    }

    /// The full catalog: every category ordered by name, each with
    /// its items
    pub async fn list_catalog(&self) -> Result<Vec<CategoryWithItems>, AppError> {
        let categories = self.db.get_categories().await?;

        let mut catalog = Vec::with_capacity(categories.len());
        for category in categories {
            let items = self.db.get_items_by_category(category.id).await?;
            catalog.push(CategoryWithItems { category, items });
        }

        Ok(catalog)
    }

    /// Resolve a category and its items, ordered by title
    ///
    /// # Errors
    /// Returns `NotFound` if the category id does not resolve
    pub async fn items_by_category(
        &self,
        category_id: i64,
    ) -> Result<CategoryWithItems, AppError> {
        let category = self
            .db
            .get_category(category_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let items = self.db.get_items_by_category(category.id).await?;

        Ok(CategoryWithItems { category, items })
    }

    /// Resolve an item plus all items sharing its category
    ///
    /// # Errors
    /// Returns `NotFound` if the item id does not resolve
    pub async fn item_with_siblings(&self, item_id: i64) -> Result<ItemWithSiblings, AppError> {
        let item = self.db.get_item(item_id).await?.ok_or(AppError::NotFound)?;
        let category = self
            .db
            .get_category(item.cat_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let siblings = self.db.get_items_by_category(item.cat_id).await?;

        Ok(ItemWithSiblings {
            item,
            category,
            siblings,
        })
    }
}
