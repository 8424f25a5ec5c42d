//! Catalog write service
//!
//! Create/update/delete for items. All callers hold an authenticated
//! session; this service additionally enforces the ownership policy.

use std::sync::Arc;

use super::sanitize::sanitize;
use crate::data::{Category, Database, Item};
use crate::error::AppError;

/// Confirmation data returned by a successful delete
#[derive(Debug, Clone)]
pub struct DeletedItem {
    /// The item's former title
    pub title: String,
    /// The category the item belonged to
    pub category: Category,
}

/// Catalog write service
pub struct ItemService {
    db: Arc<Database>,
    /// When true, edit/delete require the acting user to own the item
    restrict_edits_to_owner: bool,
}

impl ItemService {
    /// Create new item service
    pub fn new(db: Arc<Database>, restrict_edits_to_owner: bool) -> Self {
        Self {
            db,
            restrict_edits_to_owner,
        }
    }

    /// Apply the ownership policy to an edit or delete attempt
    ///
    /// Also called by the form pages so a non-owner is refused before
    /// the form renders, not just on submission.
    ///
    /// # Errors
    /// `Forbidden` when the policy restricts edits to the owner and
    /// the acting user is not the owner
    pub fn authorize_edit(&self, item: &Item, acting_user_id: i64) -> Result<(), AppError> {
        if self.restrict_edits_to_owner && item.user_id != acting_user_id {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    /// Create a new item
    ///
    /// Title and description are sanitized before persisting; the
    /// stored values never contain markup.
    ///
    /// # Errors
    /// - `Validation` if the title is empty after sanitization
    /// - `NotFound` if the category does not resolve
    pub async fn create_item(
        &self,
        title: &str,
        description: &str,
        category_id: i64,
        owner_user_id: i64,
    ) -> Result<Item, AppError> {
        let title = sanitize(title.trim());
        let description = sanitize(description);

        if title.is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }

        self.db
            .get_category(category_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let item = self
            .db
            .insert_item(&title, &description, category_id, owner_user_id)
            .await?;

        tracing::info!(item_id = item.id, cat_id = category_id, "Item created");

        Ok(item)
    }

    /// Update an item's title and/or description
    ///
    /// Only supplied non-empty fields are written, each sanitized
    /// identically to creation.
    ///
    /// # Errors
    /// - `NotFound` if the item does not exist
    /// - `Forbidden` if the ownership policy rejects the acting user
    pub async fn update_item(
        &self,
        item_id: i64,
        title: Option<&str>,
        description: Option<&str>,
        acting_user_id: i64,
    ) -> Result<Item, AppError> {
        let item = self.db.get_item(item_id).await?.ok_or(AppError::NotFound)?;
        self.authorize_edit(&item, acting_user_id)?;

        // Empty fields mean "leave unchanged"
        let title = title
            .map(|t| sanitize(t.trim()))
            .filter(|t| !t.is_empty());
        let description = description
            .map(|d| sanitize(d))
            .filter(|d| !d.is_empty());

        self.db
            .update_item(item_id, title.as_deref(), description.as_deref())
            .await?;

        let updated = self.db.get_item(item_id).await?.ok_or(AppError::NotFound)?;

        tracing::info!(item_id, "Item updated");

        Ok(updated)
    }

    /// Delete an item
    ///
    /// # Returns
    /// The former title and owning category for confirmation messaging
    ///
    /// # Errors
    /// - `NotFound` if the item does not exist
    /// - `Forbidden` if the ownership policy rejects the acting user
    pub async fn delete_item(
        &self,
        item_id: i64,
        acting_user_id: i64,
    ) -> Result<DeletedItem, AppError> {
        let item = self.db.get_item(item_id).await?.ok_or(AppError::NotFound)?;
        self.authorize_edit(&item, acting_user_id)?;

        let category = self
            .db
            .get_category(item.cat_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !self.db.delete_item(item_id).await? {
            return Err(AppError::NotFound);
        }

        tracing::info!(item_id, cat_id = category.id, "Item deleted");

        Ok(DeletedItem {
            title: item.title,
            category,
        })
    }
}
