//! Data models
//!
//! Rust structs representing database entities. IDs are SQLite
//! rowids (i64); timestamps use chrono.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// User
// =============================================================================

/// A local user record, created on first successful OAuth login
///
/// The email address acts as the login key; users are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Avatar URL from the identity provider
    pub picture: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Category
// =============================================================================

/// A named grouping of items
///
/// Categories have no management routes; the set is fixed by migration.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

impl Category {
    /// URL-safe slug derived from the category name
    pub fn urlname(&self) -> String {
        slugify(&self.name)
    }
}

// =============================================================================
// Item
// =============================================================================

/// A user-submitted catalog entry
///
/// Belongs to exactly one category and one creating user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Owning category
    pub cat_id: i64,
    /// Creating user
    pub user_id: i64,
    pub created_date: DateTime<Utc>,
}

impl Item {
    /// URL-safe slug derived from the item title
    pub fn urltitle(&self) -> String {
        slugify(&self.title)
    }
}

/// Derive a URL-safe slug from a display name
///
/// Lowercases the input and collapses every run of non-alphanumeric
/// characters into a single hyphen, trimming hyphens at both ends.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_separator = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Rock Climbing"), "rock-climbing");
        assert_eq!(slugify("Soccer"), "soccer");
    }

    #[test]
    fn slugify_collapses_symbol_runs() {
        assert_eq!(slugify("Ball -- (new!)"), "ball-new");
    }

    #[test]
    fn slugify_trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  Shin Guards  "), "shin-guards");
        assert_eq!(slugify("!!!"), "");
    }
}
