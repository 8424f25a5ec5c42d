//! User directory
//!
//! Maps provider identities to local user records.

use std::sync::Arc;

use crate::auth::Profile;
use crate::data::{Database, User};
use crate::error::AppError;

/// User directory service
pub struct UserDirectory {
    db: Arc<Database>,
}

impl UserDirectory {
    /// Create new user directory
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Look up a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.db.get_user_by_email(email).await
    }

    /// Create a user from a provider profile
    ///
    /// The UNIQUE(email) constraint makes concurrent duplicate
    /// creation safe; the existing row is returned in that case.
    pub async fn create(&self, profile: &Profile) -> Result<User, AppError> {
        self.db
            .insert_user_if_absent(&profile.name, &profile.email, &profile.picture)
            .await
    }

    /// Register a logged-in identity: look up by email, create if
    /// absent
    ///
    /// # Returns
    /// The local user to bind into the session
    pub async fn register(&self, profile: &Profile) -> Result<User, AppError> {
        if let Some(user) = self.find_by_email(&profile.email).await? {
            return Ok(user);
        }

        let user = self.create(profile).await?;
        tracing::info!(user_id = user.id, "New user registered");

        Ok(user)
    }
}
