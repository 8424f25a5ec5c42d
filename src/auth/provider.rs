//! Identity providers
//!
//! OAuth token exchange is delegated to the providers over HTTP and
//! modeled behind the `IdentityProvider` trait so the login flow can
//! be exercised without network access.

use std::collections::HashMap;
use std::sync::Arc;

use axum::async_trait;
use serde::Deserialize;

use crate::config::OAuthClientConfig;
use crate::error::AppError;

/// Provider-scoped identity established by a successful token exchange
#[derive(Debug, Clone)]
pub struct Profile {
    /// Provider-scoped user ID
    pub provider_id: String,
    pub name: String,
    pub email: String,
    pub picture: String,
    /// Access token obtained from the exchange, kept for revocation
    pub access_token: String,
}

/// External identity provider capability
///
/// `exchange_code` turns an OAuth authorization code into the
/// provider's user profile. `revoke` invalidates an access token at
/// logout; callers treat it as best-effort.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider selector ("google" or "facebook")
    fn name(&self) -> &'static str;

    /// Exchange an authorization code for the provider's user profile
    ///
    /// # Errors
    /// Returns `AppError::Auth` when the exchange fails or when the
    /// token was issued for a different client ID.
    async fn exchange_code(&self, code: &str) -> Result<Profile, AppError>;

    /// Revoke an access token
    async fn revoke(&self, access_token: &str) -> Result<(), AppError>;
}

/// Resolves a provider selector to its implementation
pub struct ProviderRegistry {
    providers: HashMap<&'static str, Arc<dyn IdentityProvider>>,
}

impl ProviderRegistry {
    /// Build the registry with the real Google and Facebook providers
    pub fn new(
        http_client: Arc<reqwest::Client>,
        google: OAuthClientConfig,
        facebook: OAuthClientConfig,
    ) -> Self {
        let providers: Vec<Arc<dyn IdentityProvider>> = vec![
            Arc::new(GoogleProvider::new(http_client.clone(), google)),
            Arc::new(FacebookProvider::new(http_client, facebook)),
        ];
        Self::from_providers(providers)
    }

    /// Build a registry from explicit providers (used by tests)
    pub fn from_providers(providers: Vec<Arc<dyn IdentityProvider>>) -> Self {
        Self {
            providers: providers.into_iter().map(|p| (p.name(), p)).collect(),
        }
    }

    /// Look up a provider by selector
    pub fn get(&self, name: &str) -> Option<Arc<dyn IdentityProvider>> {
        self.providers.get(name).cloned()
    }
}

// =============================================================================
// Google
// =============================================================================

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_TOKENINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/tokeninfo";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo";
const GOOGLE_REVOKE_URL: &str = "https://accounts.google.com/o/oauth2/revoke";

/// Google OAuth provider
pub struct GoogleProvider {
    http_client: Arc<reqwest::Client>,
    config: OAuthClientConfig,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    user_id: String,
    /// Client ID the token was issued to
    issued_to: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    name: String,
    email: String,
    #[serde(default)]
    picture: String,
}

impl GoogleProvider {
    pub fn new(http_client: Arc<reqwest::Client>, config: OAuthClientConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn exchange_code(&self, code: &str) -> Result<Profile, AppError> {
        // 1. Exchange the authorization code for an access token
        let token_response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("redirect_uri", "postmessage"),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !token_response.status().is_success() {
            return Err(AppError::Auth(
                "Failed to upgrade the authorization code.".to_string(),
            ));
        }

        let token: GoogleTokenResponse = token_response
            .json()
            .await
            .map_err(|_| AppError::Auth("Malformed token response.".to_string()))?;

        // 2. Verify the token audience matches our client ID
        let token_info: GoogleTokenInfo = self
            .http_client
            .get(GOOGLE_TOKENINFO_URL)
            .query(&[("access_token", token.access_token.as_str())])
            .send()
            .await?
            .json()
            .await
            .map_err(|_| AppError::Auth("Malformed tokeninfo response.".to_string()))?;

        if token_info.issued_to != self.config.client_id {
            return Err(AppError::Auth(
                "Token's client ID does not match app's.".to_string(),
            ));
        }

        // 3. Fetch the user profile
        let user_info: GoogleUserInfo = self
            .http_client
            .get(GOOGLE_USERINFO_URL)
            .query(&[
                ("access_token", token.access_token.as_str()),
                ("alt", "json"),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|_| AppError::Auth("Malformed userinfo response.".to_string()))?;

        Ok(Profile {
            provider_id: token_info.user_id,
            name: user_info.name,
            email: user_info.email,
            picture: user_info.picture,
            access_token: token.access_token,
        })
    }

    async fn revoke(&self, access_token: &str) -> Result<(), AppError> {
        let response = self
            .http_client
            .get(GOOGLE_REVOKE_URL)
            .query(&[("token", access_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Auth(
                "Failed to revoke token for given user.".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Facebook
// =============================================================================

const FACEBOOK_GRAPH_URL: &str = "https://graph.facebook.com/v12.0";

/// Facebook OAuth provider
pub struct FacebookProvider {
    http_client: Arc<reqwest::Client>,
    config: OAuthClientConfig,
}

#[derive(Debug, Deserialize)]
struct FacebookTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct FacebookUserInfo {
    id: String,
    name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct FacebookPicture {
    data: FacebookPictureData,
}

#[derive(Debug, Deserialize)]
struct FacebookPictureData {
    url: String,
}

impl FacebookProvider {
    pub fn new(http_client: Arc<reqwest::Client>, config: OAuthClientConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[async_trait]
impl IdentityProvider for FacebookProvider {
    fn name(&self) -> &'static str {
        "facebook"
    }

    async fn exchange_code(&self, code: &str) -> Result<Profile, AppError> {
        // 1. Exchange the short-lived token for a long-lived one
        let token_response = self
            .http_client
            .get(format!("{}/oauth/access_token", FACEBOOK_GRAPH_URL))
            .query(&[
                ("grant_type", "fb_exchange_token"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("fb_exchange_token", code),
            ])
            .send()
            .await?;

        if !token_response.status().is_success() {
            return Err(AppError::Auth(
                "Failed to upgrade the authorization code.".to_string(),
            ));
        }

        let token: FacebookTokenResponse = token_response
            .json()
            .await
            .map_err(|_| AppError::Auth("Malformed token response.".to_string()))?;

        // 2. Fetch the user profile
        let user_info: FacebookUserInfo = self
            .http_client
            .get(format!("{}/me", FACEBOOK_GRAPH_URL))
            .query(&[
                ("access_token", token.access_token.as_str()),
                ("fields", "name,id,email"),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|_| AppError::Auth("Malformed userinfo response.".to_string()))?;

        // 3. The picture comes from a separate Graph endpoint
        let picture: FacebookPicture = self
            .http_client
            .get(format!("{}/me/picture", FACEBOOK_GRAPH_URL))
            .query(&[
                ("access_token", token.access_token.as_str()),
                ("redirect", "0"),
                ("height", "200"),
                ("width", "200"),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|_| AppError::Auth("Malformed picture response.".to_string()))?;

        Ok(Profile {
            provider_id: user_info.id,
            name: user_info.name,
            email: user_info.email,
            picture: picture.data.url,
            access_token: token.access_token,
        })
    }

    async fn revoke(&self, access_token: &str) -> Result<(), AppError> {
        let response = self
            .http_client
            .delete(format!("{}/me/permissions", FACEBOOK_GRAPH_URL))
            .query(&[("access_token", access_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Auth(
                "Failed to revoke token for given user.".to_string(),
            ));
        }

        Ok(())
    }
}
