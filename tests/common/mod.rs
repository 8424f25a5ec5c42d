//! Common test utilities for E2E tests

use std::sync::Arc;

use axum::async_trait;
use chrono::{Duration, Utc};
use curio::auth::{IdentityProvider, Profile, ProviderRegistry, Session, create_session_token};
use curio::data::User;
use curio::error::AppError;
use curio::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const TEST_SESSION_SECRET: &str = "test-secret-key-32-bytes-long!!!";

/// Identity provider that never touches the network
pub struct FakeProvider {
    name: &'static str,
    profile: Option<Profile>,
}

impl FakeProvider {
    /// Provider that succeeds with the given profile
    pub fn succeeding(name: &'static str, profile: Profile) -> Self {
        Self {
            name,
            profile: Some(profile),
        }
    }

    /// Provider that fails every exchange
    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            profile: None,
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn exchange_code(&self, _code: &str) -> Result<Profile, AppError> {
        self.profile
            .clone()
            .ok_or_else(|| AppError::Auth("Failed to upgrade the authorization code.".to_string()))
    }

    async fn revoke(&self, _access_token: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// Profile used by the default test providers
pub fn test_profile() -> Profile {
    Profile {
        provider_id: "g-12345".to_string(),
        name: "Test User".to_string(),
        email: "testuser@example.com".to_string(),
        picture: "https://example.com/avatar.png".to_string(),
        access_token: "provider-access-token".to_string(),
    }
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a test server with providers that succeed with
    /// `test_profile()`
    pub async fn new() -> Self {
        let registry = ProviderRegistry::from_providers(vec![
            Arc::new(FakeProvider::succeeding("google", test_profile())),
            Arc::new(FakeProvider::succeeding("facebook", test_profile())),
        ]);
        Self::with_providers(registry).await
    }

    /// Create a test server with explicit providers
    pub async fn with_providers(providers: ProviderRegistry) -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig {
                path: db_path.clone(),
            },
            auth: config::AuthConfig {
                session_secret: TEST_SESSION_SECRET.to_string(),
                session_max_age: 604800,
                google: config::OAuthClientConfig {
                    client_id: "test-google-client-id".to_string(),
                    client_secret: "test-google-client-secret".to_string(),
                },
                facebook: config::OAuthClientConfig {
                    client_id: "test-facebook-client-id".to_string(),
                    client_secret: "test-facebook-client-secret".to_string(),
                },
            },
            catalog: config::CatalogConfig {
                latest_items_limit: 10,
                restrict_edits_to_owner: true,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state with the fake providers
        let state = AppState::with_providers(config, providers).await.unwrap();

        // Create HTTP client; redirects stay visible to assertions
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = curio::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Create a user directly in the database
    pub async fn create_user(&self, name: &str, email: &str) -> User {
        self.state
            .db
            .insert_user_if_absent(name, email, "https://example.com/avatar.png")
            .await
            .unwrap()
    }

    /// Build a `Cookie` header value carrying a valid session for the
    /// given user
    pub fn session_cookie(&self, user: &User) -> String {
        let now = Utc::now();
        let session = Session {
            user_id: user.id,
            username: user.name.clone(),
            email: user.email.clone(),
            picture: user.picture.clone(),
            provider: "google".to_string(),
            provider_user_id: "g-12345".to_string(),
            access_token: "provider-access-token".to_string(),
            created_at: now,
            expires_at: now + Duration::days(7),
        };
        let token = create_session_token(&session, TEST_SESSION_SECRET).unwrap();
        format!("session={}", token)
    }

    /// Resolve a seeded category id by name
    pub async fn category_id(&self, name: &str) -> i64 {
        self.state
            .db
            .get_categories()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("seeded category {name} missing"))
            .id
    }
}
