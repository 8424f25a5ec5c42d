//! Login endpoints
//!
//! `POST /gconnect` and `POST /fbconnect` exchange an OAuth
//! authorization code (sent as the request body) for a provider
//! profile and establish the local session. `GET /logout` revokes the
//! provider token best-effort and clears the session.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::AppState;
use crate::auth::{MaybeUser, Profile, SESSION_COOKIE, STATE_COOKIE, Session, create_session_token};
use crate::error::AppError;
use crate::service::UserDirectory;

/// Create login router
///
/// Routes:
/// - POST /gconnect - Google login
/// - POST /fbconnect - Facebook login
/// - GET /logout - Logout
pub fn connect_router() -> Router<AppState> {
    Router::new()
        .route("/gconnect", post(gconnect))
        .route("/fbconnect", post(fbconnect))
        .route("/logout", get(logout))
}

#[derive(Debug, Deserialize)]
struct StateParam {
    state: Option<String>,
}

/// POST /gconnect?state=
async fn gconnect(
    State(state): State<AppState>,
    Query(params): Query<StateParam>,
    user: MaybeUser,
    jar: CookieJar,
    code: String,
) -> Result<Response, AppError> {
    connect(state, params, user, jar, code, "google").await
}

/// POST /fbconnect?state=
async fn fbconnect(
    State(state): State<AppState>,
    Query(params): Query<StateParam>,
    user: MaybeUser,
    jar: CookieJar,
    code: String,
) -> Result<Response, AppError> {
    connect(state, params, user, jar, code, "facebook").await
}

/// Shared login flow
///
/// # Steps
/// 1. Verify the anti-forgery state token against the cookie
/// 2. Exchange the authorization code with the provider
/// 3. Short-circuit if this identity is already logged in
/// 4. Register the user (create-if-absent) and bind the session
async fn connect(
    state: AppState,
    params: StateParam,
    user: MaybeUser,
    jar: CookieJar,
    code: String,
    provider_name: &str,
) -> Result<Response, AppError> {
    verify_state_token(&params, &jar)?;

    let provider = state
        .providers
        .get(provider_name)
        .ok_or_else(|| AppError::Auth(format!("Unknown provider: {provider_name}")))?;

    let profile = provider.exchange_code(code.trim()).await?;

    // Submitting the same token twice must not re-establish anything
    if let Some(session) = &user.0 {
        if session.provider == provider_name && session.provider_user_id == profile.provider_id {
            tracing::debug!(user_id = session.user_id, "User already connected");
            return Ok(
                Json(serde_json::json!("Current user is already connected.")).into_response(),
            );
        }
    }

    let registered = UserDirectory::new(state.db.clone()).register(&profile).await?;

    let session = build_session(&state, provider_name, &profile, registered.id);
    let token = create_session_token(&session, &state.config.auth.session_secret)?;

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(state.config.should_use_secure_cookies());
    let jar = jar.add(cookie);

    tracing::info!(
        user_id = registered.id,
        provider = provider_name,
        "Login established"
    );

    let confirmation = format!("You are now logged in as {}", session.username);
    Ok((jar, Json(serde_json::json!(confirmation))).into_response())
}

fn verify_state_token(params: &StateParam, jar: &CookieJar) -> Result<(), AppError> {
    let supplied = params
        .state
        .as_deref()
        .ok_or_else(|| AppError::Auth("Invalid state parameter.".to_string()))?;
    let expected = jar
        .get(STATE_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or_else(|| AppError::Auth("Invalid state parameter.".to_string()))?;

    if supplied != expected {
        return Err(AppError::Auth("Invalid state parameter.".to_string()));
    }

    Ok(())
}

fn build_session(
    state: &AppState,
    provider_name: &str,
    profile: &Profile,
    user_id: i64,
) -> Session {
    let now = Utc::now();
    Session {
        user_id,
        username: profile.name.clone(),
        email: profile.email.clone(),
        picture: profile.picture.clone(),
        provider: provider_name.to_string(),
        provider_user_id: profile.provider_id.clone(),
        access_token: profile.access_token.clone(),
        created_at: now,
        expires_at: now + Duration::seconds(state.config.auth.session_max_age),
    }
}

/// GET /logout
///
/// Revokes the provider token best-effort, clears the session cookie
/// and redirects home. Logging out without a session is a no-op
/// redirect.
async fn logout(State(state): State<AppState>, user: MaybeUser, jar: CookieJar) -> Response {
    let jar = match user.0 {
        Some(session) => {
            if let Some(provider) = state.providers.get(&session.provider) {
                // Best-effort: revocation failures are logged, not surfaced
                let access_token = session.access_token.clone();
                tokio::spawn(async move {
                    if let Err(error) = provider.revoke(&access_token).await {
                        tracing::warn!(%error, "Token revocation failed");
                    }
                });
            }

            tracing::info!(user_id = session.user_id, "User logged out");
            let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
            jar.remove(removal)
        }
        None => jar,
    };

    (jar, Redirect::to("/")).into_response()
}
