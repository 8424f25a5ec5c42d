//! Third-party authentication
//!
//! Handles:
//! - Identity providers (Google, Facebook OAuth)
//! - Session management (signed cookies)
//! - Session extractors

mod middleware;
mod provider;
pub mod session;

pub use middleware::{MaybeUser, SESSION_COOKIE, STATE_COOKIE};
pub use provider::{
    FacebookProvider, GoogleProvider, IdentityProvider, Profile, ProviderRegistry,
};
pub use session::{Session, create_session_token, generate_state_token, verify_session_token};
