//! API layer
//!
//! HTTP handlers for:
//! - Catalog browsing/mutation pages (HTML)
//! - Catalog JSON projection
//! - Login/logout

mod connect;
mod dto;
mod json;
mod pages;

pub use dto::*;

pub use connect::connect_router;
pub use json::json_router;
pub use pages::pages_router;
