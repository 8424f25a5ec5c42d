//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate database queries, sanitization, and the
//! ownership policy.

mod catalog;
mod items;
mod sanitize;
mod users;

pub use catalog::{CatalogService, CategoryWithItems, ItemWithSiblings};
pub use items::{DeletedItem, ItemService};
pub use sanitize::sanitize;
pub use users::UserDirectory;
