//! Markup sanitization
//!
//! User-supplied titles and descriptions pass through an allow-list
//! HTML sanitizer before they are persisted. The allow-list is empty:
//! every tag and attribute is stripped, leaving plain text.

/// Tags permitted in user-supplied text. Empty on purpose.
const ALLOWED_TAGS: &[&str] = &[];

/// Strip markup from user-supplied text
///
/// Pure function; the stored value is the sanitized form, so raw
/// input containing markup never reaches the database.
pub fn sanitize(text: &str) -> String {
    let mut builder = ammonia::Builder::default();
    builder.tags(ALLOWED_TAGS.iter().copied().collect());
    builder.clean(text).to_string()
}
