//! Machine-readable catalog projection

use axum::{Json, Router, extract::State, routing::get};

use super::dto::CatalogResponse;
use crate::AppState;
use crate::error::AppError;
use crate::service::CatalogService;

/// Create JSON API router
///
/// Routes:
/// - GET /catalog.json - Full catalog as nested JSON
pub fn json_router() -> Router<AppState> {
    Router::new().route("/catalog.json", get(catalog_json))
}

/// GET /catalog.json
///
/// The entire catalog as a single object:
/// `{"Category": [{...category fields, "Item": [...item fields]}]}`
async fn catalog_json(State(state): State<AppState>) -> Result<Json<CatalogResponse>, AppError> {
    let catalog = CatalogService::new(state.db.clone()).list_catalog().await?;
    Ok(Json(CatalogResponse::from_catalog(&catalog)))
}
