//! Catalog browsing and mutation pages
//!
//! HTML surface of the application. Mutating routes require a
//! session; unauthenticated requests are redirected to the home page
//! rather than rejected with an error.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Deserialize;

use super::dto::{category_items_path, item_detail_path};
use crate::AppState;
use crate::auth::{MaybeUser, STATE_COOKIE, generate_state_token};
use crate::data::{Category, Item};
use crate::error::AppError;
use crate::service::{CatalogService, ItemService};

/// Create catalog page router
///
/// Routes:
/// - GET / - Landing page (categories + latest items)
/// - GET /catalog/{category}/items - Items of one category
/// - GET /catalog/{category}/{item} - Item detail
/// - GET,POST /catalog/new - Create item
/// - GET,POST /catalog/{item}/edit - Edit item
/// - GET,POST /catalog/{item}/delete - Delete item
pub fn pages_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/catalog/new", get(new_item_form).post(create_item))
        .route("/catalog/:category/items", get(category_items))
        .route("/catalog/:item/edit", get(edit_item_form).post(update_item))
        .route(
            "/catalog/:item/delete",
            get(delete_item_form).post(delete_item),
        )
        .route("/catalog/:category/:item", get(item_detail))
}

fn build_catalog_service(state: &AppState) -> CatalogService {
    CatalogService::new(state.db.clone())
}

fn build_item_service(state: &AppState) -> ItemService {
    ItemService::new(
        state.db.clone(),
        state.config.catalog.restrict_edits_to_owner,
    )
}

// =============================================================================
// HTML rendering
// =============================================================================

fn layout(title: &str, session_hint: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{} - Curio</title></head>\n<body>\n\
         <header><h1><a href=\"/\">Curio Catalog</a></h1>{}</header>\n{}\n</body>\n</html>",
        html_escape::encode_text(title),
        session_hint,
        body
    ))
}

fn session_hint(user: &MaybeUser) -> String {
    match &user.0 {
        Some(session) => format!(
            "<p>Logged in as {} | <a href=\"/logout\">Logout</a></p>",
            html_escape::encode_text(&session.username)
        ),
        None => "<p><a href=\"#gconnect\">Sign in with Google</a> | \
                 <a href=\"#fbconnect\">Sign in with Facebook</a></p>"
            .to_string(),
    }
}

fn category_list_html(categories: &[Category]) -> String {
    let entries: String = categories
        .iter()
        .map(|category| {
            format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                category_items_path(category),
                html_escape::encode_text(&category.name)
            )
        })
        .collect();
    format!("<ul>\n{}</ul>", entries)
}

fn item_list_html(category: &Category, items: &[Item]) -> String {
    let entries: String = items
        .iter()
        .map(|item| {
            format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                item_detail_path(category, item),
                html_escape::encode_text(&item.title)
            )
        })
        .collect();
    format!("<ul>\n{}</ul>", entries)
}

// =============================================================================
// Browsing pages
// =============================================================================

/// GET /
///
/// Landing page: categories alongside the most recent items. Also
/// issues the anti-forgery state cookie consumed by the login
/// endpoints.
async fn home(
    State(state): State<AppState>,
    user: MaybeUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let catalog = build_catalog_service(&state);
    let categories = catalog.list_categories().await?;
    let latest = catalog
        .latest_items(state.config.catalog.latest_items_limit)
        .await?;

    let categories_by_id: std::collections::HashMap<i64, &Category> =
        categories.iter().map(|c| (c.id, c)).collect();
    let latest_html: String = latest
        .iter()
        .map(|item| {
            let link = categories_by_id
                .get(&item.cat_id)
                .map(|category| item_detail_path(category, item))
                .unwrap_or_else(|| format!("/catalog/item/{}?item_id={}", item.urltitle(), item.id));
            format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                link,
                html_escape::encode_text(&item.title)
            )
        })
        .collect();

    let state_token = generate_state_token();
    let body = format!(
        "<div data-oauth-state=\"{}\">\n<h2>Categories</h2>\n{}\n\
         <h2>Latest Items</h2>\n<ul>\n{}</ul>\n\
         <p><a href=\"/catalog/new\">Add Item</a></p>\n</div>",
        html_escape::encode_double_quoted_attribute(&state_token),
        category_list_html(&categories),
        latest_html
    );

    let mut state_cookie = Cookie::new(STATE_COOKIE, state_token);
    state_cookie.set_path("/");
    state_cookie.set_http_only(true);
    state_cookie.set_same_site(SameSite::Lax);
    state_cookie.set_secure(state.config.should_use_secure_cookies());
    let jar = jar.add(state_cookie);

    Ok((jar, layout("Catalog", &session_hint(&user), &body)).into_response())
}

#[derive(Debug, Deserialize)]
struct CategoryIdParam {
    category_id: Option<i64>,
}

/// GET /catalog/{category}/items?category_id=
///
/// The slug in the path is cosmetic; the id query parameter is the
/// lookup key. Missing or unresolved ids are a 404.
async fn category_items(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(_category_slug): Path<String>,
    Query(params): Query<CategoryIdParam>,
) -> Result<Response, AppError> {
    let category_id = params.category_id.ok_or(AppError::NotFound)?;
    let entry = build_catalog_service(&state)
        .items_by_category(category_id)
        .await?;

    let body = format!(
        "<h2>{} Items ({})</h2>\n{}",
        html_escape::encode_text(&entry.category.name),
        entry.items.len(),
        item_list_html(&entry.category, &entry.items)
    );

    Ok(layout(&entry.category.name, &session_hint(&user), &body).into_response())
}

#[derive(Debug, Deserialize)]
struct ItemIdParam {
    item_id: Option<i64>,
}

/// GET /catalog/{category}/{item}?item_id=
async fn item_detail(
    State(state): State<AppState>,
    user: MaybeUser,
    Path((_category_slug, _item_slug)): Path<(String, String)>,
    Query(params): Query<ItemIdParam>,
) -> Result<Response, AppError> {
    let item_id = params.item_id.ok_or(AppError::NotFound)?;
    let resolved = build_catalog_service(&state).item_with_siblings(item_id).await?;

    let body = format!(
        "<h2>{}</h2>\n<p>{}</p>\n\
         <p><a href=\"/catalog/{}/edit?item_id={}\">Edit</a> | \
         <a href=\"/catalog/{}/delete?item_id={}\">Delete</a></p>\n\
         <h3>More in {}</h3>\n{}",
        html_escape::encode_text(&resolved.item.title),
        html_escape::encode_text(&resolved.item.description),
        urlencoding::encode(&resolved.item.urltitle()),
        resolved.item.id,
        urlencoding::encode(&resolved.item.urltitle()),
        resolved.item.id,
        html_escape::encode_text(&resolved.category.name),
        item_list_html(&resolved.category, &resolved.siblings)
    );

    Ok(layout(&resolved.item.title, &session_hint(&user), &body).into_response())
}

// =============================================================================
// Mutation pages
// =============================================================================

#[derive(Debug, Deserialize)]
struct ItemForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    category: Option<i64>,
}

fn item_form_html(action: &str, categories: &[Category], item: Option<&Item>) -> String {
    let options: String = categories
        .iter()
        .map(|category| {
            let selected = if item.map(|i| i.cat_id) == Some(category.id) {
                " selected"
            } else {
                ""
            };
            format!(
                "<option value=\"{}\"{}>{}</option>\n",
                category.id,
                selected,
                html_escape::encode_text(&category.name)
            )
        })
        .collect();

    format!(
        "<form method=\"post\" action=\"{}\">\n\
         <label>Title <input name=\"title\" value=\"{}\"></label><br>\n\
         <label>Description <textarea name=\"description\">{}</textarea></label><br>\n\
         <label>Category <select name=\"category\">\n{}</select></label><br>\n\
         <button type=\"submit\">Save</button>\n</form>",
        action,
        html_escape::encode_double_quoted_attribute(item.map(|i| i.title.as_str()).unwrap_or("")),
        html_escape::encode_text(item.map(|i| i.description.as_str()).unwrap_or("")),
        options
    )
}

/// GET /catalog/new
async fn new_item_form(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(params): Query<CategoryIdParam>,
) -> Result<Response, AppError> {
    if user.0.is_none() {
        return Ok(Redirect::to("/").into_response());
    }

    let catalog = build_catalog_service(&state);
    let categories = catalog.list_categories().await?;

    // A preselected category must resolve
    if let Some(category_id) = params.category_id {
        catalog.items_by_category(category_id).await?;
    }

    let body = format!(
        "<h2>New Item</h2>\n{}",
        item_form_html("/catalog/new", &categories, None)
    );

    Ok(layout("New Item", &session_hint(&user), &body).into_response())
}

/// POST /catalog/new
async fn create_item(
    State(state): State<AppState>,
    user: MaybeUser,
    axum::Form(form): axum::Form<ItemForm>,
) -> Result<Response, AppError> {
    let Some(session) = user.0 else {
        return Ok(Redirect::to("/").into_response());
    };

    let category_id = form
        .category
        .ok_or_else(|| AppError::Validation("category is required".to_string()))?;

    let item = build_item_service(&state)
        .create_item(&form.title, &form.description, category_id, session.user_id)
        .await?;
    let category = state
        .db
        .get_category(item.cat_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Redirect::to(&item_detail_path(&category, &item)).into_response())
}

/// GET /catalog/{item}/edit?item_id=
async fn edit_item_form(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(_item_slug): Path<String>,
    Query(params): Query<ItemIdParam>,
) -> Result<Response, AppError> {
    let Some(session) = user.0.clone() else {
        return Ok(Redirect::to("/").into_response());
    };

    let item_id = params.item_id.ok_or(AppError::NotFound)?;
    let resolved = build_catalog_service(&state).item_with_siblings(item_id).await?;
    build_item_service(&state).authorize_edit(&resolved.item, session.user_id)?;
    let categories = build_catalog_service(&state).list_categories().await?;

    let action = format!(
        "/catalog/{}/edit?item_id={}",
        urlencoding::encode(&resolved.item.urltitle()),
        resolved.item.id
    );
    let body = format!(
        "<h2>Edit {}</h2>\n{}",
        html_escape::encode_text(&resolved.item.title),
        item_form_html(&action, &categories, Some(&resolved.item))
    );

    Ok(layout("Edit Item", &session_hint(&user), &body).into_response())
}

/// POST /catalog/{item}/edit?item_id=
async fn update_item(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(_item_slug): Path<String>,
    Query(params): Query<ItemIdParam>,
    axum::Form(form): axum::Form<ItemForm>,
) -> Result<Response, AppError> {
    let Some(session) = user.0 else {
        return Ok(Redirect::to("/").into_response());
    };

    let item_id = params.item_id.ok_or(AppError::NotFound)?;
    let item = build_item_service(&state)
        .update_item(
            item_id,
            Some(form.title.as_str()),
            Some(form.description.as_str()),
            session.user_id,
        )
        .await?;
    let category = state
        .db
        .get_category(item.cat_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Redirect::to(&item_detail_path(&category, &item)).into_response())
}

/// GET /catalog/{item}/delete?item_id=
async fn delete_item_form(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(_item_slug): Path<String>,
    Query(params): Query<ItemIdParam>,
) -> Result<Response, AppError> {
    let Some(session) = user.0.clone() else {
        return Ok(Redirect::to("/").into_response());
    };

    let item_id = params.item_id.ok_or(AppError::NotFound)?;
    let resolved = build_catalog_service(&state).item_with_siblings(item_id).await?;
    build_item_service(&state).authorize_edit(&resolved.item, session.user_id)?;

    let action = format!(
        "/catalog/{}/delete?item_id={}",
        urlencoding::encode(&resolved.item.urltitle()),
        resolved.item.id
    );
    let body = format!(
        "<h2>Delete {}?</h2>\n\
         <form method=\"post\" action=\"{}\">\n\
         <button type=\"submit\">Confirm Delete</button>\n</form>",
        html_escape::encode_text(&resolved.item.title),
        action
    );

    Ok(layout("Delete Item", &session_hint(&user), &body).into_response())
}

/// POST /catalog/{item}/delete?item_id=
async fn delete_item(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(_item_slug): Path<String>,
    Query(params): Query<ItemIdParam>,
) -> Result<Response, AppError> {
    let Some(session) = user.0 else {
        return Ok(Redirect::to("/").into_response());
    };

    let item_id = params.item_id.ok_or(AppError::NotFound)?;
    let deleted = build_item_service(&state)
        .delete_item(item_id, session.user_id)
        .await?;

    tracing::debug!(
        title = %deleted.title,
        category = %deleted.category.name,
        "Delete confirmed"
    );

    Ok(Redirect::to(&category_items_path(&deleted.category)).into_response())
}
