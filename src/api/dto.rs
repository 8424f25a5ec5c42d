//! API data transfer objects
//!
//! The `/catalog.json` projection nests items under `"Item"` inside
//! each `"Category"` entry.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::{Category, Item};
use crate::service::CategoryWithItems;

/// Full catalog response: `{"Category": [...]}`
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    #[serde(rename = "Category")]
    pub categories: Vec<CategoryJson>,
}

/// One category with its items
#[derive(Debug, Serialize)]
pub struct CategoryJson {
    pub id: i64,
    pub name: String,
    pub urlname: String,
    #[serde(rename = "Item")]
    pub items: Vec<ItemJson>,
}

/// One item
#[derive(Debug, Serialize)]
pub struct ItemJson {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub cat_id: i64,
    pub user_id: i64,
    pub created_date: DateTime<Utc>,
    pub urltitle: String,
}

impl From<&Item> for ItemJson {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            description: item.description.clone(),
            cat_id: item.cat_id,
            user_id: item.user_id,
            created_date: item.created_date,
            urltitle: item.urltitle(),
        }
    }
}

impl From<&CategoryWithItems> for CategoryJson {
    fn from(entry: &CategoryWithItems) -> Self {
        Self {
            id: entry.category.id,
            name: entry.category.name.clone(),
            urlname: entry.category.urlname(),
            items: entry.items.iter().map(ItemJson::from).collect(),
        }
    }
}

impl CatalogResponse {
    pub fn from_catalog(catalog: &[CategoryWithItems]) -> Self {
        Self {
            categories: catalog.iter().map(CategoryJson::from).collect(),
        }
    }
}

/// Item detail URL used by redirects after create/update
pub fn item_detail_path(category: &Category, item: &Item) -> String {
    format!(
        "/catalog/{}/{}?item_id={}",
        urlencoding::encode(&category.urlname()),
        urlencoding::encode(&item.urltitle()),
        item.id
    )
}

/// Category item-list URL used by redirects after delete
pub fn category_items_path(category: &Category) -> String {
    format!(
        "/catalog/{}/items?category_id={}",
        urlencoding::encode(&category.urlname()),
        category.id
    )
}
