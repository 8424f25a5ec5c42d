//! Database tests

use super::*;
use tempfile::TempDir;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

async fn create_test_user(db: &Database) -> User {
    db.insert_user_if_absent("Test User", "test@example.com", "https://example.com/a.png")
        .await
        .unwrap()
}

async fn soccer_category_id(db: &Database) -> i64 {
    db.get_categories()
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Soccer")
        .unwrap()
        .id
}

#[tokio::test]
async fn test_database_connection_seeds_categories() {
    let (db, _temp_dir) = create_test_db().await;

    let categories = db.get_categories().await.unwrap();
    assert!(!categories.is_empty());

    // Seeded set comes back alphabetical
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[tokio::test]
async fn test_user_insert_and_lookup() {
    let (db, _temp_dir) = create_test_db().await;

    let user = create_test_user(&db).await;
    assert_eq!(user.email, "test@example.com");

    let by_email = db.get_user_by_email("test@example.com").await.unwrap();
    assert_eq!(by_email.unwrap().id, user.id);

    let by_id = db.get_user(user.id).await.unwrap();
    assert_eq!(by_id.unwrap().name, "Test User");

    assert!(db.get_user_by_email("absent@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_user_insert_returns_existing_row() {
    let (db, _temp_dir) = create_test_db().await;

    let first = create_test_user(&db).await;
    let second = db
        .insert_user_if_absent("Other Name", "test@example.com", "https://example.com/b.png")
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    // The original registration wins
    assert_eq!(second.name, "Test User");
}

#[tokio::test]
async fn test_item_crud() {
    let (db, _temp_dir) = create_test_db().await;

    let user = create_test_user(&db).await;
    let cat_id = soccer_category_id(&db).await;

    let item = db
        .insert_item("Ball", "A round ball", cat_id, user.id)
        .await
        .unwrap();
    assert!(item.id > 0);

    let retrieved = db.get_item(item.id).await.unwrap().unwrap();
    assert_eq!(retrieved.title, "Ball");
    assert_eq!(retrieved.cat_id, cat_id);
    assert_eq!(retrieved.user_id, user.id);

    // Partial update: only the title changes
    assert!(db.update_item(item.id, Some("New Ball"), None).await.unwrap());
    let updated = db.get_item(item.id).await.unwrap().unwrap();
    assert_eq!(updated.title, "New Ball");
    assert_eq!(updated.description, "A round ball");

    assert!(db.delete_item(item.id).await.unwrap());
    assert!(db.get_item(item.id).await.unwrap().is_none());
    assert!(!db.delete_item(item.id).await.unwrap());
}

#[tokio::test]
async fn test_items_by_category_ordered_by_title() {
    let (db, _temp_dir) = create_test_db().await;

    let user = create_test_user(&db).await;
    let cat_id = soccer_category_id(&db).await;

    db.insert_item("Shin Guards", "", cat_id, user.id).await.unwrap();
    db.insert_item("Ball", "", cat_id, user.id).await.unwrap();
    db.insert_item("Jersey", "", cat_id, user.id).await.unwrap();

    let items = db.get_items_by_category(cat_id).await.unwrap();
    let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Ball", "Jersey", "Shin Guards"]);
}

#[tokio::test]
async fn test_items_by_created_date_truncates_to_limit() {
    let (db, _temp_dir) = create_test_db().await;

    let user = create_test_user(&db).await;
    let cat_id = soccer_category_id(&db).await;

    // Titles deliberately out of creation order
    for title in ["Cleats", "Ball", "Jersey", "Whistle", "Net"] {
        db.insert_item(title, "", cat_id, user.id).await.unwrap();
    }

    let items = db.get_items_by_created_date(3).await.unwrap();
    let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
    // Creation order, not title order, and exactly the limit
    assert_eq!(titles, vec!["Cleats", "Ball", "Jersey"]);
}

#[tokio::test]
async fn test_update_missing_item_reports_no_rows() {
    let (db, _temp_dir) = create_test_db().await;

    assert!(!db.update_item(9999, Some("x"), None).await.unwrap());
}

#[tokio::test]
async fn test_insert_item_rejects_unknown_category() {
    let (db, _temp_dir) = create_test_db().await;

    let user = create_test_user(&db).await;
    let result = db.insert_item("Ball", "", 9999, user.id).await;
    assert!(matches!(result, Err(crate::error::AppError::Database(_))));
}
