//! E2E tests for item create/edit/delete

mod common;

use common::TestServer;

#[tokio::test]
async fn create_item_persists_and_redirects_to_detail() {
    let server = TestServer::new().await;

    let user = server.create_user("Test User", "testuser@example.com").await;
    let soccer = server.category_id("Soccer").await;

    let response = server
        .client
        .post(server.url("/catalog/new"))
        .header("Cookie", server.session_cookie(&user))
        .form(&[
            ("title", "Ball"),
            ("description", "A round ball"),
            ("category", &soccer.to_string()),
        ])
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    let location = response.headers()["location"].to_str().unwrap();
    assert!(location.starts_with("/catalog/soccer/ball?item_id="));

    let detail = server
        .client
        .get(server.url(location))
        .send()
        .await
        .unwrap();
    assert_eq!(detail.status(), 200);
    assert!(detail.text().await.unwrap().contains("A round ball"));
}

#[tokio::test]
async fn create_item_sanitizes_markup() {
    let server = TestServer::new().await;

    let user = server.create_user("Test User", "testuser@example.com").await;
    let soccer = server.category_id("Soccer").await;

    let response = server
        .client
        .post(server.url("/catalog/new"))
        .header("Cookie", server.session_cookie(&user))
        .form(&[
            ("title", "Ball"),
            ("description", "<script>x</script>"),
            ("category", &soccer.to_string()),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());

    // The stored description carries no script tag
    let items = server.state.db.get_items_by_category(soccer).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Ball");
    assert!(!items[0].description.contains("<script>"));
    assert!(!items[0].description.contains("x</script>"));

    // And the JSON projection lists exactly one sanitized item
    let body: serde_json::Value = server
        .client
        .get(server.url("/catalog.json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let soccer_entry = body["Category"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Soccer")
        .unwrap();
    let json_items = soccer_entry["Item"].as_array().unwrap();
    assert_eq!(json_items.len(), 1);
    assert_eq!(json_items[0]["title"], "Ball");
    assert!(!json_items[0]["description"]
        .as_str()
        .unwrap()
        .contains("<script>"));
}

#[tokio::test]
async fn create_item_with_empty_title_is_rejected() {
    let server = TestServer::new().await;

    let user = server.create_user("Test User", "testuser@example.com").await;
    let soccer = server.category_id("Soccer").await;

    let response = server
        .client
        .post(server.url("/catalog/new"))
        .header("Cookie", server.session_cookie(&user))
        .form(&[
            ("title", ""),
            ("description", "No title"),
            ("category", &soccer.to_string()),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert!(server
        .state
        .db
        .get_items_by_category(soccer)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn write_routes_without_session_redirect_and_do_not_mutate() {
    let server = TestServer::new().await;

    let user = server.create_user("Test User", "testuser@example.com").await;
    let soccer = server.category_id("Soccer").await;
    let item = server
        .state
        .db
        .insert_item("Ball", "A round ball", soccer, user.id)
        .await
        .unwrap();

    // Create without a session
    let response = server
        .client
        .post(server.url("/catalog/new"))
        .form(&[
            ("title", "Sneaky"),
            ("description", ""),
            ("category", &soccer.to_string()),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()["location"].to_str().unwrap(), "/");

    // Edit without a session
    let response = server
        .client
        .post(server.url(&format!("/catalog/ball/edit?item_id={}", item.id)))
        .form(&[("title", "Hacked"), ("description", "")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());

    // Delete without a session
    let response = server
        .client
        .post(server.url(&format!("/catalog/ball/delete?item_id={}", item.id)))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());

    // Nothing changed
    let items = server.state.db.get_items_by_category(soccer).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Ball");
}

#[tokio::test]
async fn update_with_only_title_leaves_description_unchanged() {
    let server = TestServer::new().await;

    let user = server.create_user("Test User", "testuser@example.com").await;
    let soccer = server.category_id("Soccer").await;
    let item = server
        .state
        .db
        .insert_item("Ball", "A round ball", soccer, user.id)
        .await
        .unwrap();

    let response = server
        .client
        .post(server.url(&format!("/catalog/ball/edit?item_id={}", item.id)))
        .header("Cookie", server.session_cookie(&user))
        .form(&[("title", "New Ball"), ("description", "")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());

    let updated = server.state.db.get_item(item.id).await.unwrap().unwrap();
    assert_eq!(updated.title, "New Ball");
    assert_eq!(updated.description, "A round ball");
}

#[tokio::test]
async fn update_sanitizes_supplied_fields() {
    let server = TestServer::new().await;

    let user = server.create_user("Test User", "testuser@example.com").await;
    let soccer = server.category_id("Soccer").await;
    let item = server
        .state
        .db
        .insert_item("Ball", "A round ball", soccer, user.id)
        .await
        .unwrap();

    server
        .client
        .post(server.url(&format!("/catalog/ball/edit?item_id={}", item.id)))
        .header("Cookie", server.session_cookie(&user))
        .form(&[
            ("title", "<b>Bold Ball</b>"),
            ("description", "<img src=x onerror=alert(1)>desc"),
        ])
        .send()
        .await
        .unwrap();

    let updated = server.state.db.get_item(item.id).await.unwrap().unwrap();
    assert_eq!(updated.title, "Bold Ball");
    assert!(!updated.description.contains("onerror"));
    assert!(updated.description.contains("desc"));
}

#[tokio::test]
async fn update_missing_item_is_not_found() {
    let server = TestServer::new().await;

    let user = server.create_user("Test User", "testuser@example.com").await;

    let response = server
        .client
        .post(server.url("/catalog/ball/edit?item_id=99999"))
        .header("Cookie", server.session_cookie(&user))
        .form(&[("title", "x"), ("description", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn delete_item_removes_record_and_redirects_to_category() {
    let server = TestServer::new().await;

    let user = server.create_user("Test User", "testuser@example.com").await;
    let soccer = server.category_id("Soccer").await;
    let item = server
        .state
        .db
        .insert_item("Ball", "A round ball", soccer, user.id)
        .await
        .unwrap();

    let response = server
        .client
        .post(server.url(&format!("/catalog/ball/delete?item_id={}", item.id)))
        .header("Cookie", server.session_cookie(&user))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    let location = response.headers()["location"].to_str().unwrap();
    assert_eq!(
        location,
        format!("/catalog/soccer/items?category_id={soccer}")
    );

    assert!(server.state.db.get_item(item.id).await.unwrap().is_none());

    // Detail page for the deleted item is now a 404
    let response = server
        .client
        .get(server.url(&format!("/catalog/soccer/ball?item_id={}", item.id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Deleting again is a 404
    let response = server
        .client
        .post(server.url(&format!("/catalog/ball/delete?item_id={}", item.id)))
        .header("Cookie", server.session_cookie(&user))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn non_owner_cannot_edit_or_delete_when_policy_restricts() {
    let server = TestServer::new().await;

    let owner = server.create_user("Owner", "owner@example.com").await;
    let other = server.create_user("Other", "other@example.com").await;
    let soccer = server.category_id("Soccer").await;
    let item = server
        .state
        .db
        .insert_item("Ball", "A round ball", soccer, owner.id)
        .await
        .unwrap();

    let response = server
        .client
        .post(server.url(&format!("/catalog/ball/edit?item_id={}", item.id)))
        .header("Cookie", server.session_cookie(&other))
        .form(&[("title", "Taken over"), ("description", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // The forms themselves are refused too, not just the submission
    let response = server
        .client
        .get(server.url(&format!("/catalog/ball/edit?item_id={}", item.id)))
        .header("Cookie", server.session_cookie(&other))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = server
        .client
        .get(server.url(&format!("/catalog/ball/delete?item_id={}", item.id)))
        .header("Cookie", server.session_cookie(&other))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // The owner still gets the edit form
    let response = server
        .client
        .get(server.url(&format!("/catalog/ball/edit?item_id={}", item.id)))
        .header("Cookie", server.session_cookie(&owner))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = server
        .client
        .post(server.url(&format!("/catalog/ball/delete?item_id={}", item.id)))
        .header("Cookie", server.session_cookie(&other))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let unchanged = server.state.db.get_item(item.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Ball");
}
