use axum::http::{Method, StatusCode};
use integration_tests::{id_of, Part, TestApp};
use serde_json::json;

#[tokio::test]
async fn posted_item_is_hidden_until_approved() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (owner_id, owner) = app.verified_resident("lender", &admin).await;

    let created = app
        .multipart(
            Method::POST,
            "/api/items",
            Some(&owner),
            &[
                Part::Text("type", "donation"),
                Part::Text("name", "Rice cooker"),
                Part::Text("condition", "like_new"),
                Part::png("photo"),
            ],
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    let item = &created.body["item"];
    assert_eq!(item["status"], "pending");
    assert_eq!(item["owner_id"], owner_id);
    assert_eq!(item["type"], "donation");
    assert!(item["due_date"].is_null());
    assert!(item["photo"].as_str().unwrap().starts_with("items/"));
    let item_id = id_of(item);

    let catalog = app.get("/api/items", Some(&owner)).await;
    assert_eq!(catalog.body["items"].as_array().unwrap().len(), 0);

    let pending = app.get("/api/items/pending", Some(&admin)).await;
    assert_eq!(pending.status, StatusCode::OK);
    assert_eq!(pending.body["items"].as_array().unwrap().len(), 1);

    let approved = app
        .json(Method::PUT, &format!("/api/items/{item_id}/approve"), Some(&admin), json!({}))
        .await;
    assert_eq!(approved.status, StatusCode::OK, "{:?}", approved.body);
    assert_eq!(approved.message(), "Item approved");

    let catalog = app.get("/api/items", Some(&owner)).await;
    let items = catalog.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["owner_username"], "lender");

    let mine = app.get("/api/items/mine", Some(&owner)).await;
    assert_eq!(mine.body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn lending_item_needs_a_due_date() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, owner) = app.verified_resident("lender", &admin).await;

    let response = app
        .multipart(
            Method::POST,
            "/api/items",
            Some(&owner),
            &[
                Part::Text("type", "lending"),
                Part::Text("name", "Ladder"),
                Part::Text("condition", "good"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["fieldErrors"]["due_date"],
        "Due date is required for lending items"
    );
}

#[tokio::test]
async fn unknown_type_and_condition_are_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, owner) = app.verified_resident("lender", &admin).await;

    let response = app
        .multipart(
            Method::POST,
            "/api/items",
            Some(&owner),
            &[
                Part::Text("type", "rental"),
                Part::Text("name", "Ladder"),
                Part::Text("condition", "good"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["fieldErrors"].get("type").is_some());
}

#[tokio::test]
async fn unverified_residents_cannot_post_items() {
    let app = TestApp::spawn().await;
    let registered = app.register_resident("newcomer").await;
    let token = registered.body["token"].as_str().unwrap().to_string();

    let response = app
        .multipart(
            Method::POST,
            "/api/items",
            Some(&token),
            &[
                Part::Text("type", "donation"),
                Part::Text("name", "Books"),
                Part::Text("condition", "fair"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.message(),
        "Account verification required. Please wait for admin approval."
    );
}

#[tokio::test]
async fn residents_cannot_review_items() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, owner) = app.verified_resident("lender", &admin).await;

    let pending = app.get("/api/items/pending", Some(&owner)).await;
    assert_eq!(pending.status, StatusCode::FORBIDDEN);

    let approve = app
        .json(Method::PUT, "/api/items/1/approve", Some(&owner), json!({}))
        .await;
    assert_eq!(approve.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn item_review_happens_once() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, owner) = app.verified_resident("lender", &admin).await;
    let item_id = app.available_item(&owner, &admin, "Ladder").await;

    let again = app
        .json(Method::PUT, &format!("/api/items/{item_id}/reject"), Some(&admin), json!({}))
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let missing = app
        .json(Method::PUT, "/api/items/9999/approve", Some(&admin), json!({}))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.message(), "Item not found");
}

#[tokio::test]
async fn catalog_filters_by_type_and_search_text() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, owner) = app.verified_resident("lender", &admin).await;
    app.available_item(&owner, &admin, "Folding ladder").await;
    app.available_item(&owner, &admin, "Garden hose").await;

    let ladders = app.get("/api/items?q=ladder", Some(&owner)).await;
    let items = ladders.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Folding ladder");

    let donations = app.get("/api/items?type=donation", Some(&owner)).await;
    assert_eq!(donations.body["items"].as_array().unwrap().len(), 0);

    let bogus = app.get("/api/items?condition=broken", Some(&owner)).await;
    assert_eq!(bogus.status, StatusCode::OK);
    assert_eq!(bogus.body["items"].as_array().unwrap().len(), 0);
}
