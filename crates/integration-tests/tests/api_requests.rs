use axum::http::{Method, StatusCode};
use integration_tests::{id_of, TestApp, TestResponse};
use serde_json::json;

const PURPOSE: &str = "Fixing the roof gutter this weekend";

async fn submit(app: &TestApp, token: &str, item_id: i64) -> TestResponse {
    app.json(
        Method::POST,
        "/api/requests",
        Some(token),
        json!({ "item_id": item_id, "purpose": PURPOSE }),
    )
    .await
}

#[tokio::test]
async fn approving_a_request_borrows_the_item() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, lender) = app.verified_resident("lender", &admin).await;
    let (borrower_id, borrower) = app.verified_resident("borrower", &admin).await;
    let item_id = app.available_item(&lender, &admin, "Ladder").await;

    let created = submit(&app, &borrower, item_id).await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    assert_eq!(
        created.message(),
        "Request submitted successfully. Waiting for admin approval."
    );
    let request = &created.body["request"];
    assert_eq!(request["status"], "pending");
    assert_eq!(request["requester_id"], borrower_id);
    let request_id = id_of(request);

    let approved = app
        .json(
            Method::PUT,
            &format!("/api/requests/{request_id}/approve"),
            Some(&admin),
            json!({ "remarks": "Return by Sunday" }),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK, "{:?}", approved.body);
    assert_eq!(approved.body["request"]["status"], "approved");
    assert_eq!(approved.body["request"]["remarks"], "Return by Sunday");

    let catalog = app.get("/api/items", Some(&borrower)).await;
    assert_eq!(catalog.body["items"].as_array().unwrap().len(), 0);

    let mine = app.get("/api/requests/my-requests", Some(&borrower)).await;
    let requests = mine.body["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["item_name"], "Ladder");

    let again = app
        .json(
            Method::PUT,
            &format!("/api/requests/{request_id}/approve"),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn borrowed_item_accepts_no_new_requests() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, lender) = app.verified_resident("lender", &admin).await;
    let (_, first) = app.verified_resident("first", &admin).await;
    let (_, late) = app.verified_resident("late", &admin).await;
    let item_id = app.available_item(&lender, &admin, "Ladder").await;

    let request_id = id_of(&submit(&app, &first, item_id).await.body["request"]);
    let approved = app
        .json(Method::PUT, &format!("/api/requests/{request_id}/approve"), Some(&admin), json!({}))
        .await;
    assert_eq!(approved.status, StatusCode::OK);

    let response = submit(&app, &late, item_id).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["fieldErrors"]["item_id"],
        "Item not found or not available"
    );
}

#[tokio::test]
async fn one_pending_request_per_item_and_requester() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, lender) = app.verified_resident("lender", &admin).await;
    let (_, borrower) = app.verified_resident("borrower", &admin).await;
    let item_id = app.available_item(&lender, &admin, "Ladder").await;

    assert_eq!(submit(&app, &borrower, item_id).await.status, StatusCode::CREATED);
    let duplicate = submit(&app, &borrower, item_id).await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn short_purpose_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, lender) = app.verified_resident("lender", &admin).await;
    let (_, borrower) = app.verified_resident("borrower", &admin).await;
    let item_id = app.available_item(&lender, &admin, "Ladder").await;

    let response = app
        .json(
            Method::POST,
            "/api/requests",
            Some(&borrower),
            json!({ "item_id": item_id, "purpose": "need it" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["fieldErrors"].get("purpose").is_some());
}

#[tokio::test]
async fn concurrent_approvals_borrow_the_item_once() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, lender) = app.verified_resident("lender", &admin).await;
    let (_, alice) = app.verified_resident("alice", &admin).await;
    let (_, bob) = app.verified_resident("bob", &admin).await;
    let item_id = app.available_item(&lender, &admin, "Ladder").await;

    let first = id_of(&submit(&app, &alice, item_id).await.body["request"]);
    let second = id_of(&submit(&app, &bob, item_id).await.body["request"]);

    let (app_ref, admin_ref) = (&app, admin.as_str());
    let approve = move |id: i64| async move {
        let uri = format!("/api/requests/{id}/approve");
        app_ref.json(Method::PUT, &uri, Some(admin_ref), json!({})).await
    };
    let (a, b) = tokio::join!(approve(first), approve(second));

    let mut statuses = [a.status, b.status];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT], "{a:?} {b:?}");

    let listing = app.get("/api/requests/admin?status=approved", Some(&admin)).await;
    assert_eq!(listing.body["requests"].as_array().unwrap().len(), 1);
    let pending = app.get("/api/requests/admin?status=pending", Some(&admin)).await;
    assert_eq!(pending.body["requests"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deny_requires_remarks_and_keeps_item_available() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, lender) = app.verified_resident("lender", &admin).await;
    let (_, borrower) = app.verified_resident("borrower", &admin).await;
    let item_id = app.available_item(&lender, &admin, "Ladder").await;
    let request_id = id_of(&submit(&app, &borrower, item_id).await.body["request"]);

    let bare = app
        .json(Method::PUT, &format!("/api/requests/{request_id}/deny"), Some(&admin), json!({}))
        .await;
    assert_eq!(bare.status, StatusCode::BAD_REQUEST);
    assert_eq!(bare.body["fieldErrors"]["remarks"], "Rejection remarks are required");

    let denied = app
        .json(
            Method::PUT,
            &format!("/api/requests/{request_id}/deny"),
            Some(&admin),
            json!({ "remarks": "Item reserved for barangay event" }),
        )
        .await;
    assert_eq!(denied.status, StatusCode::OK, "{:?}", denied.body);
    assert_eq!(denied.body["request"]["status"], "denied");

    let catalog = app.get("/api/items", Some(&borrower)).await;
    assert_eq!(catalog.body["items"].as_array().unwrap().len(), 1);

    // A denied request no longer blocks a fresh one.
    assert_eq!(submit(&app, &borrower, item_id).await.status, StatusCode::CREATED);
}

#[tokio::test]
async fn request_detail_is_limited_to_owner_and_admins() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, lender) = app.verified_resident("lender", &admin).await;
    let (_, borrower) = app.verified_resident("borrower", &admin).await;
    let item_id = app.available_item(&lender, &admin, "Ladder").await;
    let request_id = id_of(&submit(&app, &borrower, item_id).await.body["request"]);
    let uri = format!("/api/requests/{request_id}");

    assert_eq!(app.get(&uri, Some(&borrower)).await.status, StatusCode::OK);
    assert_eq!(app.get(&uri, Some(&admin)).await.status, StatusCode::OK);

    let stranger = app.get(&uri, Some(&lender)).await;
    assert_eq!(stranger.status, StatusCode::FORBIDDEN);
    assert_eq!(stranger.message(), "Access denied");

    let missing = app.get("/api/requests/9999", Some(&admin)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn residents_cannot_decide_requests() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, lender) = app.verified_resident("lender", &admin).await;
    let (_, borrower) = app.verified_resident("borrower", &admin).await;
    let item_id = app.available_item(&lender, &admin, "Ladder").await;
    let request_id = id_of(&submit(&app, &borrower, item_id).await.body["request"]);

    let response = app
        .json(
            Method::PUT,
            &format!("/api/requests/{request_id}/approve"),
            Some(&lender),
            json!({}),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
