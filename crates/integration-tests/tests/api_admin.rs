use axum::http::{Method, StatusCode};
use integration_tests::{id_of, TestApp};
use serde_json::json;

#[tokio::test]
async fn health_and_unknown_routes() {
    let app = TestApp::spawn().await;

    let health = app.get("/api/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "OK");

    let missing = app.get("/api/nowhere", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["success"], false);
    assert_eq!(missing.message(), "Route not found");
}

#[tokio::test]
async fn verification_queue_and_detail() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let id = id_of(&app.register_resident("juan").await.body["user"]);
    app.register_resident("maria").await;

    let queue = app.get("/api/admin/verifications", Some(&admin)).await;
    assert_eq!(queue.status, StatusCode::OK);
    assert_eq!(queue.body["users"].as_array().unwrap().len(), 2);

    let detail = app
        .get(&format!("/api/admin/verifications/{id}"), Some(&admin))
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["user"]["username"], "juan");

    let blank = app
        .json(
            Method::PUT,
            &format!("/api/admin/verifications/{id}/reject"),
            Some(&admin),
            json!({ "reason": "   " }),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["fieldErrors"]["reason"], "Rejection reason is required");
}

#[tokio::test]
async fn verification_decisions_apply_only_to_pending_residents() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (id, _) = app.verified_resident("juan", &admin).await;

    let approve_again = app
        .json(
            Method::PUT,
            &format!("/api/admin/verifications/{id}/approve"),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(approve_again.status, StatusCode::CONFLICT);

    let reject_after = app
        .json(
            Method::PUT,
            &format!("/api/admin/verifications/{id}/reject"),
            Some(&admin),
            json!({ "reason": "Too late" }),
        )
        .await;
    assert_eq!(reject_after.status, StatusCode::CONFLICT);

    let unknown = app
        .json(Method::PUT, "/api/admin/verifications/9999/approve", Some(&admin), json!({}))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_reject_residents() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, resident) = app.verified_resident("juan", &admin).await;

    for uri in ["/api/admin/verifications", "/api/admin/dashboard", "/api/admin/users", "/api/admin/admins"] {
        let response = app.get(uri, Some(&resident)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn dashboard_counts_residents_by_status() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    app.verified_resident("approved", &admin).await;
    app.register_resident("waiting").await;
    let denied = id_of(&app.register_resident("denied").await.body["user"]);
    app.json(
        Method::PUT,
        &format!("/api/admin/verifications/{denied}/reject"),
        Some(&admin),
        json!({ "reason": "Documents do not match" }),
    )
    .await;

    let dashboard = app.get("/api/admin/dashboard", Some(&admin)).await;
    assert_eq!(dashboard.status, StatusCode::OK);
    let stats = &dashboard.body["stats"];
    assert_eq!(stats["pendingVerifications"], 1);
    assert_eq!(stats["approvedResidents"], 1);
    assert_eq!(stats["rejectedResidents"], 1);
    assert_eq!(stats["totalResidents"], 3);
    assert_eq!(stats["totalAdmins"], 1);
}

#[tokio::test]
async fn user_listing_filters_and_paginates() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    app.verified_resident("approved", &admin).await;
    app.register_resident("waiting").await;

    let residents = app
        .get("/api/admin/users?role=resident&limit=1", Some(&admin))
        .await;
    assert_eq!(residents.status, StatusCode::OK);
    assert_eq!(residents.body["users"].as_array().unwrap().len(), 1);
    assert_eq!(residents.body["pagination"]["total"], 2);
    assert_eq!(residents.body["pagination"]["pages"], 2);

    let verified = app
        .get("/api/admin/users?role=resident&status=true", Some(&admin))
        .await;
    let users = verified.body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "approved");

    let bogus_role = app.get("/api/admin/users?role=superuser", Some(&admin)).await;
    assert_eq!(bogus_role.status, StatusCode::BAD_REQUEST);
    assert_eq!(bogus_role.body["fieldErrors"]["role"], "Role must be resident or admin");
}

#[tokio::test]
async fn admin_accounts_are_managed_by_admins() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let created = app
        .json(
            Method::POST,
            "/api/admin/create",
            Some(&admin),
            json!({
                "username": "deputy",
                "full_name": "Deputy Admin",
                "email": "deputy@barangaylink.com",
                "password": "Deputy123",
                "contact_number": "09181234567",
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK, "{:?}", created.body);
    assert_eq!(created.body["user"]["role"], "admin");
    assert_eq!(created.body["user"]["is_verified"], true);
    let deputy_id = id_of(&created.body["user"]);

    let deputy = app.login("deputy", "Deputy123").await;
    assert_eq!(deputy.status, StatusCode::OK, "{:?}", deputy.body);

    let admins = app.get("/api/admin/admins", Some(&admin)).await;
    let listed = admins.body["admins"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    let default_id = listed
        .iter()
        .find(|a| a["username"] == "Admin")
        .map(id_of)
        .unwrap();

    let protected = app
        .json(Method::DELETE, &format!("/api/admin/admins/{default_id}"), Some(&admin), json!({}))
        .await;
    assert_eq!(protected.status, StatusCode::FORBIDDEN);
    assert_eq!(protected.message(), "Cannot delete the default admin user");

    let deleted = app
        .json(Method::DELETE, &format!("/api/admin/admins/{deputy_id}"), Some(&admin), json!({}))
        .await;
    assert_eq!(deleted.status, StatusCode::OK, "{:?}", deleted.body);

    let gone = app
        .json(Method::DELETE, &format!("/api/admin/admins/{deputy_id}"), Some(&admin), json!({}))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_overview_searches_and_counts() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (_, lender) = app.verified_resident("lender", &admin).await;
    let (_, borrower) = app.verified_resident("borrower", &admin).await;
    let ladder = app.available_item(&lender, &admin, "Ladder").await;
    let hose = app.available_item(&lender, &admin, "Garden hose").await;

    for item_id in [ladder, hose] {
        let created = app
            .json(
                Method::POST,
                "/api/requests",
                Some(&borrower),
                json!({ "item_id": item_id, "purpose": "Weekend house repairs" }),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    }

    let all = app.get("/api/admin/requests", Some(&admin)).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body["totalCount"], 2);
    assert_eq!(all.body["currentPage"], 1);

    let search = app.get("/api/admin/requests?search=hose", Some(&admin)).await;
    let requests = search.body["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["item_name"], "Garden hose");

    let bad = app.get("/api/admin/requests?status=lost", Some(&admin)).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}
