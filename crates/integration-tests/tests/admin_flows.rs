//! HTTP tests against a running admin area.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (sw-cli migrate all) at `DATABASE_URL`
//! - The admin server running against it (cargo run -p shelfwise-admin)
//!
//! Admin accounts are created directly through the admin service, then used
//! to sign in over HTTP.
//!
//! Run with: cargo test -p shelfwise-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};

use shelfwise_admin::services::AdminAuthService;
use shelfwise_core::AdminRole;
use shelfwise_integration_tests::{
    admin_base_url, client, location, pool, unique_email, unique_isbn,
};

const PASSWORD: &str = "integration-admin-pass";

/// Create an admin with `role` and sign `client` in as them.
async fn sign_in_as(client: &Client, role: AdminRole) {
    let pool = pool().await;
    let email = unique_email("admin");
    AdminAuthService::new(&pool)
        .create_admin(&email, "Integration Admin", role, PASSWORD)
        .await
        .unwrap();

    let resp = client
        .post(format!("{}/auth/login", admin_base_url()))
        .form(&[("email", email.as_str()), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/"));
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_admin_pages_require_login() {
    let client = client();
    for path in ["/", "/users", "/books", "/admin-users"] {
        let resp = client
            .get(format!("{}{path}", admin_base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "GET {path}");
        assert_eq!(location(&resp).as_deref(), Some("/auth/login"));
    }
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_wrong_password_rerenders_login() {
    let resp = client()
        .post(format!("{}/auth/login", admin_base_url()))
        .form(&[("email", "nobody@test.shelfwise.app"), ("password", "wrong")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Invalid email or password."));
    assert!(body.contains("nobody@test.shelfwise.app"));
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_admin_users_page_is_super_admin_only() {
    let admin = client();
    sign_in_as(&admin, AdminRole::Admin).await;
    let resp = admin
        .get(format!("{}/admin-users", admin_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let super_admin = client();
    sign_in_as(&super_admin, AdminRole::SuperAdmin).await;
    let resp = super_admin
        .get(format!("{}/admin-users", admin_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_add_book_and_reject_duplicate_isbn() {
    let client = client();
    sign_in_as(&client, AdminRole::Admin).await;
    let isbn = unique_isbn();
    let form = [
        ("title", "The Integration Test"),
        ("author", "A. Tester"),
        ("isbn", isbn.as_str()),
        ("page_count", "212"),
    ];

    let resp = client
        .post(format!("{}/books", admin_base_url()))
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&resp).as_deref(),
        Some("/books?success=book_added")
    );

    let resp = client
        .post(format!("{}/books", admin_base_url()))
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("A book with this ISBN is already in the catalog."));
    assert!(body.contains("The Integration Test"));
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_invalid_book_form_keeps_input() {
    let client = client();
    sign_in_as(&client, AdminRole::Admin).await;

    let resp = client
        .post(format!("{}/books", admin_base_url()))
        .form(&[("title", "Bad ISBN"), ("author", "A. Tester"), ("isbn", "12345")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("ISBN must have 10 or 13 digits"));
    assert!(body.contains("Bad ISBN"));
}
