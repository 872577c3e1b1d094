//! HTTP tests against a running reader site.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (sw-cli migrate all)
//! - The reader site running (cargo run -p shelfwise-web)
//!
//! Run with: cargo test -p shelfwise-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use chrono::{Datelike, Utc};
use reqwest::{Client, StatusCode};

use shelfwise_integration_tests::{client, location, send_with_backoff, unique_email, web_base_url};

/// Register a fresh reader; the client keeps the session cookie.
async fn register(client: &Client) -> String {
    let email = unique_email("reader");
    let resp = post_form(
        client,
        "/auth/register",
        &[
            ("email", email.as_str()),
            ("display_name", "Test Reader"),
            ("password", "correct horse battery"),
            ("password_confirm", "correct horse battery"),
        ],
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp).as_deref(),
        Some("/account?success=registered")
    );
    email
}

async fn post_form(client: &Client, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
    let url = format!("{}{path}", web_base_url());
    send_with_backoff(|| client.post(&url).form(form)).await
}

async fn get_text(client: &Client, path: &str) -> String {
    let resp = client
        .get(format!("{}{path}", web_base_url()))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
    resp.text().await.expect("Failed to read body")
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_health_endpoints() {
    let client = client();
    let base = web_base_url();

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = client
        .get(format!("{base}/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_security_headers_present() {
    let resp = client()
        .get(format!("{}/", web_base_url()))
        .send()
        .await
        .unwrap();

    let headers = resp.headers();
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert!(headers.contains_key("content-security-policy"));
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_protected_pages_redirect_to_login() {
    let client = client();
    for path in ["/account", "/shelf", "/goals", "/friends"] {
        let resp = client
            .get(format!("{}{path}", web_base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "GET {path}");
        assert_eq!(location(&resp).as_deref(), Some("/auth/login"));
    }
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_register_then_duplicate_email_rejected() {
    let first = client();
    let email = register(&first).await;

    let body = get_text(&first, "/account?success=registered").await;
    assert!(body.contains("Welcome to Shelfwise!"));

    let second = client();
    let resp = post_form(
        &second,
        "/auth/register",
        &[
            ("email", email.as_str()),
            ("display_name", "Someone Else"),
            ("password", "another long password"),
            ("password_confirm", "another long password"),
        ],
    )
    .await;
    assert_eq!(
        location(&resp).as_deref(),
        Some("/auth/register?error=email_taken")
    );
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_login_wrong_password() {
    let client = client();
    let email = register(&client).await;
    post_form(&client, "/auth/logout", &[]).await;

    let resp = post_form(
        &client,
        "/auth/login",
        &[("email", email.as_str()), ("password", "not the password")],
    )
    .await;
    assert_eq!(
        location(&resp).as_deref(),
        Some("/auth/login?error=invalid_credentials")
    );
}

// ============================================================================
// Reading goals
// ============================================================================

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_goal_lifecycle_allows_over_achievement() {
    let client = client();
    register(&client).await;
    let year = Utc::now().year().to_string();

    let resp = post_form(&client, "/goals", &[("year", &year), ("target_books", "2")]).await;
    assert_eq!(location(&resp).as_deref(), Some("/goals?success=goal_set"));

    let resp = post_form(&client, "/goals", &[("year", &year), ("target_books", "5")]).await;
    assert_eq!(location(&resp).as_deref(), Some("/goals?error=goal_exists"));

    for _ in 0..3 {
        let resp = post_form(&client, &format!("/goals/{year}/increment"), &[]).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    let body = get_text(&client, "/goals").await;
    assert!(body.contains("<strong>3</strong> of 2 books"));
    assert!(body.contains("150.0% complete"));
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_goal_validation_errors() {
    let client = client();
    register(&client).await;
    let year = Utc::now().year().to_string();

    let resp = post_form(&client, "/goals", &[("year", &year), ("target_books", "0")]).await;
    assert_eq!(location(&resp).as_deref(), Some("/goals?error=invalid_target"));

    let resp = post_form(&client, "/goals", &[("year", &year), ("target_books", "ten")]).await;
    assert_eq!(location(&resp).as_deref(), Some("/goals?error=invalid_form"));

    let resp = post_form(&client, &format!("/goals/{year}/increment"), &[]).await;
    assert_eq!(location(&resp).as_deref(), Some("/goals?error=goal_not_found"));

    post_form(&client, "/goals", &[("year", &year), ("target_books", "4")]).await;
    let resp = post_form(
        &client,
        &format!("/goals/{year}/progress"),
        &[("books_read", "-1")],
    )
    .await;
    assert_eq!(
        location(&resp).as_deref(),
        Some("/goals?error=negative_progress")
    );
}

// ============================================================================
// Bookshelf
// ============================================================================

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_shelving_unknown_book_rejected() {
    let client = client();
    register(&client).await;

    let resp = post_form(
        &client,
        "/shelf",
        &[("book_id", "2147483647"), ("status", "want_to_read")],
    )
    .await;
    assert_eq!(
        location(&resp).as_deref(),
        Some("/shelf?error=book_not_found")
    );
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_status_update_for_unshelved_book_rejected() {
    let client = client();
    register(&client).await;

    let resp = post_form(&client, "/shelf/2147483647/status", &[("status", "read")]).await;
    assert_eq!(location(&resp).as_deref(), Some("/shelf?error=not_on_shelf"));
}
