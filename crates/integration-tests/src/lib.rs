//! Integration tests for Shelfwise.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate a scratch database
//! DATABASE_URL=postgres://... cargo run -p shelfwise-cli -- migrate all
//!
//! # Start both servers, then run the ignored tests
//! cargo test -p shelfwise-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `web_flows` - HTTP tests against a running reader site
//! - `admin_flows` - HTTP tests against a running admin area
//! - `repositories` - `sqlx` tests against a migrated database
//!
//! Every test that needs a server or database is `#[ignore]`d so a plain
//! `cargo test` stays hermetic.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::SecretString;
use sqlx::PgPool;

/// Base URL of the reader site (`WEB_BASE_URL`, default `http://localhost:3000`).
#[must_use]
pub fn web_base_url() -> String {
    dotenvy::dotenv().ok();
    std::env::var("WEB_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Base URL of the admin area (`ADMIN_BASE_URL`, default `http://localhost:3001`).
#[must_use]
pub fn admin_base_url() -> String {
    dotenvy::dotenv().ok();
    std::env::var("ADMIN_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3001".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// HTTP client with a cookie jar that does not follow redirects, so tests
/// can assert on `Location` headers.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Send a request, waiting out `429 Too Many Requests` from the auth rate
/// limiter (a burst of five, then one request every six seconds per IP).
///
/// # Panics
///
/// Panics if the request cannot be sent.
pub async fn send_with_backoff(build: impl Fn() -> RequestBuilder) -> Response {
    for _ in 0..5 {
        let resp = build().send().await.expect("Request failed");
        if resp.status() != StatusCode::TOO_MANY_REQUESTS {
            return resp;
        }
        tokio::time::sleep(Duration::from_secs(6)).await;
    }
    build().send().await.expect("Request failed")
}

/// Connect to the test database (`DATABASE_URL`).
///
/// # Panics
///
/// Panics if `DATABASE_URL` is unset or the connection fails.
pub async fn pool() -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    shelfwise_web::db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database")
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.shelfwise.app", uuid::Uuid::new_v4().simple())
}

/// An ISBN-13 shaped string unlikely to collide between runs.
#[must_use]
pub fn unique_isbn() -> String {
    let n = uuid::Uuid::new_v4().as_u128() % 10_000_000_000;
    format!("979{n:010}")
}

/// The `Location` header of a redirect response.
#[must_use]
pub fn location(resp: &Response) -> Option<String> {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
