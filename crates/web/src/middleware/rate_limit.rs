//! Rate limiting middleware using governor and `tower_governor`.
//!
//! - `auth_rate_limiter`: Strict limits for login and registration (~10/min)
//! - `form_rate_limiter`: Relaxed limits for other form posts (~60/min)

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers checked for the real client IP, in order.
const CLIENT_IP_HEADERS: &[&str] = &["x-forwarded-for", "x-real-ip"];

/// Key extractor that reads the client IP from reverse proxy headers,
/// falling back to the peer address.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        client_ip_from_headers(req.headers())
            .or_else(|| {
                req.extensions()
                    .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
                    .map(|info| info.0.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// First parseable client IP in the proxy headers.
///
/// For `X-Forwarded-For` the left-most entry is the original client.
fn client_ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Replenishes 1 token every 6 seconds with a burst of 5.
///
/// # Panics
///
/// Never panics: `per_second(6)` and `burst_size(5)` are always accepted by
/// `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Create rate limiter for other form posts: ~60 requests per minute per IP.
///
/// # Panics
///
/// Never panics: `per_second(1)` and `burst_size(30)` are always accepted by
/// `GovernorConfigBuilder`.
#[must_use]
pub fn form_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(1)
        .burst_size(30)
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(30) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_forwarded_for_uses_first_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(
            client_ip_from_headers(&headers),
            Some("203.0.113.7".parse().unwrap())
        );
    }

    #[test]
    fn test_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("garbage"));
        headers.insert("x-real-ip", HeaderValue::from_static("2001:db8::1"));
        assert_eq!(
            client_ip_from_headers(&headers),
            Some("2001:db8::1".parse().unwrap())
        );
    }

    #[test]
    fn test_no_headers() {
        assert_eq!(client_ip_from_headers(&HeaderMap::new()), None);
    }
}
