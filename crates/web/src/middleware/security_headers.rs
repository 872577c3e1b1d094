//! Security headers middleware for XSS, clickjacking, and isolation protection.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

/// Content security policy for server-rendered pages.
///
/// Book covers are hot-linked from arbitrary https hosts, so `img-src`
/// is the only directive that reaches off-site.
const CSP: &str = "default-src 'none'; \
                   script-src 'self'; \
                   style-src 'self'; \
                   font-src 'self'; \
                   img-src 'self' https: data:; \
                   connect-src 'self'; \
                   frame-src 'none'; \
                   object-src 'none'; \
                   base-uri 'self'; \
                   form-action 'self'; \
                   frame-ancestors 'none'";

const PERMISSIONS_POLICY: &str = "accelerometer=(), \
                                  camera=(), \
                                  display-capture=(), \
                                  geolocation=(), \
                                  gyroscope=(), \
                                  microphone=(), \
                                  payment=(), \
                                  usb=()";

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY`
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: same-origin`
/// - `Content-Security-Policy` (see [`CSP`])
/// - `Permissions-Policy` denying device features
/// - `Cache-Control: no-store` unless the handler set its own
/// - `Cross-Origin-Opener-Policy: same-origin`
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("same-origin"));
    headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static(CSP));
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(PERMISSIONS_POLICY),
    );

    // Static files set their own caching
    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{HeaderMap, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;

    async fn headers_for(app: Router) -> HeaderMap {
        let response = app
            .layer(axum::middleware::from_fn(security_headers_middleware))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response.headers().clone()
    }

    #[tokio::test]
    async fn test_headers_applied() {
        let headers = headers_for(Router::new().route("/", get(|| async { "ok" }))).await;

        assert_eq!(headers[X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[CACHE_CONTROL], "no-store, max-age=0");
        assert!(
            headers[CONTENT_SECURITY_POLICY]
                .to_str()
                .unwrap()
                .contains("img-src 'self' https: data:")
        );
    }

    #[tokio::test]
    async fn test_existing_cache_control_kept() {
        let app = Router::new().route(
            "/",
            get(|| async { ([(CACHE_CONTROL, "public, max-age=3600")], "css") }),
        );
        let headers = headers_for(app).await;

        assert_eq!(headers[CACHE_CONTROL], "public, max-age=3600");
    }
}
