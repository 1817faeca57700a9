//! CSRF token middleware
//!
//! Generates a per-request token and carries it explicitly: as a request
//! extension for handlers and as a response header for clients. Never
//! ambient state.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use gatekit_security::csrf::generate_csrf_token;
use gatekit_shared::constants::CSRF_TOKEN_HEADER;

/// The CSRF token attached to the current request.
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

pub async fn attach_csrf_token(mut req: Request, next: Next) -> Response {
    let token = CsrfToken(generate_csrf_token());
    req.extensions_mut().insert(token.clone());

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&token.0) {
        res.headers_mut()
            .insert(HeaderName::from_static(CSRF_TOKEN_HEADER), value);
    }
    res
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request as HttpRequest, middleware::from_fn, routing::get, Extension, Router};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn token_reaches_handler_and_response_header() {
        async fn echo(Extension(token): Extension<CsrfToken>) -> String {
            token.0
        }

        let app = Router::new()
            .route("/", get(echo))
            .layer(from_fn(attach_csrf_token));
        let res = app
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(res.headers().contains_key(CSRF_TOKEN_HEADER));
    }
}
