use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::sync::Arc;

/// Header carrying the pre-shared key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Paths under these prefixes are documentation and never require a key
const OPEN_PREFIXES: [&str; 2] = ["/openapi", "/scalar"];

/// Immutable allowlist of pre-shared keys, built once at startup
#[derive(Clone, Debug, Default)]
pub struct ApiKeys(Arc<HashSet<String>>);

impl ApiKeys {
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        Self(Arc::new(keys.into_iter().collect()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }
}

/// Rejects requests without a valid key: 401 when the header is missing,
/// 403 when the key is not in the allowlist. Documentation paths pass
/// through unchecked.
pub async fn require_api_key(
    State(keys): State<ApiKeys>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_ascii_lowercase();
    if OPEN_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return next.run(request).await;
    }

    let Some(provided) = request.headers().get(API_KEY_HEADER) else {
        return (
            StatusCode::UNAUTHORIZED,
            "API key is required. Provide it via X-API-Key header.",
        )
            .into_response();
    };

    // A non-UTF-8 header value can never be in the allowlist
    let provided = provided.to_str().unwrap_or_default();
    if !keys.contains(provided) {
        return (StatusCode::FORBIDDEN, "Invalid API key.").into_response();
    }

    next.run(request).await
}
