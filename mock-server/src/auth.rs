//! Bearer token and `X-Signature` verification.
//!
//! GET requests are signed over the raw path and query exactly as received;
//! every other method is signed over the raw request body.

use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;
use zenzap_core::signing;

use crate::{AppState, ErrorResponse};

pub async fn require_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, raw_body) = request.into_parts();

    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if bearer != Some(state.config.api_key.as_str()) {
        debug!(path = %parts.uri, "rejected: bad bearer token");
        return unauthorized("invalid API key");
    }

    let Some(signature) = parts
        .headers
        .get("x-signature")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
    else {
        return unauthorized("missing signature");
    };

    let bytes = match body::to_bytes(raw_body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return ErrorResponse::bad_request("unreadable body").into_response(),
    };

    let payload: &[u8] = if parts.method == Method::GET {
        parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().as_bytes())
            .unwrap_or_default()
    } else {
        &bytes
    };

    if !signing::verify(&state.config.secret, payload, &signature) {
        debug!(method = %parts.method, path = %parts.uri, "rejected: signature mismatch");
        return unauthorized("invalid signature");
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn unauthorized(message: &str) -> Response {
    ErrorResponse::new(StatusCode::UNAUTHORIZED, message).into_response()
}
