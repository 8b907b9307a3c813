//! Page endpoints.
//!
//! Serve complete HTML documents built by the page assembler, with `ETag`
//! revalidation.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use md5::{Digest, Md5};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET / (index page).
pub(crate) async fn get_index_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    serve_page("", &state, &headers).await
}

/// Handle GET /{*page}.
pub(crate) async fn get_page(
    Path(page): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    serve_page(&page, &state, &headers).await
}

async fn serve_page(
    path: &str,
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let page = state.assembler.build_page(path).await?;
    tracing::debug!(page = %page.id, from_cache = page.from_cache, "Serving page");

    let etag = compute_etag(&state.version, &page.html);

    // Conditional request: client already has this version
    if headers
        .get(header::IF_NONE_MATCH)
        .is_some_and(|value| etag_matches(value, &etag))
    {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
        ],
        Html(page.html),
    )
        .into_response())
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars) - sufficient for
/// cache revalidation with negligible collision probability.
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}

/// Whether an `If-None-Match` value matches `etag`.
///
/// Accepts `*`, a comma-separated list, and weak validators (`W/"..."`).
fn etag_matches(if_none_match: &HeaderValue, etag: &str) -> bool {
    let Ok(value) = if_none_match.to_str() else {
        return false;
    };
    value.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}
