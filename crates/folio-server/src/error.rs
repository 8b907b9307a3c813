//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use folio_site::BuildError;
use folio_view::escape_html;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// No page exists at the requested path.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// The page exists but could not be built.
    #[error("Build error: {0}")]
    Build(BuildError),
}

impl From<BuildError> for ServerError {
    fn from(e: BuildError) -> Self {
        match e {
            BuildError::NotFound(id) => Self::PageNotFound(id),
            other => Self::Build(other),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::PageNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Page not found: {}", escape_html(id)),
            ),
            Self::Build(e) => {
                // Details stay in the log
                tracing::error!(error = %e, "Failed to build page");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The page could not be built.".to_owned(),
                )
            }
        };

        let reason = status.canonical_reason().unwrap_or_default();
        let body = format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n\
             <title>{code} {reason}</title>\n</head>\n<body>\n<h1>{code} {reason}</h1>\n\
             <p>{message}</p>\n</body>\n</html>\n",
            code = status.as_u16(),
        );

        (status, Html(body)).into_response()
    }
}
