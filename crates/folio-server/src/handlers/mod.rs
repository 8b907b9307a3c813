//! HTTP request handlers.

pub(crate) mod pages;

/// Handle GET /healthz.
pub(crate) async fn health() -> &'static str {
    "ok"
}
