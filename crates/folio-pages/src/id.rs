//! Page identifier normalization.

use crate::source::ResolveError;

/// Turn a raw request path into a page identifier.
///
/// Leading and trailing slashes are trimmed, and an empty path maps to
/// `index_page`. The result is checked with [`check_page_id`].
///
/// # Examples
///
/// ```
/// use folio_pages::normalize_page_id;
///
/// assert_eq!(normalize_page_id("/about/", "index").unwrap(), "about");
/// assert_eq!(normalize_page_id("", "index").unwrap(), "index");
/// assert!(normalize_page_id("../secrets", "index").is_err());
/// ```
pub fn normalize_page_id(raw: &str, index_page: &str) -> Result<String, ResolveError> {
    let trimmed = raw.trim_matches('/');
    let id = if trimmed.is_empty() {
        index_page
    } else {
        trimmed
    };
    check_page_id(id)?;
    Ok(id.to_owned())
}

/// Whether `id` is a well-formed normalized page identifier.
///
/// Every `/`-separated segment must be non-empty, must not be `.` or `..`, and
/// must not contain a backslash or NUL. This keeps identifiers safe to map onto
/// file paths.
#[must_use]
pub fn is_valid_page_id(id: &str) -> bool {
    !id.is_empty()
        && id.split('/').all(|segment| {
            !segment.is_empty()
                && segment != "."
                && segment != ".."
                && !segment.contains(['\\', '\0'])
        })
}

/// Validate a normalized page identifier. See [`is_valid_page_id`].
pub fn check_page_id(id: &str) -> Result<(), ResolveError> {
    if is_valid_page_id(id) {
        Ok(())
    } else {
        Err(ResolveError::InvalidId(id.to_owned()))
    }
}
