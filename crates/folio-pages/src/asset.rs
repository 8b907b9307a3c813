//! Asset import classification.

/// Kind of tag an asset import turns into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    /// `.css` file, emitted as `<link rel="stylesheet">` in the head.
    Stylesheet,
    /// `.js` file, emitted as `<script src>` at the end of the body.
    Script,
}

impl AssetKind {
    /// Classify an import path by extension.
    ///
    /// Any `?query` or `#fragment` suffix is ignored, so cache-busting URLs
    /// like `/app.js?v=3` still classify. Returns `None` for unrecognized
    /// extensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_pages::AssetKind;
    ///
    /// assert_eq!(AssetKind::classify("site.css"), Some(AssetKind::Stylesheet));
    /// assert_eq!(AssetKind::classify("/app.js?v=3"), Some(AssetKind::Script));
    /// assert_eq!(AssetKind::classify("logo.svg"), None);
    /// ```
    #[must_use]
    #[allow(clippy::case_sensitive_file_extension_comparisons)]
    pub fn classify(path: &str) -> Option<Self> {
        let end = path.find(['?', '#']).unwrap_or(path.len());
        let path = &path[..end];

        if path.ends_with(".css") {
            Some(Self::Stylesheet)
        } else if path.ends_with(".js") {
            Some(Self::Script)
        } else {
            None
        }
    }
}
