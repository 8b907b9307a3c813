use folio_pages::ResolveError;

/// Error returned when a page cannot be built.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No definition exists for the identifier, or the identifier is
    /// malformed. Callers map this to "not found" rather than a server error.
    #[error("Page not found: {0}")]
    NotFound(String),
    /// The definition exists but could not be loaded or is invalid.
    #[error(transparent)]
    Resolve(ResolveError),
}

impl BuildError {
    /// Whether this error means the page does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<ResolveError> for BuildError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::NotFound(id) | ResolveError::InvalidId(id) => Self::NotFound(id),
            other => Self::Resolve(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_resolve_error() {
        assert!(BuildError::from(ResolveError::NotFound("a".to_owned())).is_not_found());
        assert!(BuildError::from(ResolveError::InvalidId("..".to_owned())).is_not_found());

        let err = BuildError::from(ResolveError::Invalid {
            id: "a".to_owned(),
            reason: "title cannot be empty".to_owned(),
        });
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Invalid page definition for a: title cannot be empty"
        );
    }
}
