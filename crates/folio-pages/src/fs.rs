//! Filesystem page source.
//!
//! Maps page identifiers onto YAML files in a pages directory:
//!
//! ```text
//! {pages_dir}/
//! +-- index.yaml          # "index"
//! +-- about.yml           # "about"
//! +-- docs/
//!     +-- install.yaml    # "docs/install"
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::definition::PageDefinition;
use crate::id::check_page_id;
use crate::source::{PageSource, ResolveError};

/// Extensions tried in order for each identifier.
const EXTENSIONS: &[&str] = &["yaml", "yml"];

/// [`PageSource`] reading one YAML definition file per page.
#[derive(Clone, Debug)]
pub struct FsPageSource {
    pages_dir: PathBuf,
}

impl FsPageSource {
    #[must_use]
    pub fn new(pages_dir: PathBuf) -> Self {
        Self { pages_dir }
    }

    /// Root directory of the definition files.
    #[must_use]
    pub fn pages_dir(&self) -> &Path {
        &self.pages_dir
    }

    /// Read the first candidate file that exists.
    async fn read_definition(&self, id: &str) -> Result<(PathBuf, String), ResolveError> {
        for ext in EXTENSIONS {
            let path = self.pages_dir.join(format!("{id}.{ext}"));
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => return Ok((path, content)),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(ResolveError::Io { path, source }),
            }
        }
        Err(ResolveError::NotFound(id.to_owned()))
    }
}

#[async_trait]
impl PageSource for FsPageSource {
    async fn resolve(&self, id: &str) -> Result<PageDefinition, ResolveError> {
        check_page_id(id)?;

        let (path, content) = self.read_definition(id).await?;
        let definition: PageDefinition =
            serde_yaml::from_str(&content).map_err(|source| ResolveError::Parse {
                path: path.clone(),
                source,
            })?;
        definition.validate(id)?;

        tracing::debug!(page = %id, path = %path.display(), "Loaded page definition");
        Ok(definition)
    }
}
