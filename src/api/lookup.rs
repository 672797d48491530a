//! Server-side option lists, loaded once per service instance.
//!
//! Each list is fetched on first use and reused thereafter; a failed fetch
//! leaves the cell empty so the next call tries again.

use regex::Regex;
use std::sync::LazyLock;
use tokio::sync::OnceCell;

use crate::error::Result;

use super::types::ServerFile;
use super::PreingestApi;

/// Prewash transformations; a leading underscore marks a helper.
static PREWASH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[^_].+\.xslt$").expect("PREWASH_PATTERN must compile"));

/// OPEX polishing stylesheets.
static POLISH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[^_].+\.xsl$").expect("POLISH_PATTERN must compile"));

/// Stylesheets and schemas offered for the prewash, polish and validation
/// settings.
#[derive(Debug, Default)]
pub struct LookupCache {
    prewash: OnceCell<Vec<String>>,
    polish: OnceCell<Vec<String>>,
    schemas: OnceCell<Vec<String>>,
}

impl LookupCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted XSLT stylesheets usable for prewash transformations.
    ///
    /// Skips helper transformations (leading underscore) and stray files
    /// like `Thumbs.db`.
    pub async fn prewash_stylesheets(&self, api: &dyn PreingestApi) -> Result<&[String]> {
        let list = self
            .prewash
            .get_or_try_init(|| async {
                let files = api.list_stylesheets().await?;
                Ok::<_, crate::error::PreingestError>(filter_sorted(&files, &PREWASH_PATTERN))
            })
            .await?;
        Ok(list.as_slice())
    }

    /// Sorted XSL stylesheets usable for polishing OPEX output.
    pub async fn polish_stylesheets(&self, api: &dyn PreingestApi) -> Result<&[String]> {
        let list = self
            .polish
            .get_or_try_init(|| async {
                let files = api.list_stylesheets().await?;
                Ok::<_, crate::error::PreingestError>(filter_sorted(&files, &POLISH_PATTERN))
            })
            .await?;
        Ok(list.as_slice())
    }

    /// Sorted schema file names usable for metadata validation.
    pub async fn schemas(&self, api: &dyn PreingestApi) -> Result<&[String]> {
        let list = self
            .schemas
            .get_or_try_init(|| async {
                let files = api.list_schemas().await?;
                let mut names: Vec<String> = files.into_iter().map(|f| f.filename).collect();
                names.sort();
                Ok::<_, crate::error::PreingestError>(names)
            })
            .await?;
        Ok(list.as_slice())
    }
}

fn filter_sorted(files: &[ServerFile], re: &Regex) -> Vec<String> {
    let mut names: Vec<String> = files
        .iter()
        .filter(|f| re.is_match(&f.filename))
        .map(|f| f.filename.clone())
        .collect();
    names.sort();
    names
}
