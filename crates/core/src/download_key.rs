//! Parsing of public page download paths.
//!
//! `GET /downloads/{release_key}/{page_file}` where the release key is
//! `{projectName}-{chapter}.{version}` and the page file is `{page}.{ext}`.
//! Slugs may contain `-`, so the chapter is whatever follows the last one.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

static RELEASE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<slug>[A-Za-z0-9][A-Za-z0-9_-]*)-(?P<chapter>[A-Za-z0-9][A-Za-z0-9_.]*)\.(?P<version>\d+)$")
        .expect("valid regex")
});

/// A parsed download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDownloadKey {
    pub project_slug: String,
    pub chapter: String,
    pub version: i32,
    /// Page file name without its extension.
    pub page_stem: String,
    /// Page file name exactly as requested.
    pub page_file: String,
}

/// Parse the two path segments of a page download URL.
pub fn parse_page_download(release_key: &str, page_file: &str) -> Result<PageDownloadKey, CoreError> {
    let malformed = || {
        CoreError::Validation(
            "The requested URL is not formatted as /{projectName}-{chapter}.{version}/{page}.{ext}"
                .to_string(),
        )
    };

    let caps = RELEASE_KEY_RE.captures(release_key).ok_or_else(malformed)?;
    let version: i32 = caps["version"].parse().map_err(|_| malformed())?;

    let (page_stem, extension) = page_file.rsplit_once('.').ok_or_else(malformed)?;
    if page_stem.is_empty() || extension.is_empty() {
        return Err(malformed());
    }

    Ok(PageDownloadKey {
        project_slug: caps["slug"].to_string(),
        chapter: caps["chapter"].to_string(),
        version,
        page_stem: page_stem.to_string(),
        page_file: page_file.to_string(),
    })
}
