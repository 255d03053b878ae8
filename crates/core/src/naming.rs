//! Field validation and file naming for projects, releases and pages.
//!
//! Project slugs, chapters and page names end up in download URLs and archive
//! entry names, so they are restricted to path-safe characters.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Maximum length of a project display name.
pub const MAX_PROJECT_NAME_LEN: usize = 128;

/// Maximum length of a page name.
pub const MAX_PAGE_NAME_LEN: usize = 128;

/// Slugs: alphanumeric start, then alphanumerics, `_` or `-`, 128 chars max.
static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,127}$").expect("valid regex")
});

/// Chapters never contain `-` because it separates slug and chapter in
/// download keys.
static CHAPTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.]{0,31}$").expect("valid regex"));

/// Validate a project display name: non-blank and at most 128 characters.
pub fn validate_project_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Project name must not be empty".to_string());
    }
    if name.chars().count() > MAX_PROJECT_NAME_LEN {
        return Err(format!(
            "Project name must be at most {MAX_PROJECT_NAME_LEN} characters"
        ));
    }
    Ok(())
}

/// Validate a project slug (`projectName`), which doubles as a storage path.
pub fn validate_project_slug(slug: &str) -> Result<(), String> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(format!(
            "Invalid projectName '{slug}'. Use letters, digits, '_' or '-' (max 128), \
             starting with a letter or digit"
        ))
    }
}

/// Validate a release chapter label such as `1`, `12.5` or `v2_extra`.
pub fn validate_chapter(chapter: &str) -> Result<(), String> {
    if CHAPTER_RE.is_match(chapter) {
        Ok(())
    } else {
        Err(format!(
            "Invalid chapter '{chapter}'. Use letters, digits, '_' or '.' (max 32), \
             starting with a letter or digit"
        ))
    }
}

/// Validate a release version. Versions are non-negative and fit an `INTEGER`.
pub fn validate_version(version: i64) -> Result<i32, String> {
    if version < 0 {
        return Err(format!("Version must be a non-negative integer, got {version}"));
    }
    i32::try_from(version).map_err(|_| format!("Version {version} is too large"))
}

/// Validate a page name. Page names become archive entry names.
pub fn validate_page_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Page name must not be empty".to_string());
    }
    if name.chars().count() > MAX_PAGE_NAME_LEN {
        return Err(format!(
            "Page name must be at most {MAX_PAGE_NAME_LEN} characters"
        ));
    }
    if name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(format!("Page name '{name}' must not start with '.' or contain path separators"));
    }
    Ok(())
}

/// Download filename for a release archive: `{slug}-{chapter}.{version}.zip`.
pub fn archive_filename(project_slug: &str, chapter: &str, version: i32) -> String {
    format!("{project_slug}-{chapter}.{version}.zip")
}

/// Entry name of a page inside a release archive.
///
/// Browser uploads usually name pages after the source file (`001.png`), in
/// which case the name is used as is; bare names get `.{extension}` appended.
pub fn page_entry_name(page_name: &str, extension: &str) -> String {
    let lower = page_name.to_ascii_lowercase();
    let has_image_ext = [".png", ".jpg", ".jpeg"]
        .iter()
        .any(|ext| lower.ends_with(ext));
    if has_image_ext {
        page_name.to_string()
    } else {
        format!("{page_name}.{extension}")
    }
}

/// Entry names for a whole bundle, in input order, with `(name, extension)`
/// pairs as for [`page_entry_name`].
///
/// Pages named `001` and `001.png` both map to `001.png`; later collisions
/// get a `-2`, `-3`, ... suffix before the extension.
pub fn page_entry_names<'a>(pages: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<String> {
    let mut taken = HashSet::new();
    pages
        .into_iter()
        .map(|(page_name, extension)| {
            let base = page_entry_name(page_name, extension);
            let mut candidate = base.clone();
            let mut n = 2;
            while !taken.insert(candidate.clone()) {
                candidate = match base.rsplit_once('.') {
                    Some((stem, ext)) => format!("{stem}-{n}.{ext}"),
                    None => format!("{base}-{n}"),
                };
                n += 1;
            }
            candidate
        })
        .collect()
}
