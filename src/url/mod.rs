//! URL handling module
//!
//! This module builds documentation URLs for programs, resolves relative
//! references found in pages, and classifies image URLs.

use crate::config::ProgramConfig;
use url::Url;

/// File extensions retained when collecting image URLs
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".svg", ".gif", ".bmp", ".webp"];

/// Builds the URL of one connector page of a program
///
/// Layout: `{root}/docs/{model}/ElectricalReference/{prog_id}/connector/{catalog_id}/index.html`
///
/// # Example
///
/// ```
/// use pinout_crawler::url::connector_url;
/// use url::Url;
///
/// let root = Url::parse("https://service.example.com").unwrap();
/// let url = connector_url(&root, "Model3", "prog-18", "g011").unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://service.example.com/docs/Model3/ElectricalReference/prog-18/connector/g011/index.html"
/// );
/// ```
pub fn connector_url(
    root: &Url,
    model: &str,
    prog_id: &str,
    catalog_id: &str,
) -> Result<Url, url::ParseError> {
    let mut url = root.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend([
            "docs",
            model,
            "ElectricalReference",
            prog_id,
            "connector",
            catalog_id,
            "index.html",
        ]);
    Ok(url)
}

/// Entry page for a configured program
pub fn program_entry_url(root: &Url, program: &ProgramConfig) -> Result<Url, url::ParseError> {
    connector_url(root, &program.model, &program.prog_id, &program.entry_catalog)
}

/// Resolves an href found in a page against that page's URL
///
/// Returns None if the reference should be ignored:
/// - empty or fragment-only references
/// - javascript:, mailto:, tel: and data: schemes
/// - references that do not resolve to an HTTP(S) URL
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}

/// True when the URL path ends in a known image extension (case-insensitive)
///
/// Only the path is inspected, so query strings and fragments never hide or
/// fake an extension.
pub fn has_image_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
