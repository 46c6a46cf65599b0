//! Filename extraction from a URL's path.

/// Last non-empty path segment of `url`, ignoring query and fragment.
///
/// Returns `None` if the URL does not parse, cannot carry a path, or the path
/// is empty or ends in `.`/`..`.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}
