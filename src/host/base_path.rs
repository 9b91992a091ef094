//! Base path inference from the configured site URL.

/// Derive the router base path from the site URL.
///
/// Everything after scheme and host is the install location:
/// `http://example.com` → `/`, `http://example.com/blog/` → `/blog/`.
pub fn infer_base_path(site_url: &str) -> String {
    let trimmed = site_url.trim_end_matches([' ', '/']);
    let path = trimmed.split('/').skip(3).collect::<Vec<_>>().join("/");

    if path.is_empty() {
        "/".to_string()
    } else {
        format!("/{path}/")
    }
}
