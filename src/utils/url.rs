// src/utils/url.rs

//! URL manipulation utilities.

/// Resolve a mirror-relative path against the domain that served it.
///
/// # Examples
/// ```
/// use nfbot::utils::url::resolve;
///
/// assert_eq!(
///     resolve("https://nitter.net", "/pic/media%2Fabc.jpg"),
///     "https://nitter.net/pic/media%2Fabc.jpg"
/// );
/// ```
pub fn resolve(domain: &str, href: &str) -> String {
    // Already absolute
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    // Protocol-relative
    if let Some(rest) = href.strip_prefix("//") {
        let scheme = domain.split("://").next().unwrap_or("https");
        return format!("{scheme}://{rest}");
    }

    // Mirror-relative, kept under any path prefix of the mirror base
    join(domain, href)
}

/// Join a mirror base URL and a path suffix without doubling the slash.
pub fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
