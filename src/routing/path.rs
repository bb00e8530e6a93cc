//! Path canonicalization.
//!
//! # Responsibilities
//! - Collapse repeated separators
//! - Resolve `.` and `..` segments (never above root)
//! - Guarantee a leading `/`
//! - Join a router prefix with a route path
//!
//! # Design Decisions
//! - A trailing `/` on the input survives cleaning (`/a/` stays `/a/`)
//! - Joining with an empty or root-only sub-path yields the prefix itself

/// Return the canonical form of `path`.
///
/// Follows the semantics of httprouter's `CleanPath`.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let trailing = path.len() > 1 && path.ends_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for segment in &segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }

    if cleaned.is_empty() {
        return "/".to_string();
    }
    if trailing {
        cleaned.push('/');
    }
    cleaned
}

/// Join a canonical `prefix` with `sub`, returning a canonical path.
pub fn join(prefix: &str, sub: &str) -> String {
    if sub.trim_matches('/').is_empty() {
        return clean_path(prefix);
    }
    clean_path(&format!("{prefix}/{sub}"))
}
