//! Path normalisation shared by every source adapter
//!
//! Paths are kept in one canonical form: a leading `/`, no trailing `/`,
//! no empty, `.` or `..` segments. `..` pops the previous segment and stops
//! at the root, so a joined sub-path never climbs above its base. The root
//! is `/`. Whether an upstream wants the
//! leading separator is decided by the adapter, not here.

pub const ROOT: &str = "/";

/// Canonicalise a path fragment
///
/// ```
/// use filelinker::utils::path::normalize;
/// assert_eq!(normalize("//docs///guide/"), "/docs/guide");
/// assert_eq!(normalize(""), "/");
/// assert_eq!(normalize("/docs/../../etc"), "/etc");
/// ```
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in segments(path) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Join `sub` below `base`, normalising both sides and the result
pub fn join(base: &str, sub: &str) -> String {
    let base = normalize(base);
    let sub = normalize(sub);
    if sub == ROOT {
        return base;
    }
    normalize(&format!("{}{}", base, sub))
}

/// Normalised path without the leading separator (`""` for the root)
pub fn strip_root(path: &str) -> String {
    let normalized = normalize(path);
    normalized.trim_start_matches('/').to_string()
}

/// Non-empty segments of a path, with `.` dropped and `..` resolved
pub fn segments(path: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            // 根目录之上没有父级
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out
}

/// Parent of a normalised path; the root is its own parent
pub fn parent(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind('/') {
        Some(0) | None => ROOT.to_string(),
        Some(idx) => normalized[..idx].to_string(),
    }
}

pub fn is_root(path: &str) -> bool {
    segments(path).is_empty()
}
