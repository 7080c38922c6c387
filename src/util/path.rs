//! Hierarchical key paths.
//!
//! Keys use `/` as a path separator on top of an otherwise flat namespace,
//! e.g. `/0/data`, `/0/data/title`, `/0/meta/Scan speed`.

use super::Quark;

/// Path separator for hierarchical keys.
pub const PATH_SEPARATOR: char = '/';

/// Check whether `name` lies under `prefix`.
///
/// `name` matches iff it equals `prefix` or continues with the separator
/// right after it. The empty prefix matches every name.
#[inline]
pub fn path_has_prefix(name: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match name.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(PATH_SEPARATOR),
        None => false,
    }
}

/// Check whether a key matches an optional prefix.
///
/// `None` matches every key, anonymous ones included. `Some(p)` matches
/// only named keys satisfying [`path_has_prefix`].
pub fn key_matches(key: Quark, prefix: Option<&str>) -> bool {
    match prefix {
        None => true,
        Some(p) => key.as_str().is_some_and(|name| path_has_prefix(name, p)),
    }
}

/// Replace `old_prefix` at the start of `name` with `new_prefix`.
///
/// Returns `None` when `name` is not under `old_prefix`.
pub fn replace_prefix(name: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    if !path_has_prefix(name, old_prefix) {
        return None;
    }
    let rest = &name[old_prefix.len()..];
    let mut out = String::with_capacity(new_prefix.len() + rest.len());
    out.push_str(new_prefix);
    out.push_str(rest);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_boundary() {
        assert!(path_has_prefix("pdf", "pdf"));
        assert!(path_has_prefix("pdf/f", "pdf"));
        assert!(!path_has_prefix("pdfoo", "pdf"));
        assert!(!path_has_prefix("pd", "pdf"));
        assert!(path_has_prefix("anything", ""));
    }

    #[test]
    fn test_key_matches() {
        let named = Quark::intern("/0/data/title");
        let anon = Quark::anonymous();
        assert!(key_matches(named, Some("/0/data")));
        assert!(key_matches(named, Some("")));
        assert!(!key_matches(named, Some("/0/dat")));
        assert!(key_matches(anon, None));
        assert!(!key_matches(anon, Some("")));
    }

    #[test]
    fn test_replace_prefix() {
        assert_eq!(
            replace_prefix("/0/meta/speed", "/0/meta", "/1/meta").as_deref(),
            Some("/1/meta/speed")
        );
        assert_eq!(replace_prefix("/0/meta", "/0/meta", "/x").as_deref(), Some("/x"));
        assert_eq!(replace_prefix("/0/metadata", "/0/meta", "/x"), None);
    }
}
