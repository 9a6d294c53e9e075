//! Normalization helpers for paths, extensions, and glob handling.
//!
//! These utilities keep paths stable and comparable across platforms, so
//! report entries and glob matches do not depend on the machine the run
//! happens on.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use tracing::warn;

/// Convert a path into a repository-relative string with stable `/` separators.
///
/// Steps performed:
/// 1. Canonicalize the `root` path (best-effort, resolves symlinks);
/// 2. Make the input `p` absolute (join with `root` if relative);
/// 3. Canonicalize `p` as well;
/// 4. Strip the `root` prefix (if applicable);
/// 5. Replace all separators with `/`.
///
/// # Example
/// ```
/// use std::path::Path;
/// use doc_pipeline::core::normalize::repo_rel_str;
///
/// let rel = repo_rel_str(Path::new("/srv/repo"), Path::new("/srv/repo/src/calc.py"));
/// assert_eq!(rel, "src/calc.py");
/// ```
pub fn repo_rel_str(root: &Path, p: &Path) -> String {
    let root_abs = dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let abs = dunce::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            root_abs.join(p)
        }
    });

    let rel = abs
        .strip_prefix(&root_abs)
        .or_else(|_| abs.strip_prefix(root))
        .unwrap_or(&abs);

    to_unix_sep(rel.to_string_lossy())
}

/// Replace OS-specific separators with `/`.
///
/// # Example
/// ```
/// use doc_pipeline::core::normalize::to_unix_sep;
///
/// assert_eq!(to_unix_sep(r"src\pkg\calc.py"), "src/pkg/calc.py");
/// ```
pub fn to_unix_sep<S: AsRef<str>>(s: S) -> String {
    s.as_ref().replace('\\', "/")
}

/// Lowercase extension without the leading dot.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Build a [`GlobSet`] from patterns, skipping invalid or empty ones.
///
/// Returns `None` if the input list is empty or all patterns are invalid.
///
/// # Example
/// ```
/// use doc_pipeline::core::normalize::build_globset;
///
/// let gs = build_globset(&["**/*.min.js".to_string()]).unwrap();
/// assert!(gs.is_match("static/app.min.js"));
/// ```
pub fn build_globset(patterns: &[String]) -> Option<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let mut added = 0usize;
    for pat in patterns {
        if pat.trim().is_empty() {
            continue;
        }
        match Glob::new(pat) {
            Ok(g) => {
                builder.add(g);
                added += 1;
            }
            Err(err) => warn!("normalize: invalid glob {:?} skipped: {}", pat, err),
        }
    }
    if added == 0 {
        return None;
    }
    builder.build().ok()
}

/// Return `true` if the repository-relative `rel` path matches the ignore set.
pub fn is_ignored_by(rel: &str, set: Option<&GlobSet>) -> bool {
    set.is_some_and(|gs| gs.is_match(rel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_normalized() {
        assert_eq!(normalize_extension(".PNG"), "png");
        assert_eq!(normalize_extension("js"), "js");
    }

    #[test]
    fn invalid_globs_are_skipped() {
        assert!(build_globset(&[]).is_none());
        assert!(build_globset(&[String::new(), String::from("[")]).is_none());
        let gs = build_globset(&[String::from("["), String::from("vendor/**")]);
        assert!(is_ignored_by("vendor/lib.js", gs.as_ref()));
        assert!(!is_ignored_by("src/lib.js", gs.as_ref()));
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("pkg").join("mod.py");
        std::fs::create_dir_all(nested.parent().unwrap()).unwrap();
        std::fs::write(&nested, "x = 1\n").unwrap();
        assert_eq!(repo_rel_str(dir.path(), &nested), "pkg/mod.py");
    }
}
