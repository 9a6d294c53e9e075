//! Filesystem discovery with skip diagnostics.
//!
//! Discovery runs to completion before any file is processed. The result is
//! sorted and unique by canonical path, so no two workers ever touch the
//! same file.

use crate::{
    config::model::PipelineConfig,
    core::normalize::{build_globset, is_ignored_by, normalize_extension, repo_rel_str},
};
use anyhow::{Result, bail};
use code_structure::LanguageKind;
use std::{
    collections::HashSet,
    fs,
    io::Read,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// A file that passed every discovery filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// `None` when no adapter handles the extension.
    pub language: Option<LanguageKind>,
    pub size: u64,
}

#[derive(Debug, Default)]
struct SkipCounters {
    excluded_name: usize,
    ignored: usize,
    skip_ext: usize,
    backup: usize,
    too_big: usize,
    binary: usize,
    unreadable: usize,
    aliased: usize,
}

/// Walk `root` and return every candidate file, sorted by path.
pub fn discover_files(root: &Path, cfg: &PipelineConfig) -> Result<Vec<DiscoveredFile>> {
    if !root.exists() {
        bail!("fs_scan: root does not exist: {}", root.display());
    }
    info!("fs_scan: start -> {}", root.display());

    let filters = &cfg.filters;
    let ignore_globs = build_globset(&filters.ignore_globs);
    let excluded_dirs: HashSet<&str> = filters.exclude_dirs.iter().map(String::as_str).collect();
    let excluded_files: HashSet<&str> = filters.exclude_files.iter().map(String::as_str).collect();
    let skip_ext: HashSet<String> = filters
        .skip_extensions
        .iter()
        .map(|e| normalize_extension(e))
        .filter(|e| !e.is_empty())
        .collect();
    let backup_suffix = cfg.mutation.backup_suffix.as_str();

    let mut skipped = SkipCounters::default();
    let mut files = Vec::<DiscoveredFile>::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| keep_entry(e, &excluded_dirs));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!("fs_scan: walk error: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();

        if excluded_files.contains(file_name.as_ref()) {
            skipped.excluded_name += 1;
            debug!("fs_scan: skip (excluded name) {}", path.display());
            continue;
        }
        if file_name.ends_with(backup_suffix) {
            skipped.backup += 1;
            debug!("fs_scan: skip (backup) {}", path.display());
            continue;
        }

        let rel = repo_rel_str(root, path);
        if is_ignored_by(&rel, ignore_globs.as_ref()) {
            skipped.ignored += 1;
            debug!("fs_scan: ignore (glob) {}", rel);
            continue;
        }

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if skip_ext.contains(&normalize_extension(ext)) {
                skipped.skip_ext += 1;
                debug!("fs_scan: skip (extension) {}", rel);
                continue;
            }
        }

        let size = match fs::metadata(path) {
            Ok(m) => m.len(),
            Err(err) => {
                skipped.unreadable += 1;
                warn!("fs_scan: metadata failed for {}: {}", path.display(), err);
                continue;
            }
        };
        if size > cfg.limits.max_file_bytes {
            skipped.too_big += 1;
            debug!(
                "fs_scan: skip (size {} > max {}) {}",
                size, cfg.limits.max_file_bytes, rel
            );
            continue;
        }

        match looks_binary(path, cfg.limits.binary_probe_bytes) {
            Ok(true) => {
                skipped.binary += 1;
                debug!("fs_scan: skip (binary) {}", rel);
                continue;
            }
            Ok(false) => {}
            Err(err) => {
                skipped.unreadable += 1;
                warn!("fs_scan: probe failed for {}: {}", path.display(), err);
                continue;
            }
        }

        files.push(DiscoveredFile {
            path: path.to_path_buf(),
            language: LanguageKind::from_path(path),
            size,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    // Symlinked directories reach one file under several paths; keep the first.
    let mut seen = HashSet::new();
    files.retain(|f| {
        let key = dunce::canonicalize(&f.path).unwrap_or_else(|_| f.path.clone());
        let first = seen.insert(key);
        if !first {
            skipped.aliased += 1;
            debug!("fs_scan: skip (alias) {}", f.path.display());
        }
        first
    });

    let supported = files.iter().filter(|f| f.language.is_some()).count();
    info!(
        "fs_scan: done, total={} supported={} (excluded={}, ignored={}, skip_ext={}, backups={}, too_big={}, binary={}, unreadable={}, aliased={})",
        files.len(),
        supported,
        skipped.excluded_name,
        skipped.ignored,
        skipped.skip_ext,
        skipped.backup,
        skipped.too_big,
        skipped.binary,
        skipped.unreadable,
        skipped.aliased
    );

    Ok(files)
}

/// Directory filter applied before descending.
fn keep_entry(entry: &DirEntry, excluded_dirs: &HashSet<&str>) -> bool {
    // The root itself is always walked, whatever its name.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    match entry.file_name().to_str() {
        Some(name) => !excluded_dirs.contains(name),
        None => true,
    }
}

/// `true` when a NUL byte appears in the first `probe` bytes.
fn looks_binary(path: &Path, probe: usize) -> std::io::Result<bool> {
    let file = fs::File::open(path)?;
    let mut head = Vec::with_capacity(probe);
    file.take(probe as u64).read_to_end(&mut head)?;
    Ok(head.contains(&0))
}
