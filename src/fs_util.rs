//! Small filesystem helpers for auxiliary-directory checks.
//!
//! The predicates follow symlinks, so a link to a populated directory
//! counts as populated. [`walk_files`] follows symlinked files but does
//! not descend into symlinked directories.

use std::path::Path;

/// Returns `true` if `dir` is a directory with no entries.
///
/// An unreadable directory is not reported as empty.
#[must_use]
pub(crate) fn is_empty_dir(dir: &Path) -> bool {
    dir.is_dir()
        && std::fs::read_dir(dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false)
}

/// Returns `true` if `dir` directly contains a file with extension `ext`.
#[must_use]
pub(crate) fn has_file_with_extension(dir: &Path, ext: &str) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.flatten().any(|e| {
                let path = e.path();
                path.is_file() && path.extension().is_some_and(|x| x == ext)
            })
        })
        .unwrap_or(false)
}

/// Files in `dir` with extension `ext`, sorted by path.
#[must_use]
pub(crate) fn files_with_extension(dir: &Path, ext: &str) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_file() && p.extension().is_some_and(|x| x == ext))
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

/// Files under `dir`, at any depth, whose extension is one of `exts`.
///
/// Symlinked files are included; symlinked directories are not descended
/// into. Results are sorted by path.
#[must_use]
pub(crate) fn walk_files(dir: &Path, exts: &[&str]) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                pending.push(path);
            } else if path.is_file()
                && path
                    .extension()
                    .and_then(|x| x.to_str())
                    .is_some_and(|x| exts.contains(&x))
            {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}
