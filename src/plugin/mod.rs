//! Validation of the JSON extension kinds: plugin manifests and hook
//! configurations.

pub mod hooks;
pub mod manifest;

use std::path::{Path, PathBuf};

pub use hooks::{validate_hooks, validate_hooks_text};
pub use manifest::validate_plugin;

/// Placeholder the host expands to the plugin's install directory.
pub const PLUGIN_ROOT_VAR: &str = "${CLAUDE_PLUGIN_ROOT}";

/// Plugin root for a path naming the root, its `.claude-plugin/`
/// directory, or the `plugin.json` inside it.
#[must_use]
pub fn plugin_root(path: &Path) -> PathBuf {
    let dir = if path.file_name().is_some_and(|n| n == "plugin.json") {
        path.parent().unwrap_or(Path::new("."))
    } else {
        path
    };
    if dir.file_name().is_some_and(|n| n == ".claude-plugin") {
        dir.parent().unwrap_or(Path::new(".")).to_path_buf()
    } else {
        dir.to_path_buf()
    }
}

/// Resolve a path written relative to the plugin root.
///
/// A leading `${CLAUDE_PLUGIN_ROOT}` and any leading `./` are dropped.
#[must_use]
pub fn resolve_plugin_path(root: &Path, raw: &str) -> PathBuf {
    let rel = raw.strip_prefix(PLUGIN_ROOT_VAR).unwrap_or(raw);
    let rel = rel.trim_start_matches('/');
    let mut rel = rel;
    while let Some(rest) = rel.strip_prefix("./") {
        rel = rest;
    }
    if rel.is_empty() || rel == "." {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}
