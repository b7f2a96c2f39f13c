//! Plugin manifest (`.claude-plugin/plugin.json`) validation.

use std::path::Path;

use tracing::debug;

use super::resolve_plugin_path;
use crate::diagnostics::{Diagnostic, E002, E004, E005, E006, E008, W001, W005};
use crate::fs_util::is_empty_dir;
use crate::models::Kind;
use crate::parser::read_file_checked;
use crate::schema::SchemaRegistry;
use crate::validator::{unreadable, ValidationResult};

/// Manifest keys whose values name files or directories in the plugin.
const PATH_FIELDS: &[&str] = &[
    "commands",
    "agents",
    "skills",
    "hooks",
    "outputStyles",
    "mcpServers",
    "lspServers",
];

/// Component directories bundled by convention.
const COMPONENT_DIRS: &[&str] = &["skills", "commands", "agents", "hooks"];

/// Hook configuration bundled by convention.
const BUNDLED_HOOKS: &str = "hooks/hooks.json";

/// Validate the plugin rooted at `root`.
///
/// The manifest must exist, parse as a JSON object, and carry the required
/// keys. Path-valued keys must name existing entries, and conventional
/// component directories that exist must not be empty. A bundled
/// `hooks/hooks.json` is validated too; its findings are prefixed with
/// the file name.
#[must_use]
pub fn validate_plugin(root: &Path, registry: &SchemaRegistry) -> ValidationResult {
    let mut result = ValidationResult::new(root, Kind::Plugin);
    let manifest_path = root.join(".claude-plugin").join("plugin.json");
    debug!(root = %root.display(), "validating plugin");

    if !manifest_path.is_file() {
        result.push(
            Diagnostic::error(E005, "Missing .claude-plugin/plugin.json")
                .with_suggestion("Create .claude-plugin/plugin.json with at least a name"),
        );
        return result;
    }

    let content = match read_file_checked(&manifest_path) {
        Ok(c) => c,
        Err(e) => return unreadable(&manifest_path, Kind::Plugin, &e),
    };

    let raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            result.push(Diagnostic::error(E004, format!("Invalid JSON in plugin.json: {e}")));
            return result;
        }
    };

    let Some(obj) = raw.as_object() else {
        result.push(Diagnostic::error(E008, "plugin.json must contain a JSON object"));
        return result;
    };

    let schema = registry.schema_for(Kind::Plugin);

    for key in &schema.required {
        if !obj.contains_key(key) {
            result.push(
                Diagnostic::error(E002, format!("Missing '{key}' in plugin.json"))
                    .with_field(key.as_str()),
            );
        }
    }

    for key in obj.keys() {
        if !schema.is_known(key) {
            result.push(
                Diagnostic::warning(W001, format!("Unknown field in plugin.json: '{key}'"))
                    .with_field(key.as_str()),
            );
        }
    }

    for field in PATH_FIELDS {
        for raw_path in path_values(obj.get(*field)) {
            if !resolve_plugin_path(root, raw_path).exists() {
                result.push(
                    Diagnostic::error(
                        E006,
                        format!("Path referenced by '{field}' does not exist: {raw_path}"),
                    )
                    .with_field(*field),
                );
            }
        }
    }

    for component in COMPONENT_DIRS {
        if is_empty_dir(&root.join(component)) {
            result.push(Diagnostic::warning(W005, format!("Empty {component}/ directory")));
        }
    }

    let hooks_path = root.join(BUNDLED_HOOKS);
    if hooks_path.is_file() {
        let hooks = super::validate_hooks(&hooks_path, registry);
        for diag in hooks.errors.into_iter().chain(hooks.warnings) {
            let message = format!("{BUNDLED_HOOKS}: {}", diag.message);
            result.push(Diagnostic { message, ..diag });
        }
    }

    result
}

/// Path strings held by a manifest value: a string, or an array of strings.
/// Inline objects (e.g. `mcpServers` configurations) carry no path.
fn path_values(value: Option<&serde_json::Value>) -> Vec<&str> {
    match value {
        Some(serde_json::Value::String(s)) => vec![s.as_str()],
        Some(serde_json::Value::Array(items)) => {
            items.iter().filter_map(serde_json::Value::as_str).collect()
        }
        _ => Vec::new(),
    }
}
