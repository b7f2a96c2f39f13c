//! Hook configuration (`hooks.json`, `settings.json`) validation.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::resolve_plugin_path;
use crate::diagnostics::{Diagnostic, E002, E003, E004, E006, E007, E008};
use crate::models::Kind;
use crate::parser::read_file_checked;
use crate::schema::{Enumeration, SchemaRegistry};
use crate::validator::{unreadable, ValidationResult};

/// Script paths inside a hook command: `${CLAUDE_PLUGIN_ROOT}/…` or `./…`,
/// at the start of the command or after whitespace, a quote, or `=`.
static SCRIPT_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s"'=])((?:\$\{CLAUDE_PLUGIN_ROOT\}|\.)/[^\s"';|&]+)"#)
        .expect("script path regex")
});

/// Validate a hook configuration file.
#[must_use]
pub fn validate_hooks(path: &Path, registry: &SchemaRegistry) -> ValidationResult {
    match read_file_checked(path) {
        Ok(text) => validate_hooks_text(path, &text, registry),
        Err(e) => unreadable(path, Kind::Hooks, &e),
    }
}

/// Validate hook configuration text read from `path`.
///
/// Two layouts are accepted: a bare map of event names to handler lists,
/// and a wrapper object whose `hooks` member holds that map (plugin
/// `hooks.json`, `settings.json`). A `settings.json` without hooks has
/// nothing to check.
#[must_use]
pub fn validate_hooks_text(path: &Path, text: &str, registry: &SchemaRegistry) -> ValidationResult {
    let mut result = ValidationResult::new(path, Kind::Hooks);

    let raw: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            result.push(Diagnostic::error(E004, format!("Invalid JSON: {e}")));
            return result;
        }
    };

    let Some(top) = raw.as_object() else {
        result.push(Diagnostic::error(E008, "Hook configuration must be a JSON object"));
        return result;
    };

    let events = match top.get("hooks") {
        Some(Value::Object(inner)) => inner,
        Some(_) => {
            result.push(
                Diagnostic::error(E008, "'hooks' must be a JSON object").with_field("hooks"),
            );
            return result;
        }
        None if is_settings_file(path) => return result,
        None => top,
    };

    let root = script_root(path);
    for (event, handlers) in events {
        check_event(event, handlers, &root, registry, &mut result);
    }
    result
}

fn is_settings_file(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n == "settings.json" || n == "settings.local.json")
}

/// Directory that script paths resolve against: the plugin (or project)
/// root when the file sits in `hooks/` or `.claude/`, else its own directory.
fn script_root(path: &Path) -> PathBuf {
    let dir = path.parent().unwrap_or(Path::new("."));
    if dir
        .file_name()
        .is_some_and(|n| n == "hooks" || n == ".claude")
    {
        dir.parent().unwrap_or(Path::new(".")).to_path_buf()
    } else {
        dir.to_path_buf()
    }
}

fn check_event(
    event: &str,
    handlers: &Value,
    root: &Path,
    registry: &SchemaRegistry,
    result: &mut ValidationResult,
) {
    if !registry.allows(Enumeration::HookEvents, event) {
        result.push(
            Diagnostic::error(E003, format!("Unknown hook event: '{event}'"))
                .with_field(event)
                .with_suggestion(format!(
                    "Valid events: {}",
                    registry.enumeration(Enumeration::HookEvents).join(", ")
                )),
        );
    }

    let Some(handlers) = handlers.as_array() else {
        result.push(
            Diagnostic::error(E007, format!("Hook handlers for '{event}' must be a list"))
                .with_field(event),
        );
        return;
    };

    for handler in handlers {
        let Some(obj) = handler.as_object() else {
            result.push(Diagnostic::error(
                E008,
                format!("Hook handler in '{event}' must be a JSON object"),
            ));
            continue;
        };

        // Matcher group: `{ "matcher": "...", "hooks": [ ... ] }`.
        match obj.get("hooks") {
            Some(Value::Array(inner)) => {
                for hook in inner {
                    match hook.as_object() {
                        Some(hook) => check_handler(event, hook, root, registry, result),
                        None => result.push(Diagnostic::error(
                            E008,
                            format!("Hook handler in '{event}' must be a JSON object"),
                        )),
                    }
                }
            }
            Some(_) => result.push(
                Diagnostic::error(E007, format!("Hook handlers for '{event}' must be a list"))
                    .with_field(event),
            ),
            None => check_handler(event, obj, root, registry, result),
        }
    }
}

fn check_handler(
    event: &str,
    handler: &Map<String, Value>,
    root: &Path,
    registry: &SchemaRegistry,
    result: &mut ValidationResult,
) {
    let is_prompt = handler.get("type").and_then(Value::as_str) == Some("prompt");

    for key in &registry.schema_for(Kind::Hooks).required {
        let key = if is_prompt && key == "command" {
            "prompt"
        } else {
            key.as_str()
        };
        if !handler.contains_key(key) {
            result.push(
                Diagnostic::error(E002, format!("Hook handler missing '{key}' in '{event}'"))
                    .with_field(key),
            );
        }
    }

    let Some(command) = handler.get("command").and_then(Value::as_str) else {
        return;
    };
    for caps in SCRIPT_PATH_RE.captures_iter(command) {
        let raw = &caps[1];
        if !resolve_plugin_path(root, raw).exists() {
            result.push(
                Diagnostic::error(
                    E006,
                    format!("Hook command in '{event}' references missing file: {raw}"),
                )
                .with_field("command"),
            );
        }
    }
}
