//! The version manifest: schema definitions and deprecation rules.
//!
//! The manifest is maintained outside the crate and read once per run.
//! Every section is optional; consumers fall back to built-in defaults
//! for anything the manifest omits.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::{ExtlintError, Result};

/// Default manifest location, relative to the working directory.
pub const DEFAULT_MANIFEST_PATH: &str = "data/version-manifest.json";

/// Parsed version manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Manifest {
    /// Manifest format version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Timestamp of the last documentation sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_docs_sync: Option<String>,
    pub schemas: Schemas,
    /// Raw deprecation entries. Kept untyped so that one malformed entry
    /// does not reject the whole manifest.
    pub deprecations: Vec<Value>,
}

/// The `schemas` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schemas {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_frontmatter: Option<FieldLists>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_frontmatter: Option<FieldLists>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_frontmatter: Option<FieldLists>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_manifest: Option<FieldLists>,
    /// Keys every hook handler must carry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hooks_config: Option<FieldLists>,
    /// Global enumerations (historically nested under `hooks`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hooks: Option<EnumerationLists>,
}

/// Required and optional field names for one kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldLists {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<Vec<String>>,
}

/// Allowed values for enumerated fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnumerationLists {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_models: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
}

// ── Lenient reading ─────────────────────────────────────────────────────
//
// Members are read one at a time. A mistyped member is dropped with a
// warning and its consumer falls back to the built-in default; the rest
// of the manifest is kept.

fn mistyped(member: &str, expected: &str) {
    warn!(member, expected, "mistyped manifest member, using built-in default");
}

fn string_member(value: Option<&Value>, member: &str) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        _ => {
            mistyped(member, "a string");
            None
        }
    }
}

fn string_list(value: Option<&Value>, member: &str) -> Option<Vec<String>> {
    let Value::Array(items) = value? else {
        mistyped(member, "a list of strings");
        return None;
    };
    let strings: Option<Vec<String>> = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect();
    if strings.is_none() {
        mistyped(member, "a list of strings");
    }
    strings
}

fn section<'a>(parent: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    match parent.get(key)? {
        Value::Object(obj) => Some(obj),
        _ => {
            mistyped(&format!("schemas.{key}"), "an object");
            None
        }
    }
}

impl FieldLists {
    fn from_section(schemas: &Map<String, Value>, key: &str) -> Option<Self> {
        let obj = section(schemas, key)?;
        Some(Self {
            required: string_list(obj.get("required"), &format!("schemas.{key}.required")),
            optional: string_list(obj.get("optional"), &format!("schemas.{key}.optional")),
        })
    }
}

impl EnumerationLists {
    fn from_section(schemas: &Map<String, Value>) -> Option<Self> {
        let obj = section(schemas, "hooks")?;
        let list = |key: &str| string_list(obj.get(key), &format!("schemas.hooks.{key}"));
        Some(Self {
            valid_models: list("valid_models"),
            valid_colors: list("valid_colors"),
            events: list("events"),
        })
    }
}

impl Schemas {
    fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            mistyped("schemas", "an object");
            return Self::default();
        };
        Self {
            skill_frontmatter: FieldLists::from_section(obj, "skill_frontmatter"),
            agent_frontmatter: FieldLists::from_section(obj, "agent_frontmatter"),
            command_frontmatter: FieldLists::from_section(obj, "command_frontmatter"),
            plugin_manifest: FieldLists::from_section(obj, "plugin_manifest"),
            hooks_config: FieldLists::from_section(obj, "hooks_config"),
            hooks: EnumerationLists::from_section(obj),
        }
    }
}

impl Manifest {
    /// Parse a manifest from JSON text. The top level must be an object;
    /// below it, mistyped members are dropped individually.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(content)?;
        Self::from_value(&raw)
    }

    /// Build a manifest from an already parsed JSON value.
    pub fn from_value(raw: &Value) -> Result<Self> {
        let Some(obj) = raw.as_object() else {
            return Err(ExtlintError::Manifest {
                message: "top level must be a JSON object".to_string(),
            });
        };
        let deprecations = match obj.get("deprecations") {
            None => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => {
                mistyped("deprecations", "a list");
                Vec::new()
            }
        };
        Ok(Self {
            version: string_member(obj.get("version"), "version"),
            last_docs_sync: string_member(obj.get("last_docs_sync"), "last_docs_sync"),
            schemas: obj.get("schemas").map(Schemas::from_value).unwrap_or_default(),
            deprecations,
        })
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Read a manifest, degrading to the empty manifest when the file is
    /// missing or unparseable.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "manifest not found, using built-in defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(manifest) => {
                debug!(
                    path = %path.display(),
                    version = manifest.version.as_deref().unwrap_or("unknown"),
                    deprecations = manifest.deprecations.len(),
                    "loaded manifest"
                );
                manifest
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot load manifest, using built-in defaults");
                Self::default()
            }
        }
    }
}
