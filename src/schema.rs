//! Per-kind field schemas and global enumerations.
//!
//! The registry layers the manifest over built-in defaults once, at
//! construction. Anything the manifest leaves out is filled from the
//! defaults, so a missing or partial manifest never blocks validation.

use std::fmt;

use serde::Serialize;

use crate::manifest::{FieldLists, Manifest};
use crate::models::Kind;

const SKILL_REQUIRED: &[&str] = &["name", "description"];
const SKILL_OPTIONAL: &[&str] = &[
    "allowed-tools",
    "model",
    "context",
    "agent",
    "hooks",
    "argument-hint",
    "disable-model-invocation",
    "user-invocable",
];

const AGENT_REQUIRED: &[&str] = &["name", "description"];
const AGENT_OPTIONAL: &[&str] = &[
    "tools",
    "disallowedTools",
    "model",
    "color",
    "hooks",
    "permissionMode",
    "skills",
];

const COMMAND_REQUIRED: &[&str] = &[];
const COMMAND_OPTIONAL: &[&str] = &["description", "allowed-tools", "model", "argument-hint"];

const PLUGIN_REQUIRED: &[&str] = &["name", "description"];
const PLUGIN_OPTIONAL: &[&str] = &[
    "version",
    "author",
    "homepage",
    "repository",
    "license",
    "keywords",
    "commands",
    "agents",
    "skills",
    "hooks",
    "mcpServers",
    "outputStyles",
    "lspServers",
];

const HOOK_HANDLER_REQUIRED: &[&str] = &["command"];
const HOOK_HANDLER_OPTIONAL: &[&str] = &["type", "timeout", "matcher"];

const DEFAULT_MODELS: &[&str] = &["sonnet", "opus", "haiku"];
const DEFAULT_COLORS: &[&str] = &["blue", "cyan", "green", "yellow", "magenta", "red"];
const DEFAULT_HOOK_EVENTS: &[&str] = &[
    "PreToolUse",
    "PostToolUse",
    "Stop",
    "UserPromptSubmit",
    "SessionStart",
    "SessionEnd",
    "PermissionRequest",
    "PostToolUseFailure",
    "Notification",
    "SubagentStart",
    "SubagentStop",
    "PreCompact",
];

/// A named set of allowed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Enumeration {
    Models,
    Colors,
    HookEvents,
}

impl Enumeration {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Enumeration::Models => "models",
            Enumeration::Colors => "colors",
            Enumeration::HookEvents => "hook_events",
        }
    }

    /// Look up an enumeration by name (`models`, `colors`, `hook_events`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "models" => Some(Enumeration::Models),
            "colors" => Some(Enumeration::Colors),
            "hook_events" | "events" => Some(Enumeration::HookEvents),
            _ => None,
        }
    }
}

impl fmt::Display for Enumeration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Header fields constrained to an enumeration, per kind.
#[must_use]
pub fn enumerated_fields(kind: Kind) -> &'static [(&'static str, Enumeration)] {
    match kind {
        Kind::Skill | Kind::Command => &[("model", Enumeration::Models)],
        Kind::Agent => &[("model", Enumeration::Models), ("color", Enumeration::Colors)],
        Kind::Plugin | Kind::Hooks => &[],
    }
}

/// Required and optional fields for one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindSchema {
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

impl KindSchema {
    fn layered(lists: Option<&FieldLists>, required: &[&str], optional: &[&str]) -> Self {
        Self {
            required: layer(lists.and_then(|l| l.required.as_ref()), required),
            optional: layer(lists.and_then(|l| l.optional.as_ref()), optional),
        }
    }

    /// Returns `true` if the field is declared required or optional.
    #[must_use]
    pub fn is_known(&self, field: &str) -> bool {
        self.required.iter().chain(&self.optional).any(|f| f == field)
    }
}

/// Manifest value if present, else the built-in default.
fn layer(from_manifest: Option<&Vec<String>>, default: &[&str]) -> Vec<String> {
    match from_manifest {
        Some(values) => values.clone(),
        None => default.iter().map(|s| (*s).to_string()).collect(),
    }
}

/// Field schemas and enumerations for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaRegistry {
    skill: KindSchema,
    agent: KindSchema,
    command: KindSchema,
    plugin: KindSchema,
    hooks: KindSchema,
    models: Vec<String>,
    colors: Vec<String>,
    hook_events: Vec<String>,
}

impl SchemaRegistry {
    /// Merge the manifest's schemas over the built-in defaults.
    #[must_use]
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let s = &manifest.schemas;
        let enums = s.hooks.as_ref();
        Self {
            skill: KindSchema::layered(s.skill_frontmatter.as_ref(), SKILL_REQUIRED, SKILL_OPTIONAL),
            agent: KindSchema::layered(s.agent_frontmatter.as_ref(), AGENT_REQUIRED, AGENT_OPTIONAL),
            command: KindSchema::layered(
                s.command_frontmatter.as_ref(),
                COMMAND_REQUIRED,
                COMMAND_OPTIONAL,
            ),
            plugin: KindSchema::layered(s.plugin_manifest.as_ref(), PLUGIN_REQUIRED, PLUGIN_OPTIONAL),
            hooks: KindSchema::layered(
                s.hooks_config.as_ref(),
                HOOK_HANDLER_REQUIRED,
                HOOK_HANDLER_OPTIONAL,
            ),
            models: layer(enums.and_then(|e| e.valid_models.as_ref()), DEFAULT_MODELS),
            colors: layer(enums.and_then(|e| e.valid_colors.as_ref()), DEFAULT_COLORS),
            hook_events: layer(enums.and_then(|e| e.events.as_ref()), DEFAULT_HOOK_EVENTS),
        }
    }

    /// Registry built from defaults alone.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_manifest(&Manifest::default())
    }

    /// Field schema for a kind. For hooks, the fields of one handler.
    #[must_use]
    pub fn schema_for(&self, kind: Kind) -> &KindSchema {
        match kind {
            Kind::Skill => &self.skill,
            Kind::Agent => &self.agent,
            Kind::Command => &self.command,
            Kind::Plugin => &self.plugin,
            Kind::Hooks => &self.hooks,
        }
    }

    /// Allowed values of an enumeration, in manifest order.
    #[must_use]
    pub fn enumeration(&self, which: Enumeration) -> &[String] {
        match which {
            Enumeration::Models => &self.models,
            Enumeration::Colors => &self.colors,
            Enumeration::HookEvents => &self.hook_events,
        }
    }

    /// Returns `true` if `value` belongs to the enumeration.
    #[must_use]
    pub fn allows(&self, which: Enumeration, value: &str) -> bool {
        self.enumeration(which).iter().any(|v| v == value)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
