use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::diagnostics::{
    Diagnostic, Severity, E000, E001, E002, E003, W001, W002, W003, W004, W005,
};
use crate::fs_util::has_file_with_extension;
use crate::models::{Document, Header, HeaderValue, Kind};
use crate::schema::{enumerated_fields, SchemaRegistry};

/// Descriptions longer than this draw a warning.
pub const DESCRIPTION_WARN_LENGTH: usize = 500;

/// Marker agents should use in their description to show triggering examples.
pub const EXAMPLE_MARKER: &str = "<example>";

/// Outcome of structurally validating one document.
///
/// The document is valid iff `errors` is empty; warnings never affect
/// validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub path: PathBuf,
    pub kind: Kind,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: Kind) -> Self {
        Self {
            path: path.into(),
            kind,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a diagnostic, routing it by severity.
    pub fn push(&mut self, diag: Diagnostic) {
        match diag.severity {
            Severity::Error => self.errors.push(diag),
            Severity::Warning => self.warnings.push(diag),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error messages in order.
    #[must_use]
    pub fn error_messages(&self) -> Vec<&str> {
        self.errors.iter().map(|d| d.message.as_str()).collect()
    }

    /// Warning messages in order.
    #[must_use]
    pub fn warning_messages(&self) -> Vec<&str> {
        self.warnings.iter().map(|d| d.message.as_str()).collect()
    }
}

/// Locate the skill document in a directory (prefer uppercase over lowercase).
#[must_use]
pub fn find_skill_md(dir: &Path) -> Option<PathBuf> {
    ["SKILL.md", "skill.md"]
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Validate a document on disk.
///
/// Text kinds accept a file, or for skills a directory holding `SKILL.md`.
/// Plugins accept the plugin root or its `plugin.json`. An unreadable
/// document yields a single `E000` error rather than a failure.
#[must_use]
pub fn validate_path(path: &Path, kind: Kind, registry: &SchemaRegistry) -> ValidationResult {
    match kind {
        Kind::Plugin => crate::plugin::validate_plugin(&crate::plugin::plugin_root(path), registry),
        Kind::Hooks => crate::plugin::validate_hooks(path, registry),
        Kind::Skill | Kind::Agent | Kind::Command => {
            let file = if path.is_dir() {
                find_skill_md(path).unwrap_or_else(|| path.join("SKILL.md"))
            } else {
                path.to_path_buf()
            };
            match Document::load(&file, kind) {
                Ok(doc) => validate_document(&doc, registry),
                Err(e) => unreadable(&file, kind, &e),
            }
        }
    }
}

/// Result for a document that could not be read.
pub(crate) fn unreadable(path: &Path, kind: Kind, err: &dyn std::fmt::Display) -> ValidationResult {
    let mut result = ValidationResult::new(path, kind);
    result.push(Diagnostic::error(E000, format!("Cannot read file: {err}")));
    result
}

/// Validate a parsed text document against its kind's schema.
///
/// Checks run in a fixed order: header presence, required fields,
/// enumerated values, then advisories. JSON kinds are delegated to
/// [`crate::plugin`].
#[must_use]
pub fn validate_document(doc: &Document, registry: &SchemaRegistry) -> ValidationResult {
    match doc.kind {
        Kind::Hooks => return crate::plugin::validate_hooks_text(&doc.path, &doc.text, registry),
        Kind::Plugin => return validate_path(&doc.path, Kind::Plugin, registry),
        Kind::Skill | Kind::Agent | Kind::Command => {}
    }

    let mut result = ValidationResult::new(&doc.path, doc.kind);

    // 1. Header presence.
    if doc.kind.requires_header() && !doc.has_header() {
        result.push(
            Diagnostic::error(E001, "Missing frontmatter (must start with ---)")
                .with_suggestion("Start the file with a `---` delimited header block"),
        );
        return result;
    }

    let empty = Header::new();
    let header = doc.header.as_ref().unwrap_or(&empty);

    // 2. Required fields.
    for diag in check_required(header, doc.kind, registry) {
        result.push(diag);
    }

    // 3. Enumerated fields.
    for diag in check_enumerations(header, doc.kind, registry) {
        result.push(diag);
    }

    // 4. Advisories.
    for diag in check_advisories(doc, header, registry) {
        result.push(diag);
    }

    result
}

fn check_required(header: &Header, kind: Kind, registry: &SchemaRegistry) -> Vec<Diagnostic> {
    registry
        .schema_for(kind)
        .required
        .iter()
        .filter(|field| !header.contains_key(field))
        .map(|field| {
            Diagnostic::error(E002, format!("Missing required frontmatter: '{field}'"))
                .with_field(field.as_str())
        })
        .collect()
}

fn check_enumerations(header: &Header, kind: Kind, registry: &SchemaRegistry) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    for &(field, which) in enumerated_fields(kind) {
        let Some(value) = header.get(field) else {
            continue;
        };
        let allowed = value.as_str().is_some_and(|v| registry.allows(which, v));
        if !allowed {
            let choices = registry.enumeration(which).join(", ");
            diags.push(
                Diagnostic::error(
                    E003,
                    format!(
                        "Invalid {field} '{}', must be one of: {choices}",
                        value.display()
                    ),
                )
                .with_field(field),
            );
        }
    }
    diags
}

fn check_advisories(doc: &Document, header: &Header, registry: &SchemaRegistry) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let schema = registry.schema_for(doc.kind);

    for key in header.keys() {
        if !schema.is_known(key) {
            diags.push(
                Diagnostic::warning(W001, format!("Unknown frontmatter field: '{key}'"))
                    .with_field(key),
            );
        }
    }

    if let Some(desc) = header.get_str("description") {
        let len = desc.chars().count();
        if len > DESCRIPTION_WARN_LENGTH {
            diags.push(
                Diagnostic::warning(
                    W002,
                    format!("Description is long ({len} chars), consider shortening"),
                )
                .with_field("description"),
            );
        }
    }

    if let Some(floor) = doc.kind.body_floor() {
        if doc.body.trim().chars().count() < floor {
            let label = match doc.kind {
                Kind::Command => "Command",
                _ => "Skill",
            };
            diags.push(
                Diagnostic::warning(W003, format!("{label} body is very short"))
                    .with_field("body"),
            );
        }
    }

    if doc.kind == Kind::Agent {
        // A missing description counts as one without examples.
        let desc = match header.get("description") {
            None => Some(""),
            Some(HeaderValue::Scalar(s)) => Some(s.as_str()),
            Some(_) => None,
        };
        if desc.is_some_and(|d| !d.contains(EXAMPLE_MARKER)) {
            diags.push(
                Diagnostic::warning(
                    W004,
                    "Agent description should include <example> blocks for better triggering",
                )
                .with_field("description"),
            );
        }
    }

    if doc.kind == Kind::Skill {
        let references = doc.dir().join("references");
        if references.is_dir() && !has_file_with_extension(&references, "md") {
            diags.push(Diagnostic::warning(W005, "Empty references/ directory"));
        }
    }

    diags
}
