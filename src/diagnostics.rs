//! Structured diagnostics for structural validation.
//!
//! Every finding carries a stable code, a severity, and optionally the
//! offending field and a suggested fix.

use std::fmt;

use serde::Serialize;

/// Severity of a diagnostic message or deprecation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A rule violation that makes the document invalid.
    Error,
    /// A potential issue that does not affect validity.
    Warning,
}

impl Severity {
    /// Parse a manifest severity string. Anything other than `error`
    /// (case-insensitive) is treated as a warning.
    #[must_use]
    pub fn from_manifest(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("error") {
            Severity::Error
        } else {
            Severity::Warning
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A structured diagnostic message from validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Stable code (e.g., `"E002"`, `"W003"`).
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Field that caused the diagnostic (e.g., `"model"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Suggested fix (actionable text).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with the given severity, code, and message.
    #[must_use]
    pub fn new(severity: Severity, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            field: None,
            suggestion: None,
        }
    }

    /// Shorthand for an error diagnostic.
    #[must_use]
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Shorthand for a warning diagnostic.
    #[must_use]
    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Set the field that caused this diagnostic.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Set a suggested fix for this diagnostic.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Returns `true` if this diagnostic is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Returns `true` if this diagnostic is a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// Errors display as the bare message; warnings carry a `warning:` prefix.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "{}", self.message),
            Severity::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

// ── Error code constants ────────────────────────────────────────────────

/// Infrastructure error (file unreadable, too large).
pub const E000: &str = "E000";
/// Header block missing for a kind that mandates one.
pub const E001: &str = "E001";
/// Required field missing.
pub const E002: &str = "E002";
/// Field value outside its enumeration.
pub const E003: &str = "E003";
/// JSON document does not parse.
pub const E004: &str = "E004";
/// Plugin manifest file missing.
pub const E005: &str = "E005";
/// Referenced path does not exist.
pub const E006: &str = "E006";
/// Hook handlers are not a list.
pub const E007: &str = "E007";
/// JSON document has the wrong top-level shape.
pub const E008: &str = "E008";

// ── Warning code constants ──────────────────────────────────────────────

/// Header field not declared by the kind's schema.
pub const W001: &str = "W001";
/// Description exceeds the length threshold.
pub const W002: &str = "W002";
/// Body shorter than the kind's floor.
pub const W003: &str = "W003";
/// Agent description lacks an `<example>` block.
pub const W004: &str = "W004";
/// Auxiliary directory exists but is empty.
pub const W005: &str = "W005";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_no_prefix() {
        let d = Diagnostic::error(E002, "Missing required frontmatter: 'name'");
        assert_eq!(d.to_string(), "Missing required frontmatter: 'name'");
    }

    #[test]
    fn warning_display_with_prefix() {
        let d = Diagnostic::warning(W003, "Skill body is very short");
        assert_eq!(d.to_string(), "warning: Skill body is very short");
    }

    #[test]
    fn is_error_and_is_warning() {
        let e = Diagnostic::error(E001, "test");
        assert!(e.is_error());
        assert!(!e.is_warning());
        let w = Diagnostic::warning(W001, "test");
        assert!(w.is_warning());
        assert!(!w.is_error());
    }

    #[test]
    fn builder_pattern_chains() {
        let d = Diagnostic::error(E003, "Invalid model 'gpt'")
            .with_field("model")
            .with_suggestion("Use one of: sonnet, opus, haiku");
        assert_eq!(d.code, E003);
        assert_eq!(d.field.as_deref(), Some("model"));
        assert!(d.suggestion.is_some());
    }

    #[test]
    fn serialize_json_omits_none_fields() {
        let d = Diagnostic::error(E002, "missing");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["code"], "E002");
        assert!(json.get("field").is_none());
        assert!(json.get("suggestion").is_none());
    }

    #[test]
    fn severity_from_manifest() {
        assert_eq!(Severity::from_manifest("error"), Severity::Error);
        assert_eq!(Severity::from_manifest(" ERROR "), Severity::Error);
        assert_eq!(Severity::from_manifest("warning"), Severity::Warning);
        assert_eq!(Severity::from_manifest("info"), Severity::Warning);
    }

    #[test]
    fn codes_are_unique() {
        let codes = [
            E000, E001, E002, E003, E004, E005, E006, E007, E008, W001, W002, W003, W004, W005,
        ];
        let mut seen = std::collections::HashSet::new();
        for code in &codes {
            assert!(seen.insert(code), "duplicate code: {code}");
        }
    }
}
