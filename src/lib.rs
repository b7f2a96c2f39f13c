pub mod deprecations;
pub mod diagnostics;
pub mod errors;
mod fs_util;
pub mod links;
pub mod manifest;
pub mod models;
pub mod parser;
pub mod plugin;
pub mod scan;
pub mod schema;
pub mod tokens;
pub mod validator;

// Re-export key types at crate root for convenience.
pub use deprecations::{DeprecationRule, DetectionResult, PatternMatch, RuleSet};
pub use diagnostics::{Diagnostic, Severity};
pub use errors::{ExtlintError, Result};
pub use links::{lint_file, lint_skill, Link, LinkReport, LinkValidity};
pub use manifest::{Manifest, DEFAULT_MANIFEST_PATH};
pub use models::{Document, Header, HeaderValue, Kind};
pub use parser::{parse_document, read_file_checked};
pub use scan::{DocumentReport, Engine, ScanReport, Verdict};
pub use schema::SchemaRegistry;
pub use tokens::{count_document, count_plugin, TokenCount};
pub use validator::{validate_document, validate_path, ValidationResult};
