//! Full scan: structural validation, link checking, deprecation detection,
//! and token estimation over a set of extensions, folded into one verdict.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::deprecations::{DetectionResult, RuleSet};
use crate::fs_util::{files_with_extension, walk_files};
use crate::links::{self, LinkReport};
use crate::manifest::Manifest;
use crate::models::{Document, Kind};
use crate::plugin::plugin_root;
use crate::schema::SchemaRegistry;
use crate::tokens::{self, TokenCount};
use crate::validator::{self, find_skill_md, ValidationResult};

/// Files scanned for deprecated patterns inside a plugin.
const PLUGIN_SCAN_EXTENSIONS: &[&str] = &["md", "json", "sh"];

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    #[must_use]
    pub fn is_pass(self) -> bool {
        self == Verdict::Pass
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Everything found for one extension.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub kind: Kind,
    pub validation: ValidationResult,
    pub links: Vec<LinkReport>,
    pub deprecations: Vec<DetectionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenCount>,
}

impl DocumentReport {
    #[must_use]
    pub fn broken_links(&self) -> usize {
        self.links.iter().map(LinkReport::broken_count).sum()
    }

    #[must_use]
    pub fn has_deprecation_errors(&self) -> bool {
        self.deprecations.iter().any(DetectionResult::has_errors)
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.validation.is_valid() && self.broken_links() == 0 && !self.has_deprecation_errors()
    }
}

/// Reports for every scanned extension, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub documents: Vec<DocumentReport>,
}

impl ScanReport {
    #[must_use]
    pub fn validation_passed(&self) -> bool {
        self.documents.iter().all(|d| d.validation.is_valid())
    }

    #[must_use]
    pub fn links_passed(&self) -> bool {
        self.documents.iter().all(|d| d.broken_links() == 0)
    }

    #[must_use]
    pub fn deprecations_passed(&self) -> bool {
        !self.documents.iter().any(DocumentReport::has_deprecation_errors)
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.validation_passed() && self.links_passed() && self.deprecations_passed()
    }

    /// Computed only from the finished reports.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        if self.passed() {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.documents.iter().map(|d| d.validation.errors.len()).sum()
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.documents.iter().map(|d| d.validation.warnings.len()).sum()
    }
}

/// Schema registry and deprecation rules for one run. Both are immutable
/// once built, so an engine can be shared across threads.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: SchemaRegistry,
    rules: RuleSet,
}

impl Engine {
    #[must_use]
    pub fn new(manifest: &Manifest) -> Self {
        let engine = Self {
            registry: SchemaRegistry::from_manifest(manifest),
            rules: RuleSet::from_manifest(manifest),
        };
        debug!(rules = engine.rules.rules().len(), "engine ready");
        engine
    }

    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Structural validation only.
    #[must_use]
    pub fn validate(&self, path: &Path, kind: Kind) -> ValidationResult {
        validator::validate_path(path, kind, &self.registry)
    }

    /// Run every check on one extension.
    #[must_use]
    pub fn scan_path(&self, path: &Path, kind: Kind) -> DocumentReport {
        debug!(path = %path.display(), kind = %kind, "scanning");
        match kind {
            Kind::Skill | Kind::Agent | Kind::Command => self.scan_text_kind(path, kind),
            Kind::Plugin => self.scan_plugin(&plugin_root(path)),
            Kind::Hooks => DocumentReport {
                path: path.to_path_buf(),
                kind,
                validation: self.validate(path, kind),
                links: Vec::new(),
                deprecations: vec![self.rules.scan_file(path)],
                tokens: None,
            },
        }
    }

    fn scan_text_kind(&self, path: &Path, kind: Kind) -> DocumentReport {
        let file = match kind {
            Kind::Skill if path.is_dir() => {
                find_skill_md(path).unwrap_or_else(|| path.join("SKILL.md"))
            }
            _ => path.to_path_buf(),
        };

        let doc = match Document::load(&file, kind) {
            Ok(doc) => doc,
            Err(e) => {
                return DocumentReport {
                    path: file.clone(),
                    kind,
                    validation: validator::unreadable(&file, kind, &e),
                    links: Vec::new(),
                    deprecations: Vec::new(),
                    tokens: None,
                }
            }
        };

        let mut link_reports = vec![links::lint_document(&doc)];
        if kind == Kind::Skill {
            link_reports.extend(
                files_with_extension(&doc.dir().join("references"), "md")
                    .iter()
                    .map(|p| links::lint_file(p)),
            );
        }

        DocumentReport {
            validation: validator::validate_document(&doc, &self.registry),
            links: link_reports,
            deprecations: vec![self.rules.scan_text(&doc.path, &doc.text)],
            tokens: Some(tokens::count_document(&doc)),
            path: doc.path,
            kind,
        }
    }

    fn scan_plugin(&self, root: &Path) -> DocumentReport {
        let link_reports = links::lint_plugin(root);
        let deprecations = walk_files(root, PLUGIN_SCAN_EXTENSIONS)
            .iter()
            .map(|p| self.rules.scan_file(p))
            .filter(|r| !r.matches.is_empty())
            .collect();
        DocumentReport {
            path: root.to_path_buf(),
            kind: Kind::Plugin,
            validation: validator::validate_path(root, Kind::Plugin, &self.registry),
            links: link_reports,
            deprecations,
            tokens: Some(tokens::count_plugin(root)),
        }
    }

    /// Scan every input and fold the reports. The verdict is only computed
    /// after all inputs are processed.
    #[must_use]
    pub fn scan(&self, inputs: &[(PathBuf, Kind)]) -> ScanReport {
        let documents: Vec<_> = inputs
            .iter()
            .map(|(path, kind)| self.scan_path(path, *kind))
            .collect();
        let report = ScanReport { documents };
        info!(
            documents = report.documents.len(),
            errors = report.error_count(),
            verdict = %report.verdict(),
            "scan complete"
        );
        report
    }
}
