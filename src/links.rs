//! Internal link checking for markdown documents.
//!
//! Two reference forms are extracted from a document body: markdown links
//! `[text](target)` and backtick-quoted `references/…` mentions. Lines
//! inside fenced blocks are ignored. Each target is then classified
//! against the filesystem relative to the source document's directory.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::fs_util::{files_with_extension, walk_files};
use crate::parser::{parse_document, read_file_checked};
use crate::validator::find_skill_md;

static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").expect("markdown link regex"));

static REFERENCE_MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`(references/[^`]+)`").expect("reference mention regex"));

/// How a link target resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkValidity {
    /// `http`/`https` URL; never fetched.
    External,
    /// `#fragment` within the same document.
    AnchorOnly,
    /// Relative path that exists.
    ValidInternal,
    /// Relative path that does not exist.
    Broken,
}

impl LinkValidity {
    #[must_use]
    pub fn is_valid(self) -> bool {
        self != LinkValidity::Broken
    }
}

/// Syntactic form of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    /// `[text](target)`
    Markdown,
    /// `` `references/…` ``
    ReferenceMention,
}

/// A reference found in a document, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOccurrence {
    pub text: String,
    pub target: String,
    /// 1-based line in the source file.
    pub line: usize,
    pub kind: LinkKind,
}

/// Outcome of resolving one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub validity: LinkValidity,
    /// Filesystem path checked, for internal targets.
    pub resolved: Option<PathBuf>,
    pub reason: Option<String>,
    /// Alternative target that exists. Never applied automatically.
    pub suggestion: Option<String>,
}

impl Resolution {
    fn ok(validity: LinkValidity, resolved: Option<PathBuf>) -> Self {
        Self {
            validity,
            resolved,
            reason: None,
            suggestion: None,
        }
    }
}

/// A resolved reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub source: PathBuf,
    pub text: String,
    pub target: String,
    pub line: usize,
    pub kind: LinkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<PathBuf>,
    pub validity: LinkValidity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Link {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validity.is_valid()
    }
}

/// Links found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub path: PathBuf,
    pub links: Vec<Link>,
}

impl LinkReport {
    /// Number of broken links.
    #[must_use]
    pub fn broken_count(&self) -> usize {
        self.links.iter().filter(|l| !l.is_valid()).count()
    }

    /// Returns `true` when no link is broken.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.broken_count() == 0
    }

    pub fn broken(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|l| !l.is_valid())
    }
}

// ── Extraction ──────────────────────────────────────────────────────────

/// Whether the scanner is inside a fenced block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FenceState {
    #[default]
    Outside,
    Inside,
}

impl FenceState {
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            FenceState::Outside => FenceState::Inside,
            FenceState::Inside => FenceState::Outside,
        }
    }
}

/// Returns `true` for a line that opens or closes a fenced block.
#[must_use]
pub fn is_fence_delimiter(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Extract references from `body`, whose first line is line `first_line`
/// of the source file.
///
/// Any fence delimiter flips the fence state regardless of which fence
/// character opened the block. `mailto:` links are skipped. A reference
/// mention preceded on its line by an odd number of `"` or `'` is taken
/// to sit inside a quoted example and is skipped.
#[must_use]
pub fn extract_links(body: &str, first_line: usize) -> Vec<LinkOccurrence> {
    let mut found = Vec::new();
    let mut fence = FenceState::Outside;

    for (idx, line) in body.split('\n').enumerate() {
        let line_no = first_line + idx;
        if is_fence_delimiter(line) {
            fence = fence.toggle();
            continue;
        }
        if fence == FenceState::Inside {
            continue;
        }

        for caps in MARKDOWN_LINK_RE.captures_iter(line) {
            let target = &caps[2];
            if target.starts_with("mailto:") {
                continue;
            }
            found.push(LinkOccurrence {
                text: caps[1].to_string(),
                target: target.to_string(),
                line: line_no,
                kind: LinkKind::Markdown,
            });
        }

        for caps in REFERENCE_MENTION_RE.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            let prefix = &line[..whole.start()];
            if prefix.matches('"').count() % 2 == 1 || prefix.matches('\'').count() % 2 == 1 {
                continue;
            }
            let target = &caps[1];
            found.push(LinkOccurrence {
                text: format!("`{target}`"),
                target: target.to_string(),
                line: line_no,
                kind: LinkKind::ReferenceMention,
            });
        }
    }

    found
}

// ── Resolution ──────────────────────────────────────────────────────────

fn is_url(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Classify `target` as written in the document at `source`.
#[must_use]
pub fn resolve_link(source: &Path, target: &str) -> Resolution {
    if is_url(target) {
        return Resolution::ok(LinkValidity::External, None);
    }
    if target.starts_with('#') {
        return Resolution::ok(LinkValidity::AnchorOnly, None);
    }

    let path_part = target.split('#').next().unwrap_or(target);
    if path_part.is_empty() {
        return Resolution::ok(LinkValidity::AnchorOnly, None);
    }

    let source_dir = source.parent().unwrap_or(Path::new("."));
    let resolved = source_dir.join(path_part);
    if resolved.exists() {
        return Resolution::ok(LinkValidity::ValidInternal, Some(resolved));
    }

    Resolution {
        validity: LinkValidity::Broken,
        reason: Some(format!("File not found: {}", resolved.display())),
        suggestion: suggest(source_dir, path_part),
        resolved: Some(resolved),
    }
}

/// First candidate that exists: `<target>.md` for extension-less targets,
/// then `references/<target>` and `references/<target>.md` for targets not
/// already under `references`.
fn suggest(source_dir: &Path, target: &str) -> Option<String> {
    let mut candidates = Vec::new();
    if Path::new(target).extension().is_none() {
        candidates.push(format!("{target}.md"));
    }
    if !target.contains("references") {
        candidates.push(format!("references/{target}"));
        candidates.push(format!("references/{target}.md"));
    }
    candidates
        .into_iter()
        .find(|c| source_dir.join(c).exists())
}

// ── Linting ─────────────────────────────────────────────────────────────

/// Lint already-read document text.
#[must_use]
pub fn lint_text(path: &Path, text: &str) -> LinkReport {
    let parsed = parse_document(text);
    let links = extract_links(&parsed.body, parsed.body_line)
        .into_iter()
        .map(|occ| {
            let res = resolve_link(path, &occ.target);
            Link {
                source: path.to_path_buf(),
                text: occ.text,
                target: occ.target,
                line: occ.line,
                kind: occ.kind,
                resolved: res.resolved,
                validity: res.validity,
                reason: res.reason,
                suggestion: res.suggestion,
            }
        })
        .collect();
    LinkReport {
        path: path.to_path_buf(),
        links,
    }
}

/// Lint a parsed document.
#[must_use]
pub fn lint_document(doc: &crate::models::Document) -> LinkReport {
    lint_text(&doc.path, &doc.text)
}

/// Lint a file on disk. An unreadable file yields a single broken
/// pseudo-link at line 0.
#[must_use]
pub fn lint_file(path: &Path) -> LinkReport {
    match read_file_checked(path) {
        Ok(text) => lint_text(path, &text),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read file for link check");
            LinkReport {
                path: path.to_path_buf(),
                links: vec![Link {
                    source: path.to_path_buf(),
                    text: String::new(),
                    target: String::new(),
                    line: 0,
                    kind: LinkKind::Markdown,
                    resolved: None,
                    validity: LinkValidity::Broken,
                    reason: Some(format!("Cannot read file: {e}")),
                    suggestion: None,
                }],
            }
        }
    }
}

/// Lint a skill document and every `.md` file in its `references/`
/// directory. `path` may be the skill directory or the document itself.
#[must_use]
pub fn lint_skill(path: &Path) -> Vec<LinkReport> {
    let doc = if path.is_dir() {
        find_skill_md(path).unwrap_or_else(|| path.join("SKILL.md"))
    } else {
        path.to_path_buf()
    };
    let dir = doc.parent().unwrap_or(Path::new(".")).to_path_buf();

    let mut reports = vec![lint_file(&doc)];
    reports.extend(
        files_with_extension(&dir.join("references"), "md")
            .iter()
            .map(|p| lint_file(p)),
    );
    reports
}

/// Lint every `.md` file under a plugin root.
#[must_use]
pub fn lint_plugin(root: &Path) -> Vec<LinkReport> {
    walk_files(root, &["md"]).iter().map(|p| lint_file(p)).collect()
}
