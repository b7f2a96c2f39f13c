//! Deprecated-pattern detection.
//!
//! Rules come from the manifest's `deprecations` list. Each rule is tested
//! against every line of a document; a rule matches a line at most once.

use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::{debug, warn};

use crate::diagnostics::Severity;
use crate::manifest::Manifest;
use crate::parser::read_file_checked;

/// Maximum characters of a matched line kept in a [`PatternMatch`].
pub const EXCERPT_LIMIT: usize = 80;

const DEFAULT_REPLACEMENT: &str = "see documentation";
const DEFAULT_SINCE: &str = "unknown";

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    /// Patterns using lookaround or backreferences.
    Backtracking(fancy_regex::Regex),
    /// Lowercased literal, for patterns that do not compile.
    Literal(String),
}

impl Matcher {
    fn compile(pattern: &str) -> Self {
        let err = match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(re) => return Matcher::Regex(re),
            Err(e) => e,
        };
        match fancy_regex::Regex::new(&format!("(?i){pattern}")) {
            Ok(re) => {
                debug!(pattern, "compiled with backtracking matcher");
                Matcher::Backtracking(re)
            }
            Err(_) => {
                warn!(pattern, error = %err, "pattern is not a regex, matching literally");
                Matcher::Literal(pattern.to_lowercase())
            }
        }
    }
}

/// One compiled deprecation rule.
#[derive(Debug, Clone, Serialize)]
pub struct DeprecationRule {
    pub pattern: String,
    pub replacement: String,
    pub severity: Severity,
    pub since: String,
    #[serde(skip)]
    matcher: Matcher,
}

impl DeprecationRule {
    /// Compile a rule. The pattern is matched case-insensitively. Lookaround
    /// and backreferences are supported; a pattern that is not a valid regex
    /// at all is matched as a literal substring.
    #[must_use]
    pub fn new(
        pattern: impl Into<String>,
        replacement: impl Into<String>,
        severity: Severity,
        since: impl Into<String>,
    ) -> Self {
        let pattern = pattern.into();
        let matcher = Matcher::compile(&pattern);
        Self {
            pattern,
            replacement: replacement.into(),
            severity,
            since: since.into(),
            matcher,
        }
    }

    /// Build a rule from a raw manifest entry. Returns `None` for entries
    /// without a string `pattern`.
    fn from_value(entry: &serde_json::Value) -> Option<Self> {
        let pattern = entry.get("pattern")?.as_str()?;
        let field = |key: &str| entry.get(key).and_then(serde_json::Value::as_str);
        Some(Self::new(
            pattern,
            field("replacement").unwrap_or(DEFAULT_REPLACEMENT),
            Severity::from_manifest(field("severity").unwrap_or("warning")),
            field("since").unwrap_or(DEFAULT_SINCE),
        ))
    }

    /// Returns `true` if the pattern fell back to literal matching.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self.matcher, Matcher::Literal(_))
    }

    #[must_use]
    pub fn is_match(&self, line: &str) -> bool {
        match &self.matcher {
            Matcher::Regex(re) => re.is_match(line),
            // A backtrack-limit failure counts as no match.
            Matcher::Backtracking(re) => re.is_match(line).unwrap_or(false),
            Matcher::Literal(lit) => line.to_lowercase().contains(lit.as_str()),
        }
    }
}

/// A line matched by a deprecation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternMatch {
    pub file: PathBuf,
    /// 1-based line number.
    pub line: usize,
    /// Trimmed line, truncated to [`EXCERPT_LIMIT`] characters.
    pub excerpt: String,
    pub pattern: String,
    pub replacement: String,
    pub severity: Severity,
    pub since: String,
}

/// Matches found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionResult {
    pub path: PathBuf,
    pub matches: Vec<PatternMatch>,
}

impl DetectionResult {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.matches.iter().any(|m| m.severity == Severity::Error)
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.matches.iter().any(|m| m.severity == Severity::Warning)
    }
}

/// Compiled rules, in manifest order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<DeprecationRule>,
}

impl RuleSet {
    #[must_use]
    pub fn new(rules: Vec<DeprecationRule>) -> Self {
        Self { rules }
    }

    /// Compile the manifest's deprecation entries, skipping malformed ones.
    #[must_use]
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let rules = manifest
            .deprecations
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| {
                let rule = DeprecationRule::from_value(entry);
                if rule.is_none() {
                    warn!(index = idx, "skipping deprecation entry without a pattern");
                }
                rule
            })
            .collect();
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &[DeprecationRule] {
        &self.rules
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Test every line of `text` against every rule.
    #[must_use]
    pub fn scan_text(&self, path: &Path, text: &str) -> DetectionResult {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut matches = Vec::new();
        for rule in &self.rules {
            for (idx, line) in lines.iter().enumerate() {
                if rule.is_match(line) {
                    matches.push(PatternMatch {
                        file: path.to_path_buf(),
                        line: idx + 1,
                        excerpt: line.trim().chars().take(EXCERPT_LIMIT).collect(),
                        pattern: rule.pattern.clone(),
                        replacement: rule.replacement.clone(),
                        severity: rule.severity,
                        since: rule.since.clone(),
                    });
                }
            }
        }
        DetectionResult {
            path: path.to_path_buf(),
            matches,
        }
    }

    /// Scan a file on disk. An unreadable file is logged and yields no
    /// matches.
    #[must_use]
    pub fn scan_file(&self, path: &Path) -> DetectionResult {
        match read_file_checked(path) {
            Ok(text) => self.scan_text(path, &text),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read file for deprecation scan");
                DetectionResult {
                    path: path.to_path_buf(),
                    matches: Vec::new(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules_from(json: &str) -> RuleSet {
        RuleSet::from_manifest(&Manifest::from_json_str(json).unwrap())
    }

    #[test]
    fn error_rule_fails_regardless_of_others() {
        let rules = rules_from(
            r#"{ "deprecations": [
                { "pattern": "legacyFlag", "severity": "warning" },
                { "pattern": "oldTool", "severity": "error", "replacement": "newTool", "since": "2.0" }
            ] }"#,
        );
        let result = rules.scan_text(Path::new("a.md"), "line one\nuse oldTool here\n");
        assert_eq!(result.matches.len(), 1);
        let m = &result.matches[0];
        assert_eq!(m.line, 2);
        assert_eq!(m.replacement, "newTool");
        assert_eq!(m.since, "2.0");
        assert!(result.has_errors());
        assert!(!result.has_warnings());
    }

    #[test]
    fn defaults_applied() {
        let rules = rules_from(r#"{ "deprecations": [ { "pattern": "x" } ] }"#);
        let rule = &rules.rules()[0];
        assert_eq!(rule.replacement, "see documentation");
        assert_eq!(rule.severity, Severity::Warning);
        assert_eq!(rule.since, "unknown");
    }

    #[test]
    fn unknown_severity_is_warning() {
        let rules = rules_from(r#"{ "deprecations": [ { "pattern": "x", "severity": "fatal" } ] }"#);
        assert_eq!(rules.rules()[0].severity, Severity::Warning);
    }

    #[test]
    fn malformed_entries_skipped() {
        let rules = rules_from(
            r#"{ "deprecations": [ { "replacement": "y" }, 7, { "pattern": 3 }, { "pattern": "ok" } ] }"#,
        );
        assert_eq!(rules.rules().len(), 1);
        assert_eq!(rules.rules()[0].pattern, "ok");
    }

    #[test]
    fn case_insensitive_regex() {
        let rule = DeprecationRule::new(r"tools:\s*\[", "list syntax", Severity::Warning, "1.0");
        assert!(!rule.is_literal());
        assert!(rule.is_match("TOOLS: [Read]"));
        assert!(!rule.is_match("tools: Read"));
    }

    #[test]
    fn lookahead_pattern_matches() {
        let rule = DeprecationRule::new("old(?=Tool)", "newTool", Severity::Error, "2.0");
        assert!(!rule.is_literal());
        assert!(rule.is_match("use oldTool"));
        assert!(rule.is_match("USE OLDTOOL"));
        assert!(!rule.is_match("use old api"));
    }

    #[test]
    fn backreference_pattern_matches() {
        let rule = DeprecationRule::new(r"\b(\w+) \1\b", "", Severity::Warning, "1.0");
        assert!(!rule.is_literal());
        assert!(rule.is_match("run the the script"));
        assert!(!rule.is_match("run the script"));
    }

    #[test]
    fn invalid_regex_falls_back_to_literal() {
        let rule = DeprecationRule::new("foo(", "bar", Severity::Error, "1.0");
        assert!(rule.is_literal());
        assert!(rule.is_match("call FOO(1)"));
        assert!(!rule.is_match("call foo"));
    }

    #[test]
    fn one_match_per_rule_and_line() {
        let rules = RuleSet::new(vec![DeprecationRule::new("a", "b", Severity::Warning, "1")]);
        let result = rules.scan_text(Path::new("f"), "aaa a\nb\na");
        let lines: Vec<_> = result.matches.iter().map(|m| m.line).collect();
        assert_eq!(lines, [1, 3]);
    }

    #[test]
    fn matches_ordered_by_rule_then_line() {
        let rules = RuleSet::new(vec![
            DeprecationRule::new("beta", "", Severity::Warning, "1"),
            DeprecationRule::new("alpha", "", Severity::Warning, "1"),
        ]);
        let result = rules.scan_text(Path::new("f"), "alpha\nbeta\n");
        let found: Vec<_> = result.matches.iter().map(|m| (m.pattern.as_str(), m.line)).collect();
        assert_eq!(found, [("beta", 2), ("alpha", 1)]);
    }

    #[test]
    fn adding_rule_never_removes_matches() {
        let text = "old api\nnew api\nlegacy mode\n";
        let base = RuleSet::new(vec![DeprecationRule::new("old", "", Severity::Warning, "1")]);
        let extended = RuleSet::new(vec![
            DeprecationRule::new("old", "", Severity::Warning, "1"),
            DeprecationRule::new("legacy", "", Severity::Error, "1"),
        ]);
        let before = base.scan_text(Path::new("f"), text).matches;
        let after = extended.scan_text(Path::new("f"), text).matches;
        assert!(before.iter().all(|m| after.contains(m)));
        assert!(after.len() > before.len());
    }

    #[test]
    fn excerpt_trimmed_and_truncated() {
        let rules = RuleSet::new(vec![DeprecationRule::new("x", "", Severity::Warning, "1")]);
        let line = format!("   x{}", "y".repeat(200));
        let result = rules.scan_text(Path::new("f"), &line);
        let excerpt = &result.matches[0].excerpt;
        assert_eq!(excerpt.chars().count(), EXCERPT_LIMIT);
        assert!(excerpt.starts_with('x'));
    }

    #[test]
    fn unreadable_file_yields_no_matches() {
        let rules = RuleSet::new(vec![DeprecationRule::new("x", "", Severity::Error, "1")]);
        let result = rules.scan_file(Path::new("/nonexistent/file.md"));
        assert!(result.matches.is_empty());
        assert!(!result.has_errors());
    }
}
