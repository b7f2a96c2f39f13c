//! Token footprint estimation.
//!
//! Counts are a characters-per-token approximation, good enough to flag
//! documents that are far outside the recommended size for their kind.
//! Results are advisory and never affect validity.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::fs_util::{files_with_extension, walk_files};
use crate::models::{Document, Kind};

/// Approximate characters per token for English prose.
pub const CHARS_PER_TOKEN: usize = 4;

/// Name of the section preceding the first heading.
pub const INTRO_SECTION: &str = "_intro";

/// Estimated token count of `text`.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / CHARS_PER_TOKEN
}

/// Recommended `(min, max)` token range for a kind.
#[must_use]
pub fn token_range(kind: Kind) -> Option<(usize, usize)> {
    match kind {
        Kind::Skill => Some((500, 1500)),
        Kind::Agent => Some((800, 2000)),
        Kind::Command => Some((50, 500)),
        Kind::Plugin => Some((0, 5000)),
        Kind::Hooks => None,
    }
}

/// Token count of one named part of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub tokens: usize,
}

/// Token breakdown for one extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenCount {
    pub path: PathBuf,
    pub kind: Kind,
    pub total_tokens: usize,
    pub total_chars: usize,
    pub header_tokens: usize,
    pub body_tokens: usize,
    pub references_tokens: usize,
    pub sections: Vec<Section>,
    pub recommendation: String,
}

fn set_section(sections: &mut Vec<Section>, title: String, tokens: usize) {
    match sections.iter_mut().find(|s| s.title == title) {
        Some(existing) => existing.tokens = tokens,
        None => sections.push(Section { title, tokens }),
    }
}

/// Split markdown into heading-delimited sections with their token counts.
///
/// Text before the first heading is [`INTRO_SECTION`]. A heading followed
/// directly by another heading yields no section. A repeated title keeps
/// its first position and the last count.
#[must_use]
pub fn extract_sections(markdown: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut title = INTRO_SECTION.to_string();
    let mut lines: Vec<&str> = Vec::new();

    for line in markdown.split('\n') {
        if line.starts_with('#') {
            if !lines.is_empty() {
                set_section(&mut sections, title, estimate_tokens(&lines.join("\n")));
            }
            title = line.trim_start_matches('#').trim().to_string();
            lines.clear();
        } else {
            lines.push(line);
        }
    }
    if !lines.is_empty() {
        set_section(&mut sections, title, estimate_tokens(&lines.join("\n")));
    }
    sections
}

fn recommend(kind: Kind, total: usize, files: usize) -> String {
    let Some((min, max)) = token_range(kind) else {
        return String::new();
    };
    match kind {
        Kind::Skill if total < min => {
            format!("Skill may be too sparse ({total} tokens, recommend {min}-{max})")
        }
        Kind::Agent if total < min => format!("Agent may be too sparse ({total} tokens)"),
        Kind::Skill | Kind::Agent if total > max => {
            format!("Consider reducing tokens ({total} > {max} max)")
        }
        Kind::Skill | Kind::Agent => "Token count within recommended range".to_string(),
        Kind::Command if total > max => {
            format!("Command is verbose ({total} tokens), consider simplifying")
        }
        Kind::Command => "Token count acceptable".to_string(),
        Kind::Plugin => format!("Plugin total: {total} tokens across {files} files"),
        Kind::Hooks => String::new(),
    }
}

/// Count tokens for a text document. Skills also count every `.md` file in
/// their `references/` directory, each as a `ref:<name>` section.
#[must_use]
pub fn count_document(doc: &Document) -> TokenCount {
    let header_tokens = if doc.has_header() {
        // Header text between the delimiters.
        let header_chars = doc.text.chars().count() - doc.body.chars().count();
        header_chars.saturating_sub(2 * crate::parser::DELIMITER.len()) / CHARS_PER_TOKEN
    } else {
        0
    };
    let body_tokens = estimate_tokens(&doc.body);
    let mut sections = if doc.kind == Kind::Command {
        Vec::new()
    } else {
        extract_sections(&doc.body)
    };

    let mut references_tokens = 0;
    if doc.kind == Kind::Skill {
        for file in files_with_extension(&doc.dir().join("references"), "md") {
            match std::fs::read_to_string(&file) {
                Ok(text) => {
                    let tokens = estimate_tokens(&text);
                    references_tokens += tokens;
                    let name = file.file_name().unwrap_or_default().to_string_lossy();
                    set_section(&mut sections, format!("ref:{name}"), tokens);
                }
                Err(e) => debug!(path = %file.display(), error = %e, "skipping unreadable reference"),
            }
        }
    }

    let total_tokens = header_tokens + body_tokens + references_tokens;
    TokenCount {
        path: doc.path.clone(),
        kind: doc.kind,
        total_tokens,
        total_chars: doc.text.chars().count(),
        header_tokens,
        body_tokens,
        references_tokens,
        sections,
        recommendation: recommend(doc.kind, total_tokens, 0),
    }
}

/// Count tokens across a plugin: every `.md` and `.json` file under its
/// root, each as a section named by its relative path.
#[must_use]
pub fn count_plugin(root: &Path) -> TokenCount {
    let mut sections = Vec::new();
    let mut total_chars = 0;
    for file in walk_files(root, &["md", "json"]) {
        let Ok(text) = std::fs::read_to_string(&file) else {
            debug!(path = %file.display(), "skipping unreadable plugin file");
            continue;
        };
        total_chars += text.chars().count();
        let rel = file.strip_prefix(root).unwrap_or(&file);
        set_section(
            &mut sections,
            rel.to_string_lossy().into_owned(),
            estimate_tokens(&text),
        );
    }
    let total_tokens = sections.iter().map(|s| s.tokens).sum();
    TokenCount {
        path: root.to_path_buf(),
        kind: Kind::Plugin,
        total_tokens,
        total_chars,
        header_tokens: 0,
        body_tokens: 0,
        references_tokens: 0,
        recommendation: recommend(Kind::Plugin, total_tokens, sections.len()),
        sections,
    }
}
