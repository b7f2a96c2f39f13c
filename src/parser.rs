//! Header block parsing.
//!
//! Documents may open with a header block delimited by `---` lines. The
//! block holds a small subset of YAML: `key: value` scalars, `- item`
//! lists attached to the preceding key, quoted strings, and booleans.
//! Parsing never fails; anything that is not a well-formed block is body.

use std::path::Path;

use crate::errors::{ExtlintError, Result};
use crate::models::{Header, HeaderValue};

/// Header block delimiter.
pub const DELIMITER: &str = "---";

/// Maximum document size accepted by [`read_file_checked`] (1 MiB).
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Result of splitting a document into header and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// `None` when the text has no well-formed header block.
    pub header: Option<Header>,
    pub body: String,
    /// 1-based line of the original text on which `body` starts.
    pub body_line: usize,
}

/// Split `text` into header fields and body.
///
/// The header block runs from the leading delimiter to the next occurrence
/// of the delimiter. Text that does not start with the delimiter, or that
/// has no second delimiter, is returned whole as body.
#[must_use]
pub fn parse_document(text: &str) -> ParsedDocument {
    let whole = || ParsedDocument {
        header: None,
        body: text.to_string(),
        body_line: 1,
    };

    let Some(rest) = text.strip_prefix(DELIMITER) else {
        return whole();
    };
    let Some(end) = rest.find(DELIMITER) else {
        return whole();
    };

    let body_start = DELIMITER.len() + end + DELIMITER.len();
    ParsedDocument {
        header: Some(parse_header_block(&rest[..end])),
        body: text[body_start..].to_string(),
        body_line: 1 + text[..body_start].matches('\n').count(),
    }
}

/// Parse the lines between the delimiters into ordered header fields.
#[must_use]
pub fn parse_header_block(block: &str) -> Header {
    let mut header = Header::new();
    let mut current_key: Option<String> = None;
    let mut in_list = false;

    for line in block.trim().lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        if let (Some(item), Some(key)) = (stripped.strip_prefix("- "), current_key.as_deref()) {
            if !key.is_empty() {
                let item = item.trim().to_string();
                if in_list {
                    if let Some(HeaderValue::List(items)) = header.get_mut(key) {
                        items.push(item);
                    }
                } else {
                    header.insert(key, HeaderValue::List(vec![item]));
                    in_list = true;
                }
                continue;
            }
        }

        if let Some((key, value)) = stripped.split_once(':') {
            let key = key.trim();
            let value = value.trim();
            current_key = Some(key.to_string());
            in_list = false;
            if !value.is_empty() {
                header.insert(key, infer_value(value));
            }
        }
    }

    header
}

/// Infer a scalar's type: quoted string, boolean, or plain string.
fn infer_value(raw: &str) -> HeaderValue {
    if let Some(inner) = strip_matching_quotes(raw) {
        return HeaderValue::Scalar(inner.to_string());
    }
    if raw.eq_ignore_ascii_case("true") {
        HeaderValue::Bool(true)
    } else if raw.eq_ignore_ascii_case("false") {
        HeaderValue::Bool(false)
    } else {
        HeaderValue::Scalar(raw.to_string())
    }
}

fn strip_matching_quotes(s: &str) -> Option<&str> {
    ['"', '\'']
        .into_iter()
        .find(|&q| s.len() >= 2 && s.starts_with(q) && s.ends_with(q))
        .map(|_| &s[1..s.len() - 1])
}

impl Header {
    /// Serialize back into a delimited header block, in field order.
    ///
    /// Scalars that would re-parse differently (empty, boolean-like,
    /// padded, or already quoted) are wrapped in double quotes.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from(DELIMITER);
        out.push('\n');
        for (key, value) in self.iter() {
            match value {
                HeaderValue::Bool(b) => out.push_str(&format!("{key}: {b}\n")),
                HeaderValue::Scalar(s) if needs_quotes(s) => {
                    out.push_str(&format!("{key}: \"{s}\"\n"));
                }
                HeaderValue::Scalar(s) => out.push_str(&format!("{key}: {s}\n")),
                HeaderValue::List(items) => {
                    out.push_str(&format!("{key}:\n"));
                    for item in items {
                        out.push_str(&format!("  - {item}\n"));
                    }
                }
            }
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.trim() != s
        || s.eq_ignore_ascii_case("true")
        || s.eq_ignore_ascii_case("false")
        || strip_matching_quotes(s).is_some()
}

/// Read a document, refusing files over [`MAX_FILE_SIZE`].
pub fn read_file_checked(path: &Path) -> Result<String> {
    let size = std::fs::metadata(path)?.len();
    if size > MAX_FILE_SIZE {
        return Err(ExtlintError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit: MAX_FILE_SIZE,
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn header_of(text: &str) -> Header {
        parse_document(text).header.expect("expected a header block")
    }

    #[test]
    fn no_delimiter_means_no_header() {
        let parsed = parse_document("# Title\n\nBody text.\n");
        assert!(parsed.header.is_none());
        assert_eq!(parsed.body, "# Title\n\nBody text.\n");
        assert_eq!(parsed.body_line, 1);
    }

    #[test]
    fn single_delimiter_degrades_to_body() {
        let text = "---\nname: foo\nno closing delimiter\n";
        let parsed = parse_document(text);
        assert!(parsed.header.is_none());
        assert_eq!(parsed.body, text);
    }

    #[test]
    fn empty_text() {
        let parsed = parse_document("");
        assert!(parsed.header.is_none());
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn scalar_fields_and_body() {
        let parsed = parse_document("---\nname: foo\ndescription: Does things\n---\nBody\n");
        let header = parsed.header.unwrap();
        assert_eq!(header.get_str("name"), Some("foo"));
        assert_eq!(header.get_str("description"), Some("Does things"));
        assert_eq!(parsed.body, "\nBody\n");
        assert_eq!(parsed.body_line, 4);
    }

    #[test]
    fn value_split_at_first_colon() {
        let h = header_of("---\ndescription: Use when: reviewing code\n---\n");
        assert_eq!(h.get_str("description"), Some("Use when: reviewing code"));
    }

    #[test]
    fn booleans_case_insensitive() {
        let h = header_of("---\na: true\nb: FALSE\nc: True\nd: yes\n---\n");
        assert_eq!(h.get("a"), Some(&HeaderValue::Bool(true)));
        assert_eq!(h.get("b"), Some(&HeaderValue::Bool(false)));
        assert_eq!(h.get("c"), Some(&HeaderValue::Bool(true)));
        assert_eq!(h.get_str("d"), Some("yes"));
    }

    #[test]
    fn quotes_stripped_and_not_boolean() {
        let h = header_of("---\na: \"hello world\"\nb: 'single'\nc: \"true\"\nd: \"mixed'\n---\n");
        assert_eq!(h.get_str("a"), Some("hello world"));
        assert_eq!(h.get_str("b"), Some("single"));
        assert_eq!(h.get_str("c"), Some("true"));
        assert_eq!(h.get_str("d"), Some("\"mixed'"));
    }

    #[test]
    fn list_items_attach_to_last_key() {
        let h = header_of("---\nname: foo\ntools:\n  - Read\n  - Bash\nmodel: opus\n---\n");
        assert_eq!(
            h.get("tools"),
            Some(&HeaderValue::List(vec!["Read".into(), "Bash".into()]))
        );
        assert_eq!(h.get_str("model"), Some("opus"));
    }

    #[test]
    fn list_item_converts_scalar() {
        let h = header_of("---\ntools: Read\n- Bash\n---\n");
        assert_eq!(h.get("tools"), Some(&HeaderValue::List(vec!["Bash".into()])));
    }

    #[test]
    fn empty_value_without_items_is_absent() {
        let h = header_of("---\nname: foo\nhooks:\n---\n");
        assert!(!h.contains_key("hooks"));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let h = header_of("---\n# comment\n\nname: foo\n---\n");
        let keys: Vec<_> = h.keys().collect();
        assert_eq!(keys, ["name"]);
    }

    #[test]
    fn list_item_before_any_key_is_ignored() {
        let h = header_of("---\n- orphan\nname: foo\n---\n");
        let keys: Vec<_> = h.keys().collect();
        assert_eq!(keys, ["name"]);
    }

    #[test]
    fn empty_header_block_is_present_but_empty() {
        let parsed = parse_document("---\n---\nBody\n");
        let header = parsed.header.unwrap();
        assert!(header.is_empty());
        assert_eq!(parsed.body_line, 2);
    }

    #[test]
    fn render_reparses_to_same_fields() {
        let text = "---\nname: foo\nflag: true\nquoted: \"false\"\nblank: \"\"\n\
                    padded: \" x \"\ntools:\n  - Read\n  - Bash\nnote: 'kept'\n---\nBody\n";
        let original = header_of(text);
        let rendered = original.render();
        let reparsed = header_of(&rendered);
        assert_eq!(reparsed, original);
        let keys: Vec<_> = reparsed.keys().collect();
        assert_eq!(keys, ["name", "flag", "quoted", "blank", "padded", "tools", "note"]);
    }

    #[test]
    fn render_quotes_values_that_look_quoted() {
        let mut h = Header::new();
        h.insert("a", HeaderValue::Scalar("'inner'".into()));
        let reparsed = header_of(&h.render());
        assert_eq!(reparsed.get_str("a"), Some("'inner'"));
    }

    #[test]
    fn read_file_checked_reads_small_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "hello").unwrap();
        assert_eq!(read_file_checked(&path).unwrap(), "hello");
    }

    #[test]
    fn read_file_checked_rejects_large_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.md");
        fs::write(&path, "a".repeat(MAX_FILE_SIZE as usize + 1)).unwrap();
        let err = read_file_checked(&path).unwrap_err();
        assert!(matches!(err, ExtlintError::FileTooLarge { .. }));
    }

    #[test]
    fn read_file_checked_missing_file() {
        let err = read_file_checked(Path::new("/nonexistent/doc.md")).unwrap_err();
        assert!(matches!(err, ExtlintError::Io(_)));
    }
}
