use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::errors::Result;
use crate::parser::{parse_document, read_file_checked};

/// Document category selecting the applicable schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Skill,
    Agent,
    Command,
    Plugin,
    Hooks,
}

impl Kind {
    /// All kinds, in reporting order.
    pub const ALL: [Kind; 5] = [
        Kind::Skill,
        Kind::Agent,
        Kind::Command,
        Kind::Plugin,
        Kind::Hooks,
    ];

    /// Lowercase name used in messages and JSON output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Skill => "skill",
            Kind::Agent => "agent",
            Kind::Command => "command",
            Kind::Plugin => "plugin",
            Kind::Hooks => "hooks",
        }
    }

    /// Returns `true` for kinds stored as header + body text documents.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, Kind::Skill | Kind::Agent | Kind::Command)
    }

    /// Returns `true` if documents of this kind must carry a header block.
    #[must_use]
    pub fn requires_header(self) -> bool {
        matches!(self, Kind::Skill | Kind::Agent)
    }

    /// Minimum trimmed body length before a "very short" warning.
    #[must_use]
    pub fn body_floor(self) -> Option<usize> {
        match self {
            Kind::Skill => Some(50),
            Kind::Command => Some(10),
            _ => None,
        }
    }

    /// Classify a path by naming convention.
    ///
    /// Directories are plugins when they hold `.claude-plugin/`, skills
    /// when they hold `SKILL.md`. Files are matched by name, then by the
    /// nearest `agents` or `commands` ancestor. Returns `None` when the
    /// path fits no convention.
    #[must_use]
    pub fn infer(path: &Path) -> Option<Kind> {
        if path.is_dir() {
            if path.join(".claude-plugin").is_dir() {
                return Some(Kind::Plugin);
            }
            if path.join("SKILL.md").is_file() || path.join("skill.md").is_file() {
                return Some(Kind::Skill);
            }
            return None;
        }

        let name = path.file_name()?.to_str()?;
        match name {
            "hooks.json" | "settings.json" => return Some(Kind::Hooks),
            "plugin.json" => return Some(Kind::Plugin),
            "SKILL.md" | "skill.md" => return Some(Kind::Skill),
            _ => {}
        }

        if !path.extension().is_some_and(|e| e == "md") {
            return None;
        }
        let parent = path.parent()?;
        for component in parent.components().rev() {
            match component.as_os_str().to_str() {
                Some("agents") => return Some(Kind::Agent),
                Some("commands") => return Some(Kind::Command),
                _ => {}
            }
        }
        Some(Kind::Skill)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skill" | "skills" => Ok(Kind::Skill),
            "agent" | "agents" => Ok(Kind::Agent),
            "command" | "commands" => Ok(Kind::Command),
            "plugin" | "plugins" => Ok(Kind::Plugin),
            "hook" | "hooks" => Ok(Kind::Hooks),
            other => Err(format!("unknown kind: '{other}'")),
        }
    }
}

/// A header field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Bool(bool),
    Scalar(String),
    List(Vec<String>),
}

impl HeaderValue {
    /// The string content of a scalar value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable rendering used in diagnostic messages.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            HeaderValue::Bool(b) => b.to_string(),
            HeaderValue::Scalar(s) => s.clone(),
            HeaderValue::List(items) => format!("[{}]", items.join(", ")),
        }
    }
}

/// Parsed header fields in their original order. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    fields: Vec<(String, HeaderValue)>,
}

impl Header {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. An existing field keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: HeaderValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut HeaderValue> {
        self.fields
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Scalar string value of a field, if present and scalar.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HeaderValue::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A text document split into header and body.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub kind: Kind,
    pub text: String,
    /// `None` when the text carries no (well-formed) header block.
    pub header: Option<Header>,
    pub body: String,
    /// 1-based file line on which `body` starts.
    pub body_line: usize,
}

impl Document {
    /// Build a document from already-read text.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: Kind, text: impl Into<String>) -> Self {
        let text = text.into();
        let parsed = parse_document(&text);
        Self {
            path: path.into(),
            kind,
            header: parsed.header,
            body: parsed.body,
            body_line: parsed.body_line,
            text,
        }
    }

    /// Read and parse a document from disk.
    pub fn load(path: &Path, kind: Kind) -> Result<Self> {
        let text = read_file_checked(path)?;
        Ok(Self::new(path, kind, text))
    }

    /// Returns `true` if a header block was found.
    #[must_use]
    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    /// Directory containing the document.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }
}
