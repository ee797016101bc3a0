//! Document domain types — source kinds, citation markers, and the
//! line-addressable text every prompt is grounded on.
//!
//! The marker format defined here is shared verbatim by the extractor (which
//! writes markers) and the prompt builder (which tells the model to cite
//! them), so a citation in a model answer can be traced back to the literal
//! source line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How prompts describe the marker scheme to the model.
///
/// Must stay in sync with [`Marker`]'s `Display` implementation.
pub const MARKER_VOCABULARY: &str = "[Page X, Line Y] or [Line Y]";

/// The declared kind of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Paginated source; markers are `[Page P, Line L]`.
    Pdf,
    /// Flat source; markers are `[Line L]`.
    #[serde(rename = "txt")]
    Text,
}

impl SourceKind {
    /// Resolve the kind from the text after the last `.` of a filename,
    /// case-insensitively. Only `pdf` and `txt` are accepted.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "txt",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A citation location. Page and line numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Marker {
    /// Line `line` of page `page` (line numbering restarts on every page).
    Page { page: u32, line: u32 },
    /// Line `line` of a flat source (numbered continuously).
    Line { line: u32 },
}

impl Marker {
    /// Parse exactly one bracketed marker, e.g. `[Page 2, Line 7]`.
    pub fn parse(token: &str) -> Option<Self> {
        let inner = token.strip_prefix('[')?.strip_suffix(']')?;
        if let Some(rest) = inner.strip_prefix("Page ") {
            let (page, line) = rest.split_once(", Line ")?;
            return Some(Self::Page {
                page: parse_position(page)?,
                line: parse_position(line)?,
            });
        }
        let line = inner.strip_prefix("Line ")?;
        Some(Self::Line {
            line: parse_position(line)?,
        })
    }

    /// Every well-formed marker appearing in `text`, in order of appearance.
    ///
    /// Bracketed text that is not a marker (ranges, footnotes) is skipped.
    pub fn find_all(text: &str) -> Vec<Self> {
        let mut found = Vec::new();
        let mut rest = text;
        while let Some(open) = rest.find('[') {
            let candidate = &rest[open..];
            match candidate.find(']') {
                Some(close) => {
                    if let Some(marker) = Self::parse(&candidate[..=close]) {
                        found.push(marker);
                    }
                    rest = &candidate[1..];
                }
                None => break,
            }
        }
        found
    }
}

fn parse_position(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|n| *n > 0)
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page { page, line } => write!(f, "[Page {page}, Line {line}]"),
            Self::Line { line } => write!(f, "[Line {line}]"),
        }
    }
}

/// Document text in which every non-blank source line carries a [`Marker`].
///
/// Blank source lines are kept as bare newlines so numbering stays
/// contiguous. Built once with an [`AddressableTextWriter`], immutable after.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressableText {
    text: String,
    marked_lines: usize,
}

impl AddressableText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of marker-tagged (non-blank) lines.
    pub fn marked_lines(&self) -> usize {
        self.marked_lines
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The literal source line a marker points at, if it exists.
    pub fn resolve(&self, marker: &Marker) -> Option<&str> {
        let prefix = format!("{marker} ");
        self.text
            .lines()
            .find_map(|line| line.strip_prefix(prefix.as_str()))
    }
}

impl fmt::Display for AddressableText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Incremental builder that keeps the marker format in one place.
#[derive(Debug, Default)]
pub struct AddressableTextWriter {
    text: String,
    marked_lines: usize,
}

impl AddressableTextWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `"{marker} {line}\n"`.
    pub fn push_line(&mut self, marker: Marker, line: &str) {
        use std::fmt::Write;
        // Writing into a String cannot fail.
        let _ = writeln!(self.text, "{marker} {line}");
        self.marked_lines += 1;
    }

    /// Append a bare newline for a blank source line.
    pub fn push_blank(&mut self) {
        self.text.push('\n');
    }

    pub fn marked_lines(&self) -> usize {
        self.marked_lines
    }

    pub fn finish(self) -> AddressableText {
        AddressableText {
            text: self.text,
            marked_lines: self.marked_lines,
        }
    }
}

/// A stored document: the client-supplied name and its addressable text.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    /// Opaque identifier (the uploaded filename); not checked for uniqueness.
    pub name: String,
    pub kind: SourceKind,
    pub text: AddressableText,
    pub ingested_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(name: impl Into<String>, kind: SourceKind, text: AddressableText) -> Self {
        Self {
            name: name.into(),
            kind,
            text,
            ingested_at: Utc::now(),
        }
    }
}

/// Lightweight listing view of a [`DocumentRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub name: String,
    pub kind: SourceKind,
    pub lines: usize,
    pub ingested_at: DateTime<Utc>,
}

impl From<&DocumentRecord> for DocumentInfo {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            name: record.name.clone(),
            kind: record.kind,
            lines: record.text.marked_lines(),
            ingested_at: record.ingested_at,
        }
    }
}
