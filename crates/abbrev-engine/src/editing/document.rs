use std::ops::Range;

use log::warn;
use xi_rope::Rope;
use xi_rope::delta::Builder;

use crate::actions::EditorHost;
use crate::editing::{Patch, TextEdit};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Edit range {start}..{end} is outside the document (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("Offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("Edits at {first:?} and {second:?} overlap")]
    Overlapping {
        first: Range<usize>,
        second: Range<usize>,
    },
}

/// Indentation style detected in the document
#[derive(Debug, Clone, PartialEq)]
pub enum IndentStyle {
    Spaces(usize), // Number of spaces per indent level
    Tabs,          // Tab characters
}

impl IndentStyle {
    /// One level of indentation
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Tabs => "\t".to_string(),
            IndentStyle::Spaces(n) => " ".repeat(*n),
        }
    }
}

/// A text buffer with selections and a language id
///
/// The buffer is a single `xi_rope::Rope` and round-trips its bytes
/// exactly. Selections are byte ranges; an empty range is a cursor. Every
/// successful [`Document::apply`] bumps the version.
pub struct Document {
    pub(crate) buffer: Rope,
    pub(crate) selections: Vec<Range<usize>>,
    pub(crate) version: u64,
    pub(crate) language: String,
    /// Detected on load
    pub(crate) indent_style: IndentStyle,
}

impl Document {
    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8], language: impl Into<String>) -> Result<Self, DocumentError> {
        let text = std::str::from_utf8(bytes)?;
        let buffer = Rope::from(text);
        let len = buffer.len();
        let indent_style = detect_indent_style(&buffer);

        Ok(Self {
            buffer,
            selections: vec![len..len], // Start with cursor at end
            version: 0,
            language: language.into(),
            indent_style,
        })
    }

    /// Get the document's content as raw bytes (exact round-trip)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn indent_style(&self) -> &IndentStyle {
        &self.indent_style
    }

    pub fn selections(&self) -> &[Range<usize>] {
        &self.selections
    }

    /// Replace all selections. Ranges are clamped to the buffer.
    pub fn set_selections(&mut self, selections: Vec<Range<usize>>) {
        let len = self.buffer.len();
        self.selections = selections
            .into_iter()
            .map(|r| {
                let end = r.end.min(len);
                r.start.min(end)..end
            })
            .collect();
    }

    /// Collapse the selections to a single cursor.
    pub fn set_cursor(&mut self, offset: usize) {
        self.set_selections(vec![offset..offset]);
    }

    /// Byte offset of a zero-based `line` and byte `column`.
    ///
    /// Returns `None` past the end of the line or the document.
    pub fn offset_at(&self, line: usize, column: usize) -> Option<usize> {
        let text = self.buffer.to_string();
        let mut start = 0;
        for (index, content) in text.split('\n').enumerate() {
            if index == line {
                return (column <= content.len()).then_some(start + column);
            }
            start += content.len() + 1;
        }
        None
    }

    /// Apply a batch of edits atomically
    ///
    /// Edits are given in pre-edit offsets and may arrive in any order.
    /// The batch is rejected as a whole when any range is out of bounds,
    /// splits a character, or overlaps another edit.
    ///
    /// Selections move with the text: an offset before an edit stays, one
    /// after it shifts, and one inside or at the end of a replaced range
    /// lands after the inserted text.
    pub fn apply(&mut self, edits: &[TextEdit]) -> Result<Patch, DocumentError> {
        let mut sorted: Vec<&TextEdit> = edits.iter().collect();
        sorted.sort_by_key(|e| (e.range.start, e.range.end));
        self.validate(&sorted)?;

        // Build one delta for the whole batch
        let mut builder = Builder::new(self.buffer.len());
        for edit in &sorted {
            builder.replace(edit.range.clone(), Rope::from(edit.text.as_str()));
        }
        let delta = builder.build();

        let mut changed = Vec::with_capacity(sorted.len());
        let mut shift: isize = 0;
        for edit in &sorted {
            let start = offset_by(edit.range.start, shift);
            changed.push(start..start + edit.text.len());
            shift += edit.text.len() as isize - edit.range.len() as isize;
        }

        self.buffer = delta.apply(&self.buffer);

        let new_selections: Vec<Range<usize>> = self
            .selections
            .iter()
            .map(|r| transform_offset(r.start, &sorted)..transform_offset(r.end, &sorted))
            .collect();
        self.selections = new_selections.clone();

        self.version += 1;

        Ok(Patch {
            changed,
            new_selections,
            version: self.version,
        })
    }

    fn validate(&self, sorted: &[&TextEdit]) -> Result<(), DocumentError> {
        let len = self.buffer.len();
        let text = self.buffer.to_string();
        let mut previous: Option<&Range<usize>> = None;

        for edit in sorted {
            let Range { start, end } = edit.range;
            if start > end || end > len {
                return Err(DocumentError::OutOfBounds { start, end, len });
            }
            for offset in [start, end] {
                if !text.is_char_boundary(offset) {
                    return Err(DocumentError::NotCharBoundary { offset });
                }
            }
            if let Some(prev) = previous
                && start < prev.end
            {
                return Err(DocumentError::Overlapping {
                    first: prev.clone(),
                    second: edit.range.clone(),
                });
            }
            previous = Some(&edit.range);
        }
        Ok(())
    }
}

impl EditorHost for Document {
    fn text(&self) -> String {
        Document::text(self)
    }

    fn language_id(&self) -> String {
        self.language.clone()
    }

    fn selections(&self) -> Vec<Range<usize>> {
        self.selections.clone()
    }

    fn apply_edits(&mut self, edits: Vec<TextEdit>) -> bool {
        match self.apply(&edits) {
            Ok(_) => true,
            Err(e) => {
                warn!("Rejected {} edit(s): {e}", edits.len());
                false
            }
        }
    }

    fn indent_unit(&self) -> String {
        self.indent_style.unit()
    }
}

fn offset_by(offset: usize, shift: isize) -> usize {
    offset.saturating_add_signed(shift)
}

/// Map a pre-edit offset through sorted edits.
fn transform_offset(offset: usize, sorted: &[&TextEdit]) -> usize {
    let mut shift: isize = 0;
    for edit in sorted {
        if offset < edit.range.start {
            break;
        }
        if offset <= edit.range.end {
            return offset_by(edit.range.start, shift) + edit.text.len();
        }
        shift += edit.text.len() as isize - edit.range.len() as isize;
    }
    offset_by(offset, shift)
}

/// First indented line wins; tabs when nothing is indented.
fn detect_indent_style(buffer: &Rope) -> IndentStyle {
    let text = buffer.to_string();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with('\t') {
            return IndentStyle::Tabs;
        }

        let spaces = line.chars().take_while(|&c| c == ' ').count();
        if spaces > 0 {
            return IndentStyle::Spaces(spaces);
        }
    }

    IndentStyle::Tabs
}
