/*!
 * # Editing
 *
 * An in-process editor buffer for running the abbreviation commands
 * outside an editor.
 *
 * - **`document`**: `Document`, an `xi_rope::Rope` buffer with selections,
 *   a language id and the detected indentation. Implements
 *   [`EditorHost`](crate::actions::EditorHost).
 * - **`patch`**: what an applied batch of edits changed.
 *
 * Edits are applied as one batch: every edit in a batch is validated
 * against the current buffer and compiled into a single delta, so either
 * all of them land or none do.
 *
 * ```rust
 * use abbrev_engine::editing::{Document, TextEdit};
 *
 * let mut doc = Document::from_bytes(b"<p>ul</p>", "html").unwrap();
 * let patch = doc.apply(&[TextEdit::new(3..5, "<ul></ul>")]).unwrap();
 * assert_eq!(doc.text(), "<p><ul></ul></p>");
 * assert_eq!(patch.changed, vec![3..12]);
 * ```
 */

pub mod document;
pub mod patch;

pub use document::{Document, DocumentError, IndentStyle};
pub use patch::Patch;

use std::ops::Range;

/// Replace the bytes in `range` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub text: String,
}

impl TextEdit {
    pub fn new(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }
}
