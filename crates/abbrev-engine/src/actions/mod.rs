//! The editor commands and the interfaces they reach the editor through.
//!
//! The engine holds no document state. An [`EditorHost`] supplies the
//! text, language and selections and applies the resulting edits;
//! [`AbbreviationPrompt`] asks the user for an abbreviation when a wrap
//! command is run without one.

mod service;

pub use service::AbbreviationService;

use std::ops::Range;

use crate::editing::TextEdit;

// ============ Host interfaces ============

/// The editor side of a command invocation.
pub trait EditorHost {
    fn text(&self) -> String;

    fn language_id(&self) -> String;

    /// Byte ranges into [`EditorHost::text`]; empty ranges are cursors.
    fn selections(&self) -> Vec<Range<usize>>;

    /// Apply every edit or none. Ranges are in pre-edit offsets.
    fn apply_edits(&mut self, edits: Vec<TextEdit>) -> bool;

    /// One level of indentation.
    fn indent_unit(&self) -> String {
        "\t".to_string()
    }
}

pub trait AbbreviationPrompt {
    /// `None` when the user cancels.
    fn ask(&self, message: &str) -> Option<String>;
}

/// Answers every prompt with the same text.
impl AbbreviationPrompt for Option<String> {
    fn ask(&self, _message: &str) -> Option<String> {
        self.clone()
    }
}

// ============ Command arguments ============

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandArgs {
    /// Expand as this language instead of the host's.
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrapArgs {
    /// Prompt for the abbreviation when `None`.
    pub abbreviation: Option<String>,
}
