//! # abbrev-engine
//!
//! Expands markup and stylesheet abbreviations such as `ul>li.item$*3` or
//! `m10-20` and runs the `expand_abbreviation` and `wrap_with_abbreviation`
//! editor commands on top of that.
//!
//! ## Pipeline
//!
//! ```text
//! context → extract → parse → resolve → filters → render → edits
//! ```
//!
//! - [`context`] decides whether the cursor is in markup, a stylesheet or
//!   nowhere expandable, and finds the abbreviation before the cursor.
//! - Parsing lives in the `abbrev-syntax` crate.
//! - [`resolve`] substitutes [`snippets`], assigns implicit tag names and
//!   expands repeats and numbering.
//! - [`filters`] rewrite the resolved tree (`|bem`, `|c`, ...).
//! - [`render`] writes markup or stylesheet text relative to the insertion
//!   point.
//! - [`actions`] ties it together against an [`actions::EditorHost`];
//!   [`editing::Document`] is an in-process host.
//!
//! ## Example
//!
//! ```rust
//! use abbrev_engine::{AbbreviationService, Document, ExpandArgs};
//!
//! let mut doc = Document::from_bytes(b"<body>\n\tul>li*2\n</body>", "html").unwrap();
//! doc.set_cursor(15);
//!
//! let service = AbbreviationService::default();
//! assert_eq!(service.expand_abbreviation(&mut doc, &ExpandArgs::default()), Some(true));
//! assert_eq!(
//!     doc.text(),
//!     "<body>\n\t<ul>\n\t\t<li></li>\n\t\t<li></li>\n\t</ul>\n</body>"
//! );
//! ```

pub mod actions;
pub mod context;
pub mod editing;
pub mod filters;
pub mod html;
pub mod render;
pub mod resolve;
pub mod snippets;

// Re-export key types for easier usage
pub use actions::{AbbreviationPrompt, AbbreviationService, EditorHost, ExpandArgs, WrapArgs};
pub use context::{EditorContext, Syntax, detect_context, extract_abbreviation};
pub use editing::{Document, DocumentError, Patch, TextEdit};
