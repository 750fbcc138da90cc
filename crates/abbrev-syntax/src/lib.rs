//! # abbrev-syntax
//!
//! A lossless syntax tree for markup abbreviations (`ul>li.item$*3`), using
//! [Rowan] + [Logos] and following the [rust-analyzer] architecture model.
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//! [rust-analyzer]: https://rust-analyzer.github.io/book/contributing/syntax.html
//!
//! ## Architecture Overview
//!
//! ```text
//! Abbreviation → Lexer → Tokens → Parser → Events → Sink → Rowan Tree → AST
//!                (Logos)          (Grammar)        (GreenNodeBuilder)  (lowering)
//! ```
//!
//! 1. [`lexer`] splits the input into operator tokens and `WORD` runs.
//! 2. [`parser`] runs the grammar, emitting events and collecting
//!    [`ParseError`]s without ever aborting.
//! 3. The sink builds an immutable Rowan tree that covers every input byte.
//! 4. [`ast`] lowers an error-free tree into [`Abbreviation`], resolving the
//!    `>`, `+` and `^` operators into parent/child structure.
//!
//! ## Grammar at a glance
//!
//! | syntax | meaning |
//! |--------|---------|
//! | `a>b` | `b` is a child of `a` |
//! | `a+b` | `b` is a sibling of `a` |
//! | `a>b^c` | `c` climbs back up to be a sibling of `a` |
//! | `(a>b)*2` | group repeated twice |
//! | `li*3`, `li*` | repeat three times / implicit repeat |
//! | `.c #i [x=y] {text}` | class, id, attributes, text |
//! | `item$$@3`, `@-` | numbering placeholder, offset, reverse |
//! | `img/` | self-closing element |
//! | `...\|bem` | filter list |
//!
//! ## Quick Start
//!
//! ```
//! use abbrev_syntax::{parse, Abbreviation, SyntaxKind};
//!
//! let parse = parse("ul>li*2");
//! assert!(parse.is_valid());
//! assert_eq!(parse.syntax().kind(), SyntaxKind::ROOT);
//!
//! let abbr = Abbreviation::parse("ul>li*2").unwrap();
//! assert_eq!(abbr.nodes.len(), 1);
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod syntax_kind;

pub use ast::{Abbreviation, Attribute, Element, Group, Node, Repeat};
pub use error::ParseError;
pub use parser::{Parse, parse};
pub use syntax_kind::{AbbrevLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
