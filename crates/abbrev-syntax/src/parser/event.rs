//! # Parser Events
//!
//! The grammar never touches Rowan directly. It emits a flat list of events
//! which the [`Sink`](super::sink::Sink) replays into a green tree:
//!
//! ```text
//! Start(ELEMENT)        ← "li.item*2"
//!   Start(TAG_NAME)
//!     Token(WORD)       ← "li"
//!   Finish
//!   Start(CLASS)
//!     Token(DOT)
//!     Token(WORD)       ← "item"
//!   Finish
//!   Start(REPEAT)
//!     Token(STAR)
//!     Token(WORD)       ← "2"
//!   Finish
//! Finish
//! ```
//!
//! `forward_parent` lets a completed node be wrapped after the fact; the sink
//! follows the chain and opens the outermost node first.

use crate::syntax_kind::SyntaxKind;

/// An event emitted by the parser during tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a new composite node, optionally reparented through
    /// `forward_parent` (index of another `Start`).
    Start {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },

    /// Add `n_raw_tokens` lexer tokens to the current node as one token of `kind`.
    Token { kind: SyntaxKind, n_raw_tokens: u8 },

    /// Finish the current node.
    Finish,

    /// Reserved slot from `Parser::start`; ignored by the sink unless completed.
    Placeholder,
}

impl Event {
    /// Create a start event with no forward parent.
    pub fn start(kind: SyntaxKind) -> Self {
        Event::Start {
            kind,
            forward_parent: None,
        }
    }

    /// Create a token event for a single raw token.
    pub fn token(kind: SyntaxKind) -> Self {
        Event::Token {
            kind,
            n_raw_tokens: 1,
        }
    }
}
