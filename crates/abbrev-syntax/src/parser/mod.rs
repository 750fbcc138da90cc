//! # Parser - Event-Based Tree Construction
//!
//! Transforms the token stream into a lossless syntax tree using the
//! **event-based** architecture from rust-analyzer. Grammar functions emit
//! [`Event`]s; the [`Sink`] replays them into a Rowan tree.
//!
//! ## The Marker System
//!
//! `parser.start()` returns a [`Marker`] that **must** be completed
//! (`marker.complete(parser, KIND)`) or abandoned (`marker.abandon(parser)`).
//! Dropping it otherwise panics, which catches corrupt trees early.
//!
//! ```ignore
//! let m = p.start();
//! p.bump();                           // the tag name
//! m.complete(p, SyntaxKind::TAG_NAME);
//! ```
//!
//! ## Errors
//!
//! Parsing never fails outright. Problems are recorded as [`ParseError`]s
//! alongside the tree and offending tokens are wrapped in `ERROR` nodes, so
//! the tree still covers every byte of the input. Callers that need a valid
//! sentence (the AST lowering) check [`Parse::errors`] first.
//!
//! ```
//! use abbrev_syntax::parse;
//!
//! let parse = parse("ul>li*2");
//! assert!(parse.errors().is_empty());
//! assert_eq!(parse.syntax().text().to_string(), "ul>li*2");
//! ```

pub mod event;
pub mod sink;

mod grammar;

use rowan::GreenNode;

use crate::error::ParseError;
use crate::lexer::{Token, lex};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use event::Event;
use sink::Sink;

/// The parser state machine.
///
/// Grammar functions receive `&mut Parser` and use its methods to:
///
/// - Inspect tokens: `current()`, `nth()`, `at()`, `at_end()`
/// - Consume tokens: `bump()`, `eat()`
/// - Build structure: `start()` → `Marker` → `complete()`/`abandon()`
/// - Report problems: `error()`
pub struct Parser<'t, 'input> {
    tokens: &'t [Token<'input>],
    offsets: Vec<usize>,
    pos: usize,
    events: Vec<Event>,
    errors: Vec<ParseError>,
}

impl<'t, 'input> Parser<'t, 'input> {
    /// Create a new parser from a slice of tokens.
    pub fn new(tokens: &'t [Token<'input>]) -> Self {
        let mut offsets = Vec::with_capacity(tokens.len() + 1);
        let mut offset = 0;
        for token in tokens {
            offsets.push(offset);
            offset += token.text.len();
        }
        offsets.push(offset);

        Self {
            tokens,
            offsets,
            pos: 0,
            events: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Parse the tokens and return the tree with any recorded errors.
    pub fn parse(mut self) -> Parse {
        grammar::root(&mut self);
        let green = Sink::new(self.tokens, self.events).finish();
        Parse {
            green,
            errors: self.errors,
        }
    }

    /// Start a new node and return a marker.
    pub fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::Placeholder);
        Marker {
            pos,
            completed: false,
        }
    }

    /// Current token kind, or EOF if past end.
    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Look ahead n tokens.
    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(SyntaxKind::EOF)
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the current token unconditionally.
    pub fn bump(&mut self) {
        if !self.at_end() {
            let kind = self.current();
            self.events.push(Event::token(kind));
            self.pos += 1;
        }
    }

    /// Get the text of the current token.
    pub fn current_text(&self) -> &'input str {
        self.tokens.get(self.pos).map(|t| t.text).unwrap_or("")
    }

    /// Byte offset of the current token (input length at EOF).
    pub fn current_offset(&self) -> usize {
        self.offsets[self.pos.min(self.tokens.len())]
    }

    /// Record a problem without stopping the parse.
    pub fn error(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Wrap the current token in an ERROR node, reporting it as unexpected.
    pub fn error_token(&mut self) {
        let offset = self.current_offset();
        let text = self.current_text();
        let error = match self.current() {
            SyntaxKind::UNKNOWN if text.starts_with('{') => ParseError::UnclosedText { offset },
            SyntaxKind::RPAREN => ParseError::UnbalancedGroup { offset },
            _ => ParseError::UnexpectedToken {
                offset,
                found: text.to_string(),
            },
        };
        self.error(error);

        let m = self.start();
        self.bump();
        m.complete(self, SyntaxKind::ERROR);
    }
}

/// A marker for a node being constructed.
///
/// `parser.start()` pushes a `Placeholder` event and hands out a `Marker`
/// pointing at it. The marker must be completed or abandoned; dropping it
/// otherwise panics.
#[must_use = "Markers must be completed or abandoned, dropping them is a bug"]
pub struct Marker {
    pos: usize,
    completed: bool,
}

impl Marker {
    /// Complete this marker, creating a node of the given kind.
    pub fn complete(mut self, p: &mut Parser<'_, '_>, kind: SyntaxKind) -> CompletedMarker {
        self.completed = true;
        let event_at_pos = &mut p.events[self.pos];
        assert!(matches!(event_at_pos, Event::Placeholder));
        *event_at_pos = Event::Start {
            kind,
            forward_parent: None,
        };
        p.events.push(Event::Finish);
        CompletedMarker { pos: self.pos }
    }

    /// Abandon this marker without creating a node.
    ///
    /// The placeholder is popped when it is still the last event; otherwise
    /// it stays inert and the sink skips it.
    pub fn abandon(mut self, p: &mut Parser<'_, '_>) {
        self.completed = true;
        if self.pos == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Placeholder) => {}
                _ => unreachable!(),
            }
        }
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("Marker must be either completed or abandoned");
        }
    }
}

/// A marker for a node that has been completed.
///
/// `precede()` wraps the completed node in a new parent through a forward
/// parent link that the sink resolves.
#[derive(Debug, Clone, Copy)]
pub struct CompletedMarker {
    pos: usize,
}

impl CompletedMarker {
    /// Create a new parent node that will contain this node.
    pub fn precede(self, p: &mut Parser<'_, '_>) -> Marker {
        let new_pos = p.events.len();
        p.events.push(Event::Placeholder);

        if let Event::Start { forward_parent, .. } = &mut p.events[self.pos] {
            *forward_parent = Some(new_pos);
        }

        Marker {
            pos: new_pos,
            completed: false,
        }
    }
}

/// Result of parsing: an immutable green tree plus recorded errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    /// Root syntax node (kind `ROOT`).
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse an abbreviation into a lossless syntax tree.
pub fn parse(source: &str) -> Parse {
    let tokens = lex(source);
    Parser::new(&tokens).parse()
}
