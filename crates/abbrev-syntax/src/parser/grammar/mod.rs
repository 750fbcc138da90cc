//! # Grammar Rules
//!
//! Each function takes a `&mut Parser` and uses its methods to inspect
//! tokens, consume them and build nodes through markers.
//!
//! ## Shape of the tree
//!
//! Operators are **not** nested by the grammar. A sequence is kept flat:
//!
//! ```text
//! ul>li+li^p   →   ROOT [ELEMENT(ul) GT ELEMENT(li) PLUS ELEMENT(li) CARET ELEMENT(p)]
//! ```
//!
//! The parent/child structure those operators describe is built when the
//! tree is lowered to the AST (see [`crate::ast`]), which walks the sequence
//! left to right with a stack of open parents. Groups are the only nesting
//! the grammar itself produces.
//!
//! ## Modules
//!
//! - [`element`] - elements, groups, classes, ids, text, repeaters
//! - [`attributes`] - `[name=value ...]` lists
//!
//! ## Error Recovery
//!
//! Unexpected tokens are wrapped in ERROR nodes and reported through
//! `Parser::error`; the parse always continues to the end of input.

mod attributes;
mod element;

use crate::error::ParseError;
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Parse the root abbreviation: a sequence and optional filters.
pub fn root(p: &mut Parser<'_, '_>) {
    let m = p.start();

    if p.at_end() {
        p.error(ParseError::Empty);
    }

    sequence(p);

    while !p.at_end() {
        if p.at(SyntaxKind::PIPE) {
            filters(p);
        } else {
            p.error_token();
            sequence(p);
        }
    }

    m.complete(p, SyntaxKind::ROOT);
}

/// Parse `item (op item)*`. Stops silently at anything that cannot
/// continue the sequence; the caller decides whether that is an error.
pub(super) fn sequence(p: &mut Parser<'_, '_>) {
    if !p.current().starts_item() {
        return;
    }
    element::item(p);

    while p.current().is_operator() {
        let offset = p.current_offset();
        if p.at(SyntaxKind::CARET) {
            while p.at(SyntaxKind::CARET) {
                p.bump();
            }
        } else {
            p.bump();
        }

        if !p.current().starts_item() {
            p.error(ParseError::TrailingOperator { offset });
            return;
        }
        element::item(p);
    }
}

/// Parse `|name|name...`.
fn filters(p: &mut Parser<'_, '_>) {
    let m = p.start();

    while p.at(SyntaxKind::PIPE) {
        let offset = p.current_offset();
        p.bump();
        if p.at(SyntaxKind::WORD) {
            let f = p.start();
            p.bump();
            f.complete(p, SyntaxKind::FILTER);
        } else {
            p.error(ParseError::ExpectedName { offset: offset + 1 });
        }
    }

    m.complete(p, SyntaxKind::FILTERS);
}
