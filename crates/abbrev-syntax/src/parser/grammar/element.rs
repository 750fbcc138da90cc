//! Element and group grammar.
//!
//! ```text
//! item    := group | element
//! group   := "(" sequence ")" repeat?
//! element := WORD? (class | id | attr_list | TEXT_LITERAL | "/" | repeat)*
//! class   := "." WORD
//! id      := "#" WORD
//! repeat  := "*" WORD(digits)?
//! ```
//!
//! An element needs at least one component; `item` is only entered when the
//! current token can start one.

use super::{attributes, sequence};
use crate::error::ParseError;
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

pub(super) fn item(p: &mut Parser<'_, '_>) {
    if p.at(SyntaxKind::LPAREN) {
        group(p);
    } else {
        element(p);
    }
}

fn group(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let offset = p.current_offset();
    p.bump();

    loop {
        sequence(p);
        if p.at(SyntaxKind::RPAREN) || p.at_end() || p.at(SyntaxKind::PIPE) {
            break;
        }
        p.error_token();
    }

    if p.eat(SyntaxKind::RPAREN) {
        if p.at(SyntaxKind::STAR) {
            repeat(p);
        }
    } else {
        p.error(ParseError::UnbalancedGroup { offset });
    }

    m.complete(p, SyntaxKind::GROUP);
}

fn element(p: &mut Parser<'_, '_>) {
    let m = p.start();

    if p.at(SyntaxKind::WORD) {
        let name = p.start();
        p.bump();
        name.complete(p, SyntaxKind::TAG_NAME);
    }

    loop {
        match p.current() {
            SyntaxKind::DOT => prefixed(p, SyntaxKind::CLASS),
            SyntaxKind::HASH => prefixed(p, SyntaxKind::ID),
            SyntaxKind::LBRACKET => attributes::attr_list(p),
            SyntaxKind::TEXT_LITERAL => {
                let text = p.start();
                p.bump();
                text.complete(p, SyntaxKind::TEXT);
            }
            SyntaxKind::SLASH => p.bump(),
            SyntaxKind::STAR => repeat(p),
            SyntaxKind::UNKNOWN => p.error_token(),
            _ => break,
        }
    }

    m.complete(p, SyntaxKind::ELEMENT);
}

/// `.word` or `#word`
fn prefixed(p: &mut Parser<'_, '_>, kind: SyntaxKind) {
    let m = p.start();
    let offset = p.current_offset();
    p.bump();
    if !p.eat(SyntaxKind::WORD) {
        p.error(ParseError::ExpectedName { offset: offset + 1 });
    }
    m.complete(p, kind);
}

fn repeat(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let offset = p.current_offset();
    p.bump();

    if p.at(SyntaxKind::WORD) && p.current_text().bytes().all(|b| b.is_ascii_digit()) {
        match p.current_text().parse::<usize>() {
            Ok(count) if count > 0 => {}
            _ => p.error(ParseError::InvalidRepeat { offset }),
        }
        p.bump();
    }

    m.complete(p, SyntaxKind::REPEAT);
}
