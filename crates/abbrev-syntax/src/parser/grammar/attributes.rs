//! Attribute list grammar: `[name name=value name="quoted value" name={braced}]`.
//!
//! Whitespace separates attributes. A bare value runs until whitespace or
//! `]`, so URLs such as `[href=a.html]` need no quoting.

use crate::error::ParseError;
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

pub(super) fn attr_list(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let offset = p.current_offset();
    p.bump();

    loop {
        match p.current() {
            SyntaxKind::RBRACKET => {
                p.bump();
                break;
            }
            SyntaxKind::EOF => {
                p.error(ParseError::UnclosedAttributes { offset });
                break;
            }
            SyntaxKind::WHITESPACE => p.bump(),
            SyntaxKind::EQ | SyntaxKind::QUOTED | SyntaxKind::TEXT_LITERAL | SyntaxKind::UNKNOWN => {
                p.error_token()
            }
            _ => attribute(p),
        }
    }

    m.complete(p, SyntaxKind::ATTR_LIST);
}

fn is_name_token(kind: SyntaxKind) -> bool {
    !matches!(
        kind,
        SyntaxKind::WHITESPACE
            | SyntaxKind::RBRACKET
            | SyntaxKind::EQ
            | SyntaxKind::QUOTED
            | SyntaxKind::TEXT_LITERAL
            | SyntaxKind::UNKNOWN
            | SyntaxKind::EOF
    )
}

fn attribute(p: &mut Parser<'_, '_>) {
    let name = p.start();
    while is_name_token(p.current()) {
        p.bump();
    }
    let name = name.complete(p, SyntaxKind::ATTR_NAME);

    // The name is only known to belong to an attribute once it is parsed
    let m = name.precede(p);

    if p.eat(SyntaxKind::EQ) {
        let value = p.start();
        match p.current() {
            SyntaxKind::QUOTED | SyntaxKind::TEXT_LITERAL => p.bump(),
            _ => {
                while !p.at_end()
                    && !p.at(SyntaxKind::WHITESPACE)
                    && !p.at(SyntaxKind::RBRACKET)
                {
                    p.bump();
                }
            }
        }
        value.complete(p, SyntaxKind::ATTR_VALUE);
    }

    m.complete(p, SyntaxKind::ATTRIBUTE);
}
