//! # Lexer - Tokenizing Abbreviations
//!
//! This module provides the first stage of parsing: breaking an abbreviation
//! into tokens using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte in the input appears in exactly one token. Nothing is skipped,
//! so the CST can always be printed back to the original abbreviation:
//!
//! ```
//! use abbrev_syntax::lexer::lex;
//!
//! let input = "ul>li.item$*2";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Token Design
//!
//! Operators and component prefixes get their own tokens (`>`, `+`, `^`, `*`,
//! `.`, `#`, brackets, braces). Everything else collapses into `WORD` runs:
//! tag names, class words, repeat counts and numbering placeholders such as
//! `item$@44` are all single words. Whether a word after `*` is a count is
//! decided by the parser.
//!
//! Text literals (`{...}`) and quoted attribute values are lexed whole so
//! their contents never leak into the operator grammar. An unterminated `{`
//! or quote becomes an `UNKNOWN` token, which the parser reports.

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Token kinds produced by the Logos lexer.
///
/// This enum exists separately from [`SyntaxKind`] because Logos needs to
/// derive on it. Each variant maps to a corresponding `SyntaxKind` token.
///
/// [`SyntaxKind`]: crate::syntax_kind::SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[token(".")]
    Dot,

    #[token("#")]
    Hash,

    #[token(">")]
    Gt,

    #[token("+")]
    Plus,

    #[token("^")]
    Caret,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("=")]
    Eq,

    #[token("|")]
    Pipe,

    /// `{...}` with `\}` escapes
    #[regex(r"\{([^}\\]|\\.)*\}")]
    TextLiteral,

    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    Quoted,

    /// Anything that is not an operator; `\x` escapes any single character
    #[regex(r#"([^\s.#>+^*/()\[\]{}=|"'\\]|\\.)+"#)]
    Word,
}

impl TokenKind {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::Hash => SyntaxKind::HASH,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Caret => SyntaxKind::CARET,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::Slash => SyntaxKind::SLASH,
            TokenKind::LParen => SyntaxKind::LPAREN,
            TokenKind::RParen => SyntaxKind::RPAREN,
            TokenKind::LBracket => SyntaxKind::LBRACKET,
            TokenKind::RBracket => SyntaxKind::RBRACKET,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::Pipe => SyntaxKind::PIPE,
            TokenKind::TextLiteral => SyntaxKind::TEXT_LITERAL,
            TokenKind::Quoted => SyntaxKind::QUOTED,
            TokenKind::Word => SyntaxKind::WORD,
        }
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    lex_with_spans(input)
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

/// Lex and return tokens along with their byte spans.
pub fn lex_with_spans(input: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let kind = match result {
            Ok(token_kind) => token_kind.to_syntax_kind(),
            Err(()) => SyntaxKind::UNKNOWN,
        };
        tokens.push((Token { kind, text }, span));
    }

    tokens
}
