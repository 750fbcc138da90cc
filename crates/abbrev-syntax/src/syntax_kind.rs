//! SyntaxKind enum for all tokens and nodes in the abbreviation CST.
//!
//! Following the rust-analyzer model, all tokens and nodes share a single enum.
//! Every byte of the abbreviation must appear as a token in the tree.

/// All syntax kinds for the abbreviation CST.
///
/// This enum represents both tokens (lexer output) and composite nodes (parser output).
/// The `repr(u16)` ensures efficient storage in rowan's green tree.
///
/// We use SCREAMING_CASE following the rust-analyzer convention for SyntaxKind.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Tokens (lexer output) ===
    /// Horizontal whitespace, only meaningful inside `[...]`
    WHITESPACE,
    /// `.` class prefix
    DOT,
    /// `#` id prefix
    HASH,
    /// `>` child operator
    GT,
    /// `+` sibling operator
    PLUS,
    /// `^` climb-up operator
    CARET,
    /// `*` multiplication operator
    STAR,
    /// `/` self-closing marker
    SLASH,
    /// `(` group start
    LPAREN,
    /// `)` group end
    RPAREN,
    /// `[` attribute list start
    LBRACKET,
    /// `]` attribute list end
    RBRACKET,
    /// `=` between attribute name and value
    EQ,
    /// `|` filter separator
    PIPE,
    /// `{...}` text literal, braces included
    TEXT_LITERAL,
    /// `"..."` or `'...'` attribute value, quotes included
    QUOTED,
    /// Names, class and id words, numbers, numbering placeholders
    WORD,
    /// Bytes the lexer could not classify (unclosed `{`, `"`, trailing `\`)
    UNKNOWN,
    /// End of input marker
    EOF,

    // === Composite Nodes (parser output) ===
    /// Root abbreviation node
    ROOT,
    /// A single element: name plus class/id/attribute/text components
    ELEMENT,
    /// Parenthesised sequence `( ... )`
    GROUP,
    /// Element name
    TAG_NAME,
    /// `.word`
    CLASS,
    /// `#word`
    ID,
    /// `[ ... ]`
    ATTR_LIST,
    /// `name` or `name=value` inside an attribute list
    ATTRIBUTE,
    /// Attribute name
    ATTR_NAME,
    /// Attribute value (quoted, braced or bare)
    ATTR_VALUE,
    /// Text content `{...}`
    TEXT,
    /// `*N` or implicit `*`
    REPEAT,
    /// Trailing `|filter|filter` list
    FILTERS,
    /// A single filter name
    FILTER,

    /// Error recovery node
    ERROR,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token (lexer output).
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true for the operators joining items of a sequence.
    pub fn is_operator(self) -> bool {
        matches!(self, Self::GT | Self::PLUS | Self::CARET)
    }

    /// Returns true if an element or group may start at this token.
    pub fn starts_item(self) -> bool {
        matches!(
            self,
            Self::WORD | Self::DOT | Self::HASH | Self::LBRACKET | Self::TEXT_LITERAL | Self::LPAREN
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AbbrevLang {}

impl rowan::Language for AbbrevLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::ERROR as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<AbbrevLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<AbbrevLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<AbbrevLang>;
