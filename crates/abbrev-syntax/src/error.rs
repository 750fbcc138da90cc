use thiserror::Error;

/// Reasons an abbreviation does not form a valid grammar sentence.
///
/// Offsets are byte offsets into the abbreviation text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("abbreviation is empty")]
    Empty,

    #[error("unbalanced group at {offset}")]
    UnbalancedGroup { offset: usize },

    #[error("unexpected {found:?} at {offset}")]
    UnexpectedToken { offset: usize, found: String },

    #[error("expected a name at {offset}")]
    ExpectedName { offset: usize },

    #[error("attribute list opened at {offset} is not closed")]
    UnclosedAttributes { offset: usize },

    #[error("text opened at {offset} is not closed")]
    UnclosedText { offset: usize },

    #[error("invalid repeat count at {offset}")]
    InvalidRepeat { offset: usize },

    #[error("operator at {offset} is not followed by an element")]
    TrailingOperator { offset: usize },
}

impl ParseError {
    /// Byte offset the error points at, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::Empty => None,
            ParseError::UnbalancedGroup { offset }
            | ParseError::UnexpectedToken { offset, .. }
            | ParseError::ExpectedName { offset }
            | ParseError::UnclosedAttributes { offset }
            | ParseError::UnclosedText { offset }
            | ParseError::InvalidRepeat { offset }
            | ParseError::TrailingOperator { offset } => Some(*offset),
        }
    }
}
