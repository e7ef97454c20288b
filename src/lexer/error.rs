use std::fmt;

use thiserror::Error;

use crate::token::Position;

/// Token class whose configured length cap was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthLimited {
    Identifier,
    String,
    Comment,
    Integer,
    Float,
}

impl fmt::Display for LengthLimited {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identifier => "Identifier",
            Self::String => "String",
            Self::Comment => "Comment",
            Self::Integer => "Integer",
            Self::Float => "Float",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Invalid character '{character}' at {position}")]
    InvalidToken { character: char, position: Position },
    #[error("{kind} exceeds max length at {position}")]
    ExceedsMaxLength {
        kind: LengthLimited,
        position: Position,
    },
    #[error("Undefined escape character '{character}' at {position}")]
    UndefinedEscapeChar { character: char, position: Position },
    #[error("Unterminated string literal starting at {position}")]
    UnterminatedString { position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            Self::InvalidToken { position, .. }
            | Self::ExceedsMaxLength { position, .. }
            | Self::UndefinedEscapeChar { position, .. }
            | Self::UnterminatedString { position } => *position,
        }
    }
}

pub type LexResult<T> = Result<T, LexError>;
