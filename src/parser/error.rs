use thiserror::Error;

use crate::lexer::LexError;
use crate::token::Position;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// The parser pulls tokens lazily, so lexing failures surface here.
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("{message} at {position}")]
    InvalidSyntax { position: Position, message: String },
}

impl ParseError {
    pub fn invalid_syntax(position: Position, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            position,
            message: message.into(),
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::Lex(error) => error.position(),
            Self::InvalidSyntax { position, .. } => *position,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
