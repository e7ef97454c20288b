use thiserror::Error;

use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::runtime::RuntimeError;
use crate::token::Position;

/// Any failure of a run, from lexing through evaluation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Lex errors reached through the parser are reported as lex errors.
impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::Lex(error) => Self::Lex(error),
            other => Self::Parse(other),
        }
    }
}

/// Classification of an [`Error`], one variant per failure the embedding
/// layer can tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidToken,
    ExceedsMaxLength,
    UndefinedEscapeChar,
    InvalidSyntax,
    MainFunctionNotFound,
    Redefinition,
    UndeclaredVariable,
    UndeclaredFunction,
    InvalidCondition,
    TypeMismatch,
    InvalidNumberOfArguments,
    InvalidMethodCall,
    InvalidReturnType,
    InvalidType,
    DivisionByZero,
    IndexOutOfBounds,
    IntegerOverflow,
    Output,
}

impl ErrorKind {
    /// Fixed user-facing message shown before the error details.
    pub fn headline(self) -> &'static str {
        match self {
            Self::InvalidToken => "Invalid token encountered",
            Self::ExceedsMaxLength => "Token exceeds maximum allowed length",
            Self::UndefinedEscapeChar => "Undefined escape character",
            Self::InvalidSyntax => "Invalid Syntax",
            Self::MainFunctionNotFound => "Main function not found",
            Self::Redefinition => "Redefinition",
            Self::UndeclaredVariable => "Undeclared variable",
            Self::UndeclaredFunction => "Undeclared function",
            Self::InvalidCondition => "Invalid condition",
            Self::TypeMismatch => "Type mismatch",
            Self::InvalidNumberOfArguments => "Invalid number of arguments",
            Self::InvalidMethodCall => "Invalid method call",
            Self::InvalidReturnType => "Invalid return type",
            Self::InvalidType => "Invalid type",
            Self::DivisionByZero => "Division by zero",
            Self::IndexOutOfBounds => "Index out of bounds",
            Self::IntegerOverflow => "Integer overflow",
            Self::Output => "Output failure",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Lex(error) => match error {
                LexError::InvalidToken { .. } => ErrorKind::InvalidToken,
                LexError::ExceedsMaxLength { .. } => ErrorKind::ExceedsMaxLength,
                LexError::UndefinedEscapeChar { .. } => ErrorKind::UndefinedEscapeChar,
                LexError::UnterminatedString { .. } => ErrorKind::InvalidSyntax,
            },
            Self::Parse(_) => ErrorKind::InvalidSyntax,
            Self::Runtime(error) => match error {
                RuntimeError::MainFunctionNotFound => ErrorKind::MainFunctionNotFound,
                RuntimeError::Redefinition { .. } => ErrorKind::Redefinition,
                RuntimeError::UndeclaredVariable { .. } => ErrorKind::UndeclaredVariable,
                RuntimeError::UndeclaredFunction { .. } => ErrorKind::UndeclaredFunction,
                RuntimeError::InvalidCondition { .. } => ErrorKind::InvalidCondition,
                RuntimeError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
                RuntimeError::InvalidNumberOfArguments { .. } => {
                    ErrorKind::InvalidNumberOfArguments
                }
                RuntimeError::InvalidMethodCall { .. } => ErrorKind::InvalidMethodCall,
                RuntimeError::InvalidReturnType { .. } => ErrorKind::InvalidReturnType,
                RuntimeError::InvalidType { .. } => ErrorKind::InvalidType,
                RuntimeError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
                RuntimeError::IndexOutOfBounds { .. } => ErrorKind::IndexOutOfBounds,
                RuntimeError::IntegerOverflow { .. } => ErrorKind::IntegerOverflow,
                RuntimeError::Output { .. } => ErrorKind::Output,
            },
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Lex(error) => Some(error.position()),
            Self::Parse(error) => Some(error.position()),
            Self::Runtime(error) => error.position(),
        }
    }
}
