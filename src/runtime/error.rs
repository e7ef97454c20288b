use std::fmt;

use thiserror::Error;

use crate::token::Position;

/// Optional source position rendered as a message suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location(pub Option<Position>);

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(position) => write!(f, " at {position}"),
            None => Ok(()),
        }
    }
}

/// Accepted argument counts for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exactly(expected) => count == expected,
            Self::AtLeast(minimum) => count >= minimum,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(expected) => write!(f, "{expected}"),
            Self::AtLeast(minimum) => write!(f, "at least {minimum}"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Function 'int main()' not found")]
    MainFunctionNotFound,
    #[error("Redefinition of '{name}'{location}")]
    Redefinition { name: String, location: Location },
    #[error("Undeclared variable '{name}'{location}")]
    UndeclaredVariable { name: String, location: Location },
    #[error("Undeclared function '{name}'{location}")]
    UndeclaredFunction { name: String, location: Location },
    #[error("Condition must be bool, got {found}{location}")]
    InvalidCondition { found: String, location: Location },
    #[error("Type mismatch for '{name}': expected {expected}, got {found}{location}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
        location: Location,
    },
    #[error("'{name}' expected {expected} arguments, got {found}{location}")]
    InvalidNumberOfArguments {
        name: String,
        expected: Arity,
        found: usize,
        location: Location,
    },
    #[error("Type {type_name} has no method '{method}'{location}")]
    InvalidMethodCall {
        method: String,
        type_name: String,
        location: Location,
    },
    #[error("Function '{name}' must return {expected}, got {found}{location}")]
    InvalidReturnType {
        name: String,
        expected: String,
        found: String,
        location: Location,
    },
    #[error("{message}{location}")]
    InvalidType { message: String, location: Location },
    #[error("Division by zero is undefined{location}")]
    DivisionByZero { location: Location },
    #[error("Index {index} out of bounds for length {len}{location}")]
    IndexOutOfBounds {
        index: i64,
        len: usize,
        location: Location,
    },
    #[error("Integer overflow in '{operation}'{location}")]
    IntegerOverflow { operation: String, location: Location },
    #[error("Failed to write output: {message}")]
    Output { message: String },
}

impl RuntimeError {
    pub fn redefinition(name: impl Into<String>) -> Self {
        Self::Redefinition {
            name: name.into(),
            location: Location::default(),
        }
    }

    pub fn undeclared_variable(name: impl Into<String>) -> Self {
        Self::UndeclaredVariable {
            name: name.into(),
            location: Location::default(),
        }
    }

    pub fn undeclared_function(name: impl Into<String>) -> Self {
        Self::UndeclaredFunction {
            name: name.into(),
            location: Location::default(),
        }
    }

    pub fn invalid_type(message: impl Into<String>) -> Self {
        Self::InvalidType {
            message: message.into(),
            location: Location::default(),
        }
    }

    pub fn arguments(name: impl Into<String>, expected: Arity, found: usize) -> Self {
        Self::InvalidNumberOfArguments {
            name: name.into(),
            expected,
            found,
            location: Location::default(),
        }
    }

    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::IntegerOverflow {
            operation: operation.into(),
            location: Location::default(),
        }
    }

    /// Attaches `position` unless the error already carries one.
    pub fn at(mut self, position: Position) -> Self {
        if let Some(location) = self.location_mut()
            && location.0.is_none()
        {
            location.0 = Some(position);
        }
        self
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Self::MainFunctionNotFound | Self::Output { .. } => None,
            Self::Redefinition { location, .. }
            | Self::UndeclaredVariable { location, .. }
            | Self::UndeclaredFunction { location, .. }
            | Self::InvalidCondition { location, .. }
            | Self::TypeMismatch { location, .. }
            | Self::InvalidNumberOfArguments { location, .. }
            | Self::InvalidMethodCall { location, .. }
            | Self::InvalidReturnType { location, .. }
            | Self::InvalidType { location, .. }
            | Self::DivisionByZero { location }
            | Self::IndexOutOfBounds { location, .. }
            | Self::IntegerOverflow { location, .. } => location.0,
        }
    }

    fn location_mut(&mut self) -> Option<&mut Location> {
        match self {
            Self::MainFunctionNotFound | Self::Output { .. } => None,
            Self::Redefinition { location, .. }
            | Self::UndeclaredVariable { location, .. }
            | Self::UndeclaredFunction { location, .. }
            | Self::InvalidCondition { location, .. }
            | Self::TypeMismatch { location, .. }
            | Self::InvalidNumberOfArguments { location, .. }
            | Self::InvalidMethodCall { location, .. }
            | Self::InvalidReturnType { location, .. }
            | Self::InvalidType { location, .. }
            | Self::DivisionByZero { location }
            | Self::IndexOutOfBounds { location, .. }
            | Self::IntegerOverflow { location, .. } => Some(location),
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
