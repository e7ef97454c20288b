//! Interpreter for a small statically-declared language with built-in 3D
//! geometry values.
//!
//! Source text flows through [`source::Source`], [`lexer::Lexer`] and
//! [`parser::Parser`] into an [`ast::Program`], which
//! [`interpreter::Interpreter`] evaluates by walking the tree.
pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod source;
pub mod token;

pub use error::{Error, ErrorKind};
pub use interpreter::Interpreter;
pub use lexer::LexerConfig;
pub use runtime::Value;
pub use source::Source;
