use std::io::{self, Write};

use log::info;

use crate::error::Error;
use crate::lexer::LexerConfig;
use crate::parser::parse_source;
use crate::runtime::Value;
use crate::source::Source;

mod evaluator;
#[cfg(test)]
mod tests;

use evaluator::Evaluator;

/// Parses and runs one program.
///
/// Execution pipeline:
/// `run -> parse_source -> Evaluator::run_program -> call_function(main)
/// -> exec_block -> exec_statement -> eval_expression`.
///
/// `print` output goes to `W`, stdout unless built with [`Interpreter::with_output`].
pub struct Interpreter<W = io::Stdout> {
    source: Source,
    config: LexerConfig,
    output: W,
}

impl Interpreter<io::Stdout> {
    pub fn new(source: Source) -> Self {
        Self::with_output(source, io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(source: Source, output: W) -> Self {
        Self {
            source,
            config: LexerConfig::default(),
            output,
        }
    }

    pub fn with_config(mut self, config: LexerConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs `int main()` and returns the value it produced.
    pub fn run(self) -> Result<Value, Error> {
        let program = parse_source(self.source, self.config)?;
        info!("program parsed, starting evaluation");
        let mut evaluator = Evaluator::new(self.output);
        Ok(evaluator.run_program(&program)?)
    }
}
