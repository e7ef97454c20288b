//! Character cursor over program text.
//!
//! Line endings are normalized up front (`\r\n` and lone `\r` become `\n`), so
//! every line break is exactly one character and one line advance. The cursor
//! is primed on construction: the first character is current at column 1.

use std::io::{self, Read};

use crate::token::Position;

#[derive(Debug, Clone)]
pub struct Source {
    text: String,
    chars: Vec<char>,
    next_index: usize,
    current: Option<char>,
    column: usize,
    line: usize,
}

impl Source {
    pub fn new(text: &str) -> Self {
        let text = normalize_line_endings(text);
        let chars = text.chars().collect();
        let mut source = Self {
            text,
            chars,
            next_index: 0,
            current: None,
            column: 0,
            line: 1,
        };
        source.reset_to_start();
        source
    }

    pub fn from_reader(mut reader: impl Read) -> io::Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::new(&text))
    }

    /// Current character, `None` once the end of the stream is reached.
    pub fn current_char(&self) -> Option<char> {
        self.current
    }

    /// Moves one character forward and returns the new current character.
    ///
    /// At end of stream this is a no-op: the position stays on the terminal
    /// column and `None` keeps being returned.
    pub fn advance(&mut self) -> Option<char> {
        match self.current {
            None => return None,
            Some('\n') => {
                self.line += 1;
                self.column = 0;
            }
            Some(_) => {}
        }
        self.current = self.chars.get(self.next_index).copied();
        if self.current.is_some() {
            self.next_index += 1;
        }
        self.column += 1;
        self.current
    }

    /// Character after the current one, without consuming anything.
    pub fn peek(&self) -> Option<char> {
        self.current.and(self.chars.get(self.next_index).copied())
    }

    pub fn position(&self) -> Position {
        Position::new(self.column, self.line)
    }

    pub fn reset_to_start(&mut self) {
        self.line = 1;
        self.column = 0;
        self.next_index = 0;
        self.current = self.chars.first().copied();
        if self.current.is_some() {
            self.next_index = 1;
            self.column = 1;
        }
    }

    /// Text of the 1-based `line`, including its trailing newline.
    ///
    /// Returns an empty string when the line does not exist.
    pub fn read_line(&self, line: usize) -> String {
        if line == 0 {
            return String::new();
        }
        self.text
            .split_inclusive('\n')
            .nth(line - 1)
            .map(str::to_string)
            .unwrap_or_default()
    }
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
