use log::trace;

use crate::source::Source;
use crate::token::{Position, Token, TokenKind};

pub mod error;

pub use error::{LengthLimited, LexError, LexResult};

/// Length caps applied while building tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerConfig {
    pub max_identifier_length: usize,
    pub max_string_length: usize,
    pub max_comment_length: usize,
    pub max_int_length: usize,
    pub max_float_length: usize,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            max_identifier_length: 100_000,
            max_string_length: 100_000,
            max_comment_length: 100_000,
            max_int_length: 15,
            max_float_length: 15,
        }
    }
}

impl LexerConfig {
    pub fn with_max_identifier_length(mut self, length: usize) -> Self {
        self.max_identifier_length = length;
        self
    }

    pub fn with_max_string_length(mut self, length: usize) -> Self {
        self.max_string_length = length;
        self
    }

    pub fn with_max_comment_length(mut self, length: usize) -> Self {
        self.max_comment_length = length;
        self
    }

    pub fn with_max_int_length(mut self, length: usize) -> Self {
        self.max_int_length = length;
        self
    }

    pub fn with_max_float_length(mut self, length: usize) -> Self {
        self.max_float_length = length;
        self
    }
}

type Builder = fn(&mut Lexer) -> LexResult<Option<Token>>;

pub struct Lexer {
    source: Source,
    config: LexerConfig,
    finished: bool,
}

impl Lexer {
    pub fn new(source: Source) -> Self {
        Self::with_config(source, LexerConfig::default())
    }

    pub fn with_config(source: Source, config: LexerConfig) -> Self {
        Self {
            source,
            config,
            finished: false,
        }
    }

    /// Produces the next token. Once the input is exhausted every call yields
    /// another `EOF` token.
    pub fn next_token(&mut self) -> LexResult<Token> {
        self.skip_whitespace();

        // Tried in priority order; the first builder that matches wins.
        const BUILDERS: [Builder; 6] = [
            Lexer::try_identifier,
            Lexer::try_string,
            Lexer::try_comment,
            Lexer::try_number,
            Lexer::try_operator,
            Lexer::try_eof,
        ];
        for build in BUILDERS {
            if let Some(token) = build(self)? {
                trace!("token {:?} at {}", token.kind, token.position);
                return Ok(token);
            }
        }

        // The EOF builder matches whenever no character is left.
        Err(LexError::InvalidToken {
            character: self.source.current_char().unwrap_or_default(),
            position: self.source.position(),
        })
    }

    /// Tokenizes the whole source from the beginning, ending with exactly one
    /// `EOF` token.
    pub fn all_tokens(&mut self) -> LexResult<Vec<Token>> {
        self.source.reset_to_start();
        self.finished = false;
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::EOF);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while self.source.current_char().is_some_and(char::is_whitespace) {
            self.source.advance();
        }
    }

    fn try_identifier(&mut self) -> LexResult<Option<Token>> {
        if !self.source.current_char().is_some_and(char::is_alphabetic) {
            return Ok(None);
        }
        let position = self.source.position();
        let mut name = String::new();
        let mut length = 0;
        while let Some(ch) = self.source.current_char() {
            if !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
            if length >= self.config.max_identifier_length {
                return Err(self.too_long(LengthLimited::Identifier));
            }
            name.push(ch);
            length += 1;
            self.source.advance();
        }
        let kind = TokenKind::keyword(&name).unwrap_or(TokenKind::Identifier(name));
        Ok(Some(Token::new(kind, position)))
    }

    fn try_string(&mut self) -> LexResult<Option<Token>> {
        if self.source.current_char() != Some('"') {
            return Ok(None);
        }
        let position = self.source.position();
        let mut value = String::new();
        let mut length = 0;
        self.source.advance();
        loop {
            let ch = match self.source.current_char() {
                None => return Err(LexError::UnterminatedString { position }),
                Some('"') => break,
                Some(ch) => ch,
            };
            if length >= self.config.max_string_length {
                return Err(self.too_long(LengthLimited::String));
            }
            let ch = if ch == '\\' {
                self.escape_sequence(position)?
            } else {
                ch
            };
            value.push(ch);
            length += 1;
            self.source.advance();
        }
        self.source.advance(); // closing quote
        Ok(Some(Token::new(TokenKind::String(value), position)))
    }

    fn escape_sequence(&mut self, string_start: Position) -> LexResult<char> {
        match self.source.advance() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('\\') => Ok('\\'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some(character) => Err(LexError::UndefinedEscapeChar {
                character,
                position: self.source.position(),
            }),
            None => Err(LexError::UnterminatedString {
                position: string_start,
            }),
        }
    }

    fn try_comment(&mut self) -> LexResult<Option<Token>> {
        if self.source.current_char() != Some('#') {
            return Ok(None);
        }
        let position = self.source.position();
        let mut text = String::new();
        let mut length = 0;
        self.source.advance();
        while let Some(ch) = self.source.current_char() {
            if ch == '\n' {
                break;
            }
            if length >= self.config.max_comment_length {
                return Err(self.too_long(LengthLimited::Comment));
            }
            text.push(ch);
            length += 1;
            self.source.advance();
        }
        Ok(Some(Token::new(TokenKind::Comment(text), position)))
    }

    fn try_number(&mut self) -> LexResult<Option<Token>> {
        if !self.source.current_char().is_some_and(|ch| ch.is_ascii_digit()) {
            return Ok(None);
        }
        let position = self.source.position();
        let mut digits = String::new();
        while let Some(ch) = self.source.current_char().filter(char::is_ascii_digit) {
            if digits.len() >= self.config.max_int_length {
                return Err(self.too_long(LengthLimited::Integer));
            }
            digits.push(ch);
            self.source.advance();
        }

        if self.source.current_char() != Some('.') {
            let value = digits
                .parse::<i64>()
                .map_err(|_| self.too_long(LengthLimited::Integer))?;
            return Ok(Some(Token::new(TokenKind::Integer(value), position)));
        }

        digits.push('.');
        self.source.advance();
        while let Some(ch) = self.source.current_char().filter(char::is_ascii_digit) {
            if digits.len() >= self.config.max_float_length {
                return Err(self.too_long(LengthLimited::Float));
            }
            digits.push(ch);
            self.source.advance();
        }
        if digits.ends_with('.') {
            digits.push('0');
        }
        let value = digits
            .parse::<f64>()
            .map_err(|_| self.too_long(LengthLimited::Float))?;
        Ok(Some(Token::new(TokenKind::Float(value), position)))
    }

    fn try_operator(&mut self) -> LexResult<Option<Token>> {
        let Some(first) = self.source.current_char() else {
            return Ok(None);
        };
        let position = self.source.position();
        if let Some(second) = self.source.peek()
            && let Some(kind) = TokenKind::double_char(first, second)
        {
            self.source.advance();
            self.source.advance();
            return Ok(Some(Token::new(kind, position)));
        }
        if let Some(kind) = TokenKind::single_char(first) {
            self.source.advance();
            return Ok(Some(Token::new(kind, position)));
        }
        Ok(None)
    }

    fn try_eof(&mut self) -> LexResult<Option<Token>> {
        if self.source.current_char().is_some() {
            return Ok(None);
        }
        let Position { column, line } = self.source.position();
        Ok(Some(Token::new(
            TokenKind::EOF,
            Position::new(column + 1, line),
        )))
    }

    fn too_long(&self, kind: LengthLimited) -> LexError {
        LexError::ExceedsMaxLength {
            kind,
            position: self.source.position(),
        }
    }
}

/// Yields tokens up to and including the first `EOF`, or the first error.
impl Iterator for Lexer {
    type Item = LexResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        self.finished = !matches!(&result, Ok(token) if token.kind != TokenKind::EOF);
        Some(result)
    }
}

pub fn tokenize(input: &str) -> LexResult<Vec<Token>> {
    Lexer::new(Source::new(input)).all_tokens()
}

pub fn tokenize_with_config(input: &str, config: LexerConfig) -> LexResult<Vec<Token>> {
    Lexer::with_config(Source::new(input), config).all_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .expect("tokenize should succeed")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn first_error(input: &str) -> LexError {
        tokenize(input).expect_err("expected lexing failure")
    }

    #[test]
    fn tokenizes_simple_program() {
        let input = indoc! {"
            int a = 1;
            while (a < 10) { a = a + 1; }
        "};
        let expected = vec![
            TokenKind::Int,
            TokenKind::Identifier("a".to_string()),
            TokenKind::Assign,
            TokenKind::Integer(1),
            TokenKind::Semicolon,
            TokenKind::While,
            TokenKind::LParen,
            TokenKind::Identifier("a".to_string()),
            TokenKind::Less,
            TokenKind::Integer(10),
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::Identifier("a".to_string()),
            TokenKind::Assign,
            TokenKind::Identifier("a".to_string()),
            TokenKind::Plus,
            TokenKind::Integer(1),
            TokenKind::Semicolon,
            TokenKind::RBrace,
            TokenKind::EOF,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn skips_whitespace_and_reports_positions() {
        let tokens = tokenize("  \n  \n  \n a").expect("tokenize should succeed");
        assert_eq!(tokens[0].kind, TokenKind::Identifier("a".to_string()));
        assert_eq!(tokens[0].position, Position::new(2, 4));
    }

    #[test]
    fn recognizes_keywords_and_types() {
        assert_eq!(
            kinds("int float List Point Line Collection True and void return print"),
            vec![
                TokenKind::Int,
                TokenKind::FloatType,
                TokenKind::List,
                TokenKind::Point,
                TokenKind::Line,
                TokenKind::Collection,
                TokenKind::True,
                TokenKind::And,
                TokenKind::Void,
                TokenKind::Return,
                TokenKind::Identifier("print".to_string()),
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn prefers_two_character_operators() {
        assert_eq!(
            kinds("== != >= <= = ! < >"),
            vec![
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::GreaterEqual,
                TokenKind::LessEqual,
                TokenKind::Assign,
                TokenKind::Bang,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn reads_numbers() {
        assert_eq!(
            kinds("100 0 42.9999 7."),
            vec![
                TokenKind::Integer(100),
                TokenKind::Integer(0),
                TokenKind::Float(42.9999),
                TokenKind::Float(7.0),
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn reads_strings_with_escapes() {
        assert_eq!(
            kinds(r#""a\t" "a\\" "\"q\"" "'a'" "line\nbreak""#),
            vec![
                TokenKind::String("a\t".to_string()),
                TokenKind::String("a\\".to_string()),
                TokenKind::String("\"q\"".to_string()),
                TokenKind::String("'a'".to_string()),
                TokenKind::String("line\nbreak".to_string()),
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn reads_comment_to_end_of_line() {
        let tokens = tokenize("# some comment\nx").expect("tokenize should succeed");
        assert_eq!(tokens[0].kind, TokenKind::Comment(" some comment".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::Identifier("x".to_string()));
    }

    #[test]
    fn empty_input_yields_single_eof() {
        let tokens = tokenize("").expect("tokenize should succeed");
        assert_eq!(tokens, vec![Token::new(TokenKind::EOF, Position::new(1, 1))]);
    }

    #[test]
    fn eof_sits_one_past_last_column() {
        let tokens = tokenize("ab").expect("tokenize should succeed");
        assert_eq!(tokens[1].kind, TokenKind::EOF);
        assert_eq!(tokens[1].position, Position::new(4, 1));
    }

    #[test]
    fn errors_on_invalid_character() {
        assert_eq!(
            first_error("int a = 14;\nstri%ng b = \"hello\";"),
            LexError::InvalidToken {
                character: '%',
                position: Position::new(5, 2),
            }
        );
    }

    #[test]
    fn errors_on_undefined_escape() {
        assert_eq!(
            first_error(r#""\z""#),
            LexError::UndefinedEscapeChar {
                character: 'z',
                position: Position::new(3, 1),
            }
        );
    }

    #[test]
    fn errors_on_unterminated_string() {
        assert_eq!(
            first_error("\"Unclosed String"),
            LexError::UnterminatedString {
                position: Position::new(1, 1),
            }
        );
    }

    #[test]
    fn enforces_length_limits() {
        assert_eq!(
            first_error("1231234124124124124124124"),
            LexError::ExceedsMaxLength {
                kind: LengthLimited::Integer,
                position: Position::new(16, 1),
            }
        );
        assert_eq!(
            first_error("0.1231234124124124124124124"),
            LexError::ExceedsMaxLength {
                kind: LengthLimited::Float,
                position: Position::new(16, 1),
            }
        );

        let config = LexerConfig::default()
            .with_max_identifier_length(4)
            .with_max_comment_length(3)
            .with_max_string_length(2);
        let error = tokenize_with_config("abcdef", config).expect_err("identifier too long");
        assert_eq!(
            error,
            LexError::ExceedsMaxLength {
                kind: LengthLimited::Identifier,
                position: Position::new(5, 1),
            }
        );
        let error = tokenize_with_config("#abcd", config).expect_err("comment too long");
        assert_eq!(
            error,
            LexError::ExceedsMaxLength {
                kind: LengthLimited::Comment,
                position: Position::new(5, 1),
            }
        );
        let error = tokenize_with_config("\"abc\"", config).expect_err("string too long");
        assert_eq!(
            error,
            LexError::ExceedsMaxLength {
                kind: LengthLimited::String,
                position: Position::new(4, 1),
            }
        );
    }

    #[test]
    fn integer_that_overflows_configured_cap_is_too_long() {
        let config = LexerConfig::default().with_max_int_length(30);
        let error = tokenize_with_config("99999999999999999999999", config)
            .expect_err("expected overflow");
        assert!(matches!(
            error,
            LexError::ExceedsMaxLength {
                kind: LengthLimited::Integer,
                ..
            }
        ));
    }

    #[test]
    fn integers_render_back_unchanged() {
        for literal in ["0", "7", "123123412", "999999999999999"] {
            let tokens = tokenize(literal).expect("tokenize should succeed");
            assert_eq!(tokens[0].kind.to_string(), literal);
        }
    }

    #[test]
    fn iterator_stops_after_single_eof() {
        let lexer = Lexer::new(Source::new("a b"));
        let tokens = lexer
            .collect::<LexResult<Vec<_>>>()
            .expect("tokenize should succeed");
        assert_eq!(tokens.len(), 3);
        assert_eq!(
            tokens.iter().filter(|token| token.kind == TokenKind::EOF).count(),
            1
        );
        assert_eq!(tokens.last().map(|token| &token.kind), Some(&TokenKind::EOF));
    }

    #[test]
    fn next_token_keeps_returning_eof() {
        let mut lexer = Lexer::new(Source::new("x"));
        lexer.next_token().expect("identifier");
        let first = lexer.next_token().expect("eof");
        let second = lexer.next_token().expect("eof again");
        assert_eq!(first, second);
    }

    #[test]
    fn relexing_rendered_tokens_preserves_kinds() {
        let input = indoc! {r#"
            int main() {
                # geometry
                Point p = Point(1, 2.5, 3);
                string s = "a\tb";
                if (!(1 <= 2) or True) { return -4 / 2; }
                return p.x();
            }
        "#};
        let original = tokenize(input).expect("tokenize should succeed");
        let rendered = original
            .iter()
            .map(|token| token.kind.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let relexed = tokenize(&rendered).expect("re-tokenize should succeed");
        let original_kinds = original.into_iter().map(|token| token.kind).collect::<Vec<_>>();
        let relexed_kinds = relexed.into_iter().map(|token| token.kind).collect::<Vec<_>>();
        assert_eq!(original_kinds, relexed_kinds);
    }
}
