use std::fmt;

/// Column/line of a token or node. Both are 1-based once reading has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Position {
    pub column: usize,
    pub line: usize,
}

impl Position {
    pub const fn new(column: usize, line: usize) -> Self {
        Self { column, line }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Integer(i64),
    Float(f64),
    String(String),
    Comment(String),

    // Type keywords
    Int,
    FloatType,
    Bool,
    StringType,
    List,
    Point,
    Line,
    Polyhedron,
    Collection,
    Void,

    // Keywords
    If,
    Else,
    While,
    Return,
    And,
    Or,
    True,
    False,

    // Operators
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Assign,       // =
    Equal,        // ==
    NotEqual,     // !=
    Less,         // <
    Greater,      // >
    LessEqual,    // <=
    GreaterEqual, // >=
    Bang,         // !

    // Delimiters
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Comma,     // ,
    Semicolon, // ;
    Dot,       // .

    EOF,
}

impl TokenKind {
    pub fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "int" => Self::Int,
            "float" => Self::FloatType,
            "bool" => Self::Bool,
            "string" => Self::StringType,
            "List" => Self::List,
            "Point" => Self::Point,
            "Line" => Self::Line,
            "Polyhedron" => Self::Polyhedron,
            "Collection" => Self::Collection,
            "void" => Self::Void,
            "if" => Self::If,
            "else" => Self::Else,
            "while" => Self::While,
            "return" => Self::Return,
            "and" => Self::And,
            "or" => Self::Or,
            "True" => Self::True,
            "False" => Self::False,
            _ => return None,
        };
        Some(kind)
    }

    pub fn single_char(ch: char) -> Option<Self> {
        let kind = match ch {
            '+' => Self::Plus,
            '-' => Self::Minus,
            '*' => Self::Star,
            '/' => Self::Slash,
            '=' => Self::Assign,
            '<' => Self::Less,
            '>' => Self::Greater,
            '!' => Self::Bang,
            '{' => Self::LBrace,
            '}' => Self::RBrace,
            '(' => Self::LParen,
            ')' => Self::RParen,
            ',' => Self::Comma,
            ';' => Self::Semicolon,
            '.' => Self::Dot,
            _ => return None,
        };
        Some(kind)
    }

    pub fn double_char(first: char, second: char) -> Option<Self> {
        let kind = match (first, second) {
            ('=', '=') => Self::Equal,
            ('!', '=') => Self::NotEqual,
            ('<', '=') => Self::LessEqual,
            ('>', '=') => Self::GreaterEqual,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Self::Comment(_))
    }
}

/// Renders the token back as source text.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => f.write_str(name),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::String(value) => {
                f.write_str("\"")?;
                for ch in value.chars() {
                    match ch {
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\\' => f.write_str("\\\\")?,
                        '"' => f.write_str("\\\"")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("\"")
            }
            Self::Comment(text) => write!(f, "#{text}"),
            Self::Int => f.write_str("int"),
            Self::FloatType => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::StringType => f.write_str("string"),
            Self::List => f.write_str("List"),
            Self::Point => f.write_str("Point"),
            Self::Line => f.write_str("Line"),
            Self::Polyhedron => f.write_str("Polyhedron"),
            Self::Collection => f.write_str("Collection"),
            Self::Void => f.write_str("void"),
            Self::If => f.write_str("if"),
            Self::Else => f.write_str("else"),
            Self::While => f.write_str("while"),
            Self::Return => f.write_str("return"),
            Self::And => f.write_str("and"),
            Self::Or => f.write_str("or"),
            Self::True => f.write_str("True"),
            Self::False => f.write_str("False"),
            Self::Plus => f.write_str("+"),
            Self::Minus => f.write_str("-"),
            Self::Star => f.write_str("*"),
            Self::Slash => f.write_str("/"),
            Self::Assign => f.write_str("="),
            Self::Equal => f.write_str("=="),
            Self::NotEqual => f.write_str("!="),
            Self::Less => f.write_str("<"),
            Self::Greater => f.write_str(">"),
            Self::LessEqual => f.write_str("<="),
            Self::GreaterEqual => f.write_str(">="),
            Self::Bang => f.write_str("!"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::LBrace => f.write_str("{"),
            Self::RBrace => f.write_str("}"),
            Self::Comma => f.write_str(","),
            Self::Semicolon => f.write_str(";"),
            Self::Dot => f.write_str("."),
            Self::EOF => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Self { kind, position }
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }
}
