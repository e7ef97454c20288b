//! Syntax tree produced by the parser and walked by the interpreter.
//!
//! Nodes are built once and never mutated afterwards. Every node except
//! `Block` and `Program` records where it started in the source.

use std::fmt;

use crate::token::Position;

#[derive(Debug, PartialEq, Clone)]
pub struct Identifier {
    pub name: String,
    pub position: Position,
}

impl Identifier {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Identifier(Identifier),
    Boolean {
        value: bool,
        position: Position,
    },
    Integer {
        value: i64,
        position: Position,
    },
    Float {
        value: f64,
        position: Position,
    },
    String {
        value: String,
        position: Position,
    },
    BinaryOp {
        left: Box<Expression>,
        op: Operator,
        right: Box<Expression>,
        position: Position,
    },
    Negation {
        op: Operator,
        operand: Box<Expression>,
        position: Position,
    },
    MethodCall(MethodCallExpression),
    FunctionCall(FunctionCall),
}

impl Expression {
    pub fn position(&self) -> Position {
        match self {
            Self::Identifier(identifier) => identifier.position,
            Self::Boolean { position, .. }
            | Self::Integer { position, .. }
            | Self::Float { position, .. }
            | Self::String { position, .. }
            | Self::BinaryOp { position, .. }
            | Self::Negation { position, .. } => *position,
            Self::MethodCall(call) => call.position,
            Self::FunctionCall(call) => call.position,
        }
    }
}

/// One `.name(args)` segment of a method chain.
#[derive(Debug, PartialEq, Clone)]
pub struct MethodCall {
    pub name: Identifier,
    pub args: Vec<Expression>,
    pub position: Position,
}

/// A receiver followed by one or more method calls, e.g. `p.lines().get(0)`.
///
/// The caller is either an identifier or a function call.
#[derive(Debug, PartialEq, Clone)]
pub struct MethodCallExpression {
    pub caller: Box<Expression>,
    pub methods: Vec<MethodCall>,
    pub position: Position,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionCall {
    pub callee: Identifier,
    pub args: Vec<Expression>,
    pub position: Position,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operator {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Plus,
    Minus,
    Mul,
    Div,
    Not,
}

impl Operator {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::Greater
                | Self::LessEqual
                | Self::GreaterEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Not => "!",
        };
        f.write_str(symbol)
    }
}

/// Declarable value types.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TypeName {
    Int,
    Float,
    Bool,
    String,
    List,
    Point,
    Line,
    Polyhedron,
    Collection,
}

impl TypeName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::String => "string",
            Self::List => "List",
            Self::Point => "Point",
            Self::Line => "Line",
            Self::Polyhedron => "Polyhedron",
            Self::Collection => "Collection",
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct VariableType {
    pub name: TypeName,
    pub position: Position,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ReturnType {
    Void,
    Value(TypeName),
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Value(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct FunctionType {
    pub returns: ReturnType,
    pub position: Position,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Parameter {
    pub var_type: VariableType,
    pub name: String,
    pub position: Position,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Return {
        value: Option<Expression>,
        position: Position,
    },
    If {
        condition: Expression,
        then_block: Block,
        else_block: Option<Block>,
        position: Position,
    },
    While {
        condition: Expression,
        body: Block,
        position: Position,
    },
    Declaration {
        var_type: VariableType,
        name: Identifier,
        value: Option<Expression>,
        position: Position,
    },
    Assign {
        target: Identifier,
        value: Expression,
        position: Position,
    },
    MethodCall(MethodCallExpression),
    FunctionCall(FunctionCall),
}

impl Statement {
    pub fn position(&self) -> Position {
        match self {
            Self::Return { position, .. }
            | Self::If { position, .. }
            | Self::While { position, .. }
            | Self::Declaration { position, .. }
            | Self::Assign { position, .. } => *position,
            Self::MethodCall(call) => call.position,
            Self::FunctionCall(call) => call.position,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Function {
    pub return_type: FunctionType,
    pub name: String,
    pub params: Vec<Parameter>,
    pub body: Block,
    pub position: Position,
}

impl Function {
    /// A valid entry point: `int main()` with no parameters.
    pub fn is_entry_point(&self) -> bool {
        self.name == "main"
            && self.return_type.returns == ReturnType::Value(TypeName::Int)
            && self.params.is_empty()
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub functions: Vec<Function>,
}
