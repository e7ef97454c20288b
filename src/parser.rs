use std::mem;

use log::{debug, info};

use crate::ast::{
    Block, Expression, Function, FunctionCall, FunctionType, Identifier, MethodCall,
    MethodCallExpression, Operator, Parameter, Program, ReturnType, Statement, TypeName,
    VariableType,
};
use crate::lexer::{Lexer, LexerConfig};
use crate::source::Source;
use crate::token::{Position, Token, TokenKind};

pub mod error;

pub use error::{ParseError, ParseResult};

type Level = fn(&mut Parser) -> ParseResult<Option<Expression>>;

pub struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> ParseResult<Self> {
        let current = next_significant(&mut lexer)?;
        Ok(Self { lexer, current })
    }

    /// Parses zero or more functions followed by the end of input.
    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut functions = Vec::new();
        while let Some(function) = self.parse_function()? {
            debug!("parsed function '{}'", function.name);
            functions.push(function);
        }
        if self.current.kind != TokenKind::EOF {
            return Err(self.error("function definition or end of input"));
        }
        info!("parsed program with {} function(s)", functions.len());
        Ok(Program { functions })
    }

    fn parse_function(&mut self) -> ParseResult<Option<Function>> {
        let position = self.position();
        let Some(return_type) = self.parse_function_type()? else {
            return Ok(None);
        };
        let name = self.expect_identifier("function name")?;
        self.expect(TokenKind::LParen, "'(' before function parameters")?;
        let params = self.parse_parameters()?;
        self.expect(TokenKind::RParen, "')' after function parameters")?;
        let body = self.parse_block("'{' to open function body")?;
        Ok(Some(Function {
            return_type,
            name: name.name,
            params,
            body,
            position,
        }))
    }

    fn parse_function_type(&mut self) -> ParseResult<Option<FunctionType>> {
        let position = self.position();
        let returns = if self.current.kind == TokenKind::Void {
            ReturnType::Void
        } else if let Some(name) = type_name(&self.current.kind) {
            ReturnType::Value(name)
        } else {
            return Ok(None);
        };
        self.advance()?;
        Ok(Some(FunctionType { returns, position }))
    }

    fn parse_variable_type(&mut self) -> ParseResult<Option<VariableType>> {
        let position = self.position();
        let Some(name) = type_name(&self.current.kind) else {
            return Ok(None);
        };
        self.advance()?;
        Ok(Some(VariableType { name, position }))
    }

    fn parse_parameters(&mut self) -> ParseResult<Vec<Parameter>> {
        let mut params = Vec::new();
        let Some(first) = self.parse_parameter()? else {
            return Ok(params);
        };
        params.push(first);
        while self.consume_if(&TokenKind::Comma)? {
            match self.parse_parameter()? {
                Some(param) => params.push(param),
                None => return Err(self.error("parameter after ','")),
            }
        }
        Ok(params)
    }

    fn parse_parameter(&mut self) -> ParseResult<Option<Parameter>> {
        let position = self.position();
        let Some(var_type) = self.parse_variable_type()? else {
            return Ok(None);
        };
        let name = self.expect_identifier("parameter name")?;
        Ok(Some(Parameter {
            var_type,
            name: name.name,
            position,
        }))
    }

    fn parse_block(&mut self, expected: &str) -> ParseResult<Block> {
        self.expect(TokenKind::LBrace, expected)?;
        let mut statements = Vec::new();
        while let Some(statement) = self.parse_statement()? {
            statements.push(statement);
        }
        self.expect(TokenKind::RBrace, "'}' to close block")?;
        Ok(Block { statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Option<Statement>> {
        if let Some(statement) = self.parse_return_statement()? {
            return Ok(Some(statement));
        }
        if let Some(statement) = self.parse_if_statement()? {
            return Ok(Some(statement));
        }
        if let Some(statement) = self.parse_while_statement()? {
            return Ok(Some(statement));
        }
        if let Some(statement) = self.parse_declaration()? {
            return Ok(Some(statement));
        }
        self.parse_identifier_statement()
    }

    fn parse_return_statement(&mut self) -> ParseResult<Option<Statement>> {
        let position = self.position();
        if !self.consume_if(&TokenKind::Return)? {
            return Ok(None);
        }
        let value = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "';' after return statement")?;
        Ok(Some(Statement::Return { value, position }))
    }

    fn parse_if_statement(&mut self) -> ParseResult<Option<Statement>> {
        let position = self.position();
        if !self.consume_if(&TokenKind::If)? {
            return Ok(None);
        }
        let condition = self.parse_condition("if")?;
        let then_block = self.parse_block("'{' to open if block")?;
        let else_block = if self.consume_if(&TokenKind::Else)? {
            Some(self.parse_block("'{' to open else block")?)
        } else {
            None
        };
        Ok(Some(Statement::If {
            condition,
            then_block,
            else_block,
            position,
        }))
    }

    fn parse_while_statement(&mut self) -> ParseResult<Option<Statement>> {
        let position = self.position();
        if !self.consume_if(&TokenKind::While)? {
            return Ok(None);
        }
        let condition = self.parse_condition("while")?;
        let body = self.parse_block("'{' to open while block")?;
        Ok(Some(Statement::While {
            condition,
            body,
            position,
        }))
    }

    fn parse_condition(&mut self, keyword: &str) -> ParseResult<Expression> {
        self.expect(TokenKind::LParen, &format!("'(' after '{keyword}'"))?;
        let condition = self.require_expression(&format!("{keyword} condition"))?;
        self.expect(TokenKind::RParen, &format!("')' after {keyword} condition"))?;
        Ok(condition)
    }

    fn parse_declaration(&mut self) -> ParseResult<Option<Statement>> {
        let position = self.position();
        let Some(var_type) = self.parse_variable_type()? else {
            return Ok(None);
        };
        let name = self.expect_identifier("variable name after type")?;
        let value = if self.consume_if(&TokenKind::Assign)? {
            Some(self.require_expression("expression after '='")?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';' after declaration")?;
        Ok(Some(Statement::Declaration {
            var_type,
            name,
            value,
            position,
        }))
    }

    /// Assignment, method-call statement or function-call statement.
    fn parse_identifier_statement(&mut self) -> ParseResult<Option<Statement>> {
        let Some(identifier) = self.parse_identifier()? else {
            return Ok(None);
        };
        let position = identifier.position;
        let statement = match self.current.kind {
            TokenKind::Dot => {
                let caller = Expression::Identifier(identifier);
                let chain = self.parse_method_chain(caller)?;
                self.expect(TokenKind::Semicolon, "';' after method call")?;
                match chain {
                    Expression::MethodCall(call) => Statement::MethodCall(call),
                    _ => return Err(self.error("method call after '.'")),
                }
            }
            TokenKind::Assign => {
                self.advance()?;
                let value = self.require_expression("expression after '='")?;
                self.expect(TokenKind::Semicolon, "';' after assignment")?;
                Statement::Assign {
                    target: identifier,
                    value,
                    position,
                }
            }
            TokenKind::LParen => {
                let call = self.parse_call(identifier)?;
                self.expect(TokenKind::Semicolon, "';' after function call")?;
                Statement::FunctionCall(call)
            }
            _ => return Err(self.error("'=', '.' or '(' after identifier")),
        };
        Ok(Some(statement))
    }

    pub fn parse_expression(&mut self) -> ParseResult<Option<Expression>> {
        self.parse_or()
    }

    fn require_expression(&mut self, expected: &str) -> ParseResult<Expression> {
        match self.parse_expression()? {
            Some(expression) => Ok(expression),
            None => Err(self.error(expected)),
        }
    }

    fn parse_or(&mut self) -> ParseResult<Option<Expression>> {
        self.parse_binary_level(Self::parse_and, |kind| match kind {
            TokenKind::Or => Some(Operator::Or),
            _ => None,
        })
    }

    fn parse_and(&mut self) -> ParseResult<Option<Expression>> {
        self.parse_binary_level(Self::parse_comparison, |kind| match kind {
            TokenKind::And => Some(Operator::And),
            _ => None,
        })
    }

    fn parse_comparison(&mut self) -> ParseResult<Option<Expression>> {
        self.parse_binary_level(Self::parse_additive, |kind| match kind {
            TokenKind::Equal => Some(Operator::Equal),
            TokenKind::NotEqual => Some(Operator::NotEqual),
            TokenKind::Less => Some(Operator::Less),
            TokenKind::Greater => Some(Operator::Greater),
            TokenKind::LessEqual => Some(Operator::LessEqual),
            TokenKind::GreaterEqual => Some(Operator::GreaterEqual),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> ParseResult<Option<Expression>> {
        self.parse_binary_level(Self::parse_multiplicative, |kind| match kind {
            TokenKind::Plus => Some(Operator::Plus),
            TokenKind::Minus => Some(Operator::Minus),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Option<Expression>> {
        self.parse_binary_level(Self::parse_negation, |kind| match kind {
            TokenKind::Star => Some(Operator::Mul),
            TokenKind::Slash => Some(Operator::Div),
            _ => None,
        })
    }

    /// Left-associative fold of `operand (op operand)*`. Every node built here
    /// takes the position of the level's first token.
    fn parse_binary_level(
        &mut self,
        operand: Level,
        operator: fn(&TokenKind) -> Option<Operator>,
    ) -> ParseResult<Option<Expression>> {
        let position = self.position();
        let Some(mut left) = operand(self)? else {
            return Ok(None);
        };
        while let Some(op) = operator(&self.current.kind) {
            self.advance()?;
            let Some(right) = operand(self)? else {
                return Err(self.error(&format!("expression after '{op}'")));
            };
            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
                position,
            };
        }
        Ok(Some(left))
    }

    fn parse_negation(&mut self) -> ParseResult<Option<Expression>> {
        let position = self.position();
        let op = match self.current.kind {
            TokenKind::Bang => Operator::Not,
            TokenKind::Minus => Operator::Minus,
            _ => return self.parse_factor(),
        };
        self.advance()?;
        let Some(operand) = self.parse_factor()? else {
            return Err(self.error(&format!("expression after '{op}'")));
        };
        Ok(Some(Expression::Negation {
            op,
            operand: Box::new(operand),
            position,
        }))
    }

    fn parse_factor(&mut self) -> ParseResult<Option<Expression>> {
        if let Some(literal) = self.parse_literal()? {
            return Ok(Some(literal));
        }
        if self.consume_if(&TokenKind::LParen)? {
            let expression = self.require_expression("expression after '('")?;
            self.expect(TokenKind::RParen, "')' to close expression")?;
            return Ok(Some(expression));
        }
        let Some(primary) = self.parse_identifier_or_call()? else {
            return Ok(None);
        };
        self.parse_method_chain(primary).map(Some)
    }

    fn parse_literal(&mut self) -> ParseResult<Option<Expression>> {
        let position = self.position();
        let literal = match &self.current.kind {
            TokenKind::Integer(value) => Expression::Integer {
                value: *value,
                position,
            },
            TokenKind::Float(value) => Expression::Float {
                value: *value,
                position,
            },
            TokenKind::String(value) => Expression::String {
                value: value.clone(),
                position,
            },
            TokenKind::True => Expression::Boolean {
                value: true,
                position,
            },
            TokenKind::False => Expression::Boolean {
                value: false,
                position,
            },
            _ => return Ok(None),
        };
        self.advance()?;
        Ok(Some(literal))
    }

    /// An identifier, optionally called, or a constructor call such as
    /// `Point(1, 2, 3)`.
    fn parse_identifier_or_call(&mut self) -> ParseResult<Option<Expression>> {
        if let Some(identifier) = self.parse_identifier()? {
            if self.current.kind == TokenKind::LParen {
                return self.parse_call(identifier).map(|call| Some(Expression::FunctionCall(call)));
            }
            return Ok(Some(Expression::Identifier(identifier)));
        }
        if let Some(constructor) = constructor_name(&self.current.kind) {
            let identifier = Identifier::new(constructor.as_str(), self.position());
            self.advance()?;
            if self.current.kind != TokenKind::LParen {
                return Err(self.error(&format!("'(' after '{constructor}'")));
            }
            return self.parse_call(identifier).map(|call| Some(Expression::FunctionCall(call)));
        }
        Ok(None)
    }

    /// Wraps `caller` into a method-call expression for every `.name(args)`
    /// that follows. Returns `caller` untouched when no dot follows.
    fn parse_method_chain(&mut self, caller: Expression) -> ParseResult<Expression> {
        let mut methods = Vec::new();
        while self.consume_if(&TokenKind::Dot)? {
            let name = self.expect_identifier("method name after '.'")?;
            let position = name.position;
            self.expect(TokenKind::LParen, "'(' after method name")?;
            let args = self.parse_arguments()?;
            self.expect(TokenKind::RParen, "')' after method arguments")?;
            methods.push(MethodCall {
                name,
                args,
                position,
            });
        }
        if methods.is_empty() {
            return Ok(caller);
        }
        let position = caller.position();
        Ok(Expression::MethodCall(MethodCallExpression {
            caller: Box::new(caller),
            methods,
            position,
        }))
    }

    fn parse_call(&mut self, callee: Identifier) -> ParseResult<FunctionCall> {
        let position = callee.position;
        self.expect(TokenKind::LParen, "'(' before call arguments")?;
        let args = self.parse_arguments()?;
        self.expect(TokenKind::RParen, "')' after call arguments")?;
        Ok(FunctionCall {
            callee,
            args,
            position,
        })
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        let mut args = Vec::new();
        let Some(first) = self.parse_expression()? else {
            return Ok(args);
        };
        args.push(first);
        while self.consume_if(&TokenKind::Comma)? {
            args.push(self.require_expression("argument after ','")?);
        }
        Ok(args)
    }

    fn parse_identifier(&mut self) -> ParseResult<Option<Identifier>> {
        let TokenKind::Identifier(name) = &self.current.kind else {
            return Ok(None);
        };
        let identifier = Identifier::new(name.clone(), self.position());
        self.advance()?;
        Ok(Some(identifier))
    }

    fn expect_identifier(&mut self, expected: &str) -> ParseResult<Identifier> {
        match self.parse_identifier()? {
            Some(identifier) => Ok(identifier),
            None => Err(self.error(expected)),
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.current.kind == kind {
            self.advance()
        } else {
            Err(self.error(expected))
        }
    }

    fn consume_if(&mut self, kind: &TokenKind) -> ParseResult<bool> {
        if &self.current.kind == kind {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Moves to the next non-comment token and returns the previous one.
    fn advance(&mut self) -> ParseResult<Token> {
        let next = next_significant(&mut self.lexer)?;
        Ok(mem::replace(&mut self.current, next))
    }

    fn position(&self) -> Position {
        self.current.position
    }

    fn error(&self, expected: &str) -> ParseError {
        let found = match &self.current.kind {
            TokenKind::EOF => "end of input".to_string(),
            kind => format!("'{kind}'"),
        };
        ParseError::invalid_syntax(self.position(), format!("Expected {expected}, got {found}"))
    }
}

fn next_significant(lexer: &mut Lexer) -> ParseResult<Token> {
    loop {
        let token = lexer.next_token()?;
        if !token.kind.is_comment() {
            return Ok(token);
        }
    }
}

fn type_name(kind: &TokenKind) -> Option<TypeName> {
    let name = match kind {
        TokenKind::Int => TypeName::Int,
        TokenKind::FloatType => TypeName::Float,
        TokenKind::Bool => TypeName::Bool,
        TokenKind::StringType => TypeName::String,
        _ => return constructor_name(kind),
    };
    Some(name)
}

fn constructor_name(kind: &TokenKind) -> Option<TypeName> {
    let name = match kind {
        TokenKind::List => TypeName::List,
        TokenKind::Point => TypeName::Point,
        TokenKind::Line => TypeName::Line,
        TokenKind::Polyhedron => TypeName::Polyhedron,
        TokenKind::Collection => TypeName::Collection,
        _ => return None,
    };
    Some(name)
}

pub fn parse(input: &str) -> ParseResult<Program> {
    parse_source(Source::new(input), LexerConfig::default())
}

pub fn parse_source(source: Source, config: LexerConfig) -> ParseResult<Program> {
    Parser::new(Lexer::with_config(source, config))?.parse_program()
}
