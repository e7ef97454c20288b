use std::io::Write;

use log::{debug, info};

use crate::ast::{
    Block, Expression, Function, FunctionCall, Identifier, MethodCallExpression, Operator,
    Program, ReturnType, Statement,
};
use crate::runtime::{
    Arity, BuiltinFunction, ContextManager, Location, Method, Number, RuntimeError,
    RuntimeResult, Value,
};
use crate::token::Position;

/// Result of evaluating an expression. Identifiers produce a `Name` so the
/// same node can act as an assignment target or, once resolved, a value.
#[derive(Debug, Clone, PartialEq)]
enum Evaluated {
    Name(String),
    Value(Value),
}

/// Control-flow marker for statement execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecResult {
    Continue,
    Return,
}

pub(super) struct Evaluator<'p, W> {
    contexts: ContextManager<'p>,
    output: W,
}

impl<'p, W: Write> Evaluator<'p, W> {
    pub(super) fn new(output: W) -> Self {
        Self {
            contexts: ContextManager::new(),
            output,
        }
    }

    /// Validates the function set, then runs `int main()` and returns its value.
    pub(super) fn run_program(&mut self, program: &'p Program) -> RuntimeResult<Value> {
        let main = self.register_functions(program)?;
        info!("running main");
        let value = self.call_function(main, Vec::new())?;
        info!("main returned {value}");
        Ok(value)
    }

    fn register_functions(&mut self, program: &'p Program) -> RuntimeResult<&'p Function> {
        let mut entry: Option<&'p Function> = None;
        for function in &program.functions {
            if function.is_entry_point() {
                if entry.is_some() {
                    return Err(RuntimeError::redefinition(&function.name).at(function.position));
                }
                entry = Some(function);
            } else if BuiltinFunction::from_name(&function.name).is_some() {
                return Err(RuntimeError::redefinition(&function.name).at(function.position));
            } else {
                self.contexts.add_function(function)?;
            }
        }
        let main = entry.ok_or(RuntimeError::MainFunctionNotFound)?;
        self.contexts.add_function(main)?;
        debug!("registered {} function(s)", program.functions.len());
        Ok(main)
    }

    fn call_function(&mut self, function: &'p Function, args: Vec<Value>) -> RuntimeResult<Value> {
        let function = self.contexts.enter_context(&function.name)?;
        let result = self.run_function(function, args);
        self.contexts.exit_context();
        result
    }

    fn run_function(&mut self, function: &'p Function, args: Vec<Value>) -> RuntimeResult<Value> {
        for (param, value) in function.params.iter().zip(args) {
            let expected = param.var_type.name;
            if !value.is_of_type(expected) {
                return Err(RuntimeError::TypeMismatch {
                    name: param.name.clone(),
                    expected: expected.to_string(),
                    found: value.type_name().to_string(),
                    location: Location(Some(param.position)),
                });
            }
            self.contexts
                .add_variable(&param.name, value, expected)
                .map_err(|error| error.at(param.position))?;
        }

        self.exec_block(&function.body)?;
        let value = self.contexts.get_return_value().cloned().unwrap_or(Value::None);

        let valid = match function.return_type.returns {
            ReturnType::Void => value.is_none(),
            ReturnType::Value(expected) => value.is_of_type(expected),
        };
        if !valid {
            return Err(RuntimeError::InvalidReturnType {
                name: function.name.clone(),
                expected: function.return_type.returns.to_string(),
                found: value.type_name().to_string(),
                location: Location(Some(function.return_type.position)),
            });
        }
        Ok(value)
    }

    fn exec_block(&mut self, block: &'p Block) -> RuntimeResult<ExecResult> {
        for statement in &block.statements {
            if self.exec_statement(statement)? == ExecResult::Return {
                return Ok(ExecResult::Return);
            }
        }
        Ok(ExecResult::Continue)
    }

    fn exec_statement(&mut self, statement: &'p Statement) -> RuntimeResult<ExecResult> {
        match statement {
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(expression) => self.eval_value(expression)?,
                    None => Value::None,
                };
                self.contexts.set_return_value(value);
                Ok(ExecResult::Return)
            }
            Statement::If {
                condition,
                then_block,
                else_block,
                position,
            } => {
                if self.eval_condition(condition, *position)? {
                    self.exec_block(then_block)
                } else if let Some(else_block) = else_block {
                    self.exec_block(else_block)
                } else {
                    Ok(ExecResult::Continue)
                }
            }
            Statement::While {
                condition,
                body,
                position,
            } => {
                let mut running = self.eval_condition(condition, *position)?;
                while running {
                    if self.exec_block(body)? == ExecResult::Return {
                        return Ok(ExecResult::Return);
                    }
                    running = self.eval_condition(condition, *position)?;
                }
                Ok(ExecResult::Continue)
            }
            Statement::Declaration {
                var_type,
                name,
                value,
                position,
            } => {
                if self.contexts.is_variable_exists(&name.name) {
                    return Err(RuntimeError::redefinition(&name.name).at(*position));
                }
                let value = match value {
                    Some(expression) => self.eval_value(expression)?,
                    None => Value::zero(var_type.name),
                };
                if !value.is_of_type(var_type.name) {
                    return Err(RuntimeError::TypeMismatch {
                        name: name.name.clone(),
                        expected: var_type.name.to_string(),
                        found: value.type_name().to_string(),
                        location: Location(Some(*position)),
                    });
                }
                self.contexts
                    .add_variable(&name.name, value, var_type.name)
                    .map_err(|error| error.at(*position))?;
                Ok(ExecResult::Continue)
            }
            Statement::Assign {
                target,
                value,
                position,
            } => {
                self.assign(target, value, *position)?;
                Ok(ExecResult::Continue)
            }
            Statement::MethodCall(chain) => {
                self.eval_method_chain(chain)?;
                Ok(ExecResult::Continue)
            }
            Statement::FunctionCall(call) => {
                self.eval_call(call)?;
                Ok(ExecResult::Continue)
            }
        }
    }

    fn assign(
        &mut self,
        target: &'p Identifier,
        value: &'p Expression,
        position: Position,
    ) -> RuntimeResult<()> {
        let Evaluated::Name(name) = self.eval_identifier(target)? else {
            return Err(RuntimeError::undeclared_variable(&target.name).at(position));
        };
        let declared = self
            .contexts
            .get_variable_type(&name)
            .map_err(|error| error.at(position))?;
        let value = self.eval_value(value)?;
        if !value.is_of_type(declared) {
            return Err(RuntimeError::TypeMismatch {
                name,
                expected: declared.to_string(),
                found: value.type_name().to_string(),
                location: Location(Some(position)),
            });
        }
        self.contexts
            .set_variable_value(&name, value)
            .map_err(|error| error.at(position))
    }

    fn eval_condition(&mut self, condition: &'p Expression, position: Position) -> RuntimeResult<bool> {
        match self.eval_value(condition)? {
            Value::Bool(value) => Ok(value),
            other => Err(RuntimeError::InvalidCondition {
                found: other.type_name().to_string(),
                location: Location(Some(position)),
            }),
        }
    }

    /// Evaluates `expression` and dereferences a variable name to its value.
    fn eval_value(&mut self, expression: &'p Expression) -> RuntimeResult<Value> {
        let evaluated = self.eval_expression(expression)?;
        self.resolve(evaluated, expression.position())
    }

    fn resolve(&self, evaluated: Evaluated, position: Position) -> RuntimeResult<Value> {
        match evaluated {
            Evaluated::Value(value) => Ok(value),
            Evaluated::Name(name) => self
                .contexts
                .get_variable_value(&name)
                .map_err(|error| error.at(position)),
        }
    }

    fn eval_expression(&mut self, expression: &'p Expression) -> RuntimeResult<Evaluated> {
        let value = match expression {
            Expression::Identifier(identifier) => return self.eval_identifier(identifier),
            Expression::Boolean { value, .. } => Value::Bool(*value),
            Expression::Integer { value, .. } => Value::Int(*value),
            Expression::Float { value, .. } => Value::Float(*value),
            Expression::String { value, .. } => Value::Str(value.clone()),
            Expression::BinaryOp {
                left,
                op,
                right,
                position,
            } => {
                // Both sides are always evaluated; `and`/`or` do not short-circuit.
                let left = self.eval_value(left)?;
                let right = self.eval_value(right)?;
                binary(*op, left, right).map_err(|error| error.at(*position))?
            }
            Expression::Negation {
                op,
                operand,
                position,
            } => {
                let operand = self.eval_value(operand)?;
                negate(*op, operand).map_err(|error| error.at(*position))?
            }
            Expression::MethodCall(chain) => self.eval_method_chain(chain)?,
            Expression::FunctionCall(call) => self.eval_call(call)?,
        };
        Ok(Evaluated::Value(value))
    }

    /// Accepts variables, functions, `print` and built-in method names.
    fn eval_identifier(&self, identifier: &Identifier) -> RuntimeResult<Evaluated> {
        let name = identifier.name.as_str();
        let known = self.contexts.is_variable_exists(name)
            || self.contexts.is_function_exists(name)
            || name == BuiltinFunction::Print.name()
            || Method::is_known(name);
        if known {
            Ok(Evaluated::Name(identifier.name.clone()))
        } else {
            Err(RuntimeError::undeclared_variable(name).at(identifier.position))
        }
    }

    fn eval_method_chain(&mut self, chain: &'p MethodCallExpression) -> RuntimeResult<Value> {
        let mut receiver = self.eval_value(&chain.caller)?;
        for method in &chain.methods {
            let args = self.eval_arguments(&method.args)?;
            receiver = Method::dispatch(&receiver, &method.name.name, args)
                .map_err(|error| error.at(method.position))?;
        }
        Ok(receiver)
    }

    fn eval_call(&mut self, call: &'p FunctionCall) -> RuntimeResult<Value> {
        let name = call.callee.name.as_str();
        if let Some(builtin) = BuiltinFunction::from_name(name) {
            let args = self.eval_arguments(&call.args)?;
            return self
                .call_builtin(builtin, args)
                .map_err(|error| error.at(call.position));
        }

        let function = self
            .contexts
            .get_function(name)
            .map_err(|error| error.at(call.position))?;
        // Arguments are dereferenced in the caller's context.
        let args = self.eval_arguments(&call.args)?;
        if args.len() != function.params.len() {
            return Err(RuntimeError::arguments(
                name,
                Arity::Exactly(function.params.len()),
                args.len(),
            )
            .at(call.position));
        }
        debug!("calling '{name}' with {} argument(s)", args.len());
        self.call_function(function, args)
    }

    fn call_builtin(&mut self, builtin: BuiltinFunction, args: Vec<Value>) -> RuntimeResult<Value> {
        match builtin {
            BuiltinFunction::Print => {
                let [value] = <[Value; 1]>::try_from(args).map_err(|args| {
                    RuntimeError::arguments(builtin.name(), Arity::Exactly(1), args.len())
                })?;
                writeln!(self.output, "{value}").map_err(|error| RuntimeError::Output {
                    message: error.to_string(),
                })?;
                Ok(Value::None)
            }
            BuiltinFunction::Construct(builtin_type) => builtin_type.construct(args),
        }
    }

    fn eval_arguments(&mut self, args: &'p [Expression]) -> RuntimeResult<Vec<Value>> {
        args.iter().map(|arg| self.eval_value(arg)).collect()
    }
}

fn binary(op: Operator, left: Value, right: Value) -> RuntimeResult<Value> {
    match op {
        Operator::Plus => match (&left, &right) {
            (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::Str(format!("{left}{right}"))),
            _ => arithmetic("Addition", &left, &right, i64::checked_add, |a, b| a + b),
        },
        Operator::Minus => {
            arithmetic("Subtraction", &left, &right, i64::checked_sub, |a, b| a - b)
        }
        Operator::Mul => match (&left, &right) {
            (Value::Str(text), Value::Int(count)) | (Value::Int(count), Value::Str(text)) => {
                repeat(text, *count)
            }
            _ => arithmetic("Multiplication", &left, &right, i64::checked_mul, |a, b| a * b),
        },
        Operator::Div => divide(&left, &right),
        Operator::And | Operator::Or => match (&left, &right) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == Operator::And {
                *a && *b
            } else {
                *a || *b
            })),
            _ => Err(operand_error(op, &left, &right, "boolean")),
        },
        op if op.is_comparison() => compare(op, &left, &right),
        _ => Err(RuntimeError::invalid_type(format!(
            "'{op}' is not a binary operator"
        ))),
    }
}

fn arithmetic(
    operation: &str,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> RuntimeResult<Value> {
    match (left.as_number(), right.as_number()) {
        (Some(Number::Int(a)), Some(Number::Int(b))) => int_op(a, b)
            .map(Value::Int)
            .ok_or_else(|| RuntimeError::overflow(operation)),
        (Some(a), Some(b)) => Ok(Value::Float(float_op(a.as_f64(), b.as_f64()))),
        _ => Err(RuntimeError::invalid_type(format!(
            "{operation} requires numeric types, got {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Longest string `string * int` may produce, in bytes.
const MAX_REPEATED_LENGTH: usize = 1 << 30;

/// Negative counts give the empty string.
fn repeat(text: &str, count: i64) -> RuntimeResult<Value> {
    let count = usize::try_from(count).unwrap_or(0);
    match text.len().checked_mul(count) {
        Some(length) if length <= MAX_REPEATED_LENGTH => Ok(Value::Str(text.repeat(count))),
        _ => Err(RuntimeError::overflow("String repetition")),
    }
}

/// The zero check runs before any type check.
fn divide(left: &Value, right: &Value) -> RuntimeResult<Value> {
    let divisor_is_zero = match right {
        Value::Int(value) => *value == 0,
        Value::Float(value) => *value == 0.0,
        _ => false,
    };
    if divisor_is_zero {
        return Err(RuntimeError::DivisionByZero {
            location: Location::default(),
        });
    }
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok(Value::Float(a.as_f64() / b.as_f64())),
        _ => Err(RuntimeError::invalid_type(format!(
            "Division requires numeric types, got {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn compare(op: Operator, left: &Value, right: &Value) -> RuntimeResult<Value> {
    let ordering = match (left, right) {
        (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => {
            return match op {
                Operator::Equal => Ok(Value::Bool(a == b)),
                Operator::NotEqual => Ok(Value::Bool(a != b)),
                _ => Err(RuntimeError::invalid_type(format!(
                    "Strings only support '==' and '!=', got '{op}'"
                ))),
            };
        }
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => a.as_f64().partial_cmp(&b.as_f64()),
            _ => return Err(operand_error(op, left, right, "numeric")),
        },
    };
    let result = match op {
        Operator::Equal => ordering.is_some_and(|o| o.is_eq()),
        Operator::NotEqual => !ordering.is_some_and(|o| o.is_eq()),
        Operator::Less => ordering.is_some_and(|o| o.is_lt()),
        Operator::Greater => ordering.is_some_and(|o| o.is_gt()),
        Operator::LessEqual => ordering.is_some_and(|o| o.is_le()),
        Operator::GreaterEqual => ordering.is_some_and(|o| o.is_ge()),
        _ => false,
    };
    Ok(Value::Bool(result))
}

fn negate(op: Operator, operand: Value) -> RuntimeResult<Value> {
    match (op, operand) {
        (Operator::Minus, Value::Int(value)) => value
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| RuntimeError::overflow("Negation")),
        (Operator::Minus, Value::Float(value)) => Ok(Value::Float(-value)),
        (Operator::Not, Value::Bool(value)) => Ok(Value::Bool(!value)),
        (Operator::Minus, other) => Err(RuntimeError::invalid_type(format!(
            "Negation requires numeric types, got {}",
            other.type_name()
        ))),
        (_, other) => Err(RuntimeError::invalid_type(format!(
            "Logical NOT requires a boolean type, got {}",
            other.type_name()
        ))),
    }
}

fn operand_error(op: Operator, left: &Value, right: &Value, expected: &str) -> RuntimeError {
    RuntimeError::invalid_type(format!(
        "'{op}' requires {expected} types, got {} and {}",
        left.type_name(),
        right.type_name()
    ))
}
