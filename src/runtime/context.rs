//! Call-scoped variable storage plus the program-wide function table.
//!
//! One `Context` exists per active function call. There is no block scoping:
//! a variable declared inside an `if` lives until the function returns.

use log::debug;
use rustc_hash::FxHashMap;

use crate::ast::{Function, TypeName};

use super::error::{RuntimeError, RuntimeResult};
use super::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub value: Value,
    pub type_name: TypeName,
}

#[derive(Debug)]
pub struct Context<'p> {
    variables: FxHashMap<String, Variable>,
    return_value: Option<Value>,
    function: &'p Function,
}

impl<'p> Context<'p> {
    fn new(function: &'p Function) -> Self {
        Self {
            variables: FxHashMap::default(),
            return_value: None,
            function,
        }
    }
}

#[derive(Debug, Default)]
pub struct ContextManager<'p> {
    functions: FxHashMap<&'p str, &'p Function>,
    contexts: Vec<Context<'p>>,
}

impl<'p> ContextManager<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, function: &'p Function) -> RuntimeResult<()> {
        if self.functions.contains_key(function.name.as_str()) {
            return Err(RuntimeError::redefinition(&function.name).at(function.position));
        }
        self.functions.insert(&function.name, function);
        Ok(())
    }

    pub fn get_function(&self, name: &str) -> RuntimeResult<&'p Function> {
        self.functions
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::undeclared_function(name))
    }

    pub fn is_function_exists(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Pushes a fresh scope for `name` and returns its definition.
    pub fn enter_context(&mut self, name: &str) -> RuntimeResult<&'p Function> {
        let function = self.get_function(name)?;
        self.contexts.push(Context::new(function));
        debug!("entered '{name}' (depth {})", self.contexts.len());
        Ok(function)
    }

    pub fn exit_context(&mut self) -> Option<Context<'p>> {
        let context = self.contexts.pop();
        if let Some(context) = &context {
            debug!(
                "left '{}' (depth {})",
                context.function.name,
                self.contexts.len()
            );
        }
        context
    }

    pub fn add_variable(
        &mut self,
        name: &str,
        value: Value,
        type_name: TypeName,
    ) -> RuntimeResult<()> {
        // Outside any call every name counts as undeclared.
        let context = self
            .contexts
            .last_mut()
            .ok_or_else(|| RuntimeError::undeclared_variable(name))?;
        if context.variables.contains_key(name) {
            return Err(RuntimeError::redefinition(name));
        }
        context
            .variables
            .insert(name.to_string(), Variable { value, type_name });
        Ok(())
    }

    pub fn get_variable_value(&self, name: &str) -> RuntimeResult<Value> {
        self.variable(name).map(|variable| variable.value.clone())
    }

    pub fn get_variable_type(&self, name: &str) -> RuntimeResult<TypeName> {
        self.variable(name).map(|variable| variable.type_name)
    }

    pub fn set_variable_value(&mut self, name: &str, value: Value) -> RuntimeResult<()> {
        let variable = self
            .contexts
            .last_mut()
            .and_then(|context| context.variables.get_mut(name))
            .ok_or_else(|| RuntimeError::undeclared_variable(name))?;
        variable.value = value;
        Ok(())
    }

    /// Looks only at the innermost context; callers' variables are invisible.
    pub fn is_variable_exists(&self, name: &str) -> bool {
        self.variable(name).is_ok()
    }

    pub fn set_return_value(&mut self, value: Value) {
        if let Some(context) = self.contexts.last_mut() {
            context.return_value = Some(value);
        }
    }

    pub fn get_return_value(&self) -> Option<&Value> {
        self.contexts
            .last()
            .and_then(|context| context.return_value.as_ref())
    }

    fn variable(&self, name: &str) -> RuntimeResult<&Variable> {
        self.contexts
            .last()
            .and_then(|context| context.variables.get(name))
            .ok_or_else(|| RuntimeError::undeclared_variable(name))
    }
}
