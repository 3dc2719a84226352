// src/component/codegen.rs

use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// Errors raised while emitting directives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    #[error("variable '{0}' is already declared")]
    Redeclared(String),
    #[error("variable '{0}' is not declared")]
    UnknownVariable(String),
}

/// Argument of a setter call.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Int(i64),
    UInt(u32),
    Float(f32),
    /// Reference to a declared variable.
    Variable(String),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Int(v) => write!(f, "{}", v),
            Expression::UInt(v) => write!(f, "{}", v),
            // `{:?}` keeps the decimal point on whole numbers.
            Expression::Float(v) => write!(f, "{:?}f", v),
            Expression::Variable(name) => f.write_str(name),
        }
    }
}

impl From<i64> for Expression {
    fn from(v: i64) -> Self {
        Expression::Int(v)
    }
}

impl From<u32> for Expression {
    fn from(v: u32) -> Self {
        Expression::UInt(v)
    }
}

impl From<f32> for Expression {
    fn from(v: f32) -> Self {
        Expression::Float(v)
    }
}

/// A generation-time instruction, rendered to one C++ statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    DeclareInstance { id: String, class: String },
    RegisterComponent { id: String },
    RegisterUartDevice { id: String, uart_bus: String },
    Call { id: String, method: String, args: Vec<Expression> },
}

impl Directive {
    /// ID of the instance the directive acts on.
    pub fn target(&self) -> &str {
        match self {
            Directive::DeclareInstance { id, .. }
            | Directive::RegisterComponent { id }
            | Directive::RegisterUartDevice { id, .. }
            | Directive::Call { id, .. } => id,
        }
    }

    /// Method name for setter calls.
    pub fn method(&self) -> Option<&str> {
        match self {
            Directive::Call { method, .. } => Some(method),
            _ => None,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::DeclareInstance { id, class } => write!(f, "auto *{} = new {}();", id, class),
            Directive::RegisterComponent { id } => write!(f, "App.register_component({});", id),
            Directive::RegisterUartDevice { id, uart_bus } => {
                write!(f, "{}->set_uart_parent({});", id, uart_bus)
            }
            Directive::Call { id, method, args } => {
                write!(f, "{}->{}(", id, method)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(");")
            }
        }
    }
}

/// Directives emitted so far plus the variables they may refer to.
#[derive(Debug, Clone, Default)]
pub struct CodegenContext {
    directives: Vec<Directive>,
    variables: BTreeSet<String>,
}

impl CodegenContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a variable created outside this context, such as a UART bus.
    pub fn declare_variable(&mut self, id: &str) -> Result<(), CodegenError> {
        if !self.variables.insert(id.to_string()) {
            return Err(CodegenError::Redeclared(id.to_string()));
        }
        Ok(())
    }

    pub fn is_declared(&self, id: &str) -> bool {
        self.variables.contains(id)
    }

    /// Looks up a declared variable as an expression.
    pub fn get_variable(&self, id: &str) -> Result<Expression, CodegenError> {
        if !self.is_declared(id) {
            return Err(CodegenError::UnknownVariable(id.to_string()));
        }
        Ok(Expression::Variable(id.to_string()))
    }

    /// Declares `id` and emits `auto *id = new class();`.
    pub fn new_instance(&mut self, id: &str, class: &str) -> Result<(), CodegenError> {
        self.declare_variable(id)?;
        self.directives.push(Directive::DeclareInstance {
            id: id.to_string(),
            class: class.to_string(),
        });
        Ok(())
    }

    /// Emits a setter call on a declared instance.
    pub fn call(&mut self, id: &str, method: &str, args: Vec<Expression>) -> Result<(), CodegenError> {
        self.get_variable(id)?;
        self.add(Directive::Call {
            id: id.to_string(),
            method: method.to_string(),
            args,
        });
        Ok(())
    }

    pub fn add(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Renders all directives, one statement per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for directive in &self.directives {
            // Writing to a String cannot fail.
            let _ = fmt::write(&mut out, format_args!("{}\n", directive));
        }
        out
    }
}

// --- Host helpers ---

/// Registers a component, preceded by its setup priority when one is set.
pub fn register_component(
    ctx: &mut CodegenContext,
    id: &str,
    setup_priority: Option<f32>,
) -> Result<(), CodegenError> {
    ctx.get_variable(id)?;
    if let Some(priority) = setup_priority {
        ctx.call(id, "set_setup_priority", alloc::vec![Expression::Float(priority)])?;
    }
    ctx.add(Directive::RegisterComponent { id: id.to_string() });
    Ok(())
}

/// Attaches a device to a declared UART bus.
pub fn register_uart_device(ctx: &mut CodegenContext, id: &str, uart_bus: &str) -> Result<(), CodegenError> {
    ctx.get_variable(id)?;
    ctx.get_variable(uart_bus)?;
    ctx.add(Directive::RegisterUartDevice {
        id: id.to_string(),
        uart_bus: uart_bus.to_string(),
    });
    Ok(())
}
