// File: src/interpreter/native_functions/mod.rs
//
// Built-in function implementations, split by category.
// Every built-in checks its argument count and argument kinds before touching
// the machine, so a rejected call leaves no partial effect behind.

pub mod math;
pub mod system;
pub mod turtle;
pub mod vars;

use crate::ast::Builtin;
use crate::errors::{LogoError, SourceLocation};
use crate::interpreter::Value;
use crate::vm::Machine;

/// Route an already-evaluated built-in call to its category module
pub fn call_native_function(
    machine: &mut Machine,
    builtin: Builtin,
    args: &[Value],
    location: SourceLocation,
) -> Result<Value, LogoError> {
    if let Some(result) = turtle::handle(machine, builtin, args, location) {
        return result;
    }
    if let Some(result) = math::handle(builtin, args, location) {
        return result;
    }
    if let Some(result) = vars::handle(machine, builtin, args, location) {
        return result;
    }
    if let Some(result) = system::handle(machine, builtin, args, location) {
        return result;
    }

    // Every Builtin variant belongs to exactly one category above
    Err(LogoError::undefined_function(builtin.name(), location))
}

pub(crate) fn expect_arity(
    builtin: Builtin,
    args: &[Value],
    expected: usize,
    location: SourceLocation,
) -> Result<(), LogoError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(LogoError::arity(builtin.name(), expected, args.len(), location))
    }
}

pub(crate) fn expect_number(
    builtin: Builtin,
    args: &[Value],
    index: usize,
    location: SourceLocation,
) -> Result<f64, LogoError> {
    match args.get(index) {
        Some(Value::Number(n)) => Ok(*n),
        Some(other) => Err(argument_kind_error(builtin, index, "number", other, location)),
        None => Err(LogoError::arity(builtin.name(), index + 1, args.len(), location)),
    }
}

pub(crate) fn expect_string(
    builtin: Builtin,
    args: &[Value],
    index: usize,
    location: SourceLocation,
) -> Result<String, LogoError> {
    match args.get(index) {
        Some(Value::Str(s)) => Ok(s.clone()),
        Some(other) => Err(argument_kind_error(builtin, index, "string", other, location)),
        None => Err(LogoError::arity(builtin.name(), index + 1, args.len(), location)),
    }
}

/// Arity check followed by a number check on every argument
pub(crate) fn expect_numbers(
    builtin: Builtin,
    args: &[Value],
    expected: usize,
    location: SourceLocation,
) -> Result<Vec<f64>, LogoError> {
    expect_arity(builtin, args, expected, location)?;
    (0..expected).map(|i| expect_number(builtin, args, i, location)).collect()
}

fn argument_kind_error(
    builtin: Builtin,
    index: usize,
    expected: &str,
    found: &Value,
    location: SourceLocation,
) -> LogoError {
    LogoError::type_error(
        format!(
            "'{}' argument {} must be a {}, got {}",
            builtin.name(),
            index + 1,
            expected,
            found.kind_name()
        ),
        location,
    )
}
