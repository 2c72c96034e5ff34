// File: src/interpreter/native_functions/vars.rs
//
// Slider variable declarations and the push/pop value stack

use super::{expect_arity, expect_number, expect_string};
use crate::ast::Builtin;
use crate::errors::{LogoError, SourceLocation};
use crate::interpreter::Value;
use crate::vm::{FloatVar, IntVar, Machine};

pub fn handle(
    machine: &mut Machine,
    builtin: Builtin,
    args: &[Value],
    location: SourceLocation,
) -> Option<Result<Value, LogoError>> {
    let result = match builtin {
        Builtin::IntVar | Builtin::FloatVar => declare(machine, builtin, args, location),

        Builtin::Push => {
            for value in args {
                machine.push_value(value.clone());
            }
            Ok(Value::Undefined)
        }

        Builtin::Pop => expect_arity(builtin, args, 0, location)
            .and_then(|_| machine.pop_value().ok_or_else(|| LogoError::stack_underflow(location))),

        _ => return None,
    };
    Some(result)
}

/// `intvar(name, min, max, default)` / `floatvar(...)`.
/// The default only seeds the root frame when the name is unset there.
fn declare(
    machine: &mut Machine,
    builtin: Builtin,
    args: &[Value],
    location: SourceLocation,
) -> Result<Value, LogoError> {
    expect_arity(builtin, args, 4, location)?;
    let name = expect_string(builtin, args, 0, location)?;
    let min = expect_number(builtin, args, 1, location)?;
    let max = expect_number(builtin, args, 2, location)?;
    let default = expect_number(builtin, args, 3, location)?;

    if min.is_nan() || max.is_nan() {
        return Err(LogoError::type_error(
            format!("'{}' bounds must be numbers, got NaN", builtin.name()),
            location,
        ));
    }
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if builtin == Builtin::IntVar {
        let range = IntVar { min: min.trunc() as i64, max: max.trunc() as i64 };
        machine.declare_int_var(&name, range, Value::Number(default.trunc()));
    } else {
        machine.declare_float_var(&name, FloatVar { min, max }, Value::Number(default));
    }
    Ok(Value::Undefined)
}
