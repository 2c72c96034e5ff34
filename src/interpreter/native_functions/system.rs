// File: src/interpreter/native_functions/system.rs
//
// Machine-level built-ins: clear, viewport queries and debug output

use super::expect_arity;
use crate::ast::Builtin;
use crate::errors::{LogoError, SourceLocation};
use crate::interpreter::Value;
use crate::vm::Machine;

/// Handle system built-ins
/// Returns Some(result) if the function was handled, None if not recognized
pub fn handle(
    machine: &mut Machine,
    builtin: Builtin,
    args: &[Value],
    location: SourceLocation,
) -> Option<Result<Value, LogoError>> {
    let result = match builtin {
        Builtin::Clear => expect_arity(builtin, args, 0, location).map(|_| {
            // The running program still needs its frames
            machine.clear_state(false);
            Value::Undefined
        }),

        Builtin::WinW | Builtin::WinH | Builtin::MidX | Builtin::MidY => {
            expect_arity(builtin, args, 0, location).map(|_| {
                let n = match builtin {
                    Builtin::WinW => machine.viewport_width(),
                    Builtin::WinH => machine.viewport_height(),
                    Builtin::MidX => (machine.viewport_width() / 2.0).floor(),
                    _ => (machine.viewport_height() / 2.0).floor(),
                };
                Value::Number(n)
            })
        }

        Builtin::Debug => {
            let line = args.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
            tracing::info!(target: "plogo::debug", "{}", line);
            machine.log_message(line);
            Ok(Value::Undefined)
        }

        _ => return None,
    };
    Some(result)
}
