// File: src/interpreter/native_functions/math.rs
//
// Math-related native functions

use super::expect_numbers;
use crate::ast::Builtin;
use crate::builtins;
use crate::errors::{LogoError, SourceLocation};
use crate::interpreter::Value;

/// Handle math-related function calls
/// Returns Some(result) if the function was handled, None if not recognized
pub fn handle(
    builtin: Builtin,
    args: &[Value],
    location: SourceLocation,
) -> Option<Result<Value, LogoError>> {
    let result = match builtin {
        Builtin::Rand => expect_numbers(builtin, args, 2, location)
            .map(|n| Value::Number(builtins::random_between(n[0], n[1]))),
        _ => return None,
    };
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_rand_stays_within_bounds() {
        for _ in 0..100 {
            let v = handle(Builtin::Rand, &[Value::Number(3.0), Value::Number(4.0)], SourceLocation::unknown())
                .unwrap()
                .unwrap();
            let n = v.as_number().unwrap();
            assert!((3.0..=4.0).contains(&n));
        }
    }

    #[test]
    fn test_rand_rejects_strings() {
        let err = handle(
            Builtin::Rand,
            &[Value::Number(3.0), Value::Str("4".into())],
            SourceLocation::unknown(),
        )
        .unwrap()
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }
}
